pub mod audit;
pub mod config;
pub mod configurator;
pub mod domain;
pub mod errors;
pub mod plan;
pub mod view;
pub mod wizard;

pub use audit::{AuditContext, AuditEvent, AuditSink, InMemoryAuditSink, NoopAuditSink};
pub use configurator::{Configurator, ConfiguratorAction};
pub use domain::agent::{AgentId, AgentType, IconKind, UsageUnit};
pub use domain::company::{CompanyField, CompanyProfile};
pub use domain::selection::AgentSelection;
pub use errors::{ApplicationError, CatalogError, DomainError, InterfaceError};
pub use plan::catalog::AgentCatalog;
pub use plan::pricing::{compute_monthly_total, format_money, price_selections, PricingResult};
pub use plan::selection::{parse_with_fallback, SelectionState};
pub use view::ConfiguratorView;
pub use wizard::{Wizard, WizardStep};
