use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::agent::{AgentId, AgentType};
use crate::domain::company::{CompanyField, CompanyProfile};
use crate::errors::DomainError;
use crate::plan::catalog::AgentCatalog;
use crate::plan::selection::{parse_with_fallback, SelectionState};
use crate::view::ConfiguratorView;
use crate::wizard::{Wizard, WizardEvent};

/// Increment applied by the +/- limit controls.
pub const LIMIT_STEP: i64 = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfiguratorAction {
    Toggle { agent_id: AgentId },
    SetLimit { agent_id: AgentId, input: String },
    IncrementLimit { agent_id: AgentId },
    DecrementLimit { agent_id: AgentId },
    SetConcurrency { agent_id: AgentId, input: String },
    IncrementConcurrency { agent_id: AgentId },
    DecrementConcurrency { agent_id: AgentId },
    UpdateCompany { field: CompanyField, value: String },
    Next,
    Previous,
}

impl ConfiguratorAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Toggle { .. } => "toggle",
            Self::SetLimit { .. } => "set_limit",
            Self::IncrementLimit { .. } => "increment_limit",
            Self::DecrementLimit { .. } => "decrement_limit",
            Self::SetConcurrency { .. } => "set_concurrency",
            Self::IncrementConcurrency { .. } => "increment_concurrency",
            Self::DecrementConcurrency { .. } => "decrement_concurrency",
            Self::UpdateCompany { .. } => "update_company",
            Self::Next => "next",
            Self::Previous => "previous",
        }
    }
}

/// Parses compact action scripts such as `toggle:estimation`,
/// `limit:conversational=250`, `clients+:conversational`,
/// `company:name=Acme`, `next` and `previous`.
impl FromStr for ConfiguratorAction {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let unknown = || DomainError::UnknownAction(value.to_string());

        match value.to_ascii_lowercase().as_str() {
            "next" => return Ok(Self::Next),
            "previous" | "prev" | "back" => return Ok(Self::Previous),
            _ => {}
        }

        let (verb, rest) = value.split_once(':').ok_or_else(unknown)?;
        let (target, input) = match rest.split_once('=') {
            Some((target, input)) => (target.trim(), Some(input)),
            None => (rest.trim(), None),
        };
        if target.is_empty() {
            return Err(unknown());
        }
        let agent_id = AgentId::from(target);

        match (verb.trim().to_ascii_lowercase().as_str(), input) {
            ("toggle", None) => Ok(Self::Toggle { agent_id }),
            ("limit", Some(input)) => Ok(Self::SetLimit { agent_id, input: input.to_string() }),
            ("limit+", None) => Ok(Self::IncrementLimit { agent_id }),
            ("limit-", None) => Ok(Self::DecrementLimit { agent_id }),
            ("clients", Some(input)) => {
                Ok(Self::SetConcurrency { agent_id, input: input.to_string() })
            }
            ("clients+", None) => Ok(Self::IncrementConcurrency { agent_id }),
            ("clients-", None) => Ok(Self::DecrementConcurrency { agent_id }),
            ("company", Some(input)) => {
                let field = CompanyField::parse(target).ok_or_else(unknown)?;
                Ok(Self::UpdateCompany { field, value: input.to_string() })
            }
            _ => Err(unknown()),
        }
    }
}

/// One onboarding session: catalog, selections, wizard cursor and company
/// profile, mutated only through `handle`.
pub struct Configurator<S> {
    catalog: AgentCatalog,
    selections: SelectionState,
    wizard: Wizard,
    company: CompanyProfile,
    currency: String,
    sink: S,
    audit: AuditContext,
}

impl<S> Configurator<S>
where
    S: AuditSink,
{
    pub fn new(
        catalog: AgentCatalog,
        currency: impl Into<String>,
        sink: S,
        audit: AuditContext,
    ) -> Self {
        let selections = SelectionState::initialize(&catalog);
        Self {
            catalog,
            selections,
            wizard: Wizard::new(),
            company: CompanyProfile::default(),
            currency: currency.into(),
            sink,
            audit,
        }
    }

    pub fn catalog(&self) -> &AgentCatalog {
        &self.catalog
    }

    pub fn selections(&self) -> &SelectionState {
        &self.selections
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn company(&self) -> &CompanyProfile {
        &self.company
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn view(&self) -> ConfiguratorView {
        ConfiguratorView::derive(
            &self.catalog,
            &self.selections,
            &self.wizard,
            &self.currency,
            self.company.is_complete(),
        )
    }

    pub fn handle(&mut self, action: ConfiguratorAction) -> Result<ConfiguratorView, DomainError> {
        let action_name = action.name();
        match self.apply(action) {
            Ok(()) => {
                let view = self.view();
                debug!(
                    event_name = "configurator.action_applied",
                    action = action_name,
                    session_id = %self.audit.session_id,
                    correlation_id = %self.audit.correlation_id,
                    step = view.step.index,
                    total = %view.total,
                    "configurator action applied"
                );
                Ok(view)
            }
            Err(error) => {
                debug!(
                    event_name = "configurator.action_rejected",
                    action = action_name,
                    session_id = %self.audit.session_id,
                    correlation_id = %self.audit.correlation_id,
                    error = %error,
                    "configurator action rejected"
                );
                self.sink.emit(
                    AuditEvent::new(
                        &self.audit,
                        format!("configurator.{action_name}"),
                        AuditCategory::Selection,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
                Err(error)
            }
        }
    }

    fn apply(&mut self, action: ConfiguratorAction) -> Result<(), DomainError> {
        match action {
            ConfiguratorAction::Toggle { agent_id } => {
                let enabled = self.selections.toggle(&self.catalog, &agent_id)?;
                self.emit_selection("selection.toggled", &agent_id, "enabled", enabled);
            }
            ConfiguratorAction::SetLimit { agent_id, input } => {
                let fallback = self.base_limit(&agent_id)?;
                self.set_limit(&agent_id, parse_with_fallback(&input, fallback))?;
            }
            ConfiguratorAction::IncrementLimit { agent_id } => {
                let current = self.current_limit(&agent_id)?;
                self.set_limit(&agent_id, current + LIMIT_STEP)?;
            }
            ConfiguratorAction::DecrementLimit { agent_id } => {
                let current = self.current_limit(&agent_id)?;
                self.set_limit(&agent_id, current - LIMIT_STEP)?;
            }
            ConfiguratorAction::SetConcurrency { agent_id, input } => {
                self.set_concurrency(&agent_id, parse_with_fallback(&input, 1))?;
            }
            ConfiguratorAction::IncrementConcurrency { agent_id } => {
                let current = self.current_concurrency(&agent_id)?;
                self.set_concurrency(&agent_id, current + 1)?;
            }
            ConfiguratorAction::DecrementConcurrency { agent_id } => {
                let current = self.current_concurrency(&agent_id)?;
                self.set_concurrency(&agent_id, current - 1)?;
            }
            ConfiguratorAction::UpdateCompany { field, value } => {
                self.company.set(field, value);
                self.sink.emit(
                    AuditEvent::new(
                        &self.audit,
                        "profile.updated",
                        AuditCategory::Profile,
                        AuditOutcome::Success,
                    )
                    .with_metadata("field", format!("{field:?}")),
                );
            }
            ConfiguratorAction::Next => {
                self.wizard.apply_with_audit(WizardEvent::Next, &self.sink, &self.audit);
            }
            ConfiguratorAction::Previous => {
                self.wizard.apply_with_audit(WizardEvent::Previous, &self.sink, &self.audit);
            }
        }
        Ok(())
    }

    fn set_limit(&mut self, agent_id: &AgentId, requested: i64) -> Result<(), DomainError> {
        let agent = self.agent(agent_id)?;
        // mirrored limits are driven by their source while it is enabled
        let synced =
            agent.limit_source.as_ref().is_some_and(|source| self.selections.is_enabled(source));
        if synced {
            return Err(DomainError::ReadOnlyLimit(agent_id.clone()));
        }

        let limit = self.selections.set_limit(&self.catalog, agent_id, requested)?;
        self.emit_selection("selection.limit_set", agent_id, "limit", limit);
        Ok(())
    }

    fn set_concurrency(&mut self, agent_id: &AgentId, requested: i64) -> Result<(), DomainError> {
        if !self.agent(agent_id)?.supports_concurrency() {
            return Err(DomainError::ConcurrencyNotBilled(agent_id.clone()));
        }

        let clients = self.selections.set_concurrency(&self.catalog, agent_id, requested)?;
        self.emit_selection("selection.concurrency_set", agent_id, "concurrent_clients", clients);
        Ok(())
    }

    fn agent(&self, agent_id: &AgentId) -> Result<&AgentType, DomainError> {
        self.catalog.find(agent_id).ok_or_else(|| DomainError::UnknownAgent(agent_id.clone()))
    }

    fn base_limit(&self, agent_id: &AgentId) -> Result<i64, DomainError> {
        self.agent(agent_id).map(|agent| i64::from(agent.base_limit))
    }

    fn current_limit(&self, agent_id: &AgentId) -> Result<i64, DomainError> {
        let base = self.base_limit(agent_id)?;
        Ok(self
            .selections
            .get(agent_id)
            .map(|selection| i64::from(selection.limit))
            .unwrap_or(base))
    }

    fn current_concurrency(&self, agent_id: &AgentId) -> Result<i64, DomainError> {
        self.base_limit(agent_id)?;
        Ok(self
            .selections
            .get(agent_id)
            .map(|selection| i64::from(selection.concurrent_clients))
            .unwrap_or(1))
    }

    fn emit_selection(
        &self,
        event_type: &str,
        agent_id: &AgentId,
        key: &str,
        value: impl ToString,
    ) {
        self.sink.emit(
            AuditEvent::new(
                &self.audit,
                event_type,
                AuditCategory::Selection,
                AuditOutcome::Success,
            )
            .with_metadata("agent_id", agent_id.to_string())
            .with_metadata(key, value.to_string()),
        );
    }
}
