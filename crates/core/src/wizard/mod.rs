pub mod engine;
pub mod states;

pub use engine::Wizard;
pub use states::{StepIndicator, StepStatus, TransitionOutcome, WizardEvent, WizardStep};
