use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStep {
    AgentSelection,
    Configuration,
}

impl WizardStep {
    pub const ALL: [WizardStep; 2] = [WizardStep::AgentSelection, WizardStep::Configuration];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AgentSelection => "Agent Selection",
            Self::Configuration => "Configuration",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::AgentSelection => 0,
            Self::Configuration => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardEvent {
    Next,
    Previous,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Current,
    Upcoming,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepIndicator {
    pub number: usize,
    pub label: String,
    pub status: StepStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: WizardStep,
    pub to: WizardStep,
    pub event: WizardEvent,
}

impl TransitionOutcome {
    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}
