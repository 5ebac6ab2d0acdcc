use thiserror::Error;

use crate::domain::agent::AgentId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown agent `{0}`")]
    UnknownAgent(AgentId),
    #[error("limit of agent `{0}` follows its source agent and cannot be edited")]
    ReadOnlyLimit(AgentId),
    #[error("agent `{0}` does not bill concurrent clients")]
    ConcurrencyNotBilled(AgentId),
    #[error("unknown configurator action `{0}`")]
    UnknownAction(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("agent catalog must contain at least one agent")]
    Empty,
    #[error("duplicate agent id `{0}` in catalog")]
    DuplicateAgent(AgentId),
    #[error("agent `{0}` must include a base limit greater than zero")]
    ZeroBaseLimit(AgentId),
    #[error("agent `{0}` has a negative price component")]
    NegativePrice(AgentId),
    #[error("catalog must mark exactly one agent as required, found {0}")]
    RequiredAgentCount(usize),
    #[error("agent `{agent}` mirrors `{source_agent}`, which is not an earlier unmirrored entry")]
    InvalidLimitSource { agent: AgentId, source_agent: AgentId },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Catalog(error) => Self::Internal {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
