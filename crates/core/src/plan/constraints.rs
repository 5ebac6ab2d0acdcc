use serde::{Deserialize, Serialize};

use crate::plan::catalog::AgentCatalog;
use crate::plan::selection::SelectionState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub valid: bool,
    pub violations: Vec<ConstraintViolation>,
}

impl Default for ConstraintResult {
    fn default() -> Self {
        Self { valid: true, violations: Vec::new() }
    }
}

pub trait ConstraintEngine: Send + Sync {
    fn validate(&self, catalog: &AgentCatalog, selections: &SelectionState) -> ConstraintResult;
}

#[derive(Default)]
pub struct DeterministicConstraintEngine;

impl ConstraintEngine for DeterministicConstraintEngine {
    fn validate(&self, catalog: &AgentCatalog, selections: &SelectionState) -> ConstraintResult {
        validate_selections(catalog, selections)
    }
}

/// Checks a selection state against the plan invariants. State built through
/// `SelectionState` setters always passes; hand-assembled or deserialized
/// state may not.
pub fn validate_selections(
    catalog: &AgentCatalog,
    selections: &SelectionState,
) -> ConstraintResult {
    let mut result = ConstraintResult::default();

    let anchor = catalog.required_agent();
    if !selections.is_enabled(&anchor.id) {
        result.violations.push(ConstraintViolation {
            code: "REQUIRED_AGENT_DISABLED".to_string(),
            message: format!("Agent {} is required and must stay enabled", anchor.id),
            suggestion: Some(format!("Re-enable {}", anchor.name)),
        });
    }

    for (agent_id, selection) in selections.iter() {
        let Some(agent) = catalog.find(agent_id) else {
            result.violations.push(ConstraintViolation {
                code: "UNKNOWN_AGENT".to_string(),
                message: format!("Selection references unknown agent {agent_id}"),
                suggestion: Some(
                    "Remove the selection or add the agent to the catalog".to_string(),
                ),
            });
            continue;
        };

        let mirrored = agent
            .limit_source
            .as_ref()
            .and_then(|source| selections.enabled(source))
            .filter(|_| selection.enabled);

        match mirrored {
            Some(source) if source.limit != selection.limit => {
                result.violations.push(ConstraintViolation {
                    code: "MIRRORED_LIMIT_DRIFT".to_string(),
                    message: format!(
                        "Agent {agent_id} limit {} differs from its source limit {}",
                        selection.limit, source.limit
                    ),
                    suggestion: Some("Set the source agent's limit again to resync".to_string()),
                });
            }
            Some(_) => {}
            None if selection.limit < agent.base_limit => {
                result.violations.push(ConstraintViolation {
                    code: "LIMIT_BELOW_BASE".to_string(),
                    message: format!(
                        "Agent {agent_id} limit {} is below the included {}",
                        selection.limit, agent.base_limit
                    ),
                    suggestion: Some(format!("Use a limit of at least {}", agent.base_limit)),
                });
            }
            None => {}
        }

        if selection.concurrent_clients == 0 {
            result.violations.push(ConstraintViolation {
                code: "ZERO_CONCURRENCY".to_string(),
                message: format!("Agent {agent_id} has no concurrent client slots"),
                suggestion: Some("Use at least one concurrent client".to_string()),
            });
        }
    }

    if !result.violations.is_empty() {
        result.valid = false;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::validate_selections;
    use crate::domain::agent::{AgentId, CONVERSATIONAL, ESTIMATION};
    use crate::domain::selection::AgentSelection;
    use crate::plan::catalog::AgentCatalog;
    use crate::plan::selection::SelectionState;

    #[test]
    fn state_built_through_setters_is_valid() {
        let catalog = AgentCatalog::standard();
        let mut state = SelectionState::initialize(&catalog);
        state.toggle(&catalog, &AgentId::from(ESTIMATION)).expect("toggle");
        state.set_limit(&catalog, &AgentId::from(CONVERSATIONAL), 320).expect("limit");
        state.set_concurrency(&catalog, &AgentId::from(CONVERSATIONAL), 0).expect("clients");

        let result = validate_selections(&catalog, &state);
        assert!(result.valid, "{:?}", result.violations);
    }

    #[test]
    fn detects_hand_assembled_violations() {
        let catalog = AgentCatalog::standard();
        let raw = serde_json::json!({
            "selections": {
                "conversational": { "enabled": false, "limit": 40, "concurrent_clients": 0 },
                "estimation": { "enabled": true, "limit": 300, "concurrent_clients": 1 },
                "support": { "enabled": true, "limit": 100, "concurrent_clients": 1 }
            }
        });
        let state: SelectionState = serde_json::from_value(raw).expect("deserialize state");

        let result = validate_selections(&catalog, &state);
        let codes: Vec<&str> = result.violations.iter().map(|v| v.code.as_str()).collect();

        assert!(!result.valid);
        assert!(codes.contains(&"REQUIRED_AGENT_DISABLED"));
        assert!(codes.contains(&"LIMIT_BELOW_BASE"));
        assert!(codes.contains(&"ZERO_CONCURRENCY"));
        assert!(codes.contains(&"UNKNOWN_AGENT"));
        assert_eq!(AgentSelection::enabled_at(100).extra_clients(), 0);
    }

    #[test]
    fn detects_mirror_drift() {
        let catalog = AgentCatalog::standard();
        let raw = serde_json::json!({
            "selections": {
                "conversational": { "enabled": true, "limit": 250, "concurrent_clients": 1 },
                "estimation": { "enabled": true, "limit": 150, "concurrent_clients": 1 }
            }
        });
        let state: SelectionState = serde_json::from_value(raw).expect("deserialize state");

        let result = validate_selections(&catalog, &state);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].code, "MIRRORED_LIMIT_DRIFT");
    }
}
