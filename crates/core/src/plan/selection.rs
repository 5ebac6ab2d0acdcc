use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::agent::{AgentId, AgentType};
use crate::domain::selection::AgentSelection;
use crate::errors::DomainError;
use crate::plan::catalog::AgentCatalog;

/// Per-agent enablement, usage limit and concurrency, keyed by agent id.
///
/// Agents absent from the map count as disabled. Every setter clamps instead
/// of rejecting, so the state is always renderable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    selections: BTreeMap<AgentId, AgentSelection>,
}

impl SelectionState {
    pub fn initialize(catalog: &AgentCatalog) -> Self {
        let anchor = catalog.required_agent();
        let mut selections = BTreeMap::new();
        selections.insert(anchor.id.clone(), AgentSelection::enabled_at(anchor.base_limit));
        Self { selections }
    }

    pub fn get(&self, agent_id: &AgentId) -> Option<&AgentSelection> {
        self.selections.get(agent_id)
    }

    pub fn enabled(&self, agent_id: &AgentId) -> Option<&AgentSelection> {
        self.get(agent_id).filter(|selection| selection.enabled)
    }

    pub fn is_enabled(&self, agent_id: &AgentId) -> bool {
        self.enabled(agent_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentId, &AgentSelection)> {
        self.selections.iter()
    }

    /// Flips an optional agent on or off. The required agent stays enabled.
    pub fn toggle(
        &mut self,
        catalog: &AgentCatalog,
        agent_id: &AgentId,
    ) -> Result<bool, DomainError> {
        let agent = lookup(catalog, agent_id)?;
        if agent.required {
            return Ok(true);
        }

        let selection = self
            .selections
            .entry(agent.id.clone())
            .and_modify(|selection| selection.enabled = !selection.enabled)
            .or_insert_with(|| AgentSelection::enabled_at(agent.base_limit));
        Ok(selection.enabled)
    }

    /// Sets the usage limit, clamped up to the agent's base limit, and pushes
    /// the same value to every enabled agent mirroring this one.
    pub fn set_limit(
        &mut self,
        catalog: &AgentCatalog,
        agent_id: &AgentId,
        requested: i64,
    ) -> Result<u32, DomainError> {
        let agent = lookup(catalog, agent_id)?;
        let limit = clamp_to(requested, agent.base_limit);

        self.entry_for(agent).limit = limit;

        for mirror in catalog.mirrors_of(&agent.id) {
            if let Some(selection) = self.selections.get_mut(&mirror.id) {
                if selection.enabled {
                    selection.limit = limit;
                }
            }
        }

        Ok(limit)
    }

    /// Sets concurrent client slots, never below one.
    pub fn set_concurrency(
        &mut self,
        catalog: &AgentCatalog,
        agent_id: &AgentId,
        requested: i64,
    ) -> Result<u32, DomainError> {
        let agent = lookup(catalog, agent_id)?;
        let clients = clamp_to(requested, 1);
        self.entry_for(agent).concurrent_clients = clients;
        Ok(clients)
    }

    fn entry_for(&mut self, agent: &AgentType) -> &mut AgentSelection {
        self.selections.entry(agent.id.clone()).or_insert_with(|| AgentSelection {
            enabled: false,
            limit: agent.base_limit,
            concurrent_clients: 1,
        })
    }
}

fn lookup<'a>(
    catalog: &'a AgentCatalog,
    agent_id: &AgentId,
) -> Result<&'a AgentType, DomainError> {
    catalog.find(agent_id).ok_or_else(|| DomainError::UnknownAgent(agent_id.clone()))
}

fn clamp_to(requested: i64, floor: u32) -> u32 {
    let capped = requested.clamp(i64::from(floor), i64::from(u32::MAX));
    u32::try_from(capped).unwrap_or(u32::MAX)
}

/// Parses the leading integer of a text field. Empty or non-numeric input
/// yields `fallback`.
pub fn parse_with_fallback(input: &str, fallback: i64) -> i64 {
    let trimmed = input.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let end = digits.find(|ch: char| !ch.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return fallback;
    }

    match digits[..end].parse::<i64>() {
        Ok(value) => sign * value,
        Err(_) if sign < 0 => i64::MIN,
        Err(_) => i64::MAX,
    }
}
