use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSelection {
    pub enabled: bool,
    pub limit: u32,
    pub concurrent_clients: u32,
}

impl AgentSelection {
    pub fn enabled_at(limit: u32) -> Self {
        Self { enabled: true, limit, concurrent_clients: 1 }
    }

    pub fn extra_clients(&self) -> u32 {
        self.concurrent_clients.saturating_sub(1)
    }
}
