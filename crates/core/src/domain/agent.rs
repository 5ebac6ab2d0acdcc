use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const CONVERSATIONAL: &str = "conversational";
pub const ESTIMATION: &str = "estimation";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Icon tag resolved to a concrete asset by whatever renders the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconKind {
    Bot,
    Calculator,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageUnit {
    Calls,
    Estimations,
}

impl UsageUnit {
    pub fn singular(&self) -> &'static str {
        match self {
            Self::Calls => "call",
            Self::Estimations => "estimation",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Estimations => "estimations",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentType {
    pub id: AgentId,
    pub name: String,
    pub description: String,
    pub icon: IconKind,
    pub usage_unit: UsageUnit,
    pub base_price: Decimal,
    pub base_limit: u32,
    pub extra_unit_cost: Decimal,
    pub features: Vec<String>,
    /// The anchor agent every plan carries; it can never be toggled off.
    #[serde(default)]
    pub required: bool,
    /// Monthly fee for each concurrent client slot beyond the first.
    #[serde(default)]
    pub concurrency_surcharge: Option<Decimal>,
    /// Agent whose limit this one mirrors while both are enabled.
    #[serde(default)]
    pub limit_source: Option<AgentId>,
}

impl AgentType {
    pub fn overage_units(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.base_limit)
    }

    pub fn supports_concurrency(&self) -> bool {
        self.concurrency_surcharge.is_some()
    }
}
