use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::agent::{AgentId, AgentType, IconKind};
use crate::plan::catalog::AgentCatalog;
use crate::plan::pricing::{agent_cost, format_money, AgentCostBreakdown};
use crate::plan::selection::SelectionState;
use crate::wizard::{StepIndicator, Wizard};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepView {
    pub index: usize,
    pub label: String,
    pub count: usize,
    pub progress_percent: f64,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub indicators: Vec<StepIndicator>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCard {
    pub agent_id: AgentId,
    pub name: String,
    pub description: String,
    pub icon: IconKind,
    pub features: Vec<String>,
    pub price_label: String,
    pub allowance_label: String,
    pub extra_unit_label: String,
    pub selected: bool,
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfigView {
    pub agent_id: AgentId,
    pub name: String,
    pub icon: IconKind,
    pub limit: u32,
    pub limit_editable: bool,
    pub can_decrease_limit: bool,
    pub concurrent_clients: Option<u32>,
    pub can_decrease_concurrency: bool,
    pub synced_with: Option<AgentId>,
    pub breakdown: AgentCostBreakdown,
    pub monthly_cost_display: String,
    pub overage_display: String,
}

/// Everything a renderer needs for one frame. Re-derived from state on every
/// call; deriving never mutates anything.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfiguratorView {
    pub step: StepView,
    pub catalog: Vec<AgentCard>,
    pub configuration: Vec<AgentConfigView>,
    pub total: Decimal,
    pub total_display: String,
    pub currency: String,
    pub company_profile_complete: bool,
}

impl ConfiguratorView {
    pub fn derive(
        catalog: &AgentCatalog,
        selections: &SelectionState,
        wizard: &Wizard,
        currency: &str,
        company_profile_complete: bool,
    ) -> Self {
        let step = StepView {
            index: wizard.current_index(),
            label: wizard.current_step().label().to_string(),
            count: wizard.step_count(),
            progress_percent: wizard.progress_percent(),
            can_go_back: wizard.can_go_back(),
            can_go_forward: wizard.can_go_forward(),
            indicators: wizard.indicators(),
        };

        let cards = catalog
            .list_agent_types()
            .iter()
            .map(|agent| agent_card(agent, selections.is_enabled(&agent.id)))
            .collect();

        let configuration: Vec<AgentConfigView> = catalog
            .list_agent_types()
            .iter()
            .filter_map(|agent| {
                let selection = selections.enabled(&agent.id)?;
                let breakdown = agent_cost(agent, selection);
                let synced_with = agent
                    .limit_source
                    .as_ref()
                    .filter(|source| selections.is_enabled(source))
                    .cloned();

                Some(AgentConfigView {
                    agent_id: agent.id.clone(),
                    name: agent.name.clone(),
                    icon: agent.icon,
                    limit: selection.limit,
                    limit_editable: synced_with.is_none(),
                    can_decrease_limit: synced_with.is_none()
                        && selection.limit > agent.base_limit,
                    concurrent_clients: agent
                        .supports_concurrency()
                        .then_some(selection.concurrent_clients),
                    can_decrease_concurrency: agent.supports_concurrency()
                        && selection.concurrent_clients > 1,
                    synced_with,
                    monthly_cost_display: format!("{}/month", format_money(breakdown.monthly_cost)),
                    overage_display: format!(
                        "Base: {} included, Extra: {} x ${} = {}",
                        agent.base_limit,
                        breakdown.overage_units,
                        breakdown.overage_rate.normalize(),
                        format_money(breakdown.overage_cost)
                    ),
                    breakdown,
                })
            })
            .collect();

        let total: Decimal = configuration.iter().map(|line| line.breakdown.monthly_cost).sum();

        Self {
            step,
            catalog: cards,
            configuration,
            total,
            total_display: format_money(total),
            currency: currency.to_string(),
            company_profile_complete,
        }
    }
}

fn agent_card(agent: &AgentType, selected: bool) -> AgentCard {
    AgentCard {
        agent_id: agent.id.clone(),
        name: agent.name.clone(),
        description: agent.description.clone(),
        icon: agent.icon,
        features: agent.features.clone(),
        price_label: format!("${}/month", agent.base_price.normalize()),
        allowance_label: format!("{} {}/month", agent.base_limit, agent.usage_unit.plural()),
        extra_unit_label: format!(
            "+${} per extra {}",
            agent.extra_unit_cost.normalize(),
            agent.usage_unit.singular()
        ),
        selected,
        required: agent.required,
    }
}
