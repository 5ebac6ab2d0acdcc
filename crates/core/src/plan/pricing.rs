use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::agent::{AgentId, AgentType};
use crate::domain::selection::AgentSelection;
use crate::plan::catalog::AgentCatalog;
use crate::plan::selection::SelectionState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCostBreakdown {
    pub agent_id: AgentId,
    pub base_price: Decimal,
    pub overage_units: u32,
    pub overage_rate: Decimal,
    pub overage_cost: Decimal,
    pub extra_clients: u32,
    pub concurrency_surcharge: Decimal,
    pub monthly_cost: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTrace {
    pub currency: String,
    pub steps: Vec<PricingTraceStep>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub lines: Vec<AgentCostBreakdown>,
    pub total: Decimal,
    pub trace: PricingTrace,
}

pub trait PricingEngine: Send + Sync {
    fn price(
        &self,
        catalog: &AgentCatalog,
        selections: &SelectionState,
        currency: &str,
    ) -> PricingResult;
}

#[derive(Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(
        &self,
        catalog: &AgentCatalog,
        selections: &SelectionState,
        currency: &str,
    ) -> PricingResult {
        price_selections(catalog, selections, currency)
    }
}

pub fn agent_cost(agent: &AgentType, selection: &AgentSelection) -> AgentCostBreakdown {
    let overage_units = agent.overage_units(selection.limit);
    let overage_cost = Decimal::from(overage_units) * agent.extra_unit_cost;
    let extra_clients = match agent.concurrency_surcharge {
        Some(_) => selection.extra_clients(),
        None => 0,
    };
    let concurrency_surcharge = agent
        .concurrency_surcharge
        .map(|fee| Decimal::from(extra_clients) * fee)
        .unwrap_or(Decimal::ZERO);

    AgentCostBreakdown {
        agent_id: agent.id.clone(),
        base_price: agent.base_price,
        overage_units,
        overage_rate: agent.extra_unit_cost,
        overage_cost,
        extra_clients,
        concurrency_surcharge,
        monthly_cost: agent.base_price + overage_cost + concurrency_surcharge,
    }
}

/// Per-agent breakdowns for every enabled agent, in catalog order.
pub fn cost_breakdowns(
    catalog: &AgentCatalog,
    selections: &SelectionState,
) -> Vec<AgentCostBreakdown> {
    catalog
        .list_agent_types()
        .iter()
        .filter_map(|agent| {
            selections.enabled(&agent.id).map(|selection| agent_cost(agent, selection))
        })
        .collect()
}

pub fn compute_monthly_total(catalog: &AgentCatalog, selections: &SelectionState) -> Decimal {
    cost_breakdowns(catalog, selections).iter().map(|line| line.monthly_cost).sum()
}

pub fn price_selections(
    catalog: &AgentCatalog,
    selections: &SelectionState,
    currency: &str,
) -> PricingResult {
    let lines = cost_breakdowns(catalog, selections);
    let base_total: Decimal = lines.iter().map(|line| line.base_price).sum();
    let overage_total: Decimal = lines.iter().map(|line| line.overage_cost).sum();
    let surcharge_total: Decimal = lines.iter().map(|line| line.concurrency_surcharge).sum();
    let total = base_total + overage_total + surcharge_total;

    PricingResult {
        lines,
        total,
        trace: PricingTrace {
            currency: currency.to_string(),
            steps: vec![
                PricingTraceStep {
                    stage: "base".to_string(),
                    detail: "sum(base_price) over enabled agents".to_string(),
                    amount: base_total,
                },
                PricingTraceStep {
                    stage: "overage".to_string(),
                    detail: "sum(max(0, limit - base_limit) * extra_unit_cost)".to_string(),
                    amount: overage_total,
                },
                PricingTraceStep {
                    stage: "concurrency".to_string(),
                    detail: "sum((concurrent_clients - 1) * concurrency_surcharge)".to_string(),
                    amount: surcharge_total,
                },
                PricingTraceStep {
                    stage: "total".to_string(),
                    detail: "base + overage + concurrency".to_string(),
                    amount: total,
                },
            ],
        },
    }
}

/// Display-time formatting: truncates to two decimals, never rounds up.
pub fn format_money(amount: Decimal) -> String {
    let truncated = amount.round_dp_with_strategy(2, RoundingStrategy::ToZero);
    format!("${:.2}", truncated)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        compute_monthly_total, format_money, price_selections, DeterministicPricingEngine,
        PricingEngine,
    };
    use crate::domain::agent::{AgentId, CONVERSATIONAL, ESTIMATION};
    use crate::plan::catalog::AgentCatalog;
    use crate::plan::selection::SelectionState;

    fn conversational() -> AgentId {
        AgentId::from(CONVERSATIONAL)
    }

    fn estimation() -> AgentId {
        AgentId::from(ESTIMATION)
    }

    #[test]
    fn anchor_agent_at_base_limit_costs_base_price() {
        let catalog = AgentCatalog::standard();
        let state = SelectionState::initialize(&catalog);

        assert_eq!(compute_monthly_total(&catalog, &state), Decimal::from(150));
    }

    #[test]
    fn both_agents_with_overage_and_extra_seat_total_325() {
        let catalog = AgentCatalog::standard();
        let mut state = SelectionState::initialize(&catalog);
        state.toggle(&catalog, &estimation()).expect("enable estimation");
        state.set_limit(&catalog, &conversational(), 150).expect("limit");
        state.set_concurrency(&catalog, &conversational(), 2).expect("clients");

        let result = price_selections(&catalog, &state, "USD");

        assert_eq!(result.total, Decimal::from(325));
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.lines[0].overage_cost, Decimal::from(75));
        assert_eq!(result.lines[0].concurrency_surcharge, Decimal::from(25));
        assert_eq!(result.lines[0].monthly_cost, Decimal::from(250));
        assert_eq!(result.lines[1].overage_cost, Decimal::from(25));
        assert_eq!(result.lines[1].concurrency_surcharge, Decimal::ZERO);
        assert_eq!(result.trace.steps.last().map(|step| step.amount), Some(Decimal::from(325)));
        assert_eq!(compute_monthly_total(&catalog, &state), result.total);
    }

    #[test]
    fn disabled_agents_are_not_billed() {
        let catalog = AgentCatalog::standard();
        let mut state = SelectionState::initialize(&catalog);
        state.toggle(&catalog, &estimation()).expect("enable");
        state.toggle(&catalog, &estimation()).expect("disable");

        assert_eq!(compute_monthly_total(&catalog, &state), Decimal::from(150));
    }

    #[test]
    fn surcharge_applies_only_to_agents_that_bill_concurrency() {
        let catalog = AgentCatalog::standard();
        let mut state = SelectionState::initialize(&catalog);
        state.toggle(&catalog, &estimation()).expect("enable");
        state.set_concurrency(&catalog, &estimation(), 5).expect("clients");

        assert_eq!(compute_monthly_total(&catalog, &state), Decimal::from(200));
    }

    #[test]
    fn raising_any_limit_never_lowers_the_total() {
        let catalog = AgentCatalog::standard();
        let mut state = SelectionState::initialize(&catalog);
        state.toggle(&catalog, &estimation()).expect("enable");

        let mut previous = compute_monthly_total(&catalog, &state);
        for limit in (0..=1_000).step_by(37) {
            state.set_limit(&catalog, &conversational(), limit).expect("limit");
            let total = compute_monthly_total(&catalog, &state);
            assert!(total >= previous, "total dropped from {previous} to {total} at {limit}");
            previous = total;
        }

        let before = compute_monthly_total(&catalog, &state);
        state.set_limit(&catalog, &estimation(), 5_000).expect("limit");
        assert!(compute_monthly_total(&catalog, &state) >= before);
    }

    #[test]
    fn pricing_is_referentially_transparent() {
        let catalog = AgentCatalog::standard();
        let mut state = SelectionState::initialize(&catalog);
        state.set_limit(&catalog, &conversational(), 333).expect("limit");

        let engine = DeterministicPricingEngine;
        let first = engine.price(&catalog, &state, "USD");
        let second = engine.price(&catalog, &state, "USD");

        assert_eq!(first, second);
        assert_eq!(first.total, Decimal::new(49_950, 2));
    }

    #[test]
    fn money_formatting_truncates_to_cents() {
        assert_eq!(format_money(Decimal::from(325)), "$325.00");
        assert_eq!(format_money(Decimal::new(12_3456, 4)), "$12.34");
        assert_eq!(format_money(Decimal::new(19_999, 3)), "$19.99");
        assert_eq!(format_money(Decimal::new(15, 1)), "$1.50");
    }
}
