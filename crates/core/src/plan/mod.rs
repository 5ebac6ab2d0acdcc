pub mod catalog;
pub mod constraints;
pub mod pricing;
pub mod selection;

use serde::{Deserialize, Serialize};

use self::{
    catalog::AgentCatalog,
    constraints::{ConstraintEngine, ConstraintResult, DeterministicConstraintEngine},
    pricing::{DeterministicPricingEngine, PricingEngine, PricingResult},
    selection::SelectionState,
};

#[derive(Clone, Debug)]
pub struct PlanEvaluationInput<'a> {
    pub catalog: &'a AgentCatalog,
    pub selections: &'a SelectionState,
    pub currency: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEvaluation {
    pub constraints: ConstraintResult,
    pub pricing: PricingResult,
}

pub trait PlanRuntime: Send + Sync {
    fn evaluate_plan(&self, input: PlanEvaluationInput<'_>) -> PlanEvaluation;
}

pub struct DeterministicPlanRuntime<C, P> {
    constraint_engine: C,
    pricing_engine: P,
}

impl<C, P> DeterministicPlanRuntime<C, P> {
    pub fn new(constraint_engine: C, pricing_engine: P) -> Self {
        Self { constraint_engine, pricing_engine }
    }
}

impl Default
    for DeterministicPlanRuntime<DeterministicConstraintEngine, DeterministicPricingEngine>
{
    fn default() -> Self {
        Self::new(DeterministicConstraintEngine, DeterministicPricingEngine)
    }
}

impl<C, P> PlanRuntime for DeterministicPlanRuntime<C, P>
where
    C: ConstraintEngine,
    P: PricingEngine,
{
    fn evaluate_plan(&self, input: PlanEvaluationInput<'_>) -> PlanEvaluation {
        let constraints = self.constraint_engine.validate(input.catalog, input.selections);
        let pricing = self.pricing_engine.price(input.catalog, input.selections, input.currency);

        PlanEvaluation { constraints, pricing }
    }
}
