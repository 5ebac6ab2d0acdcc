use noforma_core::domain::agent::ESTIMATION;
use noforma_core::plan::constraints::DeterministicConstraintEngine;
use noforma_core::plan::pricing::{format_money, DeterministicPricingEngine};
use noforma_core::plan::{DeterministicPlanRuntime, PlanEvaluationInput, PlanRuntime};
use noforma_core::{AgentId, ApplicationError, ConfiguratorAction, DomainError};

use crate::commands::{open_session, session_failure, CommandResult};

#[derive(Clone, Debug, Default)]
pub struct QuoteArgs {
    /// Raw text for the anchor agent's monthly limit.
    pub limit: Option<String>,
    /// Raw text for the anchor agent's concurrent clients.
    pub concurrency: Option<String>,
    pub with_estimation: bool,
    pub with_agents: Vec<String>,
    pub json: bool,
}

pub fn run(args: QuoteArgs) -> CommandResult {
    let mut session = match open_session("quote") {
        Ok(session) => session,
        Err(error) => return session_failure("quote", error),
    };

    let anchor = session.configurator.catalog().required_agent().id.clone();
    let mut actions = Vec::new();
    let mut optional: Vec<AgentId> = Vec::new();
    let requested = args.with_agents.iter().map(String::as_str).chain(
        args.with_estimation.then_some(ESTIMATION),
    );
    for id in requested {
        let agent_id = AgentId::from(id.trim());
        if agent_id != anchor && !optional.contains(&agent_id) {
            optional.push(agent_id);
        }
    }
    for agent_id in optional {
        actions.push(ConfiguratorAction::Toggle { agent_id });
    }
    if let Some(input) = args.limit {
        actions.push(ConfiguratorAction::SetLimit { agent_id: anchor.clone(), input });
    }
    if let Some(input) = args.concurrency {
        actions.push(ConfiguratorAction::SetConcurrency { agent_id: anchor, input });
    }

    let applied: Result<(), DomainError> = actions
        .into_iter()
        .try_for_each(|action| session.configurator.handle(action).map(|_| ()));
    if let Err(error) = applied {
        let interface = ApplicationError::from(error).into_interface("cli-quote");
        return CommandResult::failure("quote", "invalid_selection", interface.to_string(), 2);
    }

    let runtime =
        DeterministicPlanRuntime::new(DeterministicConstraintEngine, DeterministicPricingEngine);
    let evaluation = runtime.evaluate_plan(PlanEvaluationInput {
        catalog: session.configurator.catalog(),
        selections: session.configurator.selections(),
        currency: &session.config.pricing.currency,
    });
    if !evaluation.constraints.valid {
        let codes: Vec<&str> = evaluation
            .constraints
            .violations
            .iter()
            .map(|violation| violation.code.as_str())
            .collect();
        return CommandResult::failure(
            "quote",
            "constraint_violation",
            format!("plan violates invariants: {}", codes.join(", ")),
            2,
        );
    }
    let pricing = evaluation.pricing;
    tracing::info!(
        event_name = "cli.quote.priced",
        total = %pricing.total,
        agents = pricing.lines.len(),
        "quote priced"
    );

    if args.json {
        return match serde_json::to_value(&pricing) {
            Ok(data) => CommandResult::success_with_data(
                "quote",
                format!("monthly total {}", format_money(pricing.total)),
                Some(data),
            ),
            Err(error) => CommandResult::failure("quote", "serialization", error.to_string(), 3),
        };
    }

    let mut lines = vec![format!("monthly plan ({}):", pricing.trace.currency)];
    for line in &pricing.lines {
        lines.push(format!("- {}: {}", line.agent_id, format_money(line.monthly_cost)));
        lines.push(format!("    base price          {}", format_money(line.base_price)));
        lines.push(format!(
            "    overage             {} x {} = {}",
            line.overage_units,
            format_money(line.overage_rate),
            format_money(line.overage_cost)
        ));
        if line.extra_clients > 0 {
            lines.push(format!(
                "    concurrency         {} extra = {}",
                line.extra_clients,
                format_money(line.concurrency_surcharge)
            ));
        }
    }
    lines.push(format!("total: {}/month", format_money(pricing.total)));

    CommandResult::text(lines.join("\n"))
}
