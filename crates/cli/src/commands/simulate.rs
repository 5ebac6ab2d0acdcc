use noforma_core::plan::pricing::format_money;
use noforma_core::wizard::StepStatus;
use noforma_core::{ApplicationError, ConfiguratorAction};

use crate::commands::{open_session, session_failure, CommandResult};

/// Replays a scripted onboarding session and reports the final view.
pub fn run(script: &[String], json_output: bool) -> CommandResult {
    let mut session = match open_session("simulate") {
        Ok(session) => session,
        Err(error) => return session_failure("simulate", error),
    };

    let mut view = session.configurator.view();
    for (position, raw) in script.iter().enumerate() {
        let applied = raw
            .parse::<ConfiguratorAction>()
            .and_then(|action| session.configurator.handle(action));
        match applied {
            Ok(next) => view = next,
            Err(error) => {
                let interface = ApplicationError::from(error).into_interface("cli-simulate");
                return CommandResult::failure(
                    "simulate",
                    "invalid_action",
                    format!("action {} (`{raw}`) failed: {interface}", position + 1),
                    2,
                );
            }
        }
    }

    if json_output {
        return match serde_json::to_value(&view) {
            Ok(data) => CommandResult::success_with_data(
                "simulate",
                format!("{} actions applied", script.len()),
                Some(data),
            ),
            Err(error) => {
                CommandResult::failure("simulate", "serialization", error.to_string(), 3)
            }
        };
    }

    let mut lines = Vec::new();
    let progress: Vec<String> = view
        .step
        .indicators
        .iter()
        .map(|indicator| {
            let marker = match indicator.status {
                StepStatus::Completed => "x",
                StepStatus::Current => ">",
                StepStatus::Upcoming => " ",
            };
            format!("[{marker}] {}. {}", indicator.number, indicator.label)
        })
        .collect();
    lines.push(format!(
        "step {}/{} ({:.0}%): {}",
        view.step.index + 1,
        view.step.count,
        view.step.progress_percent,
        progress.join("  ")
    ));

    for config in &view.configuration {
        let mut detail = format!("- {} limit {}", config.agent_id, config.limit);
        if let Some(clients) = config.concurrent_clients {
            detail.push_str(&format!(", {clients} concurrent"));
        }
        if let Some(source) = &config.synced_with {
            detail.push_str(&format!(" (synced with {source})"));
        }
        detail.push_str(&format!(": {}", config.monthly_cost_display));
        lines.push(detail);
    }
    lines.push(format!("total: {}/month", format_money(view.total)));

    CommandResult::text(lines.join("\n"))
}
