use crate::commands::{open_session, session_failure, CommandResult};

pub fn run(json_output: bool) -> CommandResult {
    let session = match open_session("catalog") {
        Ok(session) => session,
        Err(error) => return session_failure("catalog", error),
    };

    let cards = session.configurator.view().catalog;

    if json_output {
        return match serde_json::to_value(&cards) {
            Ok(data) => CommandResult::success_with_data(
                "catalog",
                format!("{} agents available", cards.len()),
                Some(data),
            ),
            Err(error) => CommandResult::failure("catalog", "serialization", error.to_string(), 3),
        };
    }

    let mut lines = vec![format!("agent catalog ({} agents):", cards.len())];
    for card in &cards {
        let badge = if card.required { " [required]" } else { "" };
        lines.push(format!(
            "- {}: {}{} | {} | {} | {}",
            card.agent_id,
            card.name,
            badge,
            card.price_label,
            card.allowance_label,
            card.extra_unit_label
        ));
        lines.push(format!("    {}", card.description));
        for feature in &card.features {
            lines.push(format!("    * {feature}"));
        }
    }

    CommandResult::text(lines.join("\n"))
}
