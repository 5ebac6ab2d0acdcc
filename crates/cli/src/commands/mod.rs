pub mod catalog;
pub mod config;
pub mod doctor;
pub mod quote;
pub mod simulate;

use anyhow::Context;
use noforma_core::config::{AppConfig, LoadOptions};
use noforma_core::{AgentCatalog, AuditContext, Configurator, NoopAuditSink};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Everything a command needs to run an onboarding session.
pub struct Session {
    pub config: AppConfig,
    pub configurator: Configurator<NoopAuditSink>,
}

pub fn open_session(command: &str) -> anyhow::Result<Session> {
    let config = AppConfig::load(LoadOptions::default()).context("configuration issue")?;
    let catalog: AgentCatalog =
        config.agent_catalog().context("agent catalog could not be built")?;
    let configurator = Configurator::new(
        catalog,
        config.pricing.currency.clone(),
        NoopAuditSink,
        AuditContext::new(format!("cli-{command}"), format!("cli-{command}"), "noforma-cli"),
    );
    Ok(Session { config, configurator })
}

pub fn session_failure(command: &str, error: anyhow::Error) -> CommandResult {
    CommandResult::failure(command, "config_validation", format!("{error:#}"), 2)
}
