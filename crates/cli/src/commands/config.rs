use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use noforma_core::config::{default_config_paths, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "pricing.currency",
        &config.pricing.currency,
        source("pricing.currency", &["NOFORMA_PRICING_CURRENCY"]),
    ));
    let surcharge = config
        .pricing
        .concurrency_surcharge
        .map(|value| value.to_string())
        .unwrap_or_else(|| "<catalog>".to_string());
    lines.push(render_line(
        "pricing.concurrency_surcharge",
        &surcharge,
        source("pricing.concurrency_surcharge", &["NOFORMA_PRICING_CONCURRENCY_SURCHARGE"]),
    ));

    let agents = match config.agent_catalog() {
        Ok(catalog) => catalog
            .list_agent_types()
            .iter()
            .map(|agent| agent.id.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        Err(error) => format!("<invalid: {error}>"),
    };
    lines.push(render_line("agents", &agents, source("agents", &[])));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["NOFORMA_LOGGING_LEVEL", "NOFORMA_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["NOFORMA_LOGGING_FORMAT", "NOFORMA_LOG_FORMAT"]),
    ));

    CommandResult::text(lines.join("\n"))
}

fn detect_config_path() -> Option<PathBuf> {
    default_config_paths().into_iter().find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    // blank values are ignored by the loader, so they do not count as a source
    let env_key = env_keys.iter().find(|key| {
        env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
    });
    if let Some(env_key) = env_key {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
