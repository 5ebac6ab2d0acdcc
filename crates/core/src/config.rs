use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::agent::AgentType;
use crate::errors::CatalogError;
use crate::plan::catalog::AgentCatalog;

pub const CONFIG_FILE_NAME: &str = "noforma.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct PricingConfig {
    pub currency: String,
    /// Replaces the per-seat fee of every agent that bills concurrency.
    pub concurrency_surcharge: Option<Decimal>,
}

#[derive(Clone, Debug, Default)]
pub struct CatalogConfig {
    pub agents: Option<Vec<AgentType>>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub currency: Option<String>,
    pub concurrency_surcharge: Option<Decimal>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("agent catalog is invalid: {0}")]
    Catalog(#[from] CatalogError),
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig { currency: "USD".to_string(), concurrency_surcharge: None },
            catalog: CatalogConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Builds the validated catalog: configured agents when present, the
    /// standard two-agent catalog otherwise, with the surcharge override
    /// applied last.
    pub fn agent_catalog(&self) -> Result<AgentCatalog, ConfigError> {
        let catalog = match &self.catalog.agents {
            Some(agents) => AgentCatalog::new(agents.clone())?,
            None => AgentCatalog::standard(),
        };

        Ok(match self.pricing.concurrency_surcharge {
            Some(surcharge) => catalog.with_concurrency_surcharge(surcharge),
            None => catalog,
        })
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(pricing) = patch.pricing {
            if let Some(currency) = pricing.currency {
                self.pricing.currency = currency;
            }
            if let Some(surcharge) = pricing.concurrency_surcharge {
                self.pricing.concurrency_surcharge = Some(surcharge);
            }
        }

        if let Some(agents) = patch.agents {
            self.catalog.agents = Some(agents);
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("NOFORMA_PRICING_CURRENCY") {
            self.pricing.currency = value;
        }
        if let Some(value) = read_env("NOFORMA_PRICING_CONCURRENCY_SURCHARGE") {
            self.pricing.concurrency_surcharge =
                Some(parse_decimal("NOFORMA_PRICING_CONCURRENCY_SURCHARGE", &value)?);
        }

        let log_level =
            read_env("NOFORMA_LOGGING_LEVEL").or_else(|| read_env("NOFORMA_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("NOFORMA_LOGGING_FORMAT").or_else(|| read_env("NOFORMA_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(currency) = overrides.currency {
            self.pricing.currency = currency;
        }
        if let Some(surcharge) = overrides.concurrency_surcharge {
            self.pricing.concurrency_surcharge = Some(surcharge);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        self.agent_catalog()?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    default_config_paths().into_iter().find(|path| path.exists())
}

pub fn default_config_paths() -> [PathBuf; 2] {
    [PathBuf::from(CONFIG_FILE_NAME), Path::new("config").join(CONFIG_FILE_NAME)]
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    let currency = pricing.currency.trim();
    let iso_like = currency.len() == 3 && currency.chars().all(|ch| ch.is_ascii_uppercase());
    if !iso_like {
        return Err(ConfigError::Validation(
            "pricing.currency must be a three-letter uppercase code such as `USD`".to_string(),
        ));
    }

    if let Some(surcharge) = pricing.concurrency_surcharge {
        if surcharge < Decimal::ZERO {
            return Err(ConfigError::Validation(
                "pricing.concurrency_surcharge must not be negative".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    pricing: Option<PricingPatch>,
    agents: Option<Vec<AgentType>>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    currency: Option<String>,
    concurrency_surcharge: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::domain::agent::AgentId;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn write_config(dir: &TempDir, body: &str) -> Result<std::path::PathBuf, String> {
        let path = dir.path().join("noforma.toml");
        fs::write(&path, body).map_err(|err| err.to_string())?;
        Ok(path)
    }

    #[test]
    fn defaults_load_standard_catalog() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;
        let catalog = config.agent_catalog().map_err(|err| err.to_string())?;

        ensure(config.pricing.currency == "USD", "default currency should be USD")?;
        ensure(catalog.len() == 2, "standard catalog has two agents")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_NOFORMA_CURRENCY", "EUR");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[pricing]
currency = "${TEST_NOFORMA_CURRENCY}"
"#,
            )?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.pricing.currency == "EUR", "currency should come from environment")
        })();

        clear_vars(&["TEST_NOFORMA_CURRENCY"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("NOFORMA_PRICING_CONCURRENCY_SURCHARGE", "30");
        env::set_var("NOFORMA_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[pricing]
currency = "GBP"
concurrency_surcharge = 20

[logging]
level = "warn"
"#,
            )?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.pricing.currency == "GBP", "file currency should beat default")?;
            ensure(
                config.pricing.concurrency_surcharge == Some(Decimal::from(30)),
                "env surcharge should win over file",
            )?;
            ensure(config.logging.level == "debug", "override log level should win")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "log format alias should be read from env",
            )?;

            let catalog = config.agent_catalog().map_err(|err| err.to_string())?;
            ensure(
                catalog.list_agent_types()[0].concurrency_surcharge == Some(Decimal::from(30)),
                "surcharge override should reach the catalog",
            )
        })();

        clear_vars(&["NOFORMA_PRICING_CONCURRENCY_SURCHARGE", "NOFORMA_LOG_FORMAT"]);
        result
    }

    #[test]
    fn agents_can_be_declared_in_the_config_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(
            &dir,
            r#"
[[agents]]
id = "conversational"
name = "Conversational Agent"
description = "Handles new client meetings"
icon = "bot"
usage_unit = "calls"
base_price = "200"
base_limit = 250
extra_unit_cost = "1.25"
features = ["Lead qualification"]
required = true
concurrency_surcharge = "25"

[[agents]]
id = "estimation"
name = "Estimation Agent"
description = "Project estimates"
icon = "calculator"
usage_unit = "estimations"
base_price = "60"
base_limit = 250
extra_unit_cost = "0.4"
features = []
limit_source = "conversational"
"#,
        )?;

        let config =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                .map_err(|err| format!("config load failed: {err}"))?;
        let catalog = config.agent_catalog().map_err(|err| err.to_string())?;
        let estimation = catalog
            .find(&AgentId::from("estimation"))
            .ok_or_else(|| "estimation agent should be declared".to_string())?;

        ensure(catalog.required_agent().base_limit == 250, "anchor base limit from file")?;
        ensure(estimation.extra_unit_cost == Decimal::new(4, 1), "rate parsed exactly")?;
        ensure(
            estimation.limit_source == Some(AgentId::from("conversational")),
            "mirror relationship parsed",
        )
    }

    #[test]
    fn invalid_catalog_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(
            &dir,
            r#"
[[agents]]
id = "estimation"
name = "Estimation Agent"
description = "Project estimates"
icon = "calculator"
usage_unit = "estimations"
base_price = "60"
base_limit = 0
extra_unit_cost = "0.4"
features = []
required = true
"#,
        )?;

        match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() }) {
            Ok(_) => Err("expected catalog validation failure".to_string()),
            Err(error) => ensure(
                matches!(error, ConfigError::Catalog(_)),
                "zero base limit should surface as a catalog error",
            ),
        }
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("NOFORMA_PRICING_CURRENCY", "dollars");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("pricing.currency")
            );
            ensure(has_message, "validation failure should mention pricing.currency")
        })();

        clear_vars(&["NOFORMA_PRICING_CURRENCY"]);
        result
    }

    #[test]
    fn malformed_env_surcharge_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("NOFORMA_PRICING_CONCURRENCY_SURCHARGE", "lots");
        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected invalid env override".to_string()),
            Err(error) => ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. }
                    if key == "NOFORMA_PRICING_CONCURRENCY_SURCHARGE"),
                "error should name the env var",
            ),
        };

        clear_vars(&["NOFORMA_PRICING_CONCURRENCY_SURCHARGE"]);
        result
    }

    #[test]
    fn missing_required_file_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");
        match AppConfig::load(LoadOptions {
            config_path: Some(missing),
            require_file: true,
            ..LoadOptions::default()
        }) {
            Ok(_) => Err("expected missing file error".to_string()),
            Err(error) => ensure(
                matches!(error, ConfigError::MissingConfigFile(_)),
                "missing file should be reported",
            ),
        }
    }
}
