use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::import::AllocationBasis;

pub const MAX_DECIMAL_PLACES: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub defaults: SimulationDefaults,
    pub output: OutputConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Values applied to scenario files that leave a setting unset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationDefaults {
    pub exchange_rate: Option<Decimal>,
    pub import_duty_rate: Option<Decimal>,
    pub icms_rate: Option<Decimal>,
    pub freight_allocation_basis: AllocationBasis,
    pub other_expenses_allocation_basis: AllocationBasis,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub decimal_places: u32,
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
    pub decimal_places: Option<u32>,
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
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            exchange_rate: None,
            import_duty_rate: None,
            icms_rate: None,
            freight_allocation_basis: AllocationBasis::ByWeight,
            other_expenses_allocation_basis: AllocationBasis::ByFobValue,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            defaults: SimulationDefaults::default(),
            output: OutputConfig { decimal_places: 2 },
        }
    }
}

impl FromStr for LogFormat {
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("landed.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(defaults) = patch.defaults {
            if let Some(exchange_rate) = defaults.exchange_rate {
                self.defaults.exchange_rate = Some(exchange_rate);
            }
            if let Some(import_duty_rate) = defaults.import_duty_rate {
                self.defaults.import_duty_rate = Some(import_duty_rate);
            }
            if let Some(icms_rate) = defaults.icms_rate {
                self.defaults.icms_rate = Some(icms_rate);
            }
            if let Some(basis) = defaults.freight_allocation_basis {
                self.defaults.freight_allocation_basis = basis;
            }
            if let Some(basis) = defaults.other_expenses_allocation_basis {
                self.defaults.other_expenses_allocation_basis = basis;
            }
        }

        if let Some(output) = patch.output {
            if let Some(decimal_places) = output.decimal_places {
                self.output.decimal_places = decimal_places;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let log_level = read_env("LANDED_LOGGING_LEVEL").or_else(|| read_env("LANDED_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LANDED_LOGGING_FORMAT").or_else(|| read_env("LANDED_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        if let Some(value) = read_env("LANDED_DEFAULT_EXCHANGE_RATE") {
            self.defaults.exchange_rate =
                Some(parse_decimal("LANDED_DEFAULT_EXCHANGE_RATE", &value)?);
        }
        if let Some(value) = read_env("LANDED_DEFAULT_IMPORT_DUTY_RATE") {
            self.defaults.import_duty_rate =
                Some(parse_decimal("LANDED_DEFAULT_IMPORT_DUTY_RATE", &value)?);
        }
        if let Some(value) = read_env("LANDED_DEFAULT_ICMS_RATE") {
            self.defaults.icms_rate = Some(parse_decimal("LANDED_DEFAULT_ICMS_RATE", &value)?);
        }

        if let Some(value) = read_env("LANDED_OUTPUT_DECIMAL_PLACES") {
            self.output.decimal_places = parse_u32("LANDED_OUTPUT_DECIMAL_PLACES", &value)?;
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
        if let Some(decimal_places) = overrides.decimal_places {
            self.output.decimal_places = decimal_places;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_logging(&self.logging)?;
        validate_defaults(&self.defaults)?;
        validate_output(&self.output)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("landed.toml"), PathBuf::from("config/landed.toml")]
        .into_iter()
        .find(|path| path.exists())
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

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_defaults(defaults: &SimulationDefaults) -> Result<(), ConfigError> {
    if let Some(exchange_rate) = defaults.exchange_rate {
        if exchange_rate <= Decimal::ZERO {
            return Err(ConfigError::Validation(
                "defaults.exchange_rate must be greater than zero".to_string(),
            ));
        }
    }

    if let Some(import_duty_rate) = defaults.import_duty_rate {
        if import_duty_rate < Decimal::ZERO {
            return Err(ConfigError::Validation(
                "defaults.import_duty_rate must be non-negative".to_string(),
            ));
        }
    }

    if let Some(icms_rate) = defaults.icms_rate {
        if icms_rate < Decimal::ZERO || icms_rate >= Decimal::ONE {
            return Err(ConfigError::Validation(
                "defaults.icms_rate must be in range [0, 1)".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_output(output: &OutputConfig) -> Result<(), ConfigError> {
    if output.decimal_places > MAX_DECIMAL_PLACES {
        return Err(ConfigError::Validation(format!(
            "output.decimal_places must be in range 0..={MAX_DECIMAL_PLACES}"
        )));
    }

    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value.trim()).map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    logging: Option<LoggingPatch>,
    defaults: Option<DefaultsPatch>,
    output: Option<OutputPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct DefaultsPatch {
    exchange_rate: Option<Decimal>,
    import_duty_rate: Option<Decimal>,
    icms_rate: Option<Decimal>,
    freight_allocation_basis: Option<AllocationBasis>,
    other_expenses_allocation_basis: Option<AllocationBasis>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputPatch {
    decimal_places: Option<u32>,
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
    use crate::domain::import::AllocationBasis;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const ENV_KEYS: [&str; 8] = [
        "LANDED_LOGGING_LEVEL",
        "LANDED_LOG_LEVEL",
        "LANDED_LOGGING_FORMAT",
        "LANDED_LOG_FORMAT",
        "LANDED_DEFAULT_EXCHANGE_RATE",
        "LANDED_DEFAULT_IMPORT_DUTY_RATE",
        "LANDED_DEFAULT_ICMS_RATE",
        "LANDED_OUTPUT_DECIMAL_PLACES",
    ];

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

    #[test]
    fn defaults_load_without_file_or_env() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let config = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("missing.toml")),
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config == AppConfig::default(), "config should equal defaults")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);

        env::set_var("TEST_LANDED_FX", "5.35");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("landed.toml");
            fs::write(
                &path,
                r#"
[defaults]
exchange_rate = "${TEST_LANDED_FX}"
icms_rate = "0.18"
freight_allocation_basis = "by_quantity"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.defaults.exchange_rate == Some(Decimal::new(535, 2)),
                "exchange rate should be interpolated from environment",
            )?;
            ensure(
                config.defaults.icms_rate == Some(Decimal::new(18, 2)),
                "icms rate should be read from file",
            )?;
            ensure(
                config.defaults.freight_allocation_basis == AllocationBasis::ByQuantity,
                "freight basis should be read from file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_LANDED_FX"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);

        env::set_var("LANDED_LOG_LEVEL", "warn");
        env::set_var("LANDED_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&ENV_KEYS);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);

        env::set_var("LANDED_DEFAULT_ICMS_RATE", "0.12");
        env::set_var("LANDED_OUTPUT_DECIMAL_PLACES", "4");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("landed.toml");
            fs::write(
                &path,
                r#"
[defaults]
icms_rate = "0.17"
import_duty_rate = "0.6"

[output]
decimal_places = 3

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    decimal_places: Some(6),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.output.decimal_places == 6, "override decimal places should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.defaults.icms_rate == Some(Decimal::new(12, 2)),
                "env icms rate should win over file and defaults",
            )?;
            ensure(
                config.defaults.import_duty_rate == Some(Decimal::new(6, 1)),
                "file duty rate should win over defaults",
            )?;
            Ok(())
        })();

        clear_vars(&ENV_KEYS);
        result
    }

    #[test]
    fn invalid_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);

        env::set_var("LANDED_DEFAULT_EXCHANGE_RATE", "five");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected env override failure".to_string()),
            Err(error) => ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "LANDED_DEFAULT_EXCHANGE_RATE"
                ),
                "error should name the offending variable",
            ),
        };

        clear_vars(&ENV_KEYS);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);

        env::set_var("LANDED_DEFAULT_ICMS_RATE", "1");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("defaults.icms_rate")
            );
            ensure(has_message, "validation failure should mention defaults.icms_rate")
        })();

        clear_vars(&ENV_KEYS);
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("landed.toml");
        let result = AppConfig::load(LoadOptions {
            config_path: Some(missing),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should be reported",
        )
    }
}
