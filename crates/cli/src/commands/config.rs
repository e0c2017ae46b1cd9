use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use landed_core::config::{resolve_config_path, AppConfig, ConfigOverrides};
use rust_decimal::Decimal;
use toml::Value;

pub fn run(
    config: &AppConfig,
    explicit_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> String {
    let config_file_path = resolve_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(
            key_path,
            env_keys,
            is_overridden(key_path, overrides),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        )
    };

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["LANDED_LOGGING_LEVEL", "LANDED_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["LANDED_LOGGING_FORMAT", "LANDED_LOG_FORMAT"]),
    ));
    lines.push(render_line(
        "defaults.exchange_rate",
        &render_optional(config.defaults.exchange_rate),
        source("defaults.exchange_rate", &["LANDED_DEFAULT_EXCHANGE_RATE"]),
    ));
    lines.push(render_line(
        "defaults.import_duty_rate",
        &render_optional(config.defaults.import_duty_rate),
        source("defaults.import_duty_rate", &["LANDED_DEFAULT_IMPORT_DUTY_RATE"]),
    ));
    lines.push(render_line(
        "defaults.icms_rate",
        &render_optional(config.defaults.icms_rate),
        source("defaults.icms_rate", &["LANDED_DEFAULT_ICMS_RATE"]),
    ));
    lines.push(render_line(
        "defaults.freight_allocation_basis",
        config.defaults.freight_allocation_basis.as_str(),
        source("defaults.freight_allocation_basis", &[]),
    ));
    lines.push(render_line(
        "defaults.other_expenses_allocation_basis",
        config.defaults.other_expenses_allocation_basis.as_str(),
        source("defaults.other_expenses_allocation_basis", &[]),
    ));
    lines.push(render_line(
        "output.decimal_places",
        &config.output.decimal_places.to_string(),
        source("output.decimal_places", &["LANDED_OUTPUT_DECIMAL_PLACES"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn is_overridden(key_path: &str, overrides: &ConfigOverrides) -> bool {
    match key_path {
        "logging.level" => overrides.log_level.is_some(),
        "logging.format" => overrides.log_format.is_some(),
        "output.decimal_places" => overrides.decimal_places.is_some(),
        _ => false,
    }
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    overridden: bool,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if overridden {
        return "override".to_string();
    }

    if let Some(env_key) = env_keys.iter().copied().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("config file"));
            return format!("file ({})", file_path.display());
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

fn render_optional(value: Option<Decimal>) -> String {
    value.map(|value| value.to_string()).unwrap_or_else(|| "<unset>".to_string())
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
