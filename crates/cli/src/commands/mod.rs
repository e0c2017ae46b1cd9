pub mod config;
pub mod cycles;
pub mod simulate;

use landed_core::errors::{ConfigViolation, ConfigurationError};
use landed_core::ScenarioError;
use serde::Serialize;
use serde_json::Value;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INPUT: u8 = 3;

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
    violations: Option<Vec<ConfigViolation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
}

impl CommandResult {
    pub fn success_with<T: Serialize>(
        command: &str,
        message: impl Into<String>,
        result: &T,
    ) -> Self {
        let result = match serde_json::to_value(result) {
            Ok(value) => value,
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 1);
            }
        };

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            violations: None,
            result: Some(result),
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
            violations: None,
            result: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Invalid inputs: nothing was computed, every violated field is listed.
    pub fn invalid_configuration(command: &str, error: &ConfigurationError) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some("invalid_configuration".to_string()),
            message: error.user_message(),
            violations: Some(error.violations.clone()),
            result: None,
        };
        Self { exit_code: EXIT_CONFIG, output: serialize_payload(payload) }
    }

    pub fn scenario_failure(command: &str, error: &ScenarioError) -> Self {
        Self::failure(command, "scenario_input", error.to_string(), EXIT_INPUT)
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
