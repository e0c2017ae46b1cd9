use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigViolation {
    pub field: String,
    pub message: String,
}

impl ConfigViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Raised before any computation when the inputs break a configuration
/// constraint. Carries every violation found, in check order.
#[derive(Clone, Debug, Default, Error, PartialEq, Eq)]
#[error("invalid configuration: {}", render_violations(.violations))]
pub struct ConfigurationError {
    pub violations: Vec<ConfigViolation>,
}

impl ConfigurationError {
    /// A single violation for an amount that left the decimal range.
    pub fn overflow(field: impl Into<String>) -> Self {
        let mut error = Self::default();
        error.push(field, "pushes an amount past the supported decimal range");
        error
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(ConfigViolation::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|violation| violation.field.as_str()).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|violation| violation.field == field)
    }

    /// `Ok(())` when nothing was collected, otherwise the collected error.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn user_message(&self) -> String {
        match self.violations.len() {
            0 => "The configuration is valid.".to_string(),
            1 => format!("Fix `{}` and try again.", self.violations[0].field),
            count => format!("Fix the {count} highlighted fields and try again."),
        }
    }
}

fn render_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{}: {}", violation.field, violation.message))
        .collect::<Vec<_>>()
        .join("; ")
}
