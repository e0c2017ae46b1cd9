use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SimulationDefaults;
use crate::domain::import::{AllocationBasis, FreightCurrency, LineItem, SimulationConfig};
use crate::domain::investment::CycleInput;
use crate::errors::ConfigurationError;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("could not read scenario file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse scenario file `{path}`: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unsupported scenario file extension for `{0}` (expected .json or .toml)")]
    UnsupportedFormat(PathBuf),
}

/// Simulation settings as stored; unset fields fall back to the configured
/// defaults when resolved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub exchange_rate: Option<Decimal>,
    pub import_duty_rate: Option<Decimal>,
    pub icms_rate: Option<Decimal>,
    pub freight_total: Option<Decimal>,
    pub freight_currency: Option<FreightCurrency>,
    pub other_expenses_total: Option<Decimal>,
    pub freight_allocation_basis: Option<AllocationBasis>,
    pub other_expenses_allocation_basis: Option<AllocationBasis>,
}

impl ScenarioConfig {
    pub fn resolve(
        &self,
        defaults: &SimulationDefaults,
    ) -> Result<SimulationConfig, ConfigurationError> {
        let mut error = ConfigurationError::default();

        let exchange_rate = self.exchange_rate.or(defaults.exchange_rate);
        if exchange_rate.is_none() {
            error.push("exchange_rate", "is required (set it in the scenario or [defaults])");
        }
        let import_duty_rate = self.import_duty_rate.or(defaults.import_duty_rate);
        if import_duty_rate.is_none() {
            error.push("import_duty_rate", "is required (set it in the scenario or [defaults])");
        }
        let icms_rate = self.icms_rate.or(defaults.icms_rate);
        if icms_rate.is_none() {
            error.push("icms_rate", "is required (set it in the scenario or [defaults])");
        }

        match (exchange_rate, import_duty_rate, icms_rate) {
            (Some(exchange_rate), Some(import_duty_rate), Some(icms_rate)) if error.is_empty() => {
                Ok(SimulationConfig {
                    exchange_rate,
                    import_duty_rate,
                    icms_rate,
                    freight_total: self.freight_total.unwrap_or(Decimal::ZERO),
                    freight_currency: self.freight_currency.unwrap_or(FreightCurrency::Local),
                    other_expenses_total: self.other_expenses_total.unwrap_or(Decimal::ZERO),
                    freight_allocation_basis: self
                        .freight_allocation_basis
                        .unwrap_or(defaults.freight_allocation_basis),
                    other_expenses_allocation_basis: self
                        .other_expenses_allocation_basis
                        .unwrap_or(defaults.other_expenses_allocation_basis),
                })
            }
            _ => Err(error),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportScenario {
    #[serde(default)]
    pub config: ScenarioConfig,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl ImportScenario {
    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        read_scenario(path)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentScenario {
    #[serde(default)]
    pub initial_balance: Decimal,
    #[serde(default)]
    pub cycles: Vec<CycleInput>,
}

impl InvestmentScenario {
    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        read_scenario(path)
    }
}

fn read_scenario<T: DeserializeOwned>(path: &Path) -> Result<T, ScenarioError> {
    let extension =
        path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_ascii_lowercase());

    let raw = fs::read_to_string(path)
        .map_err(|source| ScenarioError::ReadFile { path: path.to_path_buf(), source })?;

    match extension.as_deref() {
        Some("json") => serde_json::from_str(&raw).map_err(|error| ScenarioError::Parse {
            path: path.to_path_buf(),
            message: error.to_string(),
        }),
        Some("toml") => toml::from_str(&raw).map_err(|error| ScenarioError::Parse {
            path: path.to_path_buf(),
            message: error.to_string(),
        }),
        _ => Err(ScenarioError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{ImportScenario, InvestmentScenario, ScenarioConfig, ScenarioError};
    use crate::config::SimulationDefaults;
    use crate::domain::import::{AllocationBasis, FreightCurrency};

    #[test]
    fn resolve_falls_back_to_defaults() {
        let defaults = SimulationDefaults {
            exchange_rate: Some(Decimal::new(520, 2)),
            import_duty_rate: Some(Decimal::new(6, 1)),
            icms_rate: Some(Decimal::new(17, 2)),
            freight_allocation_basis: AllocationBasis::ByQuantity,
            other_expenses_allocation_basis: AllocationBasis::ByFobValue,
        };
        let scenario =
            ScenarioConfig { icms_rate: Some(Decimal::new(4, 2)), ..ScenarioConfig::default() };

        let config = scenario.resolve(&defaults).expect("defaults fill the gaps");
        assert_eq!(config.exchange_rate, Decimal::new(520, 2));
        assert_eq!(config.icms_rate, Decimal::new(4, 2));
        assert_eq!(config.freight_total, Decimal::ZERO);
        assert_eq!(config.freight_currency, FreightCurrency::Local);
        assert_eq!(config.freight_allocation_basis, AllocationBasis::ByQuantity);
    }

    #[test]
    fn resolve_reports_every_missing_rate() {
        let error = ScenarioConfig::default()
            .resolve(&SimulationDefaults::default())
            .expect_err("rates are missing");

        assert_eq!(error.fields(), vec!["exchange_rate", "import_duty_rate", "icms_rate"]);
    }

    #[test]
    fn reads_json_and_toml_scenarios() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;

        let json_path = dir.path().join("order.json");
        fs::write(
            &json_path,
            r#"{
                "config": { "exchange_rate": "5.10", "freight_currency": "foreign" },
                "items": [
                    { "id": "sku-1", "quantity": 4, "unit_price_foreign": "12.5", "unit_weight_kg": 1 }
                ]
            }"#,
        )
        .map_err(|err| err.to_string())?;
        let scenario = ImportScenario::from_path(&json_path).map_err(|err| err.to_string())?;
        assert_eq!(scenario.config.exchange_rate, Some(Decimal::new(510, 2)));
        assert_eq!(scenario.config.freight_currency, Some(FreightCurrency::Foreign));
        assert_eq!(scenario.items[0].unit_price_foreign, Decimal::new(125, 1));
        assert!(scenario.items[0].description.is_empty());

        let toml_path = dir.path().join("plan.toml");
        fs::write(
            &toml_path,
            r#"
initial_balance = "10000"

[[cycles]]
roi_pct = "20"

[[cycles]]
roi_pct = "15"
contribution = "500"
"#,
        )
        .map_err(|err| err.to_string())?;
        let plan = InvestmentScenario::from_path(&toml_path).map_err(|err| err.to_string())?;
        assert_eq!(plan.initial_balance, Decimal::from(10_000));
        assert_eq!(plan.cycles.len(), 2);
        assert_eq!(plan.cycles[0].contribution, Decimal::ZERO);
        assert_eq!(plan.cycles[1].contribution, Decimal::from(500));
        Ok(())
    }

    #[test]
    fn rejects_unknown_extension() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;
        let path = dir.path().join("order.yaml");
        fs::write(&path, "items: []").map_err(|err| err.to_string())?;

        let error = ImportScenario::from_path(&path).expect_err("yaml is not supported");
        assert!(matches!(error, ScenarioError::UnsupportedFormat(_)));
        Ok(())
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let error = ImportScenario::from_path(std::path::Path::new("does-not-exist.json"))
            .expect_err("file does not exist");
        assert!(matches!(error, ScenarioError::ReadFile { .. }));
    }
}
