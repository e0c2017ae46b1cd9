use rust_decimal::Decimal;

use crate::domain::import::SimulationConfig;
use crate::errors::ConfigurationError;

/// Checks every constraint on `config` and reports all violations at once.
pub fn validate_config(config: &SimulationConfig) -> Result<(), ConfigurationError> {
    let mut error = ConfigurationError::default();

    if config.exchange_rate <= Decimal::ZERO {
        error.push("exchange_rate", "must be greater than zero");
    }
    if config.import_duty_rate < Decimal::ZERO {
        error.push("import_duty_rate", "must be non-negative");
    }
    if config.icms_rate < Decimal::ZERO {
        error.push("icms_rate", "must be non-negative");
    }
    if config.icms_rate >= Decimal::ONE {
        error.push("icms_rate", "must be less than 1 (gross-up divides by 1 - icms_rate)");
    }
    if config.freight_total < Decimal::ZERO {
        error.push("freight_total", "must be non-negative");
    }
    if config.other_expenses_total < Decimal::ZERO {
        error.push("other_expenses_total", "must be non-negative");
    }

    error.into_result()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::validate_config;
    use crate::domain::import::{AllocationBasis, FreightCurrency, SimulationConfig};

    fn valid_config() -> SimulationConfig {
        SimulationConfig {
            exchange_rate: Decimal::from(5),
            import_duty_rate: Decimal::new(6, 1),
            icms_rate: Decimal::new(17, 2),
            freight_total: Decimal::from(500),
            freight_currency: FreightCurrency::Local,
            other_expenses_total: Decimal::ZERO,
            freight_allocation_basis: AllocationBasis::ByWeight,
            other_expenses_allocation_basis: AllocationBasis::ByFobValue,
        }
    }

    #[test]
    fn accepts_valid_config() {
        assert_eq!(validate_config(&valid_config()), Ok(()));
    }

    #[test]
    fn icms_rate_of_one_or_more_is_rejected() {
        for icms_rate in [Decimal::ONE, Decimal::new(15, 1)] {
            let config = SimulationConfig { icms_rate, ..valid_config() };
            let error = validate_config(&config).expect_err("icms_rate >= 1 must be rejected");
            assert_eq!(error.fields(), vec!["icms_rate"]);
        }
    }

    #[test]
    fn icms_rate_just_below_one_is_accepted() {
        let config = SimulationConfig { icms_rate: Decimal::new(9999, 4), ..valid_config() };
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn duty_rate_above_one_is_accepted() {
        let config = SimulationConfig { import_duty_rate: Decimal::new(12, 1), ..valid_config() };
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn reports_every_violation_not_just_the_first() {
        let config = SimulationConfig {
            exchange_rate: Decimal::ZERO,
            import_duty_rate: Decimal::new(-1, 2),
            icms_rate: Decimal::from(2),
            freight_total: Decimal::from(-10),
            other_expenses_total: Decimal::from(-1),
            ..valid_config()
        };

        let error = validate_config(&config).expect_err("config should be rejected");
        assert_eq!(
            error.fields(),
            vec![
                "exchange_rate",
                "import_duty_rate",
                "icms_rate",
                "freight_total",
                "other_expenses_total"
            ]
        );
    }

    #[test]
    fn negative_icms_rate_is_reported_once() {
        let config = SimulationConfig { icms_rate: Decimal::new(-5, 2), ..valid_config() };
        let error = validate_config(&config).expect_err("negative icms must be rejected");
        assert_eq!(error.violations.len(), 1);
        assert_eq!(error.violations[0].message, "must be non-negative");
    }
}
