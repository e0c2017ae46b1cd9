use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::costing::allocation::allocate;
use crate::costing::line_item::compute_line_item;
use crate::costing::validation::validate_config;
use crate::domain::import::{LineItem, SimulationConfig, SimulationResult, SimulationTotals};
use crate::errors::ConfigurationError;

/// Computes every line item and the simulation-wide totals.
///
/// Configuration problems are the only failure; zero quantities, weightless
/// items and an empty item list all produce zeros. Amounts that would leave
/// the decimal range are reported as a violation on the field that drove them
/// there.
pub fn compute_simulation(
    config: &SimulationConfig,
    items: &[LineItem],
) -> Result<SimulationResult, ConfigurationError> {
    if let Err(error) = validate_config(config) {
        warn!(
            event_name = "costing.simulation.rejected",
            violation_count = error.violations.len(),
            fields = ?error.fields(),
            "simulation configuration rejected"
        );
        return Err(error);
    }

    let result = cost_items(config, items).map_err(|error| {
        warn!(
            event_name = "costing.simulation.overflowed",
            fields = ?error.fields(),
            "simulation amounts exceeded the decimal range"
        );
        error
    })?;

    debug!(
        event_name = "costing.simulation.computed",
        line_count = result.line_item_results.len(),
        freight_total_local = %result.freight_total_local,
        total_with_taxes_local = %result.totals.total_with_taxes_local,
        "import cost simulation computed"
    );

    Ok(result)
}

fn cost_items(
    config: &SimulationConfig,
    items: &[LineItem],
) -> Result<SimulationResult, ConfigurationError> {
    let freight_total_local = config
        .freight_total_local()
        .ok_or_else(|| ConfigurationError::overflow("freight_total"))?;

    let freight_weights = config.freight_allocation_basis.weights(items)?;
    let freight_shares = allocate(freight_total_local, &freight_weights)
        .ok_or_else(|| ConfigurationError::overflow("freight_allocation_basis"))?;
    let other_expense_weights = config.other_expenses_allocation_basis.weights(items)?;
    let other_expense_shares = allocate(config.other_expenses_total, &other_expense_weights)
        .ok_or_else(|| ConfigurationError::overflow("other_expenses_allocation_basis"))?;

    let line_item_results = items
        .iter()
        .zip(freight_shares)
        .zip(other_expense_shares)
        .map(|((item, freight), other_expenses)| {
            compute_line_item(config, item, freight, other_expenses)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut totals = SimulationTotals::default();
    for line in &line_item_results {
        totals.accumulate(line)?;
    }

    let landed_cost_multiplier = if totals.product_cost_local.is_zero() {
        Decimal::ZERO
    } else {
        totals
            .total_with_taxes_local
            .checked_div(totals.product_cost_local)
            .ok_or_else(|| ConfigurationError::overflow("landed_cost_multiplier"))?
    };

    Ok(SimulationResult { line_item_results, totals, freight_total_local, landed_cost_multiplier })
}
