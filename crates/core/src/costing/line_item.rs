use rust_decimal::Decimal;

use crate::domain::import::{LineItem, LineItemResult, SimulationConfig};
use crate::errors::ConfigurationError;

/// Runs the per-item tax cascade.
///
/// The exchange rate is applied once, at the product-cost step; everything
/// after that is local currency. ICMS is grossed up on its own base, so the
/// caller must have rejected `icms_rate >= 1` beforehand. The allocated
/// other-expenses share is carried on the result but stays out of the duty
/// and ICMS bases.
///
/// Any step leaving the decimal range fails with a violation on the input
/// that drove it there.
pub fn compute_line_item(
    config: &SimulationConfig,
    item: &LineItem,
    allocated_freight: Decimal,
    allocated_other_expenses: Decimal,
) -> Result<LineItemResult, ConfigurationError> {
    let item_overflow =
        |field: &str| ConfigurationError::overflow(format!("items[{}].{field}", item.id));
    let rate_overflow = |field: &'static str| ConfigurationError::overflow(field);

    let total_weight_kg = item.total_weight_kg().ok_or_else(|| item_overflow("unit_weight_kg"))?;
    let total_value_foreign =
        item.total_value_foreign().ok_or_else(|| item_overflow("unit_price_foreign"))?;
    let product_cost_local = total_value_foreign
        .checked_mul(config.exchange_rate)
        .ok_or_else(|| item_overflow("unit_price_foreign"))?;

    let product_plus_freight_local = product_cost_local
        .checked_add(allocated_freight)
        .ok_or_else(|| rate_overflow("freight_total"))?;
    let duty_base_local = product_plus_freight_local;
    let duty_local = duty_base_local
        .checked_mul(config.import_duty_rate)
        .ok_or_else(|| rate_overflow("import_duty_rate"))?;

    let taxed_local = product_plus_freight_local
        .checked_add(duty_local)
        .ok_or_else(|| rate_overflow("import_duty_rate"))?;
    let icms_base_local = taxed_local
        .checked_div(Decimal::ONE - config.icms_rate)
        .ok_or_else(|| rate_overflow("icms_rate"))?;
    let icms_local =
        icms_base_local.checked_mul(config.icms_rate).ok_or_else(|| rate_overflow("icms_rate"))?;
    let total_with_taxes_local =
        taxed_local.checked_add(icms_local).ok_or_else(|| rate_overflow("icms_rate"))?;

    // Dividing by a quantity of at least one cannot grow the amount.
    let (unit_cost_ex_tax_local, unit_cost_with_tax_local) = if item.quantity == 0 {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let quantity = Decimal::from(item.quantity);
        (product_plus_freight_local / quantity, total_with_taxes_local / quantity)
    };

    Ok(LineItemResult {
        id: item.id.clone(),
        description: item.description.clone(),
        quantity: item.quantity,
        total_weight_kg,
        total_value_foreign,
        product_cost_local,
        allocated_freight_local: allocated_freight,
        product_plus_freight_local,
        duty_base_local,
        duty_local,
        allocated_other_expenses_local: allocated_other_expenses,
        icms_base_local,
        icms_local,
        total_with_taxes_local,
        unit_cost_ex_tax_local,
        unit_cost_with_tax_local,
    })
}
