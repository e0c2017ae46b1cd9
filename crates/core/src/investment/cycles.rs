use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::investment::{CycleInput, CycleResult, InvestmentSummary};
use crate::errors::ConfigurationError;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

pub fn validate_cycles(
    initial_balance: Decimal,
    cycles: &[CycleInput],
) -> Result<(), ConfigurationError> {
    let mut error = ConfigurationError::default();

    if initial_balance < Decimal::ZERO {
        error.push("initial_balance", "must be non-negative");
    }

    for (index, cycle) in cycles.iter().enumerate() {
        if cycle.contribution < Decimal::ZERO {
            error.push(format!("cycles[{index}].contribution"), "must be non-negative");
        }
        if cycle.withdrawal < Decimal::ZERO {
            error.push(format!("cycles[{index}].withdrawal"), "must be non-negative");
        }
        if cycle.roi_pct <= -ONE_HUNDRED {
            error.push(format!("cycles[{index}].roi_pct"), "must be greater than -100");
        }
    }

    error.into_result()
}

/// Runs the cycle recurrence in order.
///
/// Each cycle opens with the previous closing balance, adds its contribution,
/// applies its return and then subtracts its withdrawal:
/// `closing = (opening + contribution) * (1 + roi_pct / 100) - withdrawal`.
pub fn compute_cycles(
    initial_balance: Decimal,
    cycles: &[CycleInput],
) -> Result<InvestmentSummary, ConfigurationError> {
    if let Err(error) = validate_cycles(initial_balance, cycles) {
        warn!(
            event_name = "investment.cycles.rejected",
            violation_count = error.violations.len(),
            fields = ?error.fields(),
            "investment cycle inputs rejected"
        );
        return Err(error);
    }

    let summary = fold_cycles(initial_balance, cycles).map_err(|error| {
        warn!(
            event_name = "investment.cycles.overflowed",
            fields = ?error.fields(),
            "investment balances exceeded the decimal range"
        );
        error
    })?;

    debug!(
        event_name = "investment.cycles.computed",
        cycle_count = summary.cycles.len(),
        final_balance = %summary.final_balance,
        roi_total_pct = %summary.roi_total_pct,
        "investment cycles computed"
    );

    Ok(summary)
}

fn fold_cycles(
    initial_balance: Decimal,
    cycles: &[CycleInput],
) -> Result<InvestmentSummary, ConfigurationError> {
    let mut results = Vec::with_capacity(cycles.len());
    let mut balance = initial_balance;
    let mut total_contributed = Decimal::ZERO;
    let mut total_withdrawn = Decimal::ZERO;
    let mut total_return = Decimal::ZERO;

    for (index, input) in cycles.iter().enumerate() {
        let overflow = move || ConfigurationError::overflow(format!("cycles[{index}]"));

        let opening_balance = balance;
        let invested = opening_balance.checked_add(input.contribution).ok_or_else(overflow)?;
        let return_amount = invested
            .checked_mul(input.roi_pct)
            .and_then(|scaled| scaled.checked_div(ONE_HUNDRED))
            .ok_or_else(overflow)?;
        let closing_balance = invested
            .checked_add(return_amount)
            .and_then(|grown| grown.checked_sub(input.withdrawal))
            .ok_or_else(overflow)?;

        total_contributed = total_contributed.checked_add(input.contribution).ok_or_else(overflow)?;
        total_withdrawn = total_withdrawn.checked_add(input.withdrawal).ok_or_else(overflow)?;
        total_return = total_return.checked_add(return_amount).ok_or_else(overflow)?;
        balance = closing_balance;

        results.push(CycleResult {
            cycle: results.len() as u32 + 1,
            opening_balance,
            contribution: input.contribution,
            roi_pct: input.roi_pct,
            return_amount,
            withdrawal: input.withdrawal,
            closing_balance,
        });
    }

    let summary_overflow = || ConfigurationError::overflow("cycles");
    let total_invested =
        initial_balance.checked_add(total_contributed).ok_or_else(summary_overflow)?;
    let net_gain = balance
        .checked_add(total_withdrawn)
        .and_then(|gross| gross.checked_sub(total_invested))
        .ok_or_else(summary_overflow)?;
    let roi_total_pct = if total_invested.is_zero() {
        Decimal::ZERO
    } else {
        net_gain
            .checked_div(total_invested)
            .and_then(|ratio| ratio.checked_mul(ONE_HUNDRED))
            .ok_or_else(summary_overflow)?
    };

    Ok(InvestmentSummary {
        initial_balance,
        cycles: results,
        total_contributed,
        total_withdrawn,
        total_return,
        total_invested,
        final_balance: balance,
        net_gain,
        roi_total_pct,
    })
}
