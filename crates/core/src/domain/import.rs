use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItemId(pub String);

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proportionality key used to split a shared cost pool across line items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationBasis {
    ByWeight,
    ByFobValue,
    ByQuantity,
}

impl AllocationBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByWeight => "by_weight",
            Self::ByFobValue => "by_fob_value",
            Self::ByQuantity => "by_quantity",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "by_weight" | "weight" => Some(Self::ByWeight),
            "by_fob_value" | "fob_value" | "fob" => Some(Self::ByFobValue),
            "by_quantity" | "quantity" => Some(Self::ByQuantity),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightCurrency {
    Foreign,
    Local,
}

/// Inputs shared by every line item of one simulation.
///
/// `exchange_rate` is local-currency units per foreign-currency unit, so
/// `local = foreign * exchange_rate`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub exchange_rate: Decimal,
    pub import_duty_rate: Decimal,
    pub icms_rate: Decimal,
    pub freight_total: Decimal,
    pub freight_currency: FreightCurrency,
    pub other_expenses_total: Decimal,
    pub freight_allocation_basis: AllocationBasis,
    pub other_expenses_allocation_basis: AllocationBasis,
}

impl SimulationConfig {
    /// `None` when converting the freight pool leaves the decimal range.
    pub fn freight_total_local(&self) -> Option<Decimal> {
        match self.freight_currency {
            FreightCurrency::Foreign => self.freight_total.checked_mul(self.exchange_rate),
            FreightCurrency::Local => Some(self.freight_total),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    #[serde(default)]
    pub description: String,
    pub quantity: u32,
    pub unit_price_foreign: Decimal,
    pub unit_weight_kg: Decimal,
}

impl LineItem {
    pub fn total_weight_kg(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_weight_kg)
    }

    pub fn total_value_foreign(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price_foreign)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemResult {
    pub id: LineItemId,
    pub description: String,
    pub quantity: u32,
    pub total_weight_kg: Decimal,
    pub total_value_foreign: Decimal,
    pub product_cost_local: Decimal,
    pub allocated_freight_local: Decimal,
    pub product_plus_freight_local: Decimal,
    pub duty_base_local: Decimal,
    pub duty_local: Decimal,
    pub allocated_other_expenses_local: Decimal,
    pub icms_base_local: Decimal,
    pub icms_local: Decimal,
    pub total_with_taxes_local: Decimal,
    pub unit_cost_ex_tax_local: Decimal,
    pub unit_cost_with_tax_local: Decimal,
}

impl LineItemResult {
    pub fn round_dp(&self, dp: u32) -> Self {
        Self {
            id: self.id.clone(),
            description: self.description.clone(),
            quantity: self.quantity,
            total_weight_kg: self.total_weight_kg.round_dp(dp),
            total_value_foreign: self.total_value_foreign.round_dp(dp),
            product_cost_local: self.product_cost_local.round_dp(dp),
            allocated_freight_local: self.allocated_freight_local.round_dp(dp),
            product_plus_freight_local: self.product_plus_freight_local.round_dp(dp),
            duty_base_local: self.duty_base_local.round_dp(dp),
            duty_local: self.duty_local.round_dp(dp),
            allocated_other_expenses_local: self.allocated_other_expenses_local.round_dp(dp),
            icms_base_local: self.icms_base_local.round_dp(dp),
            icms_local: self.icms_local.round_dp(dp),
            total_with_taxes_local: self.total_with_taxes_local.round_dp(dp),
            unit_cost_ex_tax_local: self.unit_cost_ex_tax_local.round_dp(dp),
            unit_cost_with_tax_local: self.unit_cost_with_tax_local.round_dp(dp),
        }
    }
}

/// Column-wise sums of every numeric `LineItemResult` field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTotals {
    pub total_quantity: u64,
    pub total_weight_kg: Decimal,
    pub total_value_foreign: Decimal,
    pub product_cost_local: Decimal,
    pub allocated_freight_local: Decimal,
    pub product_plus_freight_local: Decimal,
    pub duty_base_local: Decimal,
    pub duty_local: Decimal,
    pub allocated_other_expenses_local: Decimal,
    pub icms_base_local: Decimal,
    pub icms_local: Decimal,
    pub total_with_taxes_local: Decimal,
    pub unit_cost_ex_tax_local: Decimal,
    pub unit_cost_with_tax_local: Decimal,
}

impl SimulationTotals {
    /// Adds one line into the running sums. Fails on the first column whose
    /// sum leaves the decimal range.
    pub fn accumulate(&mut self, line: &LineItemResult) -> Result<(), ConfigurationError> {
        self.total_quantity += u64::from(line.quantity);

        let columns = [
            (&mut self.total_weight_kg, line.total_weight_kg, "total_weight_kg"),
            (&mut self.total_value_foreign, line.total_value_foreign, "total_value_foreign"),
            (&mut self.product_cost_local, line.product_cost_local, "product_cost_local"),
            (
                &mut self.allocated_freight_local,
                line.allocated_freight_local,
                "allocated_freight_local",
            ),
            (
                &mut self.product_plus_freight_local,
                line.product_plus_freight_local,
                "product_plus_freight_local",
            ),
            (&mut self.duty_base_local, line.duty_base_local, "duty_base_local"),
            (&mut self.duty_local, line.duty_local, "duty_local"),
            (
                &mut self.allocated_other_expenses_local,
                line.allocated_other_expenses_local,
                "allocated_other_expenses_local",
            ),
            (&mut self.icms_base_local, line.icms_base_local, "icms_base_local"),
            (&mut self.icms_local, line.icms_local, "icms_local"),
            (
                &mut self.total_with_taxes_local,
                line.total_with_taxes_local,
                "total_with_taxes_local",
            ),
            (
                &mut self.unit_cost_ex_tax_local,
                line.unit_cost_ex_tax_local,
                "unit_cost_ex_tax_local",
            ),
            (
                &mut self.unit_cost_with_tax_local,
                line.unit_cost_with_tax_local,
                "unit_cost_with_tax_local",
            ),
        ];

        for (sum, value, column) in columns {
            *sum = sum
                .checked_add(value)
                .ok_or_else(|| ConfigurationError::overflow(format!("totals.{column}")))?;
        }
        Ok(())
    }

    pub fn round_dp(&self, dp: u32) -> Self {
        Self {
            total_quantity: self.total_quantity,
            total_weight_kg: self.total_weight_kg.round_dp(dp),
            total_value_foreign: self.total_value_foreign.round_dp(dp),
            product_cost_local: self.product_cost_local.round_dp(dp),
            allocated_freight_local: self.allocated_freight_local.round_dp(dp),
            product_plus_freight_local: self.product_plus_freight_local.round_dp(dp),
            duty_base_local: self.duty_base_local.round_dp(dp),
            duty_local: self.duty_local.round_dp(dp),
            allocated_other_expenses_local: self.allocated_other_expenses_local.round_dp(dp),
            icms_base_local: self.icms_base_local.round_dp(dp),
            icms_local: self.icms_local.round_dp(dp),
            total_with_taxes_local: self.total_with_taxes_local.round_dp(dp),
            unit_cost_ex_tax_local: self.unit_cost_ex_tax_local.round_dp(dp),
            unit_cost_with_tax_local: self.unit_cost_with_tax_local.round_dp(dp),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub line_item_results: Vec<LineItemResult>,
    pub totals: SimulationTotals,
    pub freight_total_local: Decimal,
    pub landed_cost_multiplier: Decimal,
}

impl SimulationResult {
    /// Presentation copy with every monetary field rounded half-to-even.
    pub fn round_dp(&self, dp: u32) -> Self {
        Self {
            line_item_results: self
                .line_item_results
                .iter()
                .map(|line| line.round_dp(dp))
                .collect(),
            totals: self.totals.round_dp(dp),
            freight_total_local: self.freight_total_local.round_dp(dp),
            landed_cost_multiplier: self.landed_cost_multiplier.round_dp(dp.max(4)),
        }
    }
}
