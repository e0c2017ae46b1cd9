use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inputs for one investment cycle. `roi_pct` is a percentage (`20` is 20%).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleInput {
    #[serde(default)]
    pub contribution: Decimal,
    #[serde(default)]
    pub withdrawal: Decimal,
    pub roi_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleResult {
    pub cycle: u32,
    pub opening_balance: Decimal,
    pub contribution: Decimal,
    pub roi_pct: Decimal,
    pub return_amount: Decimal,
    pub withdrawal: Decimal,
    pub closing_balance: Decimal,
}

impl CycleResult {
    pub fn round_dp(&self, dp: u32) -> Self {
        Self {
            cycle: self.cycle,
            opening_balance: self.opening_balance.round_dp(dp),
            contribution: self.contribution.round_dp(dp),
            roi_pct: self.roi_pct,
            return_amount: self.return_amount.round_dp(dp),
            withdrawal: self.withdrawal.round_dp(dp),
            closing_balance: self.closing_balance.round_dp(dp),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentSummary {
    pub initial_balance: Decimal,
    pub cycles: Vec<CycleResult>,
    pub total_contributed: Decimal,
    pub total_withdrawn: Decimal,
    pub total_return: Decimal,
    pub total_invested: Decimal,
    pub final_balance: Decimal,
    pub net_gain: Decimal,
    pub roi_total_pct: Decimal,
}

impl InvestmentSummary {
    pub fn round_dp(&self, dp: u32) -> Self {
        Self {
            initial_balance: self.initial_balance.round_dp(dp),
            cycles: self.cycles.iter().map(|cycle| cycle.round_dp(dp)).collect(),
            total_contributed: self.total_contributed.round_dp(dp),
            total_withdrawn: self.total_withdrawn.round_dp(dp),
            total_return: self.total_return.round_dp(dp),
            total_invested: self.total_invested.round_dp(dp),
            final_balance: self.final_balance.round_dp(dp),
            net_gain: self.net_gain.round_dp(dp),
            roi_total_pct: self.roi_total_pct.round_dp(dp),
        }
    }
}
