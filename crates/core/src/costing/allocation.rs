use rust_decimal::Decimal;

use crate::domain::import::{AllocationBasis, LineItem};
use crate::errors::ConfigurationError;

type WeightFn = fn(&LineItem) -> Option<Decimal>;

fn quantity_weight(item: &LineItem) -> Option<Decimal> {
    Some(Decimal::from(item.quantity))
}

impl AllocationBasis {
    /// The weight extractor and the item field it reads.
    fn extractor(self) -> (WeightFn, &'static str) {
        match self {
            Self::ByWeight => (LineItem::total_weight_kg as WeightFn, "unit_weight_kg"),
            Self::ByFobValue => (LineItem::total_value_foreign as WeightFn, "unit_price_foreign"),
            Self::ByQuantity => (quantity_weight as WeightFn, "quantity"),
        }
    }

    /// `None` when the item's weight under this basis leaves the decimal range.
    pub fn weight_of(self, item: &LineItem) -> Option<Decimal> {
        let (extract, _) = self.extractor();
        extract(item)
    }

    pub fn weights(self, items: &[LineItem]) -> Result<Vec<Decimal>, ConfigurationError> {
        let (extract, field) = self.extractor();
        items
            .iter()
            .map(|item| {
                extract(item).ok_or_else(|| {
                    ConfigurationError::overflow(format!("items[{}].{field}", item.id))
                })
            })
            .collect()
    }
}

/// Splits `total` proportionally to `weights`.
///
/// When the weights sum to zero (no items, or every item weighs nothing
/// under the chosen basis) every share is zero. `None` means the weight sum
/// or a share left the decimal range.
pub fn allocate(total: Decimal, weights: &[Decimal]) -> Option<Vec<Decimal>> {
    let weight_sum =
        weights.iter().try_fold(Decimal::ZERO, |sum, weight| sum.checked_add(*weight))?;
    if weight_sum <= Decimal::ZERO {
        return Some(vec![Decimal::ZERO; weights.len()]);
    }

    weights.iter().map(|weight| weight.checked_div(weight_sum)?.checked_mul(total)).collect()
}
