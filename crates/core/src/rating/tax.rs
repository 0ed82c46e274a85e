use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::breakdown::round_money;
use crate::domain::tariff::TaxRates;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputation {
    pub subtotal: Decimal,
    pub tax1: Decimal,
    pub tax2: Decimal,
    pub total: Decimal,
}

/// Both rates apply to the same unrounded subtotal. Each tax is rounded on
/// its own, and the total is rounded from the unrounded components, so it
/// can differ by a cent from `subtotal + tax1 + tax2`.
pub fn compute_taxes(subtotal: Decimal, rates: &TaxRates) -> TaxComputation {
    let first = subtotal * rates.first.rate;
    let second = subtotal * rates.second.rate;

    TaxComputation {
        subtotal,
        tax1: round_money(first),
        tax2: round_money(second),
        total: round_money(subtotal + first + second),
    }
}
