use rust_decimal::Decimal;
use serde::Serialize;
use skyroute_shared::money::round_money;

/// `1 + tax_rate`, e.g. 1.18 for the standard 18% rate.
pub fn tax_multiplier(tax_rate: Decimal) -> Decimal {
    Decimal::ONE + tax_rate
}

/// Total charged for `passengers` seats: `round(price * passengers * (1 + tax_rate), 2)`.
pub fn total_amount(price: Decimal, passengers: usize, tax_rate: Decimal) -> Decimal {
    round_money(price * Decimal::from(passengers) * tax_multiplier(tax_rate))
}

/// What the summary step shows before payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FareBreakdown {
    #[serde(with = "rust_decimal::serde::float")]
    pub base_fare: Decimal,
    pub passengers: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub taxes: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl FareBreakdown {
    pub fn new(price: Decimal, passengers: usize, tax_rate: Decimal) -> Self {
        let subtotal = round_money(price * Decimal::from(passengers));
        let total = total_amount(price, passengers, tax_rate);
        Self {
            base_fare: price,
            passengers,
            subtotal,
            taxes: total - subtotal,
            total,
        }
    }
}
