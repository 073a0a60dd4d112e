//! Cart pricing: subtotal, flat threshold discount, tax and total.
//!
//! Pure functions of the cart lines. Totals are recomputed on every call and
//! never stored.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::cart::CartLine;
use crate::types::Price;

/// Subtotal above which [`DISCOUNT`] applies. A subtotal equal to the
/// threshold gets no discount.
pub const DISCOUNT_THRESHOLD: Price = Price::new(5000);

/// Flat discount for orders over [`DISCOUNT_THRESHOLD`].
pub const DISCOUNT: Price = Price::new(200);

/// Tax rate in percent, applied to the discounted subtotal.
pub const TAX_RATE_PERCENT: i64 = 15;

/// Computed amounts for a set of cart lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Price,
    pub discount: Price,
    pub tax: Price,
    pub total: Price,
}

/// Price a sequence of cart lines.
#[must_use]
pub fn price_lines(lines: &[CartLine]) -> Totals {
    price_subtotal(lines.iter().map(CartLine::line_total).sum())
}

/// Derive discount, tax and total from a subtotal.
///
/// ```
/// use campus_supply_core::pricing::price_subtotal;
/// use campus_supply_core::Price;
///
/// let totals = price_subtotal(Price::new(1200));
/// assert_eq!(totals.tax, Price::new(180));
/// assert_eq!(totals.total, Price::new(1380));
/// ```
#[must_use]
pub fn price_subtotal(subtotal: Price) -> Totals {
    let discount = discount_for(subtotal);
    let taxable = subtotal - discount;
    let tax = tax_on(taxable);

    Totals {
        subtotal,
        discount,
        tax,
        total: taxable + tax,
    }
}

/// [`DISCOUNT`] when `subtotal` is strictly above the threshold, else zero.
#[must_use]
pub fn discount_for(subtotal: Price) -> Price {
    if subtotal > DISCOUNT_THRESHOLD {
        DISCOUNT
    } else {
        Price::ZERO
    }
}

/// Tax on `taxable`, rounded half away from zero to a whole minor unit.
#[must_use]
pub fn tax_on(taxable: Price) -> Price {
    let rate = Decimal::new(TAX_RATE_PERCENT, 2);
    let exact = Decimal::from(taxable.minor_units()) * rate;
    let rounded = exact.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    // |taxable| * 0.15 always fits back into i64
    Price::new(rounded.to_i64().unwrap_or(i64::MAX))
}
