//! Integer money amounts in the store's minor currency unit.
//!
//! All catalog prices, cart lines and invoice totals are whole minor units.
//! Arithmetic saturates instead of wrapping so a hostile quantity can never
//! flip a total negative.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// An amount of money in minor units of [`CurrencyCode::STORE`].
///
/// ## Examples
///
/// ```
/// use campus_supply_core::Price;
///
/// let pencil = Price::new(250);
/// assert_eq!(pencil.times(2), Price::new(500));
/// assert_eq!(Price::new(5800).to_string(), "JMD 5,800");
/// assert_eq!(Price::new(-200).to_string(), "-JMD 200");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Create a price from a number of minor units.
    #[must_use]
    pub const fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Line total for `quantity` units at this price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }

    /// Whether the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// The amount with its sign flipped, used to show deductions.
    #[must_use]
    pub const fn negated(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Price {
    fn from(minor_units: i64) -> Self {
        Self(minor_units)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{sign}{} {}",
            CurrencyCode::STORE.code(),
            group_thousands(self.0.unsigned_abs())
        )
    }
}

/// Render digits with a comma every three places (`1234567` → `1,234,567`).
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// ISO 4217 currency codes.
///
/// The store prices everything in a single currency; there is no conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    JMD,
}

impl CurrencyCode {
    /// The currency every [`Price`] is denominated in.
    pub const STORE: Self = Self::JMD;

    /// Three-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::JMD => "JMD",
        }
    }
}
