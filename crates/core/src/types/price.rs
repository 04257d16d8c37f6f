//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g. rupees, not paisa).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display, e.g. `Rs. 1,250.00`.
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{} {}",
            self.currency_code.symbol(),
            group_thousands(self.amount)
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes a store can sell in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    NPR,
    INR,
    USD,
    EUR,
    GBP,
    AUD,
}

impl CurrencyCode {
    /// All supported currencies, in the order the settings form lists them.
    pub const ALL: [Self; 6] = [
        Self::NPR,
        Self::INR,
        Self::USD,
        Self::EUR,
        Self::GBP,
        Self::AUD,
    ];

    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::NPR => "Rs.",
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::AUD => "A$",
        }
    }

    /// ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NPR => "NPR",
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::AUD => "AUD",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unsupported currency: {s}"))
    }
}

/// An amount computed from API data does not fit in a [`Decimal`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("amount is too large")]
pub struct AmountOverflow;

/// `unit * quantity`, failing instead of overflowing.
///
/// # Errors
///
/// Returns [`AmountOverflow`] when the product does not fit.
pub fn line_amount(unit: Decimal, quantity: u32) -> Result<Decimal, AmountOverflow> {
    unit.checked_mul(Decimal::from(quantity))
        .ok_or(AmountOverflow)
}

/// Sum of amounts, failing instead of overflowing.
///
/// # Errors
///
/// Returns [`AmountOverflow`] when an input already overflowed or the sum
/// does not fit.
pub fn sum_amounts<I>(amounts: I) -> Result<Decimal, AmountOverflow>
where
    I: IntoIterator<Item = Result<Decimal, AmountOverflow>>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount?).ok_or(AmountOverflow)
    })
}

/// Render an amount with two decimals and comma thousands separators.
fn group_thousands(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{rounded:.2}");
    let (sign, digits) = text
        .strip_prefix('-')
        .map_or(("", text.as_str()), |rest| ("-", rest));
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        let price = Price::new(Decimal::new(125_000, 2), CurrencyCode::NPR);
        assert_eq!(price.display(), "Rs. 1,250.00");

        let price = Price::new(Decimal::new(123_456_789, 0), CurrencyCode::USD);
        assert_eq!(price.display(), "$ 123,456,789.00");
    }

    #[test]
    fn test_display_small_and_negative() {
        assert_eq!(group_thousands(Decimal::new(5, 1)), "0.50");
        assert_eq!(group_thousands(Decimal::new(-150_000, 2)), "-1,500.00");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(group_thousands(Decimal::new(19_995, 3)), "20.00");
    }

    #[test]
    fn test_checked_amounts() {
        assert_eq!(line_amount(Decimal::new(250, 0), 3), Ok(Decimal::new(750, 0)));
        assert_eq!(line_amount(Decimal::MAX, 2), Err(AmountOverflow));
        assert_eq!(
            sum_amounts([Ok(Decimal::ONE), Ok(Decimal::TWO)]),
            Ok(Decimal::new(3, 0))
        );
        assert_eq!(sum_amounts([Ok(Decimal::MAX), Ok(Decimal::ONE)]), Err(AmountOverflow));
        assert_eq!(sum_amounts([]), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("npr".parse::<CurrencyCode>(), Ok(CurrencyCode::NPR));
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
