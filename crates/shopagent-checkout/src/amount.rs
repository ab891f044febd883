use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CheckoutError;

/// Converts a decimal price string (`"24.99"`, `"$24.99"`) to minor units
/// (cents), rounding half away from zero.
///
/// # Errors
///
/// Returns [`CheckoutError::InvalidAmount`] if the price does not parse, is
/// not positive, or does not fit in an `i64`.
pub fn amount_to_minor_units(price: &str) -> Result<i64, CheckoutError> {
    let invalid = |reason: &str| CheckoutError::InvalidAmount {
        price: price.to_owned(),
        reason: reason.to_owned(),
    };

    let trimmed = price.trim().trim_start_matches('$').trim();
    let value = Decimal::from_str(trimmed).map_err(|_| invalid("not a decimal number"))?;

    let cents = (value * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if cents <= Decimal::ZERO {
        return Err(invalid("amount must be positive"));
    }
    cents.to_i64().ok_or_else(|| invalid("amount is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_and_fractional_prices() {
        assert_eq!(amount_to_minor_units("24.99").unwrap(), 2499);
        assert_eq!(amount_to_minor_units("12").unwrap(), 1200);
        assert_eq!(amount_to_minor_units("0.5").unwrap(), 50);
    }

    #[test]
    fn accepts_display_prices() {
        assert_eq!(amount_to_minor_units(" $7.10 ").unwrap(), 710);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(amount_to_minor_units("1.005").unwrap(), 101);
        assert_eq!(amount_to_minor_units("1.004").unwrap(), 100);
    }

    #[test]
    fn rejects_zero_and_negative() {
        assert!(matches!(
            amount_to_minor_units("0.00"),
            Err(CheckoutError::InvalidAmount { .. })
        ));
        assert!(amount_to_minor_units("-3.00").is_err());
        assert!(amount_to_minor_units("0.004").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(amount_to_minor_units("free").is_err());
        assert!(amount_to_minor_units("").is_err());
    }
}
