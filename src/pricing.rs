//! Pricing
//!
//! Amounts are whole currency units held in a `u64`. All arithmetic that
//! feeds a persisted total is checked.

use thiserror::Error;

/// Errors that can occur while pricing lines.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PricingError {
    /// A line total or subtotal does not fit in a `u64`.
    #[error("amount overflowed while pricing")]
    Overflow,
}

/// Price a single line: `unit_price * quantity`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product does not fit in a `u64`.
pub fn line_total(unit_price: u64, quantity: u32) -> Result<u64, PricingError> {
    unit_price
        .checked_mul(u64::from(quantity))
        .ok_or(PricingError::Overflow)
}

/// Sum a sequence of line totals.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the sum does not fit in a `u64`.
pub fn subtotal<I>(line_totals: I) -> Result<u64, PricingError>
where
    I: IntoIterator<Item = u64>,
{
    line_totals
        .into_iter()
        .try_fold(0_u64, u64::checked_add)
        .ok_or(PricingError::Overflow)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_line_total() -> TestResult {
        assert_eq!(line_total(500, 2)?, 1000);
        assert_eq!(line_total(0, 7)?, 0);

        Ok(())
    }

    #[test]
    fn test_line_total_overflow() {
        assert_eq!(line_total(u64::MAX, 2), Err(PricingError::Overflow));
    }

    #[test]
    fn test_subtotal() -> TestResult {
        assert_eq!(subtotal([1000, 250, 0])?, 1250);
        assert_eq!(subtotal(std::iter::empty())?, 0);

        Ok(())
    }

    #[test]
    fn test_subtotal_overflow() {
        assert_eq!(subtotal([u64::MAX, 1]), Err(PricingError::Overflow));
    }
}
