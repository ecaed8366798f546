//! Amounts are integer minor units (cents) everywhere in the engine to avoid
//! floating-point drift.

use crate::{EngineError, ResultEngine};

/// Render minor units as a decimal string with two fractional digits.
///
/// ```rust
/// use engine::format_minor;
///
/// assert_eq!(format_minor(1234), "12.34");
/// assert_eq!(format_minor(-5), "-0.05");
/// ```
pub fn format_minor(amount_minor: i64) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Sum two amounts, failing instead of wrapping.
pub(crate) fn checked_add(lhs: i64, rhs: i64) -> ResultEngine<i64> {
    lhs.checked_add(rhs)
        .ok_or_else(|| EngineError::AmountOverflow(format!("{lhs} + {rhs}")))
}

pub(crate) fn checked_sub(lhs: i64, rhs: i64) -> ResultEngine<i64> {
    lhs.checked_sub(rhs)
        .ok_or_else(|| EngineError::AmountOverflow(format!("{lhs} - {rhs}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sign_and_cents() {
        assert_eq!(format_minor(0), "0.00");
        assert_eq!(format_minor(1), "0.01");
        assert_eq!(format_minor(10), "0.10");
        assert_eq!(format_minor(1050), "10.50");
        assert_eq!(format_minor(-1050), "-10.50");
        assert_eq!(format_minor(i64::MIN), "-92233720368547758.08");
    }

    #[test]
    fn checked_sums_report_overflow() {
        assert_eq!(checked_add(2, 3).unwrap(), 5);
        assert_eq!(checked_sub(2, 3).unwrap(), -1);
        assert!(matches!(
            checked_add(i64::MAX, 1),
            Err(EngineError::AmountOverflow(_))
        ));
        assert!(matches!(
            checked_sub(i64::MIN, 1),
            Err(EngineError::AmountOverflow(_))
        ));
    }
}
