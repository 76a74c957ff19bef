//! Free-text amount parsing.
//!
//! Rates and quantities arrive as whatever the user typed. Line item arithmetic
//! treats anything unparsable as zero; catalog rates must be real numbers.

use crate::errors::{Error, Result};

/// Parses a typed amount, returning `0.0` for empty, unparsable or non-finite input.
#[must_use]
pub fn parse_or_zero(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Parses a service rate, which must be a finite, non-negative number.
///
/// # Errors
/// Returns [`Error::InvalidRate`] carrying the original text when it does not parse,
/// is NaN/infinite, or is negative.
pub fn parse_rate(input: &str) -> Result<f64> {
    let rate = input
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidRate {
            value: input.to_string(),
        })?;
    validate_rate(rate).map_err(|_| Error::InvalidRate {
        value: input.to_string(),
    })
}

/// Checks that an already-numeric rate is finite and non-negative.
pub fn validate_rate(rate: f64) -> Result<f64> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(Error::InvalidRate {
            value: rate.to_string(),
        });
    }
    Ok(rate)
}

/// Formats an amount for display, dropping a trailing `.00`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_or_zero() {
        assert_eq!(parse_or_zero("12.5"), 12.5);
        assert_eq!(parse_or_zero("  3 "), 3.0);
        assert_eq!(parse_or_zero(""), 0.0);
        assert_eq!(parse_or_zero("abc"), 0.0);
        assert_eq!(parse_or_zero("NaN"), 0.0);
        assert_eq!(parse_or_zero("inf"), 0.0);
        assert_eq!(parse_or_zero("-2"), -2.0);
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("1500").ok(), Some(1500.0));
        assert_eq!(parse_rate("0").ok(), Some(0.0));
        assert!(matches!(parse_rate("fifteen"), Err(Error::InvalidRate { value }) if value == "fifteen"));
        assert!(matches!(parse_rate("-1"), Err(Error::InvalidRate { .. })));
        assert!(matches!(parse_rate(""), Err(Error::InvalidRate { .. })));
        assert!(matches!(parse_rate("NaN"), Err(Error::InvalidRate { .. })));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1500.0), "1500");
        assert_eq!(format_amount(12.5), "12.50");
        assert_eq!(format_amount(0.0), "0");
    }
}
