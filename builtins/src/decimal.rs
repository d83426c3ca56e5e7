//! `xs:decimal` and the `xs:integer` derivation hierarchy (§3.3.1, §3.3.13-18).
//!
//! Arbitrary-precision decimal arithmetic is out of scope; values are kept in
//! their normalized digit-string form and compared digit-by-digit after aligning
//! sign, integer-part padding and fractional-part padding. This is sufficient for
//! lexical validity, canonicalization, equality and ordering, which is all the
//! facet engine (`minInclusive`/`maxInclusive`/.../`totalDigits`/`fractionDigits`)
//! needs; it does not support decimal arithmetic operations, which no facet or
//! validity rule in this crate requires.

use std::cmp::Ordering;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::DatatypeError;

lazy_static! {
    static ref DECIMAL: Regex = Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)$").expect("static regex");
}

/// A validated `xs:decimal` value, normalized to `(negative, integer_digits,
/// fraction_digits)` with no leading zeros in `integer_digits` (except a lone
/// `"0"`) and no trailing zeros in `fraction_digits`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    pub negative: bool,
    pub integer_digits: String,
    pub fraction_digits: String,
}

impl Decimal {
    pub fn parse(lexical: &str) -> Result<Self, DatatypeError> {
        let trimmed = lexical.trim();
        if !DECIMAL.is_match(trimmed) {
            return Err(DatatypeError::Lexical {
                type_name: "decimal",
                lexical: lexical.to_string(),
            });
        }

        let (negative, digits) = match trimmed.as_bytes()[0] {
            b'+' => (false, &trimmed[1..]),
            b'-' => (true, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };

        let integer_digits = {
            let stripped = int_part.trim_start_matches('0');
            if stripped.is_empty() {
                "0".to_string()
            } else {
                stripped.to_string()
            }
        };
        let fraction_digits = frac_part.trim_end_matches('0').to_string();

        let negative = negative && !(integer_digits == "0" && fraction_digits.is_empty());

        Ok(Self {
            negative,
            integer_digits,
            fraction_digits,
        })
    }

    pub fn canonical(&self) -> String {
        let sign = if self.negative { "-" } else { "" };
        if self.fraction_digits.is_empty() {
            format!("{sign}{}.0", self.integer_digits)
        } else {
            format!("{sign}{}.{}", self.integer_digits, self.fraction_digits)
        }
    }

    pub fn total_digits(&self) -> u64 {
        (self.integer_digits.trim_start_matches('0').len() + self.fraction_digits.len())
            .max(1) as u64
    }

    pub fn fraction_digit_count(&self) -> u64 {
        self.fraction_digits.len() as u64
    }

    /// Whether this value has a zero fractional part, i.e. is integer-valued.
    pub fn is_integral(&self) -> bool {
        self.fraction_digits.is_empty()
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.negative != other.negative {
            return if self.negative {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }

        let int_len = self.integer_digits.len().max(other.integer_digits.len());
        let a_int = format!("{:0>width$}", self.integer_digits, width = int_len);
        let b_int = format!("{:0>width$}", other.integer_digits, width = int_len);

        let frac_len = self.fraction_digits.len().max(other.fraction_digits.len());
        let a_frac = format!("{:0<width$}", self.fraction_digits, width = frac_len);
        let b_frac = format!("{:0<width$}", other.fraction_digits, width = frac_len);

        let magnitude = (a_int, a_frac).cmp(&(b_int, b_frac));
        if self.negative {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

/// Validates an `xs:integer`-lexical (optional sign, digits only, no fraction)
/// and returns its normalized `(negative, digits)` form.
pub fn parse_integer(lexical: &str) -> Result<(bool, String), DatatypeError> {
    let d = Decimal::parse(lexical).map_err(|_| DatatypeError::Lexical {
        type_name: "integer",
        lexical: lexical.to_string(),
    })?;
    if !d.is_integral() {
        return Err(DatatypeError::Lexical {
            type_name: "integer",
            lexical: lexical.to_string(),
        });
    }
    Ok((d.negative, d.integer_digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_leading_trailing_zeros() {
        let d = Decimal::parse("007.4200").unwrap();
        assert_eq!(d.canonical(), "7.42");
    }

    #[test]
    fn negative_zero_is_not_negative() {
        let d = Decimal::parse("-0.0").unwrap();
        assert!(!d.negative);
        assert_eq!(d.canonical(), "0.0");
    }

    #[test]
    fn ordering_across_sign_and_magnitude() {
        let a = Decimal::parse("-5.5").unwrap();
        let b = Decimal::parse("3").unwrap();
        assert!(a < b);
        let c = Decimal::parse("3.0").unwrap();
        let d = Decimal::parse("3.00").unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn rejects_non_decimal_lexical() {
        assert!(Decimal::parse("1e10").is_err());
        assert!(Decimal::parse("abc").is_err());
    }
}
