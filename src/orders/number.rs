//! Order Numbers

use std::fmt;

use jiff::Timestamp;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PREFIX: &str = "BZ";

/// Upper-case letters and digits without look-alikes (`0/O`, `1/I/L`).
const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

const SUFFIX_LEN: usize = 6;

/// Why an order number was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("order numbers look like BZ-YYMMDD-XXXXXX")]
pub struct InvalidOrderNumber;

/// Human-shareable order number, `BZ-YYMMDD-XXXXXX`.
///
/// Generation is random; uniqueness is enforced by storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a number dated with the UTC day of `now`.
    pub fn generate<R: Rng + ?Sized>(now: Timestamp, rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .filter_map(|_| ALPHABET.choose(&mut *rng).copied().map(char::from))
            .collect();

        Self(format!("{PREFIX}-{}-{suffix}", now.strftime("%y%m%d")))
    }

    /// Parse a customer-supplied number. Case and surrounding whitespace are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidOrderNumber`] if the value is not shaped like an order
    /// number.
    pub fn parse(raw: &str) -> Result<Self, InvalidOrderNumber> {
        let normalised = raw.trim().to_ascii_uppercase();
        let mut parts = normalised.split('-');

        let valid = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(PREFIX), Some(date), Some(suffix), None) => {
                date.len() == 6
                    && date.bytes().all(|b| b.is_ascii_digit())
                    && suffix.len() == SUFFIX_LEN
                    && suffix.bytes().all(|b| ALPHABET.contains(&b))
            }
            _ => false,
        };

        if valid {
            Ok(Self(normalised))
        } else {
            Err(InvalidOrderNumber)
        }
    }

    /// Wrap a value read back from storage.
    pub fn from_storage(value: String) -> Self {
        Self(value)
    }

    /// The `BZ-YYMMDD-XXXXXX` form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn generated_numbers_are_dated_and_parse_back() -> TestResult {
        let now: Timestamp = "2024-03-09T18:30:00Z".parse()?;
        let mut rng = StdRng::seed_from_u64(7);

        let number = OrderNumber::generate(now, &mut rng);

        assert!(number.as_str().starts_with("BZ-240309-"), "{number}");
        assert_eq!(number.as_str().len(), 16);
        assert_eq!(OrderNumber::parse(&number.as_str().to_lowercase())?, number);

        Ok(())
    }

    #[test]
    fn successive_numbers_differ() -> TestResult {
        let now: Timestamp = "2024-03-09T18:30:00Z".parse()?;
        let mut rng = StdRng::seed_from_u64(7);

        assert_ne!(
            OrderNumber::generate(now, &mut rng),
            OrderNumber::generate(now, &mut rng)
        );

        Ok(())
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        for raw in ["", "BZ-240309", "XX-240309-ABCDEF", "BZ-24030-ABCDEF", "BZ-240309-ABCDE0"] {
            assert_eq!(OrderNumber::parse(raw), Err(InvalidOrderNumber), "{raw}");
        }
    }
}
