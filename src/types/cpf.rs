//! Cpf identifier
//!
//! A cpf is an 11-digit numeric identifier, unique per person in the ledger.
//! It is stored as a plain integer and rendered as `000.000.000-00`.

use super::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest value representable with 11 decimal digits
const MAX_CPF: u64 = 99_999_999_999;

/// Layout of the formatted form; `d` stands for one digit
const FORMAT_MASK: &str = "ddd.ddd.ddd-dd";

/// Unique person identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Cpf(u64);

impl Cpf {
    /// Create a cpf from its numeric value
    ///
    /// Fails with `InvalidCpf` if the value needs more than 11 digits.
    pub fn new(value: u64) -> Result<Self, LedgerError> {
        if value > MAX_CPF {
            return Err(LedgerError::invalid_cpf(&value.to_string()));
        }
        Ok(Cpf(value))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = format!("{:011}", self.0);
        write!(
            f,
            "{}.{}.{}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..11]
        )
    }
}

/// Parses plain digits (`12345678901`) or the formatted form (`123.456.789-01`)
impl FromStr for Cpf {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::empty_field("cpf"));
        }

        let digits = if trimmed.len() == FORMAT_MASK.len() {
            let matches_mask = trimmed.bytes().zip(FORMAT_MASK.bytes()).all(|(c, m)| match m {
                b'd' => c.is_ascii_digit(),
                separator => c == separator,
            });
            if !matches_mask {
                return Err(LedgerError::invalid_cpf(trimmed));
            }
            trimmed.chars().filter(char::is_ascii_digit).collect()
        } else {
            trimmed.to_string()
        };
        if digits.is_empty() || digits.len() > 11 || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(LedgerError::invalid_cpf(trimmed));
        }

        let value = digits
            .parse::<u64>()
            .map_err(|_| LedgerError::invalid_cpf(trimmed))?;
        Cpf::new(value)
    }
}

impl TryFrom<u64> for Cpf {
    type Error = LedgerError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Cpf::new(value)
    }
}

impl From<Cpf> for u64 {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}
