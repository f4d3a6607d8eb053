use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of digits in a structurally valid NIT.
pub const NIT_LENGTH: usize = 9;

/// Colombian tax identifier normalized to exactly nine ASCII digits.
///
/// The only constructors go through [`validate_nit`], so holding a `Nit` is
/// proof that the digit invariant holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nit(String);

impl Nit {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the identifier into its three display groups.
    pub(crate) fn groups(&self) -> (&str, &str, &str) {
        let digits = self.0.as_str();
        (&digits[0..3], &digits[3..6], &digits[6..9])
    }
}

impl fmt::Display for Nit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Nit {
    type Error = NitRejection;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_nit(&value)
    }
}

impl From<Nit> for String {
    fn from(value: Nit) -> Self {
        value.0
    }
}

/// Reason a raw identifier was refused before any lookup was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NitRejection {
    #[error("El NIT debe contener solo números")]
    NonNumeric,
    #[error("El NIT debe tener 9 dígitos")]
    WrongLength,
}

/// Normalizes raw user input into a [`Nit`].
///
/// Hyphens and whitespace are stripped first. Any other non-digit character
/// yields [`NitRejection::NonNumeric`], which takes precedence over a length
/// mismatch.
pub fn validate_nit(raw: &str) -> Result<Nit, NitRejection> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| *ch != '-' && !ch.is_whitespace())
        .collect();

    if !cleaned.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(NitRejection::NonNumeric);
    }

    if cleaned.len() != NIT_LENGTH {
        return Err(NitRejection::WrongLength);
    }

    Ok(Nit(cleaned))
}

/// Keystroke filter for the identifier field: digits only, at most nine.
pub fn filter_nit_input(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(NIT_LENGTH)
        .collect()
}
