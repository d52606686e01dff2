//! Romanian fiscal identification code (CIF/CUI) validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AnafError;

/// Control key, right-aligned against the digits preceding the check digit.
const CIF_WEIGHTS: [u32; 9] = [7, 5, 3, 2, 1, 7, 5, 3, 2];

const CIF_MIN_LEN: usize = 2;
const CIF_MAX_LEN: usize = 10;

/// Validate a Romanian CIF by its modulus-11 check digit.
///
/// Every non-digit character is stripped first, so `"RO29930516"`,
/// `"29930516"` and `29930516` are treated alike. Never fails: anything that
/// is not 2–10 digits with a matching check digit is simply `false`.
///
/// ```
/// use anaf::validate_cif;
///
/// assert!(validate_cif(29930516));
/// assert!(validate_cif("RO 29930516"));
/// assert!(!validate_cif(1234567));
/// assert!(!validate_cif(0));
/// ```
pub fn validate_cif(cif: impl fmt::Display) -> bool {
    let digits = strip_non_digits(&cif.to_string());
    check_digits(&digits)
}

fn strip_non_digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn check_digits(digits: &str) -> bool {
    let len = digits.len();
    if !(CIF_MIN_LEN..=CIF_MAX_LEN).contains(&len) {
        return false;
    }

    let values: Vec<u32> = digits.bytes().map(|b| u32::from(b - b'0')).collect();
    let offset = CIF_MAX_LEN - len;

    let sum: u32 = values[..len - 1]
        .iter()
        .zip(&CIF_WEIGHTS[offset..])
        .map(|(d, w)| d * w)
        .sum();

    let remainder = (sum * 10) % 11;
    let expected = if remainder == 10 { 0 } else { remainder };

    values[len - 1] == expected
}

/// A fiscal code that passed [`validate_cif`].
///
/// Holds the digit-only form, so `Cif::parse("RO29930516")` displays as
/// `29930516`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cif(String);

impl Cif {
    /// Strip, validate and wrap a fiscal code.
    pub fn parse(cif: impl fmt::Display) -> Result<Self, AnafError> {
        let raw = cif.to_string();
        let digits = strip_non_digits(&raw);
        if check_digits(&digits) {
            Ok(Self(digits))
        } else {
            Err(AnafError::InvalidCif(raw))
        }
    }

    /// The digit-only representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, as the JSON services expect it.
    pub fn as_u64(&self) -> u64 {
        // At most 10 ASCII digits, always fits.
        self.0.bytes().fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'))
    }
}

impl fmt::Display for Cif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cif {
    type Err = AnafError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cif {
    type Error = AnafError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Cif> for String {
    fn from(cif: Cif) -> Self {
        cif.0
    }
}
