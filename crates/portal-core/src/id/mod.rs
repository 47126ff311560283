//! Patient identifier allocation.
//!
//! Identifiers are `<prefix><suffix>`:
//!
//! ```text
//! 25 NP 00001        numeric regime       (00001 ..= 99999)
//! 25 NP 00001 A      single-letter regime (A ..= Z)
//! 25 NP 00001 ZA     multi-letter regime  (ZA ..= ZZ, AAA, ...)
//! ^^ ^^
//! |  country code
//! year (mod 100)
//! ```
//!
//! A bucket (all identifiers sharing one prefix) only ever moves forward
//! through the regimes. The allocator is stateless: the current position of a
//! bucket is re-derived from the store on every call.

mod allocator;
mod country;
mod suffix;

pub use allocator::*;
pub use country::*;
pub use suffix::*;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Width of the zero-padded numeric field.
pub const NUMERIC_WIDTH: usize = 5;

/// Largest value of the numeric regime.
pub const NUMERIC_MAX: u64 = 99_999;

/// Bucket key: two-digit year followed by a country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdPrefix(String);

impl IdPrefix {
    /// Build a prefix from a calendar year and a country code.
    pub fn new(year: i32, country_code: &str) -> Self {
        Self(format!("{:02}{}", year.rem_euclid(100), country_code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters (the store compares prefixes per character).
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// The first identifier of this bucket.
    pub fn seed(&self) -> PatientId {
        PatientId::from_parts(self, &Suffix::SEED)
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A generated patient identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    pub(crate) fn from_parts(prefix: &IdPrefix, suffix: &Suffix) -> Self {
        Self(format!("{}{}", prefix, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Decode the suffix relative to `prefix`, if it belongs to that bucket.
    pub fn suffix(&self, prefix: &IdPrefix) -> Option<Suffix> {
        self.0.strip_prefix(prefix.as_str()).and_then(Suffix::parse)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PatientId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<PatientId> for String {
    fn from(id: PatientId) -> Self {
        id.0
    }
}
