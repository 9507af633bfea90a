//! Filesystem-safe identifiers for processed entries.
//!
//! Identifiers name the per-entry output files (`{id}.pdf`, `{id}.bib`), so
//! they must be unique within a run and safe as a file name.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::bibtex::BibRecord;

/// Longest identifier accepted before falling back, leaving room for an
/// extension within common 255-byte file name limits.
const MAX_ID_LEN: usize = 240;

/// How identifiers are derived from an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdScheme {
    /// The entry number.
    Ordinal,
    /// The percent-encoded citation key.
    EncodedKey,
    /// `{number}_{percent-encoded key}`.
    #[default]
    OrdinalAndKey,
}

impl IdScheme {
    /// Stable label for display and configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ordinal => "ORDINAL",
            Self::EncodedKey => "ENCODED_KEY",
            Self::OrdinalAndKey => "ORDINAL_AND_KEY",
        }
    }

    /// Returns the identifier of an entry.
    ///
    /// `number` is the offset-adjusted entry number. Never fails: a key that
    /// cannot be turned into a safe file name degrades to the number.
    #[must_use]
    pub fn id(self, number: usize, key: &str, _record: &BibRecord) -> String {
        match self {
            Self::Ordinal => number.to_string(),
            Self::EncodedKey => encoded_key_or_number(number, key),
            Self::OrdinalAndKey => format!("{number}_{}", encoded_key_or_number(number, key)),
        }
    }
}

fn encoded_key_or_number(number: usize, key: &str) -> String {
    match encode_key(key) {
        Ok(encoded) => encoded,
        Err(reason) => {
            let fallback = number.to_string();
            warn!(key, reason, fallback = %fallback, "failed to encode citation key");
            fallback
        }
    }
}

fn encode_key(key: &str) -> Result<String, &'static str> {
    let encoded = urlencoding::encode(key);
    match encoded.as_ref() {
        "" => Err("key is empty"),
        "." | ".." => Err("key is a reserved path segment"),
        value if value.len() > MAX_ID_LEN => Err("encoded key is too long for a file name"),
        _ => Ok(encoded.into_owned()),
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdScheme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ORDINAL" | "NUMBER" | "ENTRY_NUMBER" => Ok(Self::Ordinal),
            "ENCODED_KEY" | "URLENCODED_KEY" | "KEY" => Ok(Self::EncodedKey),
            "ORDINAL_AND_KEY" | "NUMBER_AND_KEY" => Ok(Self::OrdinalAndKey),
            other => Err(format!(
                "unknown ID scheme `{other}` (expected ORDINAL, ENCODED_KEY or ORDINAL_AND_KEY)"
            )),
        }
    }
}
