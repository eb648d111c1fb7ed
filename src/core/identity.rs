//! Saved calculation identifiers: `CALC-<ULID>` and short `CALC@N` forms

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Prefix on every saved calculation id
pub const CALC_PREFIX: &str = "CALC";

/// A unique saved calculation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalculationId {
    ulid: Ulid,
}

impl CalculationId {
    /// Create a new id; ULIDs sort by creation time
    pub fn new() -> Self {
        Self { ulid: Ulid::new() }
    }

    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl Default for CalculationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CalculationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", CALC_PREFIX, self.ulid)
    }
}

impl FromStr for CalculationId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, ulid_str) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        if !prefix.eq_ignore_ascii_case(CALC_PREFIX) {
            return Err(IdParseError::InvalidPrefix(prefix.to_string()));
        }

        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { ulid })
    }
}

impl Serialize for CalculationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CalculationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A reference to a saved calculation as typed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationRef {
    /// Full `CALC-<ULID>`
    Id(CalculationId),
    /// Short `CALC@N`, or a bare `N`
    Seq(i64),
}

impl CalculationRef {
    /// Format a sequence number as a short id
    pub fn short(seq: i64) -> String {
        format!("{}@{}", CALC_PREFIX, seq)
    }
}

impl fmt::Display for CalculationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationRef::Id(id) => write!(f, "{}", id),
            CalculationRef::Seq(seq) => write!(f, "{}", Self::short(*seq)),
        }
    }
}

impl FromStr for CalculationRef {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let seq_str = match s.split_once('@') {
            Some((prefix, num)) => {
                if !prefix.eq_ignore_ascii_case(CALC_PREFIX) {
                    return Err(IdParseError::InvalidPrefix(prefix.to_string()));
                }
                Some(num)
            }
            None if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => Some(s),
            None => None,
        };

        match seq_str {
            Some(num) => match num.parse::<i64>() {
                Ok(seq) if seq > 0 => Ok(CalculationRef::Seq(seq)),
                _ => Err(IdParseError::InvalidShortId(s.to_string())),
            },
            None => s.parse().map(CalculationRef::Id),
        }
    }
}

/// Errors that can occur when parsing calculation ids
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("invalid id prefix: '{0}' (expected CALC)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in calculation ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),

    #[error("invalid short id '{0}' (expected CALC@N with N >= 1)")]
    InvalidShortId(String),
}
