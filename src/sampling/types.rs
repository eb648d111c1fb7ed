//! Sampling vocabulary: inspection levels, quality limits and code letters

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Inspection level, selects which lot-size-to-code table applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum InspectionLevel {
    /// General level I (reduced discrimination)
    #[serde(rename = "I")]
    #[value(name = "I", alias = "i")]
    I,
    /// General level II (the normal choice)
    #[default]
    #[serde(rename = "II")]
    #[value(name = "II", alias = "ii")]
    II,
    /// Special level S-3
    #[serde(rename = "S-3")]
    #[value(name = "S-3", alias = "s-3", alias = "S3", alias = "s3")]
    S3,
    /// Special level S-4
    #[serde(rename = "S-4")]
    #[value(name = "S-4", alias = "s-4", alias = "S4", alias = "s4")]
    S4,
}

impl InspectionLevel {
    /// All levels in display order
    pub const ALL: [InspectionLevel; 4] = [
        InspectionLevel::I,
        InspectionLevel::II,
        InspectionLevel::S3,
        InspectionLevel::S4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionLevel::I => "I",
            InspectionLevel::II => "II",
            InspectionLevel::S3 => "S-3",
            InspectionLevel::S4 => "S-4",
        }
    }
}

impl fmt::Display for InspectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InspectionLevel {
    type Err = ParseSamplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('_', "-").as_str() {
            "I" => Ok(InspectionLevel::I),
            "II" => Ok(InspectionLevel::II),
            "S-3" | "S3" => Ok(InspectionLevel::S3),
            "S-4" | "S4" => Ok(InspectionLevel::S4),
            _ => Err(ParseSamplingError::InspectionLevel(s.to_string())),
        }
    }
}

/// Acceptable quality limit, selects the Ac/Re column
///
/// Serialized as the strings `"2.5"` and `"4.0"`. Plain numbers are accepted
/// when reading, since YAML turns an unquoted `4.0` into a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum QualityLimit {
    #[value(name = "2.5")]
    Aql2_5,
    #[value(name = "4.0", alias = "4")]
    Aql4_0,
}

impl QualityLimit {
    pub const ALL: [QualityLimit; 2] = [QualityLimit::Aql2_5, QualityLimit::Aql4_0];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLimit::Aql2_5 => "2.5",
            QualityLimit::Aql4_0 => "4.0",
        }
    }

    /// Column index into the acceptance table
    pub(crate) fn index(&self) -> usize {
        match self {
            QualityLimit::Aql2_5 => 0,
            QualityLimit::Aql4_0 => 1,
        }
    }

    fn from_number(value: f64) -> Option<Self> {
        if (value - 2.5).abs() < f64::EPSILON {
            Some(QualityLimit::Aql2_5)
        } else if (value - 4.0).abs() < f64::EPSILON {
            Some(QualityLimit::Aql4_0)
        } else {
            None
        }
    }
}

impl fmt::Display for QualityLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QualityLimit {
    type Err = ParseSamplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .ok()
            .and_then(QualityLimit::from_number)
            .ok_or_else(|| ParseSamplingError::QualityLimit(s.to_string()))
    }
}

impl Serialize for QualityLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for QualityLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::Number(value) => QualityLimit::from_number(value).ok_or_else(|| {
                serde::de::Error::custom(ParseSamplingError::QualityLimit(value.to_string()))
            }),
        }
    }
}

/// Sample size code letter (A..R, skipping I and O)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CodeLetter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    J,
    K,
    L,
    M,
    N,
    P,
    Q,
    R,
}

impl CodeLetter {
    /// Every code letter, smallest plan first
    pub const ALL: [CodeLetter; 16] = [
        CodeLetter::A,
        CodeLetter::B,
        CodeLetter::C,
        CodeLetter::D,
        CodeLetter::E,
        CodeLetter::F,
        CodeLetter::G,
        CodeLetter::H,
        CodeLetter::J,
        CodeLetter::K,
        CodeLetter::L,
        CodeLetter::M,
        CodeLetter::N,
        CodeLetter::P,
        CodeLetter::Q,
        CodeLetter::R,
    ];

    /// Row index into the sample size and acceptance tables
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_char(&self) -> char {
        match self {
            CodeLetter::A => 'A',
            CodeLetter::B => 'B',
            CodeLetter::C => 'C',
            CodeLetter::D => 'D',
            CodeLetter::E => 'E',
            CodeLetter::F => 'F',
            CodeLetter::G => 'G',
            CodeLetter::H => 'H',
            CodeLetter::J => 'J',
            CodeLetter::K => 'K',
            CodeLetter::L => 'L',
            CodeLetter::M => 'M',
            CodeLetter::N => 'N',
            CodeLetter::P => 'P',
            CodeLetter::Q => 'Q',
            CodeLetter::R => 'R',
        }
    }
}

impl fmt::Display for CodeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for CodeLetter {
    type Err = ParseSamplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        CodeLetter::ALL
            .iter()
            .copied()
            .find(|code| upper.len() == 1 && upper.starts_with(code.as_char()))
            .ok_or_else(|| ParseSamplingError::CodeLetter(s.to_string()))
    }
}

/// Errors parsing sampling vocabulary from text
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseSamplingError {
    #[error("unknown inspection level '{0}' (expected I, II, S-3 or S-4)")]
    InspectionLevel(String),

    #[error("unsupported quality limit '{0}' (expected 2.5 or 4.0)")]
    QualityLimit(String),

    #[error("invalid code letter '{0}'")]
    CodeLetter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspection_level_parsing() {
        assert_eq!("II".parse::<InspectionLevel>().unwrap(), InspectionLevel::II);
        assert_eq!("s-3".parse::<InspectionLevel>().unwrap(), InspectionLevel::S3);
        assert_eq!("S4".parse::<InspectionLevel>().unwrap(), InspectionLevel::S4);
        assert!("III".parse::<InspectionLevel>().is_err());
    }

    #[test]
    fn test_inspection_level_serialization() {
        let yaml = serde_yml::to_string(&InspectionLevel::S3).unwrap();
        assert_eq!(yaml.trim(), "S-3");

        let parsed: InspectionLevel = serde_yml::from_str("S-4").unwrap();
        assert_eq!(parsed, InspectionLevel::S4);
    }

    #[test]
    fn test_quality_limit_accepts_numbers_and_strings() {
        let quoted: QualityLimit = serde_yml::from_str("\"4.0\"").unwrap();
        let float: QualityLimit = serde_yml::from_str("4.0").unwrap();
        let int: QualityLimit = serde_yml::from_str("4").unwrap();
        let low: QualityLimit = serde_json::from_str("2.5").unwrap();

        assert_eq!(quoted, QualityLimit::Aql4_0);
        assert_eq!(float, QualityLimit::Aql4_0);
        assert_eq!(int, QualityLimit::Aql4_0);
        assert_eq!(low, QualityLimit::Aql2_5);
    }

    #[test]
    fn test_quality_limit_rejects_other_values() {
        assert!(serde_yml::from_str::<QualityLimit>("1.5").is_err());
        assert!("6.5".parse::<QualityLimit>().is_err());
    }

    #[test]
    fn test_quality_limit_serializes_as_string() {
        let json = serde_json::to_string(&QualityLimit::Aql4_0).unwrap();
        assert_eq!(json, "\"4.0\"");
    }

    #[test]
    fn test_code_letter_skips_i_and_o() {
        assert_eq!(CodeLetter::ALL.len(), 16);
        assert!("I".parse::<CodeLetter>().is_err());
        assert!("O".parse::<CodeLetter>().is_err());
        assert_eq!("j".parse::<CodeLetter>().unwrap(), CodeLetter::J);
    }

    #[test]
    fn test_code_letter_order_matches_index() {
        for (i, code) in CodeLetter::ALL.iter().enumerate() {
            assert_eq!(code.index(), i);
        }
        assert!(CodeLetter::H < CodeLetter::J);
    }
}
