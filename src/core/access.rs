//! Access levels for history management
//!
//! Two shared keys map to a [`Capability`]. The keys ship inside the binary,
//! so this only keeps casual users from clearing shared history; it is not
//! a security control. Anyone who needs real protection should restrict
//! file permissions on the database instead.

use miette::Diagnostic;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

const ELEVATED_KEY: &str = "ms2024";
const STANDARD_KEY: &str = "cei2024";

/// What the supplied access key allows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Calculate and save
    Standard,
    /// Also delete saved calculations
    Elevated,
}

impl Capability {
    /// Check this capability covers `required`
    pub fn require(self, required: Capability) -> Result<(), AccessError> {
        if self >= required {
            Ok(())
        } else {
            Err(AccessError::Insufficient { required, held: self })
        }
    }

    pub fn can_delete(self) -> bool {
        self == Capability::Elevated
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Standard => write!(f, "standard"),
            Capability::Elevated => write!(f, "elevated"),
        }
    }
}

/// Map an access key to the capability it grants
pub fn authorize(key: &str) -> Result<Capability, AccessError> {
    match key.trim() {
        "" => Err(AccessError::Missing),
        ELEVATED_KEY => Ok(Capability::Elevated),
        STANDARD_KEY => Ok(Capability::Standard),
        _ => Err(AccessError::Incorrect),
    }
}

/// Resolve an optional key from the command line or environment
pub fn authorize_optional(key: Option<&str>) -> Result<Capability, AccessError> {
    authorize(key.unwrap_or_default())
}

/// Access key problems
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum AccessError {
    #[error("an access key is required")]
    #[diagnostic(
        code(inspcalc::access::missing),
        help("pass --access-key <KEY> or set INSPCALC_ACCESS_KEY")
    )]
    Missing,

    #[error("Incorrect access key")]
    #[diagnostic(code(inspcalc::access::incorrect))]
    Incorrect,

    #[error("this needs {required} access, the supplied key grants {held}")]
    #[diagnostic(
        code(inspcalc::access::insufficient),
        help("only the administrator key can delete saved calculations")
    )]
    Insufficient {
        required: Capability,
        held: Capability,
    },
}
