//! Error and warning types shared by the engines.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A document-level failure. The caller skips the document and moves on.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A field the fact cannot be built without is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field was found but its value is unusable.
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    /// The hero name produced an unusable pattern.
    #[error("bad hero pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A recoverable data-quality problem. The fact is still produced, with the
/// correction applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWarning {
    /// Parsed player count was zero or below the finish place.
    PlayerCountCorrected { parsed: u32, corrected: u32 },
    /// No player count in the document; a default was used.
    PlayerCountMissing { assumed: u32 },
    /// No buy-in in the document; bucket counts are all zero.
    BuyInMissing,
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::PlayerCountCorrected { parsed, corrected } => {
                write!(f, "player count {parsed} corrected to {corrected}")
            }
            DataWarning::PlayerCountMissing { assumed } => {
                write!(f, "player count missing, assumed {assumed}")
            }
            DataWarning::BuyInMissing => f.write_str("buy-in missing"),
        }
    }
}
