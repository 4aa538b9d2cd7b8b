// Error types for the analyzer.

use thiserror::Error;

/// A character outside the script mapping. Dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported character {ch:?} at position {position}")]
pub struct UnsupportedCharacter {
    pub ch: char,
    /// Character index in the trimmed input.
    pub position: usize,
}

/// Failure of a single attested-form lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("lookup timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("lookup service returned status {0}")]
    Status(u16),
    #[error("malformed lookup response: {0}")]
    Decode(String),
}

impl LookupError {
    /// Timeouts and transport failures are worth one quick retry; a status or
    /// decode failure will not change on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, LookupError::Timeout | LookupError::Transport(_))
    }
}

/// An attested-form source that could not answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{service} unavailable: {reason}")]
pub struct SourceUnavailable {
    pub service: String,
    pub reason: LookupError,
}

/// A category value with no classical term in the terminology table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no classical term for {category} = {value}")]
pub struct UnmappedCategory {
    pub category: &'static str,
    pub value: &'static str,
}

/// Invalid or unparsable grammatical categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("unknown {category} value {value:?}")]
    UnknownValue { category: &'static str, value: String },
    #[error("missing {field} for a {class} record")]
    Missing { field: &'static str, class: String },
    #[error("invalid combination: {0}")]
    InvalidCombination(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("cannot build lookup client: {0}")]
    Lookup(#[from] LookupError),
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("cannot write feedback: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot encode feedback: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("feedback log lock poisoned")]
    Poisoned,
}
