use thiserror::Error;

/// Raised while turning raw records into documents. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("record #{index} is not an object")]
    NotAnObject { index: usize },

    /// Every required key that is absent or `null`, sorted. A `null` value is
    /// treated as missing, so a `null` ts lands here and never in `TimestampType`.
    #[error("missing document fields {fields:?} (record id: {id})")]
    MissingFields { id: String, fields: Vec<String> },

    #[error("ts must be an ISO-8601 string or date-time, found {found}")]
    TimestampType { found: &'static str },

    #[error("invalid ISO-8601 timestamp: {value}")]
    InvalidTimestamp { value: String },

    #[error("meta must be an object, found {found}")]
    MetaType { found: &'static str },

    #[error("duplicate document id: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("lexicon file not readable: {0}")]
    Io(#[from] std::io::Error),

    #[error("lexicon json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid claim trigger pattern: {0}")]
    Regex(#[from] regex::Error),
}
