use thiserror::Error;

/// Failure to coerce a CSV row or a change-stream image into typed values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing required column '{0}' in header")]
    MissingColumn(&'static str),

    #[error("row {row} has no value for column '{column}'")]
    MissingField { row: usize, column: &'static str },

    #[error("missing attribute '{0}'")]
    MissingAttribute(&'static str),

    #[error("attribute '{attribute}' must be of type {expected}")]
    AttributeType {
        attribute: &'static str,
        expected: &'static str,
    },

    #[error("invalid integer for '{field}': {value:?}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("malformed csv: {0}")]
    Csv(String),
}

impl From<csv::Error> for ParseError {
    fn from(error: csv::Error) -> Self {
        Self::Csv(error.to_string())
    }
}

/// No visible topic matched the configured alert topic name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no topic found with name '{name}' ({candidates} topics listed)")]
pub struct TopicNotFound {
    pub name: String,
    pub candidates: usize,
}

/// A trigger payload that does not have the shape a handler expects.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("event must include at least one record")]
    NoRecords,

    #[error("malformed event: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for EventError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}
