use thiserror::Error;

/// A call to an external service failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct ServiceError {
    pub operation: &'static str,
    pub message: String,
}

impl ServiceError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}
