//! Error types for the Homework Notifier
//!
//! One closed set of variants for everything that can go wrong in a poll
//! cycle, plus a separate type for sink delivery failures, which never leave
//! the dispatcher.

use thiserror::Error;

/// Main error type for the poll loop and its components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifierError {
    /// Required configuration values are not set
    #[error("Missing required environment variables: {}", .names.join(", "))]
    MissingCredentials { names: Vec<String> },

    /// Connection failure or non-success HTTP status from the status API
    #[error("Status API request failed: {0}")]
    Transport(String),

    /// Response does not have the expected structure
    #[error("Unexpected status API response: {0}")]
    Shape(String),

    /// Status record lacks a required field
    #[error("Status record has no '{name}' field")]
    MissingField { name: String },

    /// Status record carries a verdict code outside the catalog
    #[error("Unknown homework status: {code}")]
    UnknownVerdict { code: String },
}

impl NotifierError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        NotifierError::Transport(msg.into())
    }

    /// Create a shape error
    pub fn shape(msg: impl Into<String>) -> Self {
        NotifierError::Shape(msg.into())
    }

    /// Create a missing field error
    pub fn missing_field(name: impl Into<String>) -> Self {
        NotifierError::MissingField { name: name.into() }
    }

    /// Only startup configuration errors stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, NotifierError::MissingCredentials { .. })
    }
}

/// Failure delivering a message to the notification sink
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The request never produced a response
    #[error("Sink request failed: {0}")]
    Delivery(String),

    /// The sink answered but refused the message
    #[error("Sink rejected message: {0}")]
    Rejected(String),
}

/// Result type alias for poll loop operations
pub type Result<T> = std::result::Result<T, NotifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotifierError::MissingCredentials {
            names: vec!["TOKEN_PRACTICUM".to_string(), "CHAT_ID".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: TOKEN_PRACTICUM, CHAT_ID"
        );

        let err = NotifierError::missing_field("status");
        assert_eq!(err.to_string(), "Status record has no 'status' field");
    }

    #[test]
    fn test_is_fatal() {
        assert!(NotifierError::MissingCredentials { names: vec![] }.is_fatal());
        assert!(!NotifierError::transport("reset").is_fatal());
        assert!(!NotifierError::shape("not an object").is_fatal());
        assert!(!NotifierError::UnknownVerdict {
            code: "lost".to_string()
        }
        .is_fatal());
    }
}
