//! Error types for the portside-events crate.

use thiserror::Error;

/// Errors that can occur in the event feed infrastructure.
///
/// Decode problems are not errors: they are [`crate::Decoded`] outcomes,
/// because a malformed or unrecognized message is acknowledged rather than
/// retried.
#[derive(Debug, Error)]
pub enum EventError {
    // Configuration errors (permanent, no retry)
    /// Required configuration variable is missing.
    #[error("Configuration missing: {var}")]
    ConfigMissing { var: String },

    /// Configuration value is invalid.
    #[error("Configuration invalid for {var}: {reason}")]
    ConfigInvalid { var: String, reason: String },

    // Connection errors (transient, retry with backoff)
    /// Failed to connect to the broker.
    #[error("Connection to broker {broker} failed: {cause}")]
    ConnectionFailed { broker: String, cause: String },

    /// Failed to consume from a topic.
    #[error("Failed to consume from topic {topic}: {cause}")]
    ConsumeFailed { topic: String, cause: String },

    /// Internal Kafka client error.
    #[cfg(feature = "kafka")]
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}

impl EventError {
    /// Returns true if this error is transient and worth retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            EventError::ConnectionFailed { .. } | EventError::ConsumeFailed { .. } => true,
            EventError::ConfigMissing { .. } | EventError::ConfigInvalid { .. } => false,
            #[cfg(feature = "kafka")]
            EventError::Kafka(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_permanent() {
        let err = EventError::ConfigMissing {
            var: "KAFKA_BOOTSTRAP_SERVERS".to_string(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn connection_errors_are_transient() {
        let err = EventError::ConnectionFailed {
            broker: "localhost:9092".to_string(),
            cause: "refused".to_string(),
        };
        assert!(err.is_transient());
    }
}
