//! Subscriber configuration.

use crate::error::EventError;
use std::env;
use std::str::FromStr;

/// Security protocol for the broker connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityProtocol {
    /// Plaintext connection (no encryption or auth).
    Plaintext,
    /// SSL encryption without SASL auth.
    Ssl,
    /// SASL authentication without encryption.
    SaslPlaintext,
    /// SASL authentication with SSL encryption.
    SaslSsl,
}

impl FromStr for SecurityProtocol {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PLAINTEXT" => Ok(Self::Plaintext),
            "SSL" => Ok(Self::Ssl),
            "SASL_PLAINTEXT" => Ok(Self::SaslPlaintext),
            "SASL_SSL" => Ok(Self::SaslSsl),
            _ => Err(EventError::ConfigInvalid {
                var: "KAFKA_SECURITY_PROTOCOL".to_string(),
                reason: format!("Unknown protocol: {s}"),
            }),
        }
    }
}

impl SecurityProtocol {
    /// Convert to the rdkafka string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plaintext => "PLAINTEXT",
            Self::Ssl => "SSL",
            Self::SaslPlaintext => "SASL_PLAINTEXT",
            Self::SaslSsl => "SASL_SSL",
        }
    }
}

/// SASL mechanism for authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaslMechanism {
    Plain,
    ScramSha256,
    ScramSha512,
}

impl FromStr for SaslMechanism {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "PLAIN" => Ok(Self::Plain),
            "SCRAM_SHA_256" => Ok(Self::ScramSha256),
            "SCRAM_SHA_512" => Ok(Self::ScramSha512),
            _ => Err(EventError::ConfigInvalid {
                var: "KAFKA_SASL_MECHANISM".to_string(),
                reason: format!("Unknown mechanism: {s}"),
            }),
        }
    }
}

impl SaslMechanism {
    /// Convert to the rdkafka string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::ScramSha256 => "SCRAM-SHA-256",
            Self::ScramSha512 => "SCRAM-SHA-512",
        }
    }
}

/// SASL credentials for authentication.
#[derive(Debug, Clone)]
pub struct SaslCredentials {
    pub mechanism: SaslMechanism,
    pub username: String,
    pub password: String,
}

/// Connection and subscription settings for the lifecycle feed.
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Comma-separated list of broker addresses.
    pub bootstrap_servers: String,
    /// Topic carrying the procurement lifecycle events.
    pub topic: String,
    /// Consumer group of this reconciler deployment.
    pub consumer_group: String,
    /// Client identifier.
    pub client_id: String,
    /// Security protocol.
    pub security_protocol: SecurityProtocol,
    /// SASL credentials (required if using SASL).
    pub sasl: Option<SaslCredentials>,
}

impl KafkaConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `KAFKA_BOOTSTRAP_SERVERS`: Comma-separated broker list
    /// - `KAFKA_TOPIC`: Lifecycle event topic
    ///
    /// Optional:
    /// - `KAFKA_CONSUMER_GROUP`: Consumer group (default: "portside-reconciler")
    /// - `KAFKA_CLIENT_ID`: Client identifier (default: "portside")
    /// - `KAFKA_SECURITY_PROTOCOL`: PLAINTEXT (default), SSL, `SASL_PLAINTEXT`, `SASL_SSL`
    /// - `KAFKA_SASL_MECHANISM`: PLAIN, SCRAM-SHA-256, SCRAM-SHA-512 (required if SASL)
    /// - `KAFKA_SASL_USERNAME`: SASL username (required if SASL)
    /// - `KAFKA_SASL_PASSWORD`: SASL password (required if SASL)
    pub fn from_env() -> Result<Self, EventError> {
        let bootstrap_servers = required("KAFKA_BOOTSTRAP_SERVERS")?;
        let topic = required("KAFKA_TOPIC")?;

        let consumer_group = env::var("KAFKA_CONSUMER_GROUP")
            .unwrap_or_else(|_| "portside-reconciler".to_string());
        let client_id = env::var("KAFKA_CLIENT_ID").unwrap_or_else(|_| "portside".to_string());

        let security_protocol = match env::var("KAFKA_SECURITY_PROTOCOL") {
            Ok(v) => SecurityProtocol::from_str(&v)?,
            Err(_) => SecurityProtocol::Plaintext,
        };

        let sasl = if matches!(
            security_protocol,
            SecurityProtocol::SaslPlaintext | SecurityProtocol::SaslSsl
        ) {
            Some(SaslCredentials {
                mechanism: SaslMechanism::from_str(&required("KAFKA_SASL_MECHANISM")?)?,
                username: required("KAFKA_SASL_USERNAME")?,
                password: required("KAFKA_SASL_PASSWORD")?,
            })
        } else {
            None
        };

        Ok(Self {
            bootstrap_servers,
            topic,
            consumer_group,
            client_id,
            security_protocol,
            sasl,
        })
    }
}

fn required(var: &str) -> Result<String, EventError> {
    env::var(var).map_err(|_| EventError::ConfigMissing {
        var: var.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_protocol_parsing() {
        assert_eq!(
            SecurityProtocol::from_str("sasl_ssl").unwrap(),
            SecurityProtocol::SaslSsl
        );
        assert!(SecurityProtocol::from_str("QUIC").is_err());
    }

    #[test]
    fn sasl_mechanism_accepts_both_spellings() {
        assert_eq!(
            SaslMechanism::from_str("SCRAM-SHA-256").unwrap(),
            SaslMechanism::ScramSha256
        );
        assert_eq!(
            SaslMechanism::from_str("scram_sha_512").unwrap(),
            SaslMechanism::ScramSha512
        );
    }
}
