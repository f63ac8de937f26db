//! # portside-events
//!
//! Lifecycle event feed for the marketplace integration.
//!
//! The procurement service publishes account and entitlement lifecycle
//! events to a message bus with at-least-once delivery and no ordering
//! guarantee. This crate turns raw message bodies into a closed
//! [`LifecycleEvent`] enum, decides acknowledge-versus-redeliver per
//! message, and runs the subscriber loop.
//!
//! ## Cargo Features
//!
//! - `kafka`: Enable the Kafka subscriber (requires librdkafka)
//! - `kafka-static`: Build librdkafka from source (requires cmake)
//!
//! Decoding and the dispatch policy are always available, so the
//! acknowledge rules can be exercised without a broker.

pub mod config;
pub mod error;
pub mod event;
pub mod subscriber;

#[cfg(feature = "kafka")]
pub mod consumer;

pub use config::KafkaConfig;
pub use error::EventError;
pub use event::{decode, Decoded, LifecycleEvent};
pub use subscriber::{dispatch, Disposition, LifecycleHandler};

#[cfg(feature = "kafka")]
pub use consumer::EventSubscriber;
