//! Lifecycle feed subscriber wiring.
//!
//! Only compiled with the `kafka` feature; the HTTP surface works without
//! a broker, which is how the read endpoints run in local development.

use portside_events::{EventSubscriber, KafkaConfig};
use portside_reconciler::Reconciler;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Start the lifecycle subscriber on its own task.
///
/// The returned handle resolves after a shutdown signal once the in-flight
/// message has finished.
pub fn start(
    config: &KafkaConfig,
    reconciler: Reconciler,
    shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>, portside_events::EventError> {
    let subscriber = EventSubscriber::new(config, Arc::new(reconciler), shutdown)?;

    info!(topic = %config.topic, "Starting lifecycle subscriber");

    Ok(tokio::spawn(async move {
        if let Err(e) = subscriber.run().await {
            error!(error = %e, "Lifecycle subscriber failed");
        }
    }))
}
