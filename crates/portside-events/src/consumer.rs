//! Kafka subscriber loop.
//!
//! Pulls one message at a time from the lifecycle topic, runs the
//! decode-and-dispatch policy, and commits the offset only for
//! acknowledged messages. Offsets are committed manually
//! (`enable.auto.commit=false`) so an unacknowledged message is redelivered
//! by the broker with its own backoff.

use crate::config::KafkaConfig;
use crate::error::EventError;
use crate::subscriber::{dispatch, Disposition, LifecycleHandler};

use futures_util::StreamExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};
use rdkafka::TopicPartitionList;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

/// Subscriber bound to the lifecycle topic and a handler.
pub struct EventSubscriber<H> {
    consumer: StreamConsumer,
    handler: Arc<H>,
    topic: String,
    shutdown: watch::Receiver<bool>,
}

impl<H> EventSubscriber<H>
where
    H: LifecycleHandler + 'static,
{
    /// Create a subscriber from configuration.
    ///
    /// The handler and the shutdown channel are passed in by the caller;
    /// the subscriber owns no global state.
    pub fn new(
        config: &KafkaConfig,
        handler: Arc<H>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self, EventError> {
        let mut client_config = ClientConfig::new();

        client_config
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("client.id", &config.client_id)
            .set("group.id", &config.consumer_group)
            .set("security.protocol", config.security_protocol.as_str())
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .set("session.timeout.ms", "30000");

        if let Some(sasl) = &config.sasl {
            client_config
                .set("sasl.mechanism", sasl.mechanism.as_str())
                .set("sasl.username", &sasl.username)
                .set("sasl.password", &sasl.password);
        }

        let consumer: StreamConsumer =
            client_config
                .create()
                .map_err(|e| EventError::ConnectionFailed {
                    broker: config.bootstrap_servers.clone(),
                    cause: e.to_string(),
                })?;

        info!(
            topic = %config.topic,
            consumer_group = %config.consumer_group,
            bootstrap_servers = %config.bootstrap_servers,
            "Event subscriber created"
        );

        Ok(Self {
            consumer,
            handler,
            topic: config.topic.clone(),
            shutdown,
        })
    }

    /// Run the subscriber loop until shutdown is requested.
    ///
    /// Shutdown is graceful: the in-flight message finishes before the
    /// loop returns. A failing or panicking handler never terminates the
    /// loop; the message is simply left uncommitted.
    #[instrument(skip(self), fields(topic = %self.topic))]
    pub async fn run(self) -> Result<(), EventError> {
        let Self {
            consumer,
            handler,
            topic,
            mut shutdown,
        } = self;

        consumer
            .subscribe(&[topic.as_str()])
            .map_err(|e| EventError::ConsumeFailed {
                topic: topic.clone(),
                cause: e.to_string(),
            })?;

        info!("Subscriber loop started");

        let mut stream = consumer.stream();

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested, stopping subscriber loop");
                        break;
                    }
                }
                next = stream.next() => match next {
                    None => {
                        info!("Message stream ended");
                        break;
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "Error receiving message");
                    }
                    Some(Ok(message)) => {
                        Self::process(&consumer, &handler, &message).await;
                    }
                },
            }
        }

        info!("Subscriber loop stopped");
        Ok(())
    }

    /// Process a single message and commit its offset when acknowledged.
    async fn process(consumer: &StreamConsumer, handler: &Arc<H>, message: &BorrowedMessage<'_>) {
        let Some(payload) = message.payload() else {
            error!(
                offset = message.offset(),
                "Dropping message with empty payload"
            );
            Self::commit(consumer, message);
            return;
        };

        // Run the handler on its own task so a panic poisons only this
        // message, not the loop.
        let owned = payload.to_vec();
        let task_handler = Arc::clone(handler);
        let disposition =
            match tokio::spawn(async move { dispatch(task_handler.as_ref(), &owned).await }).await {
                Ok(disposition) => disposition,
                Err(e) => {
                    error!(offset = message.offset(), error = %e, "Handler task panicked");
                    Disposition::Retry
                }
            };

        match disposition {
            Disposition::Ack => {
                debug!(offset = message.offset(), "Message acknowledged");
                Self::commit(consumer, message);
            }
            Disposition::Retry => {
                debug!(
                    offset = message.offset(),
                    "Message left uncommitted for redelivery"
                );
            }
        }
    }

    /// Commit the offset for a message.
    fn commit(consumer: &StreamConsumer, message: &BorrowedMessage<'_>) {
        let mut tpl = TopicPartitionList::new();
        if let Err(e) = tpl.add_partition_offset(
            message.topic(),
            message.partition(),
            rdkafka::Offset::Offset(message.offset() + 1),
        ) {
            error!(error = %e, "Failed to build offset list");
            return;
        }

        if let Err(e) = consumer.commit(&tpl, CommitMode::Async) {
            // Commit failure is transient: the worst case is redelivery of
            // an already-applied event, which the handlers absorb.
            error!(error = %e, "Failed to commit offset");
        }
    }
}
