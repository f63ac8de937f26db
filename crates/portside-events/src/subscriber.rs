//! Decode-and-dispatch policy for the subscriber loop.
//!
//! The acknowledge decision is bus-agnostic: malformed and unrecognized
//! messages are acknowledged (redelivery cannot fix them), a handled event
//! is acknowledged, and a handler failure leaves the message unacknowledged
//! so the bus redelivers it with its own backoff. Keeping the policy here
//! lets it run without a broker.

use crate::event::{decode, Decoded, LifecycleEvent};
use async_trait::async_trait;
use tracing::error;

/// Processes one decoded lifecycle event.
///
/// Return `Ok(())` when the event is fully handled, including the
/// reported-and-skipped cases (missing referenced entity) that must be
/// acknowledged. Return `Err` only for failures that redelivery can cure,
/// such as an unreachable store or gateway.
#[async_trait]
pub trait LifecycleHandler: Send + Sync {
    async fn handle(
        &self,
        event: LifecycleEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// What to do with a message after one processing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Remove the message from the subscription.
    Ack,
    /// Leave it for the bus to redeliver.
    Retry,
}

/// Decode one raw message body and run the handler, returning the
/// acknowledge decision.
pub async fn dispatch<H>(handler: &H, payload: &[u8]) -> Disposition
where
    H: LifecycleHandler + ?Sized,
{
    match decode(payload) {
        Decoded::Malformed { reason } => {
            error!(%reason, "Dropping malformed message");
            Disposition::Ack
        }
        Decoded::Unrecognized { event_type } => {
            error!(%event_type, "Dropping unrecognized event kind");
            Disposition::Ack
        }
        Decoded::Event(event) => {
            let kind = event.kind();
            match handler.handle(event).await {
                Ok(()) => Disposition::Ack,
                Err(e) => {
                    error!(event_kind = %kind, error = %e, "Handler failed, leaving message for redelivery");
                    Disposition::Retry
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubHandler {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LifecycleHandler for StubHandler {
        async fn handle(
            &self,
            _event: LifecycleEvent,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err("store unavailable".into())
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn malformed_is_acked_without_reaching_handler() {
        let handler = StubHandler {
            fail: false,
            calls: AtomicUsize::new(0),
        };
        let disposition = dispatch(&handler, b"not json").await;
        assert_eq!(disposition, Disposition::Ack);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unrecognized_is_acked_without_reaching_handler() {
        let handler = StubHandler {
            fail: false,
            calls: AtomicUsize::new(0),
        };
        let raw = br#"{"eventType":"SOMETHING_ELSE","account":{"id":"a"}}"#;
        let disposition = dispatch(&handler, raw).await;
        assert_eq!(disposition, Disposition::Ack);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handled_event_is_acked() {
        let handler = StubHandler {
            fail: false,
            calls: AtomicUsize::new(0),
        };
        let raw = br#"{"eventType":"ENTITLEMENT_ACTIVE","entitlement":{"id":"sub-1"}}"#;
        let disposition = dispatch(&handler, raw).await;
        assert_eq!(disposition, Disposition::Ack);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handler_failure_leaves_message_for_redelivery() {
        let handler = StubHandler {
            fail: true,
            calls: AtomicUsize::new(0),
        };
        let raw = br#"{"eventType":"ENTITLEMENT_ACTIVE","entitlement":{"id":"sub-1"}}"#;
        let disposition = dispatch(&handler, raw).await;
        assert_eq!(disposition, Disposition::Retry);
    }
}
