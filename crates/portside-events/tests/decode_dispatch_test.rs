//! Integration test for the decode-and-dispatch surface.
//!
//! Exercises the crate boundary the way the subscriber loop and the
//! reconciler use it: raw bytes in, acknowledge decision out.

use async_trait::async_trait;
use portside_events::{decode, dispatch, Decoded, Disposition, LifecycleEvent, LifecycleHandler};
use std::sync::Mutex;

/// Handler that records every event it sees.
#[derive(Default)]
struct CollectingHandler {
    seen: Mutex<Vec<LifecycleEvent>>,
}

#[async_trait]
impl LifecycleHandler for CollectingHandler {
    async fn handle(
        &self,
        event: LifecycleEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.seen.lock().unwrap().push(event);
        Ok(())
    }
}

#[tokio::test]
async fn full_event_vocabulary_round_trips_through_dispatch() {
    let handler = CollectingHandler::default();

    let bodies: Vec<&[u8]> = vec![
        br#"{"eventType":"ACCOUNT_ACTIVE","account":{"id":"acc-1"}}"#,
        br#"{"eventType":"ENTITLEMENT_CREATION_REQUESTED","entitlement":{"id":"sub-1"}}"#,
        br#"{"eventType":"ENTITLEMENT_ACTIVE","entitlement":{"id":"sub-1"}}"#,
        br#"{"eventType":"ENTITLEMENT_PLAN_CHANGE_REQUESTED","entitlement":{"id":"sub-1","newPlan":"plan-b"}}"#,
        br#"{"eventType":"ENTITLEMENT_PLAN_CHANGED","entitlement":{"id":"sub-1"}}"#,
        br#"{"eventType":"ENTITLEMENT_CANCELLED","entitlement":{"id":"sub-1"}}"#,
        br#"{"eventType":"ENTITLEMENT_DELETED","entitlement":{"id":"sub-1"}}"#,
        br#"{"eventType":"ACCOUNT_DELETED","account":{"id":"acc-1"}}"#,
    ];

    for body in &bodies {
        assert_eq!(dispatch(&handler, body).await, Disposition::Ack);
    }

    let seen = handler.seen.lock().unwrap();
    assert_eq!(seen.len(), bodies.len());
    assert_eq!(seen[0].kind(), "ACCOUNT_ACTIVE");
    assert_eq!(seen[7].kind(), "ACCOUNT_DELETED");
}

#[tokio::test]
async fn undecodable_bodies_never_reach_the_handler() {
    let handler = CollectingHandler::default();

    for body in [
        &b"garbage"[..],
        &br#"{"eventType":"ENTITLEMENT_SOMETHING_NEW","entitlement":{"id":"sub-9"}}"#[..],
        &br#"{"entitlement":{"id":"sub-9"}}"#[..],
    ] {
        assert_eq!(dispatch(&handler, body).await, Disposition::Ack);
    }

    assert!(handler.seen.lock().unwrap().is_empty());
}

#[test]
fn decoded_outcomes_are_distinct() {
    assert!(matches!(
        decode(br#"{"eventType":"ACCOUNT_ACTIVE","account":{"id":"acc-1"}}"#),
        Decoded::Event(_)
    ));
    assert!(matches!(
        decode(br#"{"eventType":"ACCOUNT_SUSPENDED","account":{"id":"acc-1"}}"#),
        Decoded::Unrecognized { .. }
    ));
    assert!(matches!(decode(b"{"), Decoded::Malformed { .. }));
}
