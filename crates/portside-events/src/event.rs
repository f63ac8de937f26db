//! Typed lifecycle events and the message decoder.
//!
//! Inbound messages are JSON objects carrying an `eventType` (or an
//! `eventId` whose prefix names the type) plus a nested `account` or
//! `entitlement` object with the external id. The decoder maps each raw
//! body to exactly one [`Decoded`] outcome; unknown kinds and unparseable
//! bodies are explicit outcomes rather than errors, since neither can be
//! repaired by redelivery.

use portside_core::{EntitlementId, ProcurementAccountId};
use serde_json::Value;

/// A lifecycle event from the procurement feed.
///
/// Closed enum: every kind the reconciler understands has a variant, and
/// dispatch is an exhaustive match, so adding a kind without a handler does
/// not compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A customer account was created on the procurement side.
    AccountCreated {
        procurement_account_id: ProcurementAccountId,
    },
    /// A customer account was deleted; owned subscriptions go with it.
    AccountDeleted {
        procurement_account_id: ProcurementAccountId,
    },
    /// A customer requested a new entitlement.
    EntitlementCreationRequested { entitlement_id: EntitlementId },
    /// An entitlement became active on the procurement side.
    EntitlementActive { entitlement_id: EntitlementId },
    /// An entitlement was cancelled by the customer.
    EntitlementCancelled { entitlement_id: EntitlementId },
    /// An entitlement was deleted; terminal for the local row.
    EntitlementDeleted { entitlement_id: EntitlementId },
    /// A customer requested a plan change on an entitlement.
    EntitlementPlanChangeRequested {
        entitlement_id: EntitlementId,
        new_plan: String,
    },
    /// A previously requested plan change took effect.
    EntitlementPlanChanged { entitlement_id: EntitlementId },
}

impl LifecycleEvent {
    /// The wire name of this event's kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AccountCreated { .. } => "ACCOUNT_ACTIVE",
            Self::AccountDeleted { .. } => "ACCOUNT_DELETED",
            Self::EntitlementCreationRequested { .. } => "ENTITLEMENT_CREATION_REQUESTED",
            Self::EntitlementActive { .. } => "ENTITLEMENT_ACTIVE",
            Self::EntitlementCancelled { .. } => "ENTITLEMENT_CANCELLED",
            Self::EntitlementDeleted { .. } => "ENTITLEMENT_DELETED",
            Self::EntitlementPlanChangeRequested { .. } => "ENTITLEMENT_PLAN_CHANGE_REQUESTED",
            Self::EntitlementPlanChanged { .. } => "ENTITLEMENT_PLAN_CHANGED",
        }
    }
}

/// Outcome of decoding one raw message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A fully typed lifecycle event.
    Event(LifecycleEvent),
    /// The kind is not part of the reconciler's vocabulary. Acknowledged,
    /// logged so operators can detect producer/consumer drift.
    Unrecognized { event_type: String },
    /// The body could not be interpreted: unparseable JSON, wrong shape,
    /// or a recognized kind missing its required id.
    Malformed { reason: String },
}

/// Decode a raw message body into a [`Decoded`] outcome.
#[must_use]
pub fn decode(payload: &[u8]) -> Decoded {
    let value: Value = match serde_json::from_slice(payload) {
        Ok(value) => value,
        Err(e) => {
            return Decoded::Malformed {
                reason: format!("invalid JSON: {e}"),
            }
        }
    };

    let Some(body) = value.as_object() else {
        return Decoded::Malformed {
            reason: "top-level value is not an object".to_string(),
        };
    };

    // Prefer the explicit eventType; fall back to the kind prefix of
    // eventId (e.g. "ENTITLEMENT_ACTIVE-1234").
    let event_type = body
        .get("eventType")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            body.get("eventId")
                .and_then(Value::as_str)
                .and_then(|id| id.split('-').next())
                .map(str::to_string)
        });

    let Some(event_type) = event_type else {
        return Decoded::Malformed {
            reason: "missing eventType and eventId".to_string(),
        };
    };

    match event_type.as_str() {
        "ACCOUNT_ACTIVE" => match nested_id(body, "account") {
            Some(id) => Decoded::Event(LifecycleEvent::AccountCreated {
                procurement_account_id: ProcurementAccountId::new(id),
            }),
            None => missing_id(&event_type, "account"),
        },
        "ACCOUNT_DELETED" => match nested_id(body, "account") {
            Some(id) => Decoded::Event(LifecycleEvent::AccountDeleted {
                procurement_account_id: ProcurementAccountId::new(id),
            }),
            None => missing_id(&event_type, "account"),
        },
        "ENTITLEMENT_CREATION_REQUESTED" => match nested_id(body, "entitlement") {
            Some(id) => Decoded::Event(LifecycleEvent::EntitlementCreationRequested {
                entitlement_id: EntitlementId::new(id),
            }),
            None => missing_id(&event_type, "entitlement"),
        },
        "ENTITLEMENT_ACTIVE" => match nested_id(body, "entitlement") {
            Some(id) => Decoded::Event(LifecycleEvent::EntitlementActive {
                entitlement_id: EntitlementId::new(id),
            }),
            None => missing_id(&event_type, "entitlement"),
        },
        "ENTITLEMENT_CANCELLED" => match nested_id(body, "entitlement") {
            Some(id) => Decoded::Event(LifecycleEvent::EntitlementCancelled {
                entitlement_id: EntitlementId::new(id),
            }),
            None => missing_id(&event_type, "entitlement"),
        },
        "ENTITLEMENT_DELETED" => match nested_id(body, "entitlement") {
            Some(id) => Decoded::Event(LifecycleEvent::EntitlementDeleted {
                entitlement_id: EntitlementId::new(id),
            }),
            None => missing_id(&event_type, "entitlement"),
        },
        "ENTITLEMENT_PLAN_CHANGE_REQUESTED" => {
            let Some(id) = nested_id(body, "entitlement") else {
                return missing_id(&event_type, "entitlement");
            };
            let new_plan = body
                .get("entitlement")
                .and_then(|e| e.get("newPlan"))
                .and_then(Value::as_str);
            match new_plan {
                Some(new_plan) => Decoded::Event(LifecycleEvent::EntitlementPlanChangeRequested {
                    entitlement_id: EntitlementId::new(id),
                    new_plan: new_plan.to_string(),
                }),
                None => Decoded::Malformed {
                    reason: format!("{event_type}: missing entitlement.newPlan"),
                },
            }
        }
        "ENTITLEMENT_PLAN_CHANGED" => match nested_id(body, "entitlement") {
            Some(id) => Decoded::Event(LifecycleEvent::EntitlementPlanChanged {
                entitlement_id: EntitlementId::new(id),
            }),
            None => missing_id(&event_type, "entitlement"),
        },
        _ => Decoded::Unrecognized { event_type },
    }
}

fn nested_id<'a>(body: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    body.get(key)?.get("id")?.as_str().filter(|id| !id.is_empty())
}

fn missing_id(event_type: &str, key: &str) -> Decoded {
    Decoded::Malformed {
        reason: format!("{event_type}: missing {key}.id"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_entitlement_creation_requested() {
        let raw = br#"{"eventType":"ENTITLEMENT_CREATION_REQUESTED","entitlement":{"id":"sub-1"}}"#;
        assert_eq!(
            decode(raw),
            Decoded::Event(LifecycleEvent::EntitlementCreationRequested {
                entitlement_id: EntitlementId::new("sub-1"),
            })
        );
    }

    #[test]
    fn decodes_account_created_from_account_active() {
        let raw = br#"{"eventType":"ACCOUNT_ACTIVE","account":{"id":"acc-1"}}"#;
        assert_eq!(
            decode(raw),
            Decoded::Event(LifecycleEvent::AccountCreated {
                procurement_account_id: ProcurementAccountId::new("acc-1"),
            })
        );
    }

    #[test]
    fn falls_back_to_event_id_prefix() {
        let raw = br#"{"eventId":"ENTITLEMENT_ACTIVE-8467","entitlement":{"id":"sub-2"}}"#;
        assert_eq!(
            decode(raw),
            Decoded::Event(LifecycleEvent::EntitlementActive {
                entitlement_id: EntitlementId::new("sub-2"),
            })
        );
    }

    #[test]
    fn plan_change_requires_new_plan() {
        let raw = br#"{"eventType":"ENTITLEMENT_PLAN_CHANGE_REQUESTED","entitlement":{"id":"sub-3"}}"#;
        assert!(matches!(decode(raw), Decoded::Malformed { .. }));

        let raw = br#"{"eventType":"ENTITLEMENT_PLAN_CHANGE_REQUESTED","entitlement":{"id":"sub-3","newPlan":"plan-b"}}"#;
        assert_eq!(
            decode(raw),
            Decoded::Event(LifecycleEvent::EntitlementPlanChangeRequested {
                entitlement_id: EntitlementId::new("sub-3"),
                new_plan: "plan-b".to_string(),
            })
        );
    }

    #[test]
    fn unknown_kind_is_unrecognized_not_malformed() {
        let raw = br#"{"eventType":"ENTITLEMENT_OFFER_ACCEPTED","entitlement":{"id":"sub-4"}}"#;
        assert_eq!(
            decode(raw),
            Decoded::Unrecognized {
                event_type: "ENTITLEMENT_OFFER_ACCEPTED".to_string(),
            }
        );
    }

    #[test]
    fn garbage_and_missing_ids_are_malformed() {
        assert!(matches!(decode(b"not json"), Decoded::Malformed { .. }));
        assert!(matches!(decode(b"[1,2,3]"), Decoded::Malformed { .. }));
        assert!(matches!(decode(b"{}"), Decoded::Malformed { .. }));

        let raw = br#"{"eventType":"ENTITLEMENT_ACTIVE","entitlement":{}}"#;
        assert!(matches!(decode(raw), Decoded::Malformed { .. }));

        let raw = br#"{"eventType":"ACCOUNT_DELETED","account":{"id":""}}"#;
        assert!(matches!(decode(raw), Decoded::Malformed { .. }));
    }
}
