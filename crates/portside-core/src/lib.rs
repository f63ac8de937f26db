//! # portside-core
//!
//! Shared building blocks for the portside marketplace integration:
//! strongly typed identifiers and helpers for the procurement service's
//! resource-name format.

pub mod ids;
pub mod resource;

pub use ids::{EntitlementId, InternalAccountId, ProcurementAccountId};
pub use resource::last_segment;
