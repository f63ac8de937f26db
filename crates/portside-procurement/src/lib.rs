//! # portside-procurement
//!
//! Outbound client for the procurement service's approval surface.
//!
//! The reconciler and the synchronous approval API both talk to the
//! procurement service through the [`ProcurementGateway`] trait, so tests
//! substitute a fake and production wires in the HTTP client.

pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::HttpProcurementClient;
pub use error::ProcurementError;
pub use traits::ProcurementGateway;
pub use types::EntitlementDetails;
