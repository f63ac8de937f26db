//! # portside-db
//!
//! Postgres persistence layer for the marketplace integration.
//!
//! Owns the two durable entities, accounts and subscriptions, plus pool
//! bootstrap and embedded migrations. Query functions are generic over
//! [`sqlx::PgExecutor`] so a caller can run them against the pool directly
//! or inside a transaction it controls.

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::account::{Account, AccountStatus};
pub use models::subscription::{Subscription, SubscriptionStatus, UpsertSubscription};
pub use pool::connect;
