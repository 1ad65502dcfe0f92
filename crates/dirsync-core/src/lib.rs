//! Reconciliation core for dirsync.
//!
//! This crate owns the state-driven differencing algorithm: it fetches the
//! authoritative upstream view through the identity-provider port, loads the
//! previous run's state, computes minimal create/update/delete operation sets
//! for users, groups, and group memberships, applies them through the SCIM
//! port in referential-safety order, and persists the new state.
//!
//! The ports are trait seams; production adapters live in `dirsync-google`,
//! `dirsync-scim`, and `dirsync-state`, and tests inject in-memory doubles.

pub mod engine;
pub mod error;
pub mod ops;
pub mod ports;

pub use engine::{SyncOutcome, SyncService};
pub use error::{PortError, StateError, SyncError, SyncResult};
pub use ports::{IdentityProviderService, ScimService, StateRepository};
