//! SCIM 2.0 adapter.
//!
//! Translates model entities to and from SCIM Core/Enterprise wire payloads
//! and implements the SCIM port on top of an HTTP client that hides paging,
//! create-or-get conflict resolution, and the downstream's per-request cap on
//! group-member patch operations.

pub mod client;
pub mod error;
pub mod provider;
pub mod types;

pub use client::ScimClient;
pub use error::{ScimError, ScimResult};
pub use provider::{ScimProvider, MAX_PATCH_GROUP_MEMBERS_PER_REQUEST};
