//! Google Workspace Directory adapter.
//!
//! Translates Admin SDK Directory payloads into the dirsync entity model and
//! implements the identity-provider port on top of a paginated HTTP client.
//! Credential acquisition stays outside this crate: the client is handed an
//! [`auth::AccessTokenProvider`] and never learns how tokens are minted.

pub mod auth;
pub mod directory;
pub mod error;
pub mod provider;
mod types;

pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use directory::{DirectoryClient, DirectoryService};
pub use error::{GoogleError, GoogleResult};
pub use provider::GoogleIdentityProvider;
pub use types::{
    DirectoryEmail, DirectoryGroup, DirectoryMember, DirectoryOrganization, DirectoryUser,
};
