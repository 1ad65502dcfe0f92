//! Port traits: the seams between the engine and the outside world.
//!
//! Production implementations live in the adapter crates; tests inject
//! in-memory doubles. Every operation may block on network I/O and is
//! cancelled by dropping its future.

use async_trait::async_trait;

use dirsync_model::{GroupsMembersResult, GroupsResult, MembersResult, State, UsersResult};

use crate::error::{PortError, StateError};

/// Read-side port to the upstream identity provider.
///
/// The filter is an ordered list of provider-specific query strings passed
/// through opaquely; empty means "all".
#[async_trait]
pub trait IdentityProviderService: Send + Sync {
    /// Groups matching the filter, de-duplicated by name (first wins).
    async fn get_groups(&self, filter: &[String]) -> Result<GroupsResult, PortError>;

    /// Users matching the filter, with `suspended` mapped to `!active`.
    async fn get_users(&self, filter: &[String]) -> Result<UsersResult, PortError>;

    /// Members of one group, expanded through nested groups; entries of type
    /// `GROUP` are dropped.
    async fn get_group_members(&self, group_ipid: &str) -> Result<MembersResult, PortError>;

    /// One `GroupMembers` per group, with the aggregate hash computed.
    async fn get_groups_members(
        &self,
        groups: &GroupsResult,
    ) -> Result<GroupsMembersResult, PortError>;

    /// Full user records for every distinct member email across all groups.
    async fn get_users_by_groups_members(
        &self,
        groups_members: &GroupsMembersResult,
    ) -> Result<UsersResult, PortError>;
}

/// Read/write port to the downstream SCIM endpoint.
///
/// The port hides paging, SCIM verbs, and the per-request member-patch cap.
/// Creation is create-or-fetch: a uniqueness conflict resolves to the
/// existing record instead of failing, which makes partial prior runs safe.
#[async_trait]
pub trait ScimService: Send + Sync {
    async fn get_groups(&self) -> Result<GroupsResult, PortError>;

    async fn get_users(&self) -> Result<UsersResult, PortError>;

    /// Create (or fetch, on conflict) each group; the returned result carries
    /// the downstream identifiers.
    async fn create_groups(&self, groups: &GroupsResult) -> Result<GroupsResult, PortError>;

    async fn update_groups(&self, groups: &GroupsResult) -> Result<GroupsResult, PortError>;

    async fn delete_groups(&self, groups: &GroupsResult) -> Result<(), PortError>;

    /// Create (or fetch, on conflict) each user; the returned result carries
    /// the downstream identifiers.
    async fn create_users(&self, users: &UsersResult) -> Result<UsersResult, PortError>;

    async fn update_users(&self, users: &UsersResult) -> Result<UsersResult, PortError>;

    async fn delete_users(&self, users: &UsersResult) -> Result<(), PortError>;

    /// Add the given members to their groups, chunking patch requests at the
    /// downstream's per-request cap.
    async fn create_groups_members(
        &self,
        groups_members: &GroupsMembersResult,
    ) -> Result<GroupsMembersResult, PortError>;

    /// Remove the given members from their groups.
    async fn delete_groups_members(
        &self,
        groups_members: &GroupsMembersResult,
    ) -> Result<(), PortError>;

    /// Probe membership one (group, user) pair at a time.
    ///
    /// The downstream cannot list group members, so when no trustworthy state
    /// exists the engine falls back to filtered list queries per pair. This
    /// is the expensive path; persisted state exists to avoid it.
    async fn get_groups_members_brute_force(
        &self,
        groups: &GroupsResult,
        users: &UsersResult,
    ) -> Result<GroupsMembersResult, PortError>;
}

/// Persistence port for the state document.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Load the previous state; `StateError::NotFound` when none exists.
    async fn get_state(&self) -> Result<State, StateError>;

    /// Replace the state document atomically.
    async fn set_state(&self, state: &State) -> Result<(), StateError>;
}
