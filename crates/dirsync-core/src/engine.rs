//! The reconciliation engine.
//!
//! One public operation, [`SyncService::sync_groups_and_their_members`],
//! dispatches between two strategies:
//!
//! - **first run** (no usable previous state): reconcile the upstream view
//!   against a full downstream listing, probing memberships pair-by-pair
//!   because the downstream cannot list group members;
//! - **incremental** (previous state loaded): compare aggregate hashes per
//!   axis and diff only the axes that changed, against the state snapshot
//!   that already carries every downstream identifier.
//!
//! Operations are applied in referential-safety order: create users, create
//! groups, update users, update groups, add memberships, remove memberships,
//! delete groups, delete users. The engine aborts on the first hard error
//! and persists state only after a fully-applied run.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use dirsync_model::{GroupsMembersResult, GroupsResult, State, UsersResult};

use crate::error::{SyncError, SyncResult};
use crate::ops::{self, GroupsOperations, MembersOperations, UsersOperations};
use crate::ports::{IdentityProviderService, ScimService, StateRepository};

const CODE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Counters describing what a run changed downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub users_created: usize,
    pub users_updated: usize,
    pub users_deleted: usize,
    pub groups_created: usize,
    pub groups_updated: usize,
    pub groups_deleted: usize,
    pub memberships_added: usize,
    pub memberships_removed: usize,
    /// True when every aggregate hash matched the previous state and the run
    /// ended without a single downstream call or state write.
    pub short_circuited: bool,
}

impl SyncOutcome {
    /// True when the run performed no downstream writes.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.users_created == 0
            && self.users_updated == 0
            && self.users_deleted == 0
            && self.groups_created == 0
            && self.groups_updated == 0
            && self.groups_deleted == 0
            && self.memberships_added == 0
            && self.memberships_removed == 0
    }
}

/// Orchestrates one full reconciliation run over the three injected ports.
pub struct SyncService<I, S, R> {
    provider: I,
    scim: S,
    repo: R,
    filter: Vec<String>,
    cancel: CancellationToken,
}

impl<I, S, R> SyncService<I, S, R>
where
    I: IdentityProviderService,
    S: ScimService,
    R: StateRepository,
{
    pub fn new(provider: I, scim: S, repo: R) -> Self {
        Self {
            provider,
            scim,
            repo,
            filter: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Provider-specific query strings forwarded opaquely to the upstream.
    #[must_use]
    pub fn with_filter(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Token checked between port calls and apply steps; cancelling aborts
    /// the run without a state write.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Synchronize groups, their members, and the users reachable from them.
    pub async fn sync_groups_and_their_members(&self) -> SyncResult<SyncOutcome> {
        info!(filter = ?self.filter, "starting groups and members sync");

        let idp_groups = self
            .provider
            .get_groups(&self.filter)
            .await
            .map_err(SyncError::IdentityProvider)?;
        self.ensure_active()?;

        let idp_groups_members = self
            .provider
            .get_groups_members(&idp_groups)
            .await
            .map_err(SyncError::IdentityProvider)?;
        self.ensure_active()?;

        let idp_users = self
            .provider
            .get_users_by_groups_members(&idp_groups_members)
            .await
            .map_err(SyncError::IdentityProvider)?;
        self.ensure_active()?;

        debug!(
            groups = idp_groups.items,
            users = idp_users.items,
            "fetched upstream view"
        );

        let outcome = match self.load_state().await {
            Some(state) if !state.is_initial() => {
                self.sync_from_state(&idp_groups, &idp_groups_members, &idp_users, &state)
                    .await?
            }
            _ => {
                self.sync_from_scratch(&idp_groups, &idp_groups_members, &idp_users)
                    .await?
            }
        };

        info!(
            users_created = outcome.users_created,
            users_updated = outcome.users_updated,
            users_deleted = outcome.users_deleted,
            groups_created = outcome.groups_created,
            groups_updated = outcome.groups_updated,
            groups_deleted = outcome.groups_deleted,
            memberships_added = outcome.memberships_added,
            memberships_removed = outcome.memberships_removed,
            short_circuited = outcome.short_circuited,
            "sync finished"
        );

        Ok(outcome)
    }

    /// First-run strategy: no trustworthy state, so downstream identifiers
    /// are reconciled from a full SCIM listing and memberships from the
    /// pair-by-pair probe.
    async fn sync_from_scratch(
        &self,
        idp_groups: &GroupsResult,
        idp_groups_members: &GroupsMembersResult,
        idp_users: &UsersResult,
    ) -> SyncResult<SyncOutcome> {
        warn!("no usable previous state, reconciling against the downstream listing");

        let scim_groups = self.scim.get_groups().await.map_err(SyncError::Scim)?;
        self.ensure_active()?;
        let scim_users = self.scim.get_users().await.map_err(SyncError::Scim)?;
        self.ensure_active()?;

        let group_ops = ops::groups_operations(idp_groups, &scim_groups);
        let user_ops = ops::users_operations(idp_users, &scim_users);

        let mut outcome = SyncOutcome::default();
        let (total_groups, total_users) = self
            .apply_creates_and_updates(&group_ops, &user_ops, &mut outcome)
            .await?;

        let scim_groups_members = self
            .scim
            .get_groups_members_brute_force(&total_groups, &total_users)
            .await
            .map_err(SyncError::Scim)?;
        self.ensure_active()?;

        let snapshot =
            ops::update_groups_members_scimids(idp_groups_members, &total_groups, &total_users);
        let member_ops = ops::members_operations(&snapshot, &scim_groups_members);

        self.apply_membership_changes(&member_ops, &mut outcome)
            .await?;
        self.apply_deletes(&group_ops, &user_ops, &mut outcome)
            .await?;
        self.persist(total_groups, total_users, snapshot).await?;

        Ok(outcome)
    }

    /// Incremental strategy: diff each changed axis against the previous
    /// state, which already carries the downstream identifiers.
    async fn sync_from_state(
        &self,
        idp_groups: &GroupsResult,
        idp_groups_members: &GroupsMembersResult,
        idp_users: &UsersResult,
        state: &State,
    ) -> SyncResult<SyncOutcome> {
        info!(last_sync_time = %state.last_sync_time, "previous state loaded");

        let groups_changed = idp_groups.hash_code != state.resources.groups.hash_code;
        let users_changed = idp_users.hash_code != state.resources.users.hash_code;
        let members_changed =
            idp_groups_members.hash_code != state.resources.groups_members.hash_code;

        if !groups_changed && !users_changed && !members_changed {
            info!("upstream unchanged since the last run, nothing to do");
            return Ok(SyncOutcome {
                short_circuited: true,
                ..SyncOutcome::default()
            });
        }

        let group_ops = if groups_changed {
            ops::groups_operations(idp_groups, &state.resources.groups)
        } else {
            debug!("groups unchanged, skipping group diff");
            GroupsOperations {
                equal: state.resources.groups.clone(),
                ..GroupsOperations::default()
            }
        };

        let user_ops = if users_changed {
            ops::users_operations(idp_users, &state.resources.users)
        } else {
            debug!("users unchanged, skipping user diff");
            UsersOperations {
                equal: state.resources.users.clone(),
                ..UsersOperations::default()
            }
        };

        let mut outcome = SyncOutcome::default();
        let (total_groups, total_users) = self
            .apply_creates_and_updates(&group_ops, &user_ops, &mut outcome)
            .await?;

        let snapshot = if members_changed {
            let snapshot =
                ops::update_groups_members_scimids(idp_groups_members, &total_groups, &total_users);
            let member_ops = ops::members_operations(&snapshot, &state.resources.groups_members);
            self.apply_membership_changes(&member_ops, &mut outcome)
                .await?;
            snapshot
        } else {
            debug!("group memberships unchanged, skipping membership diff");
            state.resources.groups_members.clone()
        };

        self.apply_deletes(&group_ops, &user_ops, &mut outcome)
            .await?;
        self.persist(total_groups, total_users, snapshot).await?;

        Ok(outcome)
    }

    /// Steps 1–4: create users, create groups, update users, update groups.
    ///
    /// Returns the merged (created ∪ updated ∪ equal) totals, which carry a
    /// downstream identifier for every surviving entity.
    async fn apply_creates_and_updates(
        &self,
        group_ops: &GroupsOperations,
        user_ops: &UsersOperations,
        outcome: &mut SyncOutcome,
    ) -> SyncResult<(GroupsResult, UsersResult)> {
        let created_users = if user_ops.create.is_empty() {
            UsersResult::new(Vec::new())
        } else {
            info!(users = user_ops.create.items, "creating users");
            let created = self
                .scim
                .create_users(&user_ops.create)
                .await
                .map_err(SyncError::Scim)?;
            outcome.users_created = created.items;
            created
        };
        self.ensure_active()?;

        let created_groups = if group_ops.create.is_empty() {
            GroupsResult::new(Vec::new())
        } else {
            info!(groups = group_ops.create.items, "creating groups");
            let created = self
                .scim
                .create_groups(&group_ops.create)
                .await
                .map_err(SyncError::Scim)?;
            outcome.groups_created = created.items;
            created
        };
        self.ensure_active()?;

        let updated_users = if user_ops.update.is_empty() {
            UsersResult::new(Vec::new())
        } else {
            require_user_scimids(&user_ops.update)?;
            info!(users = user_ops.update.items, "updating users");
            let updated = self
                .scim
                .update_users(&user_ops.update)
                .await
                .map_err(SyncError::Scim)?;
            outcome.users_updated = updated.items;
            updated
        };
        self.ensure_active()?;

        let updated_groups = if group_ops.update.is_empty() {
            GroupsResult::new(Vec::new())
        } else {
            require_group_scimids(&group_ops.update)?;
            info!(groups = group_ops.update.items, "updating groups");
            let updated = self
                .scim
                .update_groups(&group_ops.update)
                .await
                .map_err(SyncError::Scim)?;
            outcome.groups_updated = updated.items;
            updated
        };
        self.ensure_active()?;

        let total_groups = GroupsResult::merge(&[&created_groups, &updated_groups, &group_ops.equal]);
        let total_users = UsersResult::merge(&[&created_users, &updated_users, &user_ops.equal]);
        Ok((total_groups, total_users))
    }

    /// Steps 5–6: add memberships, then remove the ones that disappeared.
    async fn apply_membership_changes(
        &self,
        member_ops: &MembersOperations,
        outcome: &mut SyncOutcome,
    ) -> SyncResult<()> {
        if !member_ops.create.is_empty() {
            info!(groups = member_ops.create.items, "adding group members");
            let added = self
                .scim
                .create_groups_members(&member_ops.create)
                .await
                .map_err(SyncError::Scim)?;
            outcome.memberships_added = added.resources.iter().map(|gm| gm.resources.len()).sum();
        }
        self.ensure_active()?;

        if !member_ops.delete.is_empty() {
            info!(groups = member_ops.delete.items, "removing group members");
            self.scim
                .delete_groups_members(&member_ops.delete)
                .await
                .map_err(SyncError::Scim)?;
            outcome.memberships_removed = member_ops
                .delete
                .resources
                .iter()
                .map(|gm| gm.resources.len())
                .sum();
        }
        self.ensure_active()?;

        Ok(())
    }

    /// Steps 7–8: delete groups (memberships go with them), then users.
    async fn apply_deletes(
        &self,
        group_ops: &GroupsOperations,
        user_ops: &UsersOperations,
        outcome: &mut SyncOutcome,
    ) -> SyncResult<()> {
        if !group_ops.delete.is_empty() {
            info!(groups = group_ops.delete.items, "deleting groups");
            self.scim
                .delete_groups(&group_ops.delete)
                .await
                .map_err(SyncError::Scim)?;
            outcome.groups_deleted = group_ops.delete.items;
        }
        self.ensure_active()?;

        if !user_ops.delete.is_empty() {
            info!(users = user_ops.delete.items, "deleting users");
            self.scim
                .delete_users(&user_ops.delete)
                .await
                .map_err(SyncError::Scim)?;
            outcome.users_deleted = user_ops.delete.items;
        }
        self.ensure_active()?;

        Ok(())
    }

    async fn persist(
        &self,
        groups: GroupsResult,
        users: UsersResult,
        groups_members: GroupsMembersResult,
    ) -> SyncResult<()> {
        self.ensure_active()?;

        let state = State::new(
            CODE_VERSION,
            Utc::now().to_rfc3339(),
            groups,
            users,
            groups_members,
        );
        self.repo.set_state(&state).await?;

        info!(hash_code = %state.hash_code, "state persisted");
        Ok(())
    }

    /// Read failures other than NotFound degrade to the first-run strategy;
    /// the downstream listing is then the source of truth for identifiers.
    async fn load_state(&self) -> Option<State> {
        match self.repo.get_state().await {
            Ok(state) => Some(state),
            Err(crate::error::StateError::NotFound) => {
                info!("no previous state found");
                None
            }
            Err(err) => {
                warn!(error = %err, "could not read previous state, treating as first run");
                None
            }
        }
    }

    fn ensure_active(&self) -> SyncResult<()> {
        if self.cancel.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }
}

fn require_user_scimids(users: &UsersResult) -> SyncResult<()> {
    for user in &users.resources {
        if user.scimid.is_empty() {
            return Err(SyncError::DataInvariant(format!(
                "user update for '{}' carries no downstream id",
                user.key()
            )));
        }
    }
    Ok(())
}

fn require_group_scimids(groups: &GroupsResult) -> SyncResult<()> {
    for group in &groups.resources {
        if group.scimid.is_empty() {
            return Err(SyncError::DataInvariant(format!(
                "group update for '{}' carries no downstream id",
                group.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_noop_detection() {
        let outcome = SyncOutcome::default();
        assert!(outcome.is_noop());

        let outcome = SyncOutcome {
            users_created: 1,
            ..SyncOutcome::default()
        };
        assert!(!outcome.is_noop());
    }

    #[test]
    fn short_circuit_outcome_is_noop() {
        let outcome = SyncOutcome {
            short_circuited: true,
            ..SyncOutcome::default()
        };
        assert!(outcome.is_noop());
    }
}
