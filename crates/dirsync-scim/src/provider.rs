//! SCIM port implementation over the HTTP client.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use dirsync_core::{PortError, ScimService};
use dirsync_model::{
    Group, GroupMembers, GroupsMembersResult, GroupsResult, Member, UsersResult,
};

use crate::client::ScimClient;
use crate::types::{PatchOp, PatchOperation, PatchValue, ScimGroup, ScimUser};

/// The downstream caps member operations per patch request; larger member
/// lists are split into consecutive requests in input order.
pub const MAX_PATCH_GROUP_MEMBERS_PER_REQUEST: usize = 100;

/// SCIM port adapter for an AWS IAM Identity Center-style endpoint.
pub struct ScimProvider {
    client: ScimClient,
}

impl ScimProvider {
    pub fn new(client: ScimClient) -> Self {
        Self { client }
    }

    /// Resolve the downstream id for each member, looking up by
    /// `userName = email` when the record carries none.
    async fn resolve_member_ids(&self, members: &[Member]) -> Result<Vec<Member>, PortError> {
        let mut resolved = Vec::with_capacity(members.len());
        for member in members {
            let mut member = member.clone();
            if member.scimid.is_empty() {
                let user = self
                    .client
                    .get_user_by_user_name(&member.email)
                    .await
                    .map_err(PortError::from)?;
                member.scimid = user.id.unwrap_or_default();
                member.set_hash_code();
            }
            resolved.push(member);
        }
        Ok(resolved)
    }

    /// Send one `add`/`remove` members patch per chunk of the cap size.
    async fn patch_members(
        &self,
        op: &str,
        group: &Group,
        members: &[Member],
    ) -> Result<(), PortError> {
        let values: Vec<PatchValue> = members
            .iter()
            .map(|m| PatchValue {
                value: m.scimid.clone(),
            })
            .collect();

        let chunks: Vec<&[PatchValue]> = values.chunks(MAX_PATCH_GROUP_MEMBERS_PER_REQUEST).collect();
        if chunks.len() > 1 {
            warn!(
                group = %group.name,
                members = values.len(),
                requests = chunks.len(),
                max_members_per_request = MAX_PATCH_GROUP_MEMBERS_PER_REQUEST,
                "member list exceeds the per-request cap, sending multiple patches"
            );
        }

        for chunk in chunks {
            let patch = PatchOp::new(vec![PatchOperation {
                op: op.to_string(),
                path: Some("members".to_string()),
                value: json!(chunk),
            }]);
            self.client
                .patch_group(&group.scimid, &patch)
                .await
                .map_err(PortError::from)?;
        }

        Ok(())
    }
}

#[async_trait]
impl ScimService for ScimProvider {
    async fn get_groups(&self) -> Result<GroupsResult, PortError> {
        let response = self.client.list_groups(None).await.map_err(PortError::from)?;

        let groups = response
            .resources
            .into_iter()
            .map(|g| {
                Group::builder()
                    .with_scimid(g.id.unwrap_or_default())
                    .with_name(g.display_name)
                    .with_ipid(g.external_id.unwrap_or_default())
                    .build()
            })
            .collect();

        let result = GroupsResult::new(groups);
        debug!(groups = result.items, "listed downstream groups");
        Ok(result)
    }

    async fn get_users(&self) -> Result<UsersResult, PortError> {
        let response = self.client.list_users(None).await.map_err(PortError::from)?;

        let users = response
            .resources
            .into_iter()
            .map(ScimUser::into_model)
            .collect();

        let result = UsersResult::new(users);
        debug!(users = result.items, "listed downstream users");
        Ok(result)
    }

    async fn create_groups(&self, groups: &GroupsResult) -> Result<GroupsResult, PortError> {
        let mut created = Vec::with_capacity(groups.resources.len());

        for group in &groups.resources {
            warn!(group = %group.name, "creating group");

            let request = ScimGroup::new(&group.name, &group.ipid);
            let response = self
                .client
                .create_or_get_group(&request)
                .await
                .map_err(PortError::from)?;

            created.push(
                Group::builder()
                    .with_scimid(response.id.unwrap_or_default())
                    .with_name(&group.name)
                    .with_ipid(&group.ipid)
                    .with_email(&group.email)
                    .build(),
            );
        }

        debug!(groups = created.len(), "created groups");
        Ok(GroupsResult::new(created))
    }

    async fn update_groups(&self, groups: &GroupsResult) -> Result<GroupsResult, PortError> {
        let mut updated = Vec::with_capacity(groups.resources.len());

        for group in &groups.resources {
            warn!(group = %group.name, email = %group.email, "updating group");

            let patch = PatchOp::new(vec![PatchOperation {
                op: "replace".to_string(),
                path: None,
                value: json!({
                    "id": group.scimid,
                    "externalId": group.ipid,
                }),
            }]);
            self.client
                .patch_group(&group.scimid, &patch)
                .await
                .map_err(PortError::from)?;

            updated.push(group.clone());
        }

        debug!(groups = updated.len(), "updated groups");
        Ok(GroupsResult::new(updated))
    }

    async fn delete_groups(&self, groups: &GroupsResult) -> Result<(), PortError> {
        for group in &groups.resources {
            warn!(group = %group.name, email = %group.email, "deleting group");
            self.client
                .delete_group(&group.scimid)
                .await
                .map_err(PortError::from)?;
        }
        Ok(())
    }

    async fn create_users(&self, users: &UsersResult) -> Result<UsersResult, PortError> {
        let mut created = Vec::with_capacity(users.resources.len());

        for user in &users.resources {
            warn!(
                user = %user.display_name,
                email = user.primary_email_address().unwrap_or_default(),
                "creating user"
            );

            let request = ScimUser::from_model(user);
            let response = self
                .client
                .create_or_get_user(&request)
                .await
                .map_err(PortError::from)?;

            let mut user = user.clone();
            user.scimid = response.id.unwrap_or_default();
            user.set_hash_code();
            created.push(user);
        }

        debug!(users = created.len(), "created users");
        Ok(UsersResult::new(created))
    }

    async fn update_users(&self, users: &UsersResult) -> Result<UsersResult, PortError> {
        let mut updated = Vec::with_capacity(users.resources.len());

        for user in &users.resources {
            if user.scimid.is_empty() {
                return Err(PortError::rejected(format!(
                    "cannot update user '{}': empty downstream id",
                    user.user_name
                )));
            }

            warn!(
                user = %user.display_name,
                email = user.primary_email_address().unwrap_or_default(),
                "updating user"
            );

            let request = ScimUser::from_model(user);
            let response = self
                .client
                .put_user(&user.scimid, &request)
                .await
                .map_err(PortError::from)?;

            let mut user = user.clone();
            user.scimid = response.id.unwrap_or_default();
            user.set_hash_code();
            updated.push(user);
        }

        debug!(users = updated.len(), "updated users");
        Ok(UsersResult::new(updated))
    }

    async fn delete_users(&self, users: &UsersResult) -> Result<(), PortError> {
        for user in &users.resources {
            warn!(
                user = %user.display_name,
                email = user.primary_email_address().unwrap_or_default(),
                "deleting user"
            );
            self.client
                .delete_user(&user.scimid)
                .await
                .map_err(PortError::from)?;
        }
        Ok(())
    }

    async fn create_groups_members(
        &self,
        groups_members: &GroupsMembersResult,
    ) -> Result<GroupsMembersResult, PortError> {
        let mut applied = Vec::with_capacity(groups_members.resources.len());

        for group_members in &groups_members.resources {
            let members = self.resolve_member_ids(&group_members.resources).await?;

            for member in &members {
                warn!(
                    group = %group_members.group.name,
                    email = %member.email,
                    "adding member to group"
                );
            }

            self.patch_members("add", &group_members.group, &members)
                .await?;

            applied.push(
                GroupMembers::builder()
                    .with_group(group_members.group.clone())
                    .with_resources(members)
                    .build(),
            );
        }

        debug!(groups = applied.len(), "added group members");
        Ok(GroupsMembersResult::new(applied))
    }

    async fn delete_groups_members(
        &self,
        groups_members: &GroupsMembersResult,
    ) -> Result<(), PortError> {
        for group_members in &groups_members.resources {
            for member in &group_members.resources {
                warn!(
                    group = %group_members.group.name,
                    email = %member.email,
                    "removing member from group"
                );
            }

            self.patch_members("remove", &group_members.group, &group_members.resources)
                .await?;
        }
        Ok(())
    }

    async fn get_groups_members_brute_force(
        &self,
        groups: &GroupsResult,
        users: &UsersResult,
    ) -> Result<GroupsMembersResult, PortError> {
        let mut groups_members = Vec::with_capacity(groups.resources.len());

        // the endpoint cannot list a group's members, so probe every
        // (group, user) pair with a filtered query
        for group in &groups.resources {
            let mut members = Vec::new();

            for user in &users.resources {
                let filter = format!(
                    "id eq \"{}\" and members eq \"{}\"",
                    group.scimid, user.scimid
                );
                let response = self
                    .client
                    .list_groups(Some(&filter))
                    .await
                    .map_err(PortError::from)?;

                // a match reports totalResults > 0 without materializing the
                // member in the response body
                if response.total_results > 0 {
                    let mut builder = Member::builder()
                        .with_ipid(&user.ipid)
                        .with_scimid(&user.scimid)
                        .with_email(user.key());
                    if user.active {
                        builder = builder.with_status("ACTIVE");
                    }
                    members.push(builder.build());
                }
            }

            groups_members.push(
                GroupMembers::builder()
                    .with_group(group.clone())
                    .with_resources(members)
                    .build(),
            );
        }

        let result = GroupsMembersResult::new(groups_members);
        debug!(groups = result.items, "probed downstream memberships");
        Ok(result)
    }
}
