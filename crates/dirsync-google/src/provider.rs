//! Identity-provider port implementation over the Directory service.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, warn};

use dirsync_core::{IdentityProviderService, PortError};
use dirsync_model::{
    Email, EnterpriseData, Group, GroupMembers, GroupsMembersResult, GroupsResult, Manager, Member,
    MembersResult, Name, User, UsersResult,
};

use crate::directory::DirectoryService;
use crate::types::DirectoryUser;

/// Translates Directory payloads into model entities, applying the ingest
/// rules: group names de-duplicated (first occurrence wins), nested-group
/// members dropped, `suspended` mapped to `!active`.
pub struct GoogleIdentityProvider<D> {
    directory: D,
}

impl<D: DirectoryService> GoogleIdentityProvider<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl<D: DirectoryService> IdentityProviderService for GoogleIdentityProvider<D> {
    async fn get_groups(&self, filter: &[String]) -> Result<GroupsResult, PortError> {
        let directory_groups = self.directory.list_groups(filter).await?;

        let mut seen = HashSet::with_capacity(directory_groups.len());
        let mut groups = Vec::with_capacity(directory_groups.len());
        for group in directory_groups {
            if seen.insert(group.name.clone()) {
                groups.push(
                    Group::builder()
                        .with_ipid(group.id)
                        .with_name(group.name)
                        .with_email(group.email)
                        .build(),
                );
            } else {
                warn!(
                    id = %group.id,
                    name = %group.name,
                    email = %group.email,
                    "duplicate group name upstream, dropping this occurrence; keep group names unique"
                );
            }
        }

        debug!(groups = groups.len(), "fetched upstream groups");
        Ok(GroupsResult::new(groups))
    }

    async fn get_users(&self, filter: &[String]) -> Result<UsersResult, PortError> {
        let directory_users = self.directory.list_users(filter).await?;
        let users = directory_users.into_iter().map(build_user).collect();

        let result = UsersResult::new(users);
        debug!(users = result.items, "fetched upstream users");
        Ok(result)
    }

    async fn get_group_members(&self, group_ipid: &str) -> Result<MembersResult, PortError> {
        if group_ipid.is_empty() {
            return Err(PortError::rejected("group id is empty"));
        }

        let directory_members = self.directory.list_group_members(group_ipid).await?;

        let mut members = Vec::with_capacity(directory_members.len());
        for member in directory_members {
            // nested groups are skipped; their users already appear here
            // thanks to derived-membership expansion
            if member.kind == "GROUP" {
                warn!(
                    id = %member.id,
                    email = %member.email,
                    "skipping nested group member, its users are included via derived membership"
                );
                continue;
            }

            members.push(
                Member::builder()
                    .with_ipid(member.id)
                    .with_email(member.email)
                    .with_status(member.status)
                    .build(),
            );
        }

        debug!(
            group_id = group_ipid,
            members = members.len(),
            "fetched upstream group members"
        );
        Ok(MembersResult::new(members))
    }

    async fn get_groups_members(
        &self,
        groups: &GroupsResult,
    ) -> Result<GroupsMembersResult, PortError> {
        let mut groups_members = Vec::with_capacity(groups.resources.len());

        for group in &groups.resources {
            let members = self.get_group_members(&group.ipid).await?;
            groups_members.push(
                GroupMembers::builder()
                    .with_group(group.clone())
                    .with_resources(members.resources)
                    .build(),
            );
        }

        Ok(GroupsMembersResult::new(groups_members))
    }

    async fn get_users_by_groups_members(
        &self,
        groups_members: &GroupsMembersResult,
    ) -> Result<UsersResult, PortError> {
        let mut seen = HashSet::new();
        let mut users = Vec::new();

        for group_members in &groups_members.resources {
            for member in &group_members.resources {
                if seen.insert(member.email.clone()) {
                    let directory_user =
                        self.directory.get_user(&member.email).await.map_err(|err| {
                            warn!(
                                email = %member.email,
                                error = %err,
                                "failed to fetch member's user record"
                            );
                            PortError::from(err)
                        })?;
                    users.push(build_user(directory_user));
                }
            }
        }

        let result = UsersResult::new(users);
        debug!(users = result.items, "fetched users reachable from groups");
        Ok(result)
    }
}

/// Map a Directory user onto the model entity.
fn build_user(user: DirectoryUser) -> User {
    let display_name = if user.name.full_name.is_empty() {
        format!("{} {}", user.name.given_name, user.name.family_name)
            .trim()
            .to_string()
    } else {
        user.name.full_name.clone()
    };

    let mut emails = vec![Email {
        value: user.primary_email.clone(),
        kind: "work".to_string(),
        primary: true,
    }];
    for email in &user.emails {
        if !email.primary && !email.address.is_empty() {
            emails.push(Email {
                value: email.address.clone(),
                kind: email.kind.clone(),
                primary: false,
            });
        }
    }

    let mut builder = User::builder()
        .with_ipid(user.id.clone())
        .with_user_name(user.primary_email.clone())
        .with_display_name(display_name)
        .with_name(Name {
            given_name: some_if_present(&user.name.given_name),
            family_name: some_if_present(&user.name.family_name),
            formatted: some_if_present(&user.name.full_name),
            ..Name::default()
        })
        .with_active(!user.suspended)
        .with_emails(emails);

    if let Some(language) = user.languages.first() {
        builder = builder.with_preferred_language(language.language_code.clone());
    }

    if let Some(address) = user.addresses.first() {
        builder = builder.with_addresses(vec![dirsync_model::Address {
            formatted: address.formatted.clone(),
            street_address: address.street_address.clone(),
            locality: address.locality.clone(),
            region: address.region.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            kind: address.kind.clone(),
            primary: address.primary,
        }]);
    }

    if let Some(phone) = user.phones.first() {
        builder = builder.with_phone_numbers(vec![dirsync_model::PhoneNumber {
            value: phone.value.clone(),
            kind: phone.kind.clone(),
        }]);
    }

    let organization = user.organizations.first();
    if let Some(org) = organization {
        if !org.title.is_empty() {
            builder = builder.with_title(org.title.clone());
        }
    }

    let manager = user
        .relations
        .iter()
        .find(|r| r.kind == "manager")
        .map(|r| Manager {
            value: r.value.clone(),
            reference: String::new(),
        });

    let has_enterprise_fields = !user.employee_number.is_empty()
        || manager.is_some()
        || organization.is_some_and(|org| {
            !org.cost_center.is_empty()
                || !org.department.is_empty()
                || !org.division.is_empty()
                || !org.name.is_empty()
        });

    if has_enterprise_fields {
        builder = builder.with_enterprise_data(EnterpriseData {
            employee_number: user.employee_number.clone(),
            cost_center: organization.map(|o| o.cost_center.clone()).unwrap_or_default(),
            organization: organization.map(|o| o.name.clone()).unwrap_or_default(),
            division: organization.map(|o| o.division.clone()).unwrap_or_default(),
            department: organization.map(|o| o.department.clone()).unwrap_or_default(),
            manager,
        });
    }

    builder.build()
}

fn some_if_present(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DirectoryName, DirectoryOrganization, DirectoryRelation};

    #[test]
    fn suspended_maps_to_inactive() {
        let user = build_user(DirectoryUser {
            id: "1".into(),
            primary_email: "ada@example.com".into(),
            suspended: true,
            ..DirectoryUser::default()
        });

        assert!(!user.active);
        assert_eq!(user.user_name, "ada@example.com");
    }

    #[test]
    fn primary_email_is_exactly_one() {
        let user = build_user(DirectoryUser {
            id: "1".into(),
            primary_email: "ada@example.com".into(),
            emails: vec![
                crate::types::DirectoryEmail {
                    address: "ada@example.com".into(),
                    kind: "work".into(),
                    primary: true,
                },
                crate::types::DirectoryEmail {
                    address: "ada@home.example".into(),
                    kind: "home".into(),
                    primary: false,
                },
            ],
            ..DirectoryUser::default()
        });

        let primaries = user.emails.iter().filter(|e| e.primary).count();
        assert_eq!(primaries, 1);
        assert_eq!(user.primary_email_address(), Some("ada@example.com"));
        assert_eq!(user.emails.len(), 2);
    }

    #[test]
    fn display_name_falls_back_to_given_and_family() {
        let user = build_user(DirectoryUser {
            id: "1".into(),
            primary_email: "ada@example.com".into(),
            name: DirectoryName {
                given_name: "Ada".into(),
                family_name: "Lovelace".into(),
                full_name: String::new(),
            },
            ..DirectoryUser::default()
        });

        assert_eq!(user.display_name, "Ada Lovelace");
    }

    #[test]
    fn organization_and_manager_map_to_enterprise_data() {
        let user = build_user(DirectoryUser {
            id: "1".into(),
            primary_email: "ada@example.com".into(),
            organizations: vec![DirectoryOrganization {
                title: "Engineer".into(),
                department: "R&D".into(),
                cost_center: "cc-9".into(),
                ..DirectoryOrganization::default()
            }],
            relations: vec![DirectoryRelation {
                value: "boss@example.com".into(),
                kind: "manager".into(),
            }],
            ..DirectoryUser::default()
        });

        assert_eq!(user.title, "Engineer");
        let enterprise = user.enterprise_data.expect("enterprise data");
        assert_eq!(enterprise.department, "R&D");
        assert_eq!(enterprise.cost_center, "cc-9");
        assert_eq!(enterprise.manager.unwrap().value, "boss@example.com");
    }

    #[test]
    fn plain_user_has_no_enterprise_data() {
        let user = build_user(DirectoryUser {
            id: "1".into(),
            primary_email: "ada@example.com".into(),
            ..DirectoryUser::default()
        });

        assert!(user.enterprise_data.is_none());
    }
}
