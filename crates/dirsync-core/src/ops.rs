//! Set-difference operations between an upstream view and a previous view.
//!
//! Given `current` (authoritative upstream) and `previous` (prior state or a
//! downstream listing), both keyed by the entity's natural key, the split is:
//!
//! - create: keys only in `current`
//! - delete: keys only in `previous`
//! - update: keys in both with differing content hashes; the produced record
//!   carries `current`'s content and `previous`'s downstream identifier
//! - equal: keys in both with identical hashes; the record still adopts
//!   `previous`'s downstream identifier so later steps can reference it
//!
//! Keys: group `name`, user primary email (falling back to `user_name`),
//! member `email` within a group. Insertion order of `current` is preserved
//! in every produced set.

use std::collections::HashMap;

use dirsync_model::{
    Group, GroupMembers, GroupsMembersResult, GroupsResult, Member, User, UsersResult,
};

/// Group operation sets produced by [`groups_operations`].
#[derive(Debug, Default)]
pub struct GroupsOperations {
    pub create: GroupsResult,
    pub update: GroupsResult,
    pub equal: GroupsResult,
    pub delete: GroupsResult,
}

/// User operation sets produced by [`users_operations`].
#[derive(Debug, Default)]
pub struct UsersOperations {
    pub create: UsersResult,
    pub update: UsersResult,
    pub equal: UsersResult,
    pub delete: UsersResult,
}

/// Membership operation sets produced by [`members_operations`].
///
/// Memberships have no update: a link either exists or it does not.
#[derive(Debug, Default)]
pub struct MembersOperations {
    pub create: GroupsMembersResult,
    pub equal: GroupsMembersResult,
    pub delete: GroupsMembersResult,
}

/// Split groups into create/update/equal/delete sets, keyed by name.
pub fn groups_operations(current: &GroupsResult, previous: &GroupsResult) -> GroupsOperations {
    let previous_by_name = first_occurrence_index(&previous.resources, |g: &Group| g.name.as_str());
    let current_by_name = first_occurrence_index(&current.resources, |g: &Group| g.name.as_str());

    let mut create = Vec::new();
    let mut update = Vec::new();
    let mut equal = Vec::new();

    for group in &current.resources {
        match previous_by_name.get(group.name.as_str()) {
            None => create.push(group.clone()),
            Some(prev) => {
                let mut reconciled = group.clone();
                reconciled.scimid = prev.scimid.clone();
                if group.hash_code != prev.hash_code {
                    update.push(reconciled);
                } else {
                    equal.push(reconciled);
                }
            }
        }
    }

    let delete = previous
        .resources
        .iter()
        .filter(|g| !current_by_name.contains_key(g.name.as_str()))
        .cloned()
        .collect();

    GroupsOperations {
        create: GroupsResult::new(create),
        update: GroupsResult::new(update),
        equal: GroupsResult::new(equal),
        delete: GroupsResult::new(delete),
    }
}

/// Split users into create/update/equal/delete sets, keyed by primary email
/// with `user_name` as the fallback key.
pub fn users_operations(current: &UsersResult, previous: &UsersResult) -> UsersOperations {
    let previous_by_key = first_occurrence_index(&previous.resources, User::key);
    let current_by_key = first_occurrence_index(&current.resources, User::key);

    let mut create = Vec::new();
    let mut update = Vec::new();
    let mut equal = Vec::new();

    for user in &current.resources {
        match previous_by_key.get(user.key()) {
            None => create.push(user.clone()),
            Some(prev) => {
                let mut reconciled = user.clone();
                reconciled.scimid = prev.scimid.clone();
                if user.hash_code != prev.hash_code {
                    update.push(reconciled);
                } else {
                    equal.push(reconciled);
                }
            }
        }
    }

    let delete = previous
        .resources
        .iter()
        .filter(|u| !current_by_key.contains_key(u.key()))
        .cloned()
        .collect();

    UsersOperations {
        create: UsersResult::new(create),
        update: UsersResult::new(update),
        equal: UsersResult::new(equal),
        delete: UsersResult::new(delete),
    }
}

/// Diff memberships per group, keyed by member email within each group.
///
/// Groups absent from `current` contribute no operations: deleting the group
/// downstream removes its memberships implicitly. A group new to `current`
/// contributes all of its members as additions. Only non-empty member subsets
/// produce an entry.
pub fn members_operations(
    current: &GroupsMembersResult,
    previous: &GroupsMembersResult,
) -> MembersOperations {
    let previous_by_group =
        first_occurrence_index(&previous.resources, |gm: &GroupMembers| gm.group.name.as_str());

    let mut create = Vec::new();
    let mut equal = Vec::new();
    let mut delete = Vec::new();

    for group_members in &current.resources {
        let mut group = group_members.group.clone();

        match previous_by_group.get(group_members.group.name.as_str()) {
            None => {
                if !group_members.resources.is_empty() {
                    create.push(
                        GroupMembers::builder()
                            .with_group(group)
                            .with_resources(group_members.resources.clone())
                            .build(),
                    );
                }
            }
            Some(prev) => {
                if group.scimid.is_empty() {
                    group.scimid = prev.group.scimid.clone();
                }
                let prev_by_email =
                    first_occurrence_index(&prev.resources, |m: &Member| m.email.as_str());
                let current_by_email = first_occurrence_index(&group_members.resources, |m: &Member| {
                    m.email.as_str()
                });

                let mut to_add = Vec::new();
                let mut to_keep = Vec::new();
                for member in &group_members.resources {
                    match prev_by_email.get(member.email.as_str()) {
                        None => to_add.push(member.clone()),
                        Some(known) => {
                            let mut kept = member.clone();
                            if kept.scimid.is_empty() {
                                kept.scimid = known.scimid.clone();
                            }
                            to_keep.push(kept);
                        }
                    }
                }

                let to_remove: Vec<Member> = prev
                    .resources
                    .iter()
                    .filter(|m| !current_by_email.contains_key(m.email.as_str()))
                    .cloned()
                    .collect();

                if !to_add.is_empty() {
                    create.push(
                        GroupMembers::builder()
                            .with_group(group.clone())
                            .with_resources(to_add)
                            .build(),
                    );
                }
                if !to_keep.is_empty() {
                    equal.push(
                        GroupMembers::builder()
                            .with_group(group.clone())
                            .with_resources(to_keep)
                            .build(),
                    );
                }
                if !to_remove.is_empty() {
                    delete.push(
                        GroupMembers::builder()
                            .with_group(group)
                            .with_resources(to_remove)
                            .build(),
                    );
                }
            }
        }
    }

    MembersOperations {
        create: GroupsMembersResult::new(create),
        equal: GroupsMembersResult::new(equal),
        delete: GroupsMembersResult::new(delete),
    }
}

/// Rewrite a membership snapshot with the downstream identifiers learned
/// during apply: group `scimid` looked up by name, member `scimid` by email.
///
/// Content hashes are unaffected because downstream identifiers never
/// participate in them.
pub fn update_groups_members_scimids(
    groups_members: &GroupsMembersResult,
    groups: &GroupsResult,
    users: &UsersResult,
) -> GroupsMembersResult {
    let group_ids: HashMap<&str, &str> = groups
        .resources
        .iter()
        .map(|g| (g.name.as_str(), g.scimid.as_str()))
        .collect();
    let user_ids: HashMap<&str, &str> = users
        .resources
        .iter()
        .map(|u| (u.key(), u.scimid.as_str()))
        .collect();

    let rewritten = groups_members
        .resources
        .iter()
        .map(|gm| {
            let mut group = gm.group.clone();
            if let Some(id) = group_ids.get(group.name.as_str()) {
                group.scimid = (*id).to_string();
            }
            let members = gm
                .resources
                .iter()
                .map(|m| {
                    let mut member = m.clone();
                    if let Some(id) = user_ids.get(member.email.as_str()) {
                        member.scimid = (*id).to_string();
                    }
                    member
                })
                .collect();
            GroupMembers::builder()
                .with_group(group)
                .with_resources(members)
                .build()
        })
        .collect();

    GroupsMembersResult::new(rewritten)
}

/// Index a slice by key, keeping the first occurrence on duplicates.
fn first_occurrence_index<'a, T, F>(items: &'a [T], key: F) -> HashMap<&'a str, &'a T>
where
    F: Fn(&'a T) -> &'a str,
{
    let mut index: HashMap<&str, &T> = HashMap::with_capacity(items.len());
    for item in items {
        index.entry(key(item)).or_insert(item);
    }
    index
}
