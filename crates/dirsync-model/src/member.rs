//! Group membership entities.

use serde::{Deserialize, Serialize};

use crate::hash;
use crate::Group;

/// One (user ↔ group) link as seen at read time.
///
/// Nested groups are never represented as members: upstream entries of type
/// `GROUP` are dropped at ingest and their transitively-included users are
/// surfaced through derived-membership expansion instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ipid: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scimid: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,

    #[serde(rename = "hashCode", default, skip_serializing_if = "String::is_empty")]
    pub hash_code: String,
}

impl Member {
    pub fn builder() -> MemberBuilder {
        MemberBuilder::default()
    }

    pub fn set_hash_code(&mut self) {
        self.hash_code = hash::digest(self);
    }
}

#[derive(Debug, Default)]
pub struct MemberBuilder {
    member: Member,
}

impl MemberBuilder {
    #[must_use]
    pub fn with_ipid(mut self, ipid: impl Into<String>) -> Self {
        self.member.ipid = ipid.into();
        self
    }

    #[must_use]
    pub fn with_scimid(mut self, scimid: impl Into<String>) -> Self {
        self.member.scimid = scimid.into();
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.member.email = email.into();
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.member.status = status.into();
        self
    }

    pub fn build(mut self) -> Member {
        self.member.set_hash_code();
        self.member
    }
}

/// One group paired with its member list.
///
/// The hash covers the group's content and the *set* of member hashes, so the
/// order in which members were enumerated never changes the fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembers {
    #[serde(default)]
    pub items: usize,

    #[serde(default)]
    pub group: Group,

    #[serde(default)]
    pub resources: Vec<Member>,

    #[serde(rename = "hashCode", default, skip_serializing_if = "String::is_empty")]
    pub hash_code: String,
}

impl GroupMembers {
    pub fn builder() -> GroupMembersBuilder {
        GroupMembersBuilder::default()
    }

    pub fn set_hash_code(&mut self) {
        for member in &mut self.resources {
            if member.hash_code.is_empty() {
                member.set_hash_code();
            }
        }
        let members = hash::digest_sorted(
            self.resources
                .iter()
                .map(|m| m.hash_code.clone())
                .collect(),
        );
        let group = hash::digest(&self.group);
        self.hash_code = hash::combine(&[&group, &members]);
    }
}

#[derive(Debug, Default)]
pub struct GroupMembersBuilder {
    group_members: GroupMembers,
}

impl GroupMembersBuilder {
    #[must_use]
    pub fn with_group(mut self, group: Group) -> Self {
        self.group_members.group = group;
        self
    }

    #[must_use]
    pub fn with_resources(mut self, resources: Vec<Member>) -> Self {
        self.group_members.resources = resources;
        self
    }

    pub fn build(mut self) -> GroupMembers {
        self.group_members.items = self.group_members.resources.len();
        self.group_members.set_hash_code();
        self.group_members
    }
}
