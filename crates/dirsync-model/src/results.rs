//! Result containers: a counted resource list with an aggregate hash.
//!
//! The aggregate hash is computed over the lexicographically-sorted content
//! hashes of the resources, so two results holding the same resources in
//! different orders are indistinguishable by hash.

use serde::{Deserialize, Serialize};

use crate::hash;
use crate::{Group, GroupMembers, Member, User};

/// A set of users plus its aggregate hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersResult {
    #[serde(default)]
    pub items: usize,

    #[serde(rename = "hashCode", default, skip_serializing_if = "String::is_empty")]
    pub hash_code: String,

    #[serde(default)]
    pub resources: Vec<User>,
}

impl UsersResult {
    pub fn new(mut resources: Vec<User>) -> Self {
        for user in &mut resources {
            if user.hash_code.is_empty() {
                user.set_hash_code();
            }
        }
        let mut result = Self {
            items: resources.len(),
            hash_code: String::new(),
            resources,
        };
        result.set_hash_code();
        result
    }

    /// Concatenate several results into one, recomputing the aggregate hash.
    pub fn merge(results: &[&UsersResult]) -> Self {
        Self::new(
            results
                .iter()
                .flat_map(|r| r.resources.iter().cloned())
                .collect(),
        )
    }

    pub fn set_hash_code(&mut self) {
        self.hash_code =
            hash::digest_sorted(self.resources.iter().map(|u| u.hash_code.clone()).collect());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// A set of groups plus its aggregate hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupsResult {
    #[serde(default)]
    pub items: usize,

    #[serde(rename = "hashCode", default, skip_serializing_if = "String::is_empty")]
    pub hash_code: String,

    #[serde(default)]
    pub resources: Vec<Group>,
}

impl GroupsResult {
    pub fn new(mut resources: Vec<Group>) -> Self {
        for group in &mut resources {
            if group.hash_code.is_empty() {
                group.set_hash_code();
            }
        }
        let mut result = Self {
            items: resources.len(),
            hash_code: String::new(),
            resources,
        };
        result.set_hash_code();
        result
    }

    /// Concatenate several results into one, recomputing the aggregate hash.
    pub fn merge(results: &[&GroupsResult]) -> Self {
        Self::new(
            results
                .iter()
                .flat_map(|r| r.resources.iter().cloned())
                .collect(),
        )
    }

    pub fn set_hash_code(&mut self) {
        self.hash_code =
            hash::digest_sorted(self.resources.iter().map(|g| g.hash_code.clone()).collect());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// The members of a single group plus the aggregate hash of the member set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersResult {
    #[serde(default)]
    pub items: usize,

    #[serde(rename = "hashCode", default, skip_serializing_if = "String::is_empty")]
    pub hash_code: String,

    #[serde(default)]
    pub resources: Vec<Member>,
}

impl MembersResult {
    pub fn new(mut resources: Vec<Member>) -> Self {
        for member in &mut resources {
            if member.hash_code.is_empty() {
                member.set_hash_code();
            }
        }
        let mut result = Self {
            items: resources.len(),
            hash_code: String::new(),
            resources,
        };
        result.set_hash_code();
        result
    }

    pub fn set_hash_code(&mut self) {
        self.hash_code =
            hash::digest_sorted(self.resources.iter().map(|m| m.hash_code.clone()).collect());
    }
}

/// Every synchronized group paired with its member list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupsMembersResult {
    #[serde(default)]
    pub items: usize,

    #[serde(rename = "hashCode", default, skip_serializing_if = "String::is_empty")]
    pub hash_code: String,

    #[serde(default)]
    pub resources: Vec<GroupMembers>,
}

impl GroupsMembersResult {
    pub fn new(mut resources: Vec<GroupMembers>) -> Self {
        for group_members in &mut resources {
            if group_members.hash_code.is_empty() {
                group_members.set_hash_code();
            }
        }
        let mut result = Self {
            items: resources.len(),
            hash_code: String::new(),
            resources,
        };
        result.set_hash_code();
        result
    }

    /// Concatenate several results into one, recomputing the aggregate hash.
    pub fn merge(results: &[&GroupsMembersResult]) -> Self {
        Self::new(
            results
                .iter()
                .flat_map(|r| r.resources.iter().cloned())
                .collect(),
        )
    }

    pub fn set_hash_code(&mut self) {
        self.hash_code = hash::digest_sorted(
            self.resources
                .iter()
                .map(|gm| gm.hash_code.clone())
                .collect(),
        );
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
