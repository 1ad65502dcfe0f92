//! Group entity.

use serde::{Deserialize, Serialize};

use crate::hash;

/// A named collection of users as seen by either side of the sync.
///
/// `ipid` is the upstream directory identifier; `scimid` is assigned by the
/// downstream when the group is created there. The reconciliation key is
/// `name`, which must be unique upstream (duplicates are dropped at ingest).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ipid: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scimid: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,

    #[serde(rename = "hashCode", default, skip_serializing_if = "String::is_empty")]
    pub hash_code: String,
}

impl Group {
    pub fn builder() -> GroupBuilder {
        GroupBuilder::default()
    }

    /// Recompute the content hash. `scimid` and the previous hash code never
    /// participate in the digest.
    pub fn set_hash_code(&mut self) {
        self.hash_code = hash::digest(self);
    }
}

/// Fluent builder; `build` computes the hash so a finished group is never
/// observable without one.
#[derive(Debug, Default)]
pub struct GroupBuilder {
    group: Group,
}

impl GroupBuilder {
    #[must_use]
    pub fn with_ipid(mut self, ipid: impl Into<String>) -> Self {
        self.group.ipid = ipid.into();
        self
    }

    #[must_use]
    pub fn with_scimid(mut self, scimid: impl Into<String>) -> Self {
        self.group.scimid = scimid.into();
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.group.name = name.into();
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.group.email = email.into();
        self
    }

    pub fn build(mut self) -> Group {
        self.group.set_hash_code();
        self.group
    }
}
