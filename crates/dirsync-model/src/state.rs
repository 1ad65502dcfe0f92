//! Persisted sync state.
//!
//! The state document is the snapshot of the last successfully-synchronized
//! upstream view, including the downstream identifiers learned while applying
//! it. It is written atomically at the end of every successful run and read
//! back at the start of the next one; its aggregate hashes let an unchanged
//! upstream short-circuit without a single downstream call.

use serde::{Deserialize, Serialize};

use crate::hash;
use crate::{GroupsMembersResult, GroupsResult, UsersResult};

/// Current schema version of the persisted document.
pub const STATE_SCHEMA_VERSION: &str = "1.0.0";

/// The three synchronized snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResources {
    #[serde(default)]
    pub groups: GroupsResult,

    #[serde(default)]
    pub users: UsersResult,

    #[serde(default)]
    pub groups_members: GroupsMembersResult,
}

/// The state document persisted between runs.
///
/// Unknown fields are tolerated on read so newer writers do not break older
/// readers. `hash_code` covers only the resource snapshots: timestamps and
/// versions never make two content-identical states differ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    #[serde(default)]
    pub schema_version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code_version: String,

    #[serde(rename = "lastSyncTime", default, skip_serializing_if = "String::is_empty")]
    pub last_sync_time: String,

    #[serde(rename = "hashCode", default, skip_serializing_if = "String::is_empty")]
    pub hash_code: String,

    #[serde(default)]
    pub resources: StateResources,
}

impl State {
    pub fn new(
        code_version: impl Into<String>,
        last_sync_time: impl Into<String>,
        groups: GroupsResult,
        users: UsersResult,
        groups_members: GroupsMembersResult,
    ) -> Self {
        let mut state = Self {
            schema_version: STATE_SCHEMA_VERSION.to_string(),
            code_version: code_version.into(),
            last_sync_time: last_sync_time.into(),
            hash_code: String::new(),
            resources: StateResources {
                groups,
                users,
                groups_members,
            },
        };
        state.set_hash_code();
        state
    }

    /// True when no successful run has been recorded yet.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        self.last_sync_time.is_empty()
    }

    pub fn set_hash_code(&mut self) {
        self.hash_code = hash::combine(&[
            &self.resources.groups.hash_code,
            &self.resources.users.hash_code,
            &self.resources.groups_members.hash_code,
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Group;

    fn groups() -> GroupsResult {
        GroupsResult::new(vec![Group::builder()
            .with_ipid("g-1")
            .with_name("devs")
            .with_email("devs@example.com")
            .build()])
    }

    #[test]
    fn state_hash_ignores_timestamps_and_versions() {
        let a = State::new(
            "0.1.0",
            "2024-01-01T00:00:00Z",
            groups(),
            UsersResult::new(vec![]),
            GroupsMembersResult::new(vec![]),
        );
        let b = State::new(
            "0.2.0",
            "2025-06-30T12:34:56Z",
            groups(),
            UsersResult::new(vec![]),
            GroupsMembersResult::new(vec![]),
        );

        assert_eq!(a.hash_code, b.hash_code);
    }

    #[test]
    fn state_hash_tracks_resource_changes() {
        let a = State::new(
            "0.1.0",
            "2024-01-01T00:00:00Z",
            groups(),
            UsersResult::new(vec![]),
            GroupsMembersResult::new(vec![]),
        );
        let b = State::new(
            "0.1.0",
            "2024-01-01T00:00:00Z",
            GroupsResult::new(vec![]),
            UsersResult::new(vec![]),
            GroupsMembersResult::new(vec![]),
        );

        assert_ne!(a.hash_code, b.hash_code);
    }

    #[test]
    fn wire_format_field_names() {
        let state = State::new(
            "0.1.0",
            "2024-01-01T00:00:00Z",
            GroupsResult::new(vec![]),
            UsersResult::new(vec![]),
            GroupsMembersResult::new(vec![]),
        );

        let json = serde_json::to_value(&state).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object["schemaVersion"], STATE_SCHEMA_VERSION);
        assert!(object.contains_key("codeVersion"));
        assert!(object.contains_key("lastSyncTime"));
        assert!(object.contains_key("hashCode"));

        let resources = object["resources"].as_object().unwrap();
        assert!(resources.contains_key("groups"));
        assert!(resources.contains_key("users"));
        assert!(resources.contains_key("groupsMembers"));
    }

    #[test]
    fn unknown_fields_are_tolerated_on_read() {
        let doc = r#"{
            "schemaVersion": "1.0.0",
            "lastSyncTime": "2024-01-01T00:00:00Z",
            "hashCode": "abc",
            "futureField": {"nested": true},
            "resources": {
                "groups": {"items": 0, "resources": []},
                "users": {"items": 0, "resources": []},
                "groupsMembers": {"items": 0, "resources": []}
            }
        }"#;

        let state: State = serde_json::from_str(doc).unwrap();
        assert_eq!(state.schema_version, "1.0.0");
        assert!(!state.is_initial());
    }

    #[test]
    fn default_state_is_initial() {
        assert!(State::default().is_initial());
    }
}
