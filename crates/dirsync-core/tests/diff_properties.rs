//! Property-based tests for the diff split.
//!
//! For arbitrary current/previous key sets, the produced operation sets must
//! partition the key space: create covers exactly current-minus-previous,
//! delete exactly previous-minus-current, and update plus equal exactly the
//! intersection.

use std::collections::HashSet;

use proptest::prelude::*;

use dirsync_core::ops::{groups_operations, users_operations};
use dirsync_model::{Email, Group, GroupsResult, User, UsersResult};

fn group_with_content(key: &str, variant: bool) -> Group {
    Group::builder()
        .with_ipid(format!("ipid-{key}"))
        .with_name(key)
        .with_email(if variant {
            format!("{key}-changed@example.com")
        } else {
            format!("{key}@example.com")
        })
        .build()
}

fn user_with_content(key: &str, variant: bool) -> User {
    User::builder()
        .with_ipid(format!("ipid-{key}"))
        .with_user_name(key)
        .with_active(!variant)
        .with_emails(vec![Email {
            value: key.to_string(),
            kind: "work".into(),
            primary: true,
        }])
        .build()
}

fn key_set() -> impl Strategy<Value = HashSet<String>> {
    prop::collection::hash_set("[a-f]{1,2}", 0..10)
}

proptest! {
    #[test]
    fn group_diff_partitions_the_key_space(
        current_keys in key_set(),
        previous_keys in key_set(),
        changed in prop::collection::vec(prop::bool::ANY, 32),
    ) {
        let mut sorted_current: Vec<&String> = current_keys.iter().collect();
        sorted_current.sort();
        let mut sorted_previous: Vec<&String> = previous_keys.iter().collect();
        sorted_previous.sort();

        let current = GroupsResult::new(
            sorted_current.iter().map(|k| group_with_content(k, false)).collect(),
        );
        let previous = GroupsResult::new(
            sorted_previous
                .iter()
                .enumerate()
                .map(|(i, k)| group_with_content(k, changed[i % changed.len()]))
                .collect(),
        );

        let ops = groups_operations(&current, &previous);

        let intersection = current_keys.intersection(&previous_keys).count();
        let only_current = current_keys.difference(&previous_keys).count();
        let only_previous = previous_keys.difference(&current_keys).count();

        prop_assert_eq!(ops.create.items, only_current);
        prop_assert_eq!(ops.delete.items, only_previous);
        prop_assert_eq!(ops.update.items + ops.equal.items, intersection);
        prop_assert_eq!(
            ops.create.items + ops.update.items + ops.equal.items,
            current.items
        );

        // create and delete are disjoint by key
        let created: HashSet<&str> =
            ops.create.resources.iter().map(|g| g.name.as_str()).collect();
        let deleted: HashSet<&str> =
            ops.delete.resources.iter().map(|g| g.name.as_str()).collect();
        prop_assert!(created.is_disjoint(&deleted));
    }

    #[test]
    fn user_diff_partitions_the_key_space(
        current_keys in key_set(),
        previous_keys in key_set(),
        changed in prop::collection::vec(prop::bool::ANY, 32),
    ) {
        let mut sorted_current: Vec<&String> = current_keys.iter().collect();
        sorted_current.sort();
        let mut sorted_previous: Vec<&String> = previous_keys.iter().collect();
        sorted_previous.sort();

        let current = UsersResult::new(
            sorted_current.iter().map(|k| user_with_content(k, false)).collect(),
        );
        let previous = UsersResult::new(
            sorted_previous
                .iter()
                .enumerate()
                .map(|(i, k)| user_with_content(k, changed[i % changed.len()]))
                .collect(),
        );

        let ops = users_operations(&current, &previous);

        prop_assert_eq!(
            ops.create.items,
            current_keys.difference(&previous_keys).count()
        );
        prop_assert_eq!(
            ops.delete.items,
            previous_keys.difference(&current_keys).count()
        );
        prop_assert_eq!(
            ops.update.items + ops.equal.items,
            current_keys.intersection(&previous_keys).count()
        );

        // updates with unchanged content never appear
        for user in &ops.equal.resources {
            prop_assert!(user.active);
        }
        for user in &ops.update.resources {
            prop_assert!(user.active); // update carries current content
        }
    }
}
