//! Canonical content hashing.
//!
//! Entities are fingerprinted over a canonical byte form: the value is
//! serialized to JSON, downstream-assigned identifiers (`scimid`) and prior
//! hash codes are stripped recursively, object keys are emitted in
//! lexicographic order, and the compact document is digested with SHA-256,
//! encoded as lowercase hex.
//!
//! Container results hash the sorted concatenation of their children's hash
//! codes, so reordering resources never changes a container's hash.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Keys that never participate in a content hash.
const EXCLUDED_KEYS: [&str; 2] = ["scimid", "hashCode"];

/// Compute the canonical digest of a serializable value.
pub fn digest<T: Serialize>(value: &T) -> String {
    let mut json = serde_json::to_value(value).unwrap_or(Value::Null);
    strip_excluded(&mut json);
    digest_bytes(json.to_string().as_bytes())
}

/// Digest a set of child hash codes independently of their order.
pub fn digest_sorted(mut hashes: Vec<String>) -> String {
    hashes.sort();
    digest_bytes(hashes.concat().as_bytes())
}

/// Digest the concatenation of already-computed digests, order preserved.
pub fn combine(parts: &[&str]) -> String {
    digest_bytes(parts.concat().as_bytes())
}

fn strip_excluded(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in EXCLUDED_KEYS {
                map.remove(key);
            }
            for child in map.values_mut() {
                strip_excluded(child);
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                strip_excluded(child);
            }
        }
        _ => {}
    }
}

fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn digest_is_deterministic() {
        let a = json!({"name": "devs", "email": "devs@example.com"});
        assert_eq!(digest(&a), digest(&a.clone()));
        assert_eq!(digest(&a).len(), 64);
    }

    #[test]
    fn digest_ignores_key_order() {
        let a = json!({"a": 1, "b": 2, "c": {"z": 9, "y": 8}});
        let b = json!({"c": {"y": 8, "z": 9}, "b": 2, "a": 1});
        assert_eq!(digest(&a), digest(&b));
    }

    #[test]
    fn digest_strips_scimid_and_hash_code() {
        let bare = json!({"ipid": "1", "name": "devs"});
        let decorated = json!({
            "ipid": "1",
            "name": "devs",
            "scimid": "abc-123",
            "hashCode": "deadbeef"
        });
        assert_eq!(digest(&bare), digest(&decorated));
    }

    #[test]
    fn digest_strips_nested_excluded_keys() {
        let bare = json!({"group": {"ipid": "1", "name": "devs"}});
        let decorated = json!({"group": {"ipid": "1", "name": "devs", "scimid": "s-1"}});
        assert_eq!(digest(&bare), digest(&decorated));
    }

    #[test]
    fn digest_sorted_is_order_invariant() {
        let a = digest_sorted(vec!["b".into(), "a".into(), "c".into()]);
        let b = digest_sorted(vec!["c".into(), "a".into(), "b".into()]);
        assert_eq!(a, b);
    }

    #[test]
    fn combine_is_order_sensitive() {
        assert_ne!(combine(&["a", "b"]), combine(&["b", "a"]));
    }
}
