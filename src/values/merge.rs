//! # Values Merge
//!
//! Last-wins deep merge over YAML values.
//!
//! - mapping + mapping: merged key by key, recursively
//! - anything else: the later value replaces the earlier one (sequences are
//!   not concatenated)
//!
//! Keys keep the position of their first insertion.

use serde_yaml::Value;

/// Merge `overlay` into `base`, with `overlay` winning on conflicts
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => {
                        let previous = std::mem::replace(existing, Value::Null);
                        *existing = merge_values(previous, value);
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Mapping(base)
        }
        (_, overlay) => overlay,
    }
}

/// Fold documents in order; `None` when there are none
pub fn merge_documents(documents: impl IntoIterator<Item = Value>) -> Option<Value> {
    documents.into_iter().reduce(merge_values)
}
