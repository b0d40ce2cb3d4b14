//! Configuration merging logic
//!
//! Layers are combined key by key. The overlay (child) always wins:
//! - scalars and arrays from the overlay replace the base value wholesale
//! - objects on both sides are merged recursively, so `globals` and
//!   `overrides` accumulate across an `extends` chain
//!
//! Merging is not associative over chains; callers must fold strictly from
//! the oldest ancestor to the child.

use serde_json::{Map, Value};

/// Merge `overlay` into `base`, overlay values taking precedence
///
/// Keys already present in `base` keep their position; new keys are appended
/// in overlay order.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match value {
            Value::Object(incoming) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    deep_merge(existing, incoming);
                    continue;
                }
                base.insert(key, Value::Object(incoming));
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}
