//! Settings layer merge
//!
//! Layers are folded left to right:
//! - Tables: merged key by key, recursively
//! - Arrays: replaced wholesale by the later layer
//! - Scalars: later layer wins

use serde_json::Value;

/// Fold `overlay` into `base` in place.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Merge layers in precedence order (first is the base, last wins).
pub fn merge_layers(layers: Vec<Value>) -> Value {
    let mut merged = Value::Null;
    for layer in layers {
        deep_merge(&mut merged, layer);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let mut base = json!({"www_dir": "www"});
        deep_merge(&mut base, json!({"www_dir": "public"}));
        assert_eq!(base["www_dir"], "public");
    }

    #[test]
    fn test_nested_table_keeps_siblings() {
        let mut base = json!({"hooks": {"timeout_seconds": 300}, "plugins": {}});
        deep_merge(&mut base, json!({"plugins": {"command": "plugman prepare"}}));

        assert_eq!(base["hooks"]["timeout_seconds"], 300);
        assert_eq!(base["plugins"]["command"], "plugman prepare");
    }

    #[test]
    fn test_array_replaced() {
        let mut base = json!({"merge": {"singletons": ["content", "author", "name"]}});
        deep_merge(&mut base, json!({"merge": {"singletons": ["icon"]}}));

        assert_eq!(base["merge"]["singletons"], json!(["icon"]));
    }

    #[test]
    fn test_table_replaces_scalar() {
        let mut base = json!({"web": "off"});
        deep_merge(&mut base, json!({"web": {"excludes": ["*.map"]}}));
        assert_eq!(base["web"]["excludes"][0], "*.map");
    }

    #[test]
    fn test_merge_layers_precedence() {
        let builtin = json!({"www_dir": "www", "hooks": {"timeout_seconds": 300}});
        let host = json!({"hooks": {"timeout_seconds": 60}});
        let project = json!({"www_dir": "public"});
        let cli = json!({"hooks": {"timeout_seconds": 10}});

        let merged = merge_layers(vec![builtin, host, project, cli]);

        assert_eq!(merged["www_dir"], "public");
        assert_eq!(merged["hooks"]["timeout_seconds"], 10);
    }

    #[test]
    fn test_merge_layers_empty() {
        assert!(merge_layers(Vec::new()).is_null());
    }
}
