//! Inference options threaded through every query.

use lty_common::limits::MAX_EXPR_CHECK_DEPTH;
use serde::{Deserialize, Serialize};

/// Settings that change inference results.
///
/// Never read from process-wide state: callers hand an `&InferenceOptions`
/// to every query, and the cache must be cleared if they change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceOptions {
    /// When false, `nil` is assignable to every type.
    pub nil_strict: bool,
    /// An unresolved documented type name that matches a global table
    /// variable resolves to that table's type.
    pub recognize_global_name_as_type: bool,
    /// When false, call sites skip generic binding and placeholders
    /// degrade to `Unknown`.
    pub enable_generic: bool,
    /// Member names treated as constructors when their return type is
    /// otherwise unknown.
    pub constructor_names: Vec<String>,
    pub max_inference_depth: u32,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        InferenceOptions {
            nil_strict: false,
            recognize_global_name_as_type: true,
            enable_generic: true,
            constructor_names: vec!["new".to_string(), "get".to_string()],
            max_inference_depth: MAX_EXPR_CHECK_DEPTH,
        }
    }
}

impl InferenceOptions {
    pub fn is_constructor_name(&self, name: &str) -> bool {
        self.constructor_names.iter().any(|c| c == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = InferenceOptions::default();
        assert!(!options.nil_strict);
        assert!(options.recognize_global_name_as_type);
        assert!(options.enable_generic);
        assert!(options.is_constructor_name("new"));
        assert!(options.is_constructor_name("get"));
        assert!(!options.is_constructor_name("create"));
        assert_eq!(options.max_inference_depth, MAX_EXPR_CHECK_DEPTH);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let options: InferenceOptions =
            serde_json::from_str(r#"{ "nilStrict": true, "constructorNames": ["create"] }"#)
                .expect("valid options");
        assert!(options.nil_strict);
        assert!(options.enable_generic);
        assert!(options.is_constructor_name("create"));
        assert!(!options.is_constructor_name("new"));
    }
}
