//! Method identities and signature keys
//!
//! A `SignatureKey` is the textual name under which a method's slot is
//! stored: a fixed prefix, the sanitized method name and one short label per
//! parameter. Keys deliberately ignore package paths and generic arguments,
//! so unrelated methods can collide; the slot registry resolves that using
//! the structural `MethodIdentity`.

use crate::config::ComposerConfig;
use crate::types::TypeDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix prepended to every signature key unless configured otherwise
pub const DEFAULT_KEY_PREFIX: &str = "decorating$";

/// Structural identity of a method: name plus full parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodIdentity {
    name: String,
    #[serde(default)]
    parameter_types: Vec<TypeDescriptor>,
}

impl MethodIdentity {
    /// Create a method identity
    pub fn new(name: impl Into<String>, parameter_types: Vec<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            parameter_types,
        }
    }

    /// Create a method identity from textual parameter types
    pub fn parse(name: impl Into<String>, parameter_types: &[&str]) -> Self {
        Self::new(
            name,
            parameter_types
                .iter()
                .map(|ty| TypeDescriptor::parse(ty))
                .collect(),
        )
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter types in declaration order
    pub fn parameter_types(&self) -> &[TypeDescriptor] {
        &self.parameter_types
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (index, ty) in self.parameter_types.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")
    }
}

/// Textual slot key derived from a method signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureKey(String);

impl SignatureKey {
    /// Borrow the key text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The next probe key: `marker` prepended to this key
    pub fn disambiguated(&self, marker: &str) -> Self {
        let mut key = String::with_capacity(marker.len() + self.0.len());
        key.push_str(marker);
        key.push_str(&self.0);
        Self(key)
    }
}

impl fmt::Display for SignatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives signature keys with a fixed prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureKeyBuilder {
    prefix: String,
}

impl Default for SignatureKeyBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl SignatureKeyBuilder {
    /// Create a builder with a custom prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Create a builder using the configured prefix
    pub fn from_config(config: &ComposerConfig) -> Self {
        Self::new(config.key_prefix.clone())
    }

    /// Prefix prepended to every key
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build the key for a method name and its parameter types
    pub fn build(&self, method_name: &str, parameter_types: &[TypeDescriptor]) -> SignatureKey {
        let mut key = String::with_capacity(self.prefix.len() + method_name.len() * 2);
        key.push_str(&self.prefix);
        key.push_str(&sanitize_identifier(method_name));
        for ty in parameter_types {
            key.push_str(&sanitize_identifier(&ty.label()));
        }
        SignatureKey(key)
    }

    /// Build the key for a method identity
    pub fn build_for(&self, method: &MethodIdentity) -> SignatureKey {
        self.build(method.name(), method.parameter_types())
    }
}

/// Build a signature key with the default prefix
pub fn build_key(method_name: &str, parameter_types: &[TypeDescriptor]) -> SignatureKey {
    SignatureKeyBuilder::default().build(method_name, parameter_types)
}

/// Whether `c` may appear in a generated identifier
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Replace every non-identifier character with `_`
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if is_identifier_char(c) { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_for_simple_method() {
        let key = build_key("add", &[TypeDescriptor::named("int"), TypeDescriptor::named("int")]);
        assert_eq!(key.as_str(), "decorating$addintint");
    }

    #[test]
    fn test_key_labels_arrays_recursively() {
        let method = MethodIdentity::parse("sum", &["int[]", "java.lang.String[][]"]);
        let key = SignatureKeyBuilder::default().build_for(&method);
        assert_eq!(key.as_str(), "decorating$sumintArrayStringArrayArray");
    }

    #[test]
    fn test_key_sanitizes_name() {
        let key = build_key("should work-fine!", &[]);
        assert_eq!(key.as_str(), "decorating$should_work_fine_");
    }

    #[test]
    fn test_erased_labels_collide() {
        let a = MethodIdentity::parse("load", &["a.Foo"]);
        let b = MethodIdentity::parse("load", &["b.Foo"]);
        let keys = SignatureKeyBuilder::default();
        assert_ne!(a, b);
        assert_eq!(keys.build_for(&a), keys.build_for(&b));
    }

    #[test]
    fn test_custom_prefix() {
        let keys = SignatureKeyBuilder::new("deco_");
        assert_eq!(keys.build("run", &[]).as_str(), "deco_run");
    }

    #[test]
    fn test_disambiguated_prepends_marker() {
        let key = build_key("run", &[]);
        assert_eq!(key.disambiguated("_").as_str(), "_decorating$run");
        assert_eq!(
            key.disambiguated("_").disambiguated("_").as_str(),
            "__decorating$run"
        );
    }

    #[test]
    fn test_identity_display() {
        let method = MethodIdentity::parse("add", &["int", "long[]"]);
        assert_eq!(method.to_string(), "add(int, long[])");
        assert_eq!(method.arity(), 2);
    }

    fn arb_type() -> impl Strategy<Value = TypeDescriptor> {
        let leaf = "[a-zA-Z][a-zA-Z0-9_.<> -]{0,12}".prop_map(TypeDescriptor::named);
        leaf.prop_recursive(3, 8, 1, |inner| inner.prop_map(TypeDescriptor::array_of))
    }

    proptest! {
        /// Same inputs always give the same key
        #[test]
        fn key_is_deterministic(name in ".{0,16}", params in prop::collection::vec(arb_type(), 0..4)) {
            prop_assert_eq!(build_key(&name, &params), build_key(&name, &params));
        }

        /// Keys only ever contain identifier characters
        #[test]
        fn key_is_identifier_safe(name in ".{0,16}", params in prop::collection::vec(arb_type(), 0..4)) {
            let key = build_key(&name, &params);
            prop_assert!(key.as_str().chars().all(is_identifier_char));
            prop_assert!(key.as_str().starts_with(DEFAULT_KEY_PREFIX));
        }
    }
}
