//! Property test strategies for method signatures

use adorn_core::{MethodIdentity, TypeDescriptor};
use proptest::prelude::*;

pub use proptest;

/// Method names, including ones with characters that need sanitizing
pub fn arb_method_name() -> impl Strategy<Value = String> {
    "[a-zA-Z_$][a-zA-Z0-9_$ <>.-]{0,12}"
}

/// Named types, qualified or generic, possibly wrapped in arrays
pub fn arb_type_descriptor() -> impl Strategy<Value = TypeDescriptor> {
    let named = prop_oneof![
        Just("int".to_string()),
        Just("long".to_string()),
        Just("String".to_string()),
        "[a-z]{1,5}(\\.[a-z]{1,5}){0,2}\\.[A-Z][a-zA-Z]{0,6}",
        "[A-Z][a-z]{0,5}<[A-Z][a-z]{0,5}>",
    ];
    (named, 0usize..3).prop_map(|(name, depth)| {
        (0..depth).fold(TypeDescriptor::named(name), |ty, _| TypeDescriptor::array_of(ty))
    })
}

/// Method identities with up to four parameters
pub fn arb_method_identity() -> impl Strategy<Value = MethodIdentity> {
    (arb_method_name(), prop::collection::vec(arb_type_descriptor(), 0..4))
        .prop_map(|(name, parameter_types)| MethodIdentity::new(name, parameter_types))
}
