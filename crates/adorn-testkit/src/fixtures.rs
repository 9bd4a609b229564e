//! Method fixtures and error types

use adorn_core::{CallResult, MethodDeclaration, MethodIdentity, TypeDescriptor, Value};
use serde_json::json;
use thiserror::Error;

/// Error raised by failing fixtures; downcast it to check passthrough
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("boom: {0}")]
pub struct Boom(pub String);

impl Boom {
    /// Create a boom with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// `add(int, int)`
pub fn add_identity() -> MethodIdentity {
    MethodIdentity::parse("add", &["int", "int"])
}

/// `add(a, b) = a + b`
pub fn add_method() -> MethodDeclaration {
    MethodDeclaration::new(add_identity(), TypeDescriptor::named("int"), |args| {
        Ok(json!(args.i64(0)? + args.i64(1)?))
    })
}

/// `identity(int) -> int`
pub fn identity_identity() -> MethodIdentity {
    MethodIdentity::parse("identity", &["int"])
}

/// Returns its single argument unchanged
pub fn identity_method() -> MethodDeclaration {
    MethodDeclaration::new(identity_identity(), TypeDescriptor::named("int"), |args| {
        Ok(args.value(0)?.clone())
    })
}

/// Method that always returns the given value
pub fn constant_method(identity: MethodIdentity, value: Value) -> MethodDeclaration {
    MethodDeclaration::new(identity, TypeDescriptor::named("Object"), move |_args| {
        Ok(value.clone())
    })
}

/// Method whose body always fails with `Boom`
pub fn failing_method(identity: MethodIdentity, message: &str) -> MethodDeclaration {
    let message = message.to_string();
    MethodDeclaration::new(identity, TypeDescriptor::void(), move |_args| -> CallResult {
        Err(Boom::new(message.clone()).into())
    })
}
