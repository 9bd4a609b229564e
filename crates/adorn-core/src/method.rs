//! Method declarations handed over by the rewriter

use crate::callable::{DecoratedCallable, Invocable};
use crate::diagnostics::SourceLocation;
use crate::errors::CallResult;
use crate::signature::MethodIdentity;
use crate::types::{Arguments, TypeDescriptor};
use std::fmt;
use std::sync::Arc;

/// A method of a declaring type, with its original body
#[derive(Clone)]
pub struct MethodDeclaration {
    identity: MethodIdentity,
    return_type: TypeDescriptor,
    body: Invocable,
    location: Option<SourceLocation>,
}

impl fmt::Debug for MethodDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDeclaration")
            .field("identity", &self.identity)
            .field("return_type", &self.return_type)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl MethodDeclaration {
    /// Declare a method
    pub fn new<F>(identity: MethodIdentity, return_type: TypeDescriptor, body: F) -> Self
    where
        F: Fn(Arguments) -> CallResult + Send + Sync + 'static,
    {
        Self::from_invocable(identity, return_type, Arc::new(body))
    }

    /// Declare a method with an already type-erased body
    pub fn from_invocable(identity: MethodIdentity, return_type: TypeDescriptor, body: Invocable) -> Self {
        Self {
            identity,
            return_type,
            body,
            location: None,
        }
    }

    /// Set the declaration's source location
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Structural identity
    pub fn identity(&self) -> &MethodIdentity {
        &self.identity
    }

    /// Return type
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    /// Source location, if known
    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// The original body as an undecorated callable
    pub fn original(&self) -> DecoratedCallable {
        DecoratedCallable::from_invocable(
            self.identity.name(),
            self.return_type.clone(),
            Arc::clone(&self.body),
        )
    }
}
