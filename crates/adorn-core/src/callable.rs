//! Decorated callables
//!
//! A `DecoratedCallable` is "the method, as currently composed": a callable
//! carrying the method's name and return type. Decorating never mutates a
//! callable; `decorate_with` returns a new one whose delegate was built by
//! the decorator factory around the previous one, forming an immutable chain
//! whose innermost link is the original method body.

use crate::binding::{DecoratorBinding, DecoratorFactory};
use crate::errors::{CallError, CallResult};
use crate::types::{Arguments, TypeDescriptor};
use std::fmt;
use std::sync::Arc;

/// Type-erased callable: positional arguments in, value or error out
pub type Invocable = Arc<dyn Fn(Arguments) -> CallResult + Send + Sync + 'static>;

/// A method body wrapped in zero or more decorators
#[derive(Clone)]
pub struct DecoratedCallable {
    name: Arc<str>,
    return_type: TypeDescriptor,
    delegate: Invocable,
    layers: usize,
}

impl fmt::Debug for DecoratedCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratedCallable")
            .field("name", &self.name)
            .field("return_type", &self.return_type)
            .field("layers", &self.layers)
            .finish()
    }
}

impl DecoratedCallable {
    /// Wrap an original method body
    pub fn new<F>(name: &str, return_type: TypeDescriptor, body: F) -> Self
    where
        F: Fn(Arguments) -> CallResult + Send + Sync + 'static,
    {
        Self::from_invocable(name, return_type, Arc::new(body))
    }

    /// Wrap an already type-erased body
    pub fn from_invocable(name: &str, return_type: TypeDescriptor, body: Invocable) -> Self {
        Self {
            name: Arc::from(name),
            return_type,
            delegate: body,
            layers: 0,
        }
    }

    /// Name of the original method
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return type of the original method
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    /// Number of decorators wrapped around the original body
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Call through the chain
    pub fn invoke(&self, args: impl Into<Arguments>) -> CallResult {
        (self.delegate)(args.into())
    }

    /// This callable as a plain `Invocable`
    pub fn to_invocable(&self) -> Invocable {
        Arc::clone(&self.delegate)
    }

    /// Layer the binding's decorator on top of this callable.
    ///
    /// `self` stays valid and unchanged. Errors returned by the factory are
    /// passed through as-is.
    pub fn decorate_with(&self, binding: DecoratorBinding) -> Result<DecoratedCallable, CallError> {
        let delegate = match binding.factory() {
            DecoratorFactory::Plain(factory) => factory(self.clone())?,
            DecoratorFactory::Contextual(factory) => factory(self.clone(), binding.context())?,
        };
        Ok(Self {
            name: Arc::clone(&self.name),
            return_type: self.return_type.clone(),
            delegate,
            layers: self.layers + 1,
        })
    }
}
