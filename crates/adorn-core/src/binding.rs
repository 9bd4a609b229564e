//! Decorator factories, contexts and bindings
//!
//! A decorator is a factory that receives the current callable of a method
//! and returns the callable that replaces it. Factories come in two arities:
//! `Plain` takes only the inner callable, `Contextual` also receives the
//! `DecoratorContext` describing the annotation occurrence being applied.

use crate::callable::{DecoratedCallable, Invocable};
use crate::diagnostics::SourceLocation;
use crate::errors::{CallError, CallResult};
use crate::signature::MethodIdentity;
use crate::types::{Arguments, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Arity-1 factory: `(inner) -> outer`
pub type PlainFactory =
    dyn Fn(DecoratedCallable) -> Result<Invocable, CallError> + Send + Sync + 'static;

/// Arity-2 factory: `(inner, context) -> outer`
pub type ContextualFactory = dyn Fn(DecoratedCallable, &DecoratorContext) -> Result<Invocable, CallError>
    + Send
    + Sync
    + 'static;

/// A decorator factory
#[derive(Clone)]
pub enum DecoratorFactory {
    /// Receives only the inner callable
    Plain(Arc<PlainFactory>),
    /// Receives the inner callable and the decorator context
    Contextual(Arc<ContextualFactory>),
}

impl DecoratorFactory {
    /// Fallible arity-1 factory
    pub fn plain<F>(factory: F) -> Self
    where
        F: Fn(DecoratedCallable) -> Result<Invocable, CallError> + Send + Sync + 'static,
    {
        Self::Plain(Arc::new(factory))
    }

    /// Fallible arity-2 factory
    pub fn contextual<F>(factory: F) -> Self
    where
        F: Fn(DecoratedCallable, &DecoratorContext) -> Result<Invocable, CallError>
            + Send
            + Sync
            + 'static,
    {
        Self::Contextual(Arc::new(factory))
    }

    /// Arity-1 factory written as a closure returning the outer closure
    ///
    /// ```ignore
    /// let double = DecoratorFactory::wrapping(|inner| {
    ///     move |args: Arguments| Ok(json!(inner.invoke(args)?.as_i64().unwrap_or_default() * 2))
    /// });
    /// ```
    pub fn wrapping<F, W>(factory: F) -> Self
    where
        F: Fn(DecoratedCallable) -> W + Send + Sync + 'static,
        W: Fn(Arguments) -> CallResult + Send + Sync + 'static,
    {
        Self::plain(move |inner| Ok(Arc::new(factory(inner)) as Invocable))
    }

    /// Arity-2 factory written as a closure returning the outer closure
    pub fn wrapping_with_context<F, W>(factory: F) -> Self
    where
        F: Fn(DecoratedCallable, &DecoratorContext) -> W + Send + Sync + 'static,
        W: Fn(Arguments) -> CallResult + Send + Sync + 'static,
    {
        Self::contextual(move |inner, context| Ok(Arc::new(factory(inner, context)) as Invocable))
    }

    /// Adapt an interceptor `(method_name, original, arguments) -> result`.
    ///
    /// The interceptor runs on every call with the wrapped callable in hand
    /// and decides whether and how often to invoke it.
    pub fn intercept<F>(interceptor: F) -> Self
    where
        F: Fn(&str, &DecoratedCallable, Arguments) -> CallResult + Send + Sync + 'static,
    {
        let interceptor = Arc::new(interceptor);
        Self::plain(move |inner| {
            let interceptor = Arc::clone(&interceptor);
            Ok(Arc::new(move |args: Arguments| interceptor(inner.name(), &inner, args)) as Invocable)
        })
    }

    /// Number of parameters the factory takes
    pub fn arity(&self) -> usize {
        match self {
            Self::Plain(_) => 1,
            Self::Contextual(_) => 2,
        }
    }
}

impl fmt::Debug for DecoratorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("DecoratorFactory::Plain"),
            Self::Contextual(_) => f.write_str("DecoratorFactory::Contextual"),
        }
    }
}

/// Handle describing the annotation occurrence a decorator was built for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationHandle {
    /// Annotation type name
    pub annotation_type: String,
    /// Literal values attached to this usage of the annotation
    pub attributes: BTreeMap<String, Value>,
    /// Declaring type of the decorated method
    pub declaring_type: String,
    /// Decorated method
    pub method: MethodIdentity,
    /// Where the annotation appears in source, if known
    pub location: Option<SourceLocation>,
}

/// Metadata handed to arity-2 factories
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecoratorContext {
    annotation: Option<AnnotationHandle>,
    baggage: Option<Value>,
}

impl DecoratorContext {
    /// Create a context for an annotation occurrence
    pub fn new(annotation: AnnotationHandle, baggage: Option<Value>) -> Self {
        Self {
            annotation: Some(annotation),
            baggage,
        }
    }

    /// Context carrying nothing, for decorators applied outside a declaring type
    pub fn detached() -> Self {
        Self::default()
    }

    /// Attach baggage
    pub fn with_baggage(mut self, baggage: Value) -> Self {
        self.baggage = Some(baggage);
        self
    }

    /// Originating annotation occurrence
    pub fn annotation(&self) -> Option<&AnnotationHandle> {
        self.annotation.as_ref()
    }

    /// Extra value supplied by the annotation type's declaration
    pub fn baggage(&self) -> Option<&Value> {
        self.baggage.as_ref()
    }

    /// Literal attribute of the originating annotation occurrence
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.annotation
            .as_ref()
            .and_then(|annotation| annotation.attributes.get(name))
    }
}

/// The instantiated decorator for one annotation occurrence
#[derive(Debug, Clone)]
pub struct DecoratorBinding {
    factory: DecoratorFactory,
    context: DecoratorContext,
}

impl DecoratorBinding {
    /// Bind a factory with a detached context
    pub fn new(factory: DecoratorFactory) -> Self {
        Self {
            factory,
            context: DecoratorContext::detached(),
        }
    }

    /// Replace the context
    pub fn with_context(mut self, context: DecoratorContext) -> Self {
        self.context = context;
        self
    }

    /// The factory
    pub fn factory(&self) -> &DecoratorFactory {
        &self.factory
    }

    /// The context passed to arity-2 factories
    pub fn context(&self) -> &DecoratorContext {
        &self.context
    }

    /// Number of parameters the factory takes
    pub fn arity(&self) -> usize {
        self.factory.arity()
    }
}
