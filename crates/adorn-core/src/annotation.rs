//! Annotation types and the decorator catalog
//!
//! An annotation type is decorator-capable only when it carries a
//! `DecoratorDeclaration`; applying any other annotation as a decorator is a
//! configuration error. The catalog is shared by every declaring type that
//! is composed against it.

use crate::binding::DecoratorFactory;
use crate::diagnostics::SourceLocation;
use crate::errors::CallError;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// One usage of an annotation on a method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationOccurrence {
    /// Annotation type name
    pub annotation_type: String,
    /// Literal values written at the usage site
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    /// Where the annotation appears, if known
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl AnnotationOccurrence {
    /// Create an occurrence without attributes
    pub fn new(annotation_type: impl Into<String>) -> Self {
        Self {
            annotation_type: annotation_type.into(),
            attributes: BTreeMap::new(),
            location: None,
        }
    }

    /// Add a literal attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Set the source location
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Reusable decorator implementation, instantiated per application
pub trait DecoratorClass: Send + Sync {
    /// Build the factory for a method of `declaring_type`
    fn instantiate(&self, declaring_type: &str) -> Result<DecoratorFactory, CallError>;
}

/// Where the factory of a decorator-capable annotation comes from
#[derive(Clone)]
pub enum DecoratorRef {
    /// A decorator class instantiated with the owning type
    Class(Arc<dyn DecoratorClass>),
    /// A factory embedded directly in the annotation declaration
    Literal(DecoratorFactory),
}

impl DecoratorRef {
    /// Resolve the factory for a method of `declaring_type`
    pub fn resolve(&self, declaring_type: &str) -> Result<DecoratorFactory, CallError> {
        match self {
            Self::Class(class) => class.instantiate(declaring_type),
            Self::Literal(factory) => Ok(factory.clone()),
        }
    }
}

impl fmt::Debug for DecoratorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(_) => f.write_str("DecoratorRef::Class"),
            Self::Literal(factory) => f.debug_tuple("DecoratorRef::Literal").field(factory).finish(),
        }
    }
}

/// The decorator marker carried by a decorator-capable annotation type
#[derive(Debug, Clone)]
pub struct DecoratorDeclaration {
    reference: DecoratorRef,
    baggage: Option<Value>,
}

impl DecoratorDeclaration {
    /// Declare a decorator
    pub fn new(reference: DecoratorRef) -> Self {
        Self {
            reference,
            baggage: None,
        }
    }

    /// Extra value handed to arity-2 factories of this annotation type
    pub fn with_baggage(mut self, baggage: Value) -> Self {
        self.baggage = Some(baggage);
        self
    }

    /// The decorator reference
    pub fn reference(&self) -> &DecoratorRef {
        &self.reference
    }

    /// The baggage, if any
    pub fn baggage(&self) -> Option<&Value> {
        self.baggage.as_ref()
    }
}

/// An annotation type known to the catalog
#[derive(Debug, Clone)]
pub struct AnnotationType {
    name: String,
    decorator: Option<DecoratorDeclaration>,
}

impl AnnotationType {
    /// An ordinary annotation, not usable as a decorator
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decorator: None,
        }
    }

    /// An annotation marked as declaring a decorator
    pub fn decorating(name: impl Into<String>, declaration: DecoratorDeclaration) -> Self {
        Self {
            name: name.into(),
            decorator: Some(declaration),
        }
    }

    /// Decorator-capable annotation whose factory is embedded directly
    pub fn with_factory(name: impl Into<String>, factory: DecoratorFactory) -> Self {
        Self::decorating(name, DecoratorDeclaration::new(DecoratorRef::Literal(factory)))
    }

    /// Decorator-capable annotation backed by a decorator class
    pub fn with_class(name: impl Into<String>, class: Arc<dyn DecoratorClass>) -> Self {
        Self::decorating(name, DecoratorDeclaration::new(DecoratorRef::Class(class)))
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the type carries the decorator marker
    pub fn is_decorator(&self) -> bool {
        self.decorator.is_some()
    }

    /// The decorator declaration, if marked
    pub fn decorator(&self) -> Option<&DecoratorDeclaration> {
        self.decorator.as_ref()
    }
}

/// Registry of annotation types by name
#[derive(Debug, Clone, Default)]
pub struct DecoratorCatalog {
    types: HashMap<String, AnnotationType>,
}

impl DecoratorCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an annotation type, returning the one it replaced
    pub fn register(&mut self, annotation_type: AnnotationType) -> Option<AnnotationType> {
        self.types
            .insert(annotation_type.name().to_string(), annotation_type)
    }

    /// Builder-style `register`
    pub fn with(mut self, annotation_type: AnnotationType) -> Self {
        self.register(annotation_type);
        self
    }

    /// Look up an annotation type
    pub fn get(&self, name: &str) -> Option<&AnnotationType> {
        self.types.get(name)
    }

    /// Decorator declaration of a marked annotation type
    pub fn decorator_for(&self, name: &str) -> Option<&DecoratorDeclaration> {
        self.get(name).and_then(AnnotationType::decorator)
    }

    /// Whether the type is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Arguments;
    use serde_json::json;

    struct Echo;

    impl DecoratorClass for Echo {
        fn instantiate(&self, declaring_type: &str) -> Result<DecoratorFactory, CallError> {
            let owner = declaring_type.to_string();
            Ok(DecoratorFactory::wrapping(move |_inner| {
                let owner = owner.clone();
                move |_args: Arguments| -> crate::errors::CallResult { Ok(json!(owner)) }
            }))
        }
    }

    fn passthrough() -> DecoratorFactory {
        DecoratorFactory::wrapping(|inner| move |args: Arguments| inner.invoke(args))
    }

    #[test]
    fn test_marker_distinguishes_types() {
        let catalog = DecoratorCatalog::new()
            .with(AnnotationType::plain("Deprecated"))
            .with(AnnotationType::with_factory("Logged", passthrough()));

        assert!(catalog.contains("Deprecated"));
        assert!(catalog.decorator_for("Deprecated").is_none());
        assert!(catalog.decorator_for("Logged").is_some());
        assert!(catalog.get("Cached").is_none());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_register_replaces() {
        let mut catalog = DecoratorCatalog::new();
        assert!(catalog.register(AnnotationType::plain("Logged")).is_none());

        let previous = catalog.register(AnnotationType::with_factory("Logged", passthrough()));
        assert!(previous.is_some_and(|t| !t.is_decorator()));
        assert!(catalog.get("Logged").is_some_and(AnnotationType::is_decorator));
    }

    #[test]
    fn test_class_reference_sees_owner() {
        let reference = DecoratorRef::Class(Arc::new(Echo));
        let factory = reference.resolve("OrderService").unwrap();
        assert_eq!(factory.arity(), 1);

        let literal = DecoratorRef::Literal(passthrough());
        assert_eq!(literal.resolve("OrderService").unwrap().arity(), 1);
    }

    #[test]
    fn test_occurrence_from_json() {
        let occurrence: AnnotationOccurrence = serde_json::from_value(json!({
            "annotation_type": "Retry",
            "attributes": {"times": 3},
            "location": {"file": "Api.groovy", "line": 4, "column": 5}
        }))
        .unwrap();

        assert_eq!(
            occurrence,
            AnnotationOccurrence::new("Retry")
                .with_attribute("times", json!(3))
                .at(SourceLocation::new("Api.groovy", 4, 5))
        );
    }
}
