//! Catalog and composer builders

use crate::decorators::{add_one, double, negate, times};
use adorn_core::{
    AnnotationType, DecoratorCatalog, DecoratorClass, DecoratorDeclaration, DecoratorFactory,
    DecoratorRef, TypeComposer, Value,
};
use std::sync::Arc;

/// Builder for decorator catalogs
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: DecoratorCatalog,
}

impl CatalogBuilder {
    /// Start an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decorator-capable annotation with an embedded factory
    pub fn decorator(mut self, name: &str, factory: DecoratorFactory) -> Self {
        self.catalog.register(AnnotationType::with_factory(name, factory));
        self
    }

    /// Register a decorator-capable annotation with baggage
    pub fn decorator_with_baggage(mut self, name: &str, factory: DecoratorFactory, baggage: Value) -> Self {
        let declaration = DecoratorDeclaration::new(DecoratorRef::Literal(factory)).with_baggage(baggage);
        self.catalog.register(AnnotationType::decorating(name, declaration));
        self
    }

    /// Register a decorator-capable annotation backed by a class
    pub fn class(mut self, name: &str, class: Arc<dyn DecoratorClass>) -> Self {
        self.catalog.register(AnnotationType::with_class(name, class));
        self
    }

    /// Register an annotation without the decorator marker
    pub fn plain(mut self, name: &str) -> Self {
        self.catalog.register(AnnotationType::plain(name));
        self
    }

    /// Finish the catalog
    pub fn build(self) -> Arc<DecoratorCatalog> {
        Arc::new(self.catalog)
    }
}

/// Catalog with `AddOne`, `TimesTen`, `Double`, `Negate` and the plain
/// annotation `Deprecated`
pub fn standard_catalog() -> Arc<DecoratorCatalog> {
    CatalogBuilder::new()
        .decorator("AddOne", add_one())
        .decorator("TimesTen", times(10))
        .decorator("Double", double())
        .decorator("Negate", negate())
        .plain("Deprecated")
        .build()
}

/// Composer for the fixture type `Calculator`
pub fn composer_with(catalog: Arc<DecoratorCatalog>) -> TypeComposer {
    TypeComposer::new("Calculator", catalog)
}
