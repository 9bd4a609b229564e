//! Composition context of one declaring type
//!
//! `TypeComposer` owns everything the composition phase mutates for a type:
//! the entry-point table of its declared methods and the slot registry. A
//! method's entry point starts as its original body; the first decorator
//! applied to it creates the method's slot and rewrites the entry point to
//! read the slot. `seal` ends the phase and freezes every entry point.

use crate::annotation::DecoratorCatalog;
use crate::callable::DecoratedCallable;
use crate::config::ComposerConfig;
use crate::errors::{CallResult, ComposeError, ConfigError};
use crate::method::MethodDeclaration;
use crate::signature::MethodIdentity;
use crate::slot::{EntryPointRewriter, Slot, SlotRegistry};
use crate::types::Arguments;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

enum EntryPoint {
    Original(DecoratedCallable),
    Slot(Arc<Slot>),
}

impl EntryPoint {
    fn callable(&self) -> DecoratedCallable {
        match self {
            Self::Original(callable) => callable.clone(),
            Self::Slot(slot) => slot.current(),
        }
    }
}

struct MethodEntry {
    declaration: MethodDeclaration,
    entry_point: EntryPoint,
}

/// Declared methods in declaration order
#[derive(Default)]
struct MethodTable {
    entries: IndexMap<MethodIdentity, MethodEntry>,
}

impl EntryPointRewriter for MethodTable {
    fn rewrite_entry_point(&mut self, method: &MethodIdentity, slot: Arc<Slot>) {
        if let Some(entry) = self.entries.get_mut(method) {
            entry.entry_point = EntryPoint::Slot(slot);
        }
    }
}

/// Composition context for one declaring type
pub struct TypeComposer {
    declaring_type: String,
    config: ComposerConfig,
    catalog: Arc<DecoratorCatalog>,
    methods: MethodTable,
    registry: SlotRegistry,
}

impl std::fmt::Debug for TypeComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeComposer")
            .field("declaring_type", &self.declaring_type)
            .field("methods", &self.methods.entries.len())
            .field("registry", &self.registry)
            .finish()
    }
}

impl TypeComposer {
    /// Create a composer with default configuration
    pub fn new(declaring_type: impl Into<String>, catalog: Arc<DecoratorCatalog>) -> Self {
        let declaring_type = declaring_type.into();
        let config = ComposerConfig::default();
        let registry = SlotRegistry::with_config(declaring_type.clone(), &config);
        Self {
            declaring_type,
            config,
            catalog,
            methods: MethodTable::default(),
            registry,
        }
    }

    /// Create a composer with validated configuration
    pub fn with_config(
        declaring_type: impl Into<String>,
        catalog: Arc<DecoratorCatalog>,
        config: ComposerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let declaring_type = declaring_type.into();
        let registry = SlotRegistry::with_config(declaring_type.clone(), &config);
        Ok(Self {
            declaring_type,
            config,
            catalog,
            methods: MethodTable::default(),
            registry,
        })
    }

    /// Name of the declaring type
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Active configuration
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Catalog the composer resolves annotation types against
    pub fn catalog(&self) -> &DecoratorCatalog {
        &self.catalog
    }

    /// Slot registry of this type
    pub fn slots(&self) -> &SlotRegistry {
        &self.registry
    }

    /// Declare a method; its entry point starts as the original body
    pub fn declare(&mut self, method: MethodDeclaration) -> Result<(), ComposeError> {
        let identity = method.identity().clone();
        if self.methods.entries.contains_key(&identity) {
            return Err(ComposeError::DuplicateMethod {
                declaring_type: self.declaring_type.clone(),
                method: identity.to_string(),
            });
        }
        debug!(declaring_type = %self.declaring_type, method = %identity, "declared method");
        let entry_point = EntryPoint::Original(method.original());
        self.methods.entries.insert(
            identity,
            MethodEntry {
                declaration: method,
                entry_point,
            },
        );
        Ok(())
    }

    /// Whether the method is declared
    pub fn is_declared(&self, method: &MethodIdentity) -> bool {
        self.methods.entries.contains_key(method)
    }

    /// Whether the method's entry point was rewritten to a slot
    pub fn is_decorated(&self, method: &MethodIdentity) -> bool {
        matches!(
            self.methods.entries.get(method).map(|entry| &entry.entry_point),
            Some(EntryPoint::Slot(_))
        )
    }

    /// Declared methods in declaration order
    pub fn methods(&self) -> impl Iterator<Item = &MethodIdentity> {
        self.methods.entries.keys()
    }

    /// Idempotently ensure the method has a slot, rewriting its entry point
    /// the first time
    pub fn ensure_slot(&mut self, method: &MethodIdentity) -> Result<Arc<Slot>, ComposeError> {
        let declaration = self
            .methods
            .entries
            .get(method)
            .map(|entry| entry.declaration.clone())
            .ok_or_else(|| ComposeError::unknown_method(self.declaring_type.clone(), method))?;
        Ok(self
            .registry
            .get_or_create_slot(&declaration, &mut self.methods)?)
    }

    /// Current composed callable behind the method's entry point
    pub fn callable(&self, method: &MethodIdentity) -> Option<DecoratedCallable> {
        self.methods
            .entries
            .get(method)
            .map(|entry| entry.entry_point.callable())
    }

    /// Call the method through its entry point
    pub fn invoke(&self, method: &MethodIdentity, args: impl Into<Arguments>) -> CallResult {
        let callable = self
            .callable(method)
            .ok_or_else(|| ComposeError::unknown_method(self.declaring_type.clone(), method))?;
        callable.invoke(args)
    }

    /// End the composition phase
    pub fn seal(self) -> ComposedType {
        let methods = self
            .methods
            .entries
            .into_iter()
            .map(|(identity, entry)| (identity, entry.entry_point.callable()))
            .collect();
        debug!(declaring_type = %self.declaring_type, "sealed composition");
        ComposedType {
            declaring_type: self.declaring_type,
            methods,
        }
    }
}

/// Immutable method table of a type whose composition phase is over
#[derive(Debug, Clone)]
pub struct ComposedType {
    declaring_type: String,
    methods: IndexMap<MethodIdentity, DecoratedCallable>,
}

impl ComposedType {
    /// Name of the declaring type
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Composed callable of a method
    pub fn callable(&self, method: &MethodIdentity) -> Option<&DecoratedCallable> {
        self.methods.get(method)
    }

    /// Call a method
    pub fn invoke(&self, method: &MethodIdentity, args: impl Into<Arguments>) -> CallResult {
        let callable = self
            .methods
            .get(method)
            .ok_or_else(|| ComposeError::unknown_method(self.declaring_type.clone(), method))?;
        callable.invoke(args)
    }

    /// Methods in declaration order
    pub fn methods(&self) -> impl Iterator<Item = (&MethodIdentity, &DecoratedCallable)> {
        self.methods.iter()
    }

    /// Number of methods
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the type has no methods
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
