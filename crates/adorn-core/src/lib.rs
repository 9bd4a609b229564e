//! Adorn Core - Decorator Composition Engine
//!
//! Attaches behavior-modifying wrappers (decorators) to method declarations
//! of a declaring type. Every decorated method owns one slot holding the
//! method "as currently composed"; each decorator applied to the method
//! replaces that callable with a new one layered on top of it.
//!
//! # Components
//!
//! - `signature`: stable textual keys derived from a method's name and
//!   parameter types (`SignatureKeyBuilder`)
//! - `slot`: one slot per method signature, with owner-checked collision
//!   resolution (`SlotRegistry`)
//! - `callable`: the immutable decorated chain (`DecoratedCallable`)
//! - `driver`: applies annotation occurrences in discovery order
//!   (`DecoratorDriver`)
//!
//! # Composition Model
//!
//! - Layering: the first decorator applied is innermost, the last outermost
//! - Idempotence: repeated slot lookups for one method yield the same slot,
//!   across any number of driver passes
//! - Isolation: methods whose keys collide never share a slot
//! - Passthrough: errors raised by bodies and decorators reach the caller
//!   unchanged
//!
//! Composition is single-threaded and mutates through `&mut` receivers;
//! `TypeComposer::seal` freezes the result into a `ComposedType` that may be
//! invoked from any number of threads.

#![forbid(unsafe_code)]

/// Annotation types and the decorator catalog
pub mod annotation;

/// Decorator factories, contexts and bindings
pub mod binding;

/// Decorated callables and `decorate_with`
pub mod callable;

/// Per-type composition context and sealed method tables
pub mod composer;

/// Composer configuration
pub mod config;

/// Build-time diagnostics channel
pub mod diagnostics;

/// Decorator application driver
pub mod driver;

/// Unified error handling
pub mod errors;

/// Method declarations
pub mod method;

/// Method identities and signature keys
pub mod signature;

/// Slots and the slot registry
pub mod slot;

/// Type descriptors and call arguments
pub mod types;

// === Public API Re-exports ===

pub use annotation::{
    AnnotationOccurrence, AnnotationType, DecoratorCatalog, DecoratorClass, DecoratorDeclaration,
    DecoratorRef,
};
pub use binding::{AnnotationHandle, DecoratorBinding, DecoratorContext, DecoratorFactory};
pub use callable::{DecoratedCallable, Invocable};
pub use composer::{ComposedType, TypeComposer};
pub use config::ComposerConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, SourceLocation};
pub use driver::{ApplyOutcome, CompositionReport, DecorationPlan, DecoratorDriver, PlannedMethod};
pub use errors::{ArgumentError, CallError, CallResult, ComposeError, ConfigError, RegistryError};
pub use method::MethodDeclaration;
pub use signature::{build_key, MethodIdentity, SignatureKey, SignatureKeyBuilder};
pub use slot::{EntryPointRewriter, Slot, SlotRegistry};
pub use types::{Arguments, TypeDescriptor, Value};
