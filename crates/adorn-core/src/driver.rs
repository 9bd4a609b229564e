//! Decorator application driver
//!
//! The driver applies annotation occurrences to the methods of one
//! `TypeComposer`. Each valid occurrence adds exactly one layer to the
//! method's chain: occurrences are processed in discovery order, so the first
//! one stays innermost and the last one becomes outermost. Misconfigured
//! annotations are reported through the diagnostics channel and leave the
//! method as it was.

use crate::annotation::AnnotationOccurrence;
use crate::binding::{AnnotationHandle, DecoratorBinding, DecoratorContext};
use crate::composer::TypeComposer;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::errors::ComposeError;
use crate::signature::{MethodIdentity, SignatureKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of applying one annotation occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new outermost layer was added to the method's slot
    Applied {
        /// Key of the slot that now holds the chain
        key: SignatureKey,
        /// Layers in the chain after this application
        layers: usize,
    },
    /// The annotation is not usable as a decorator; a diagnostic was recorded
    Rejected,
}

/// One method of a decoration plan with its annotations in discovery order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMethod {
    /// Target method
    pub method: MethodIdentity,
    /// Annotation occurrences in discovery order
    #[serde(default)]
    pub annotations: Vec<AnnotationOccurrence>,
}

/// Annotation occurrences discovered on a declaring type, as data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecorationPlan {
    /// Methods in discovery order
    #[serde(default)]
    pub methods: Vec<PlannedMethod>,
}

impl DecorationPlan {
    /// Parse a plan from JSON
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Add a method with its annotations
    pub fn with_method(
        mut self,
        method: MethodIdentity,
        annotations: impl IntoIterator<Item = AnnotationOccurrence>,
    ) -> Self {
        self.methods.push(PlannedMethod {
            method,
            annotations: annotations.into_iter().collect(),
        });
        self
    }

    /// Total number of annotation occurrences
    pub fn occurrences(&self) -> usize {
        self.methods.iter().map(|planned| planned.annotations.len()).sum()
    }
}

/// Summary of one driver pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionReport {
    /// Declaring type the pass ran against
    pub declaring_type: String,
    /// Occurrences that added a layer
    pub applied: usize,
    /// Occurrences rejected as misconfigured
    pub rejected: usize,
    /// Occurrences that failed for any other reason
    pub failed: usize,
    /// Everything recorded during the pass
    pub diagnostics: Diagnostics,
}

impl CompositionReport {
    /// Whether the pass recorded no diagnostics
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Applies annotation occurrences to one declaring type
#[derive(Debug)]
pub struct DecoratorDriver<'c> {
    composer: &'c mut TypeComposer,
    diagnostics: Diagnostics,
    applied: usize,
    rejected: usize,
    failed: usize,
}

impl<'c> DecoratorDriver<'c> {
    /// Start a pass over `composer`
    pub fn new(composer: &'c mut TypeComposer) -> Self {
        Self {
            composer,
            diagnostics: Diagnostics::new(),
            applied: 0,
            rejected: 0,
            failed: 0,
        }
    }

    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Apply one annotation occurrence to `method`.
    ///
    /// An annotation type that is unknown or lacks the decorator marker is a
    /// configuration error: it is recorded as a diagnostic and yields
    /// `ApplyOutcome::Rejected` without touching the method. Other failures
    /// are returned; layers applied before them stay in place.
    pub fn apply(
        &mut self,
        method: &MethodIdentity,
        occurrence: &AnnotationOccurrence,
    ) -> Result<ApplyOutcome, ComposeError> {
        let declaring_type = self.composer.declaring_type().to_string();
        let annotation = occurrence.annotation_type.as_str();

        let lookup = self
            .composer
            .catalog()
            .get(annotation)
            .map(|annotation_type| annotation_type.decorator().cloned());
        let declaration = match lookup {
            Some(Some(declaration)) => declaration,
            Some(None) => {
                let message = format!(
                    "Annotation to decorate method must be marked as a method decorator. \
                     {annotation} lacks this marker."
                );
                return Ok(self.reject(
                    DiagnosticKind::MissingDecoratorMarker,
                    message,
                    method,
                    occurrence,
                ));
            }
            None => {
                let message = format!("Unknown annotation type {annotation}.");
                return Ok(self.reject(
                    DiagnosticKind::UnknownAnnotationType,
                    message,
                    method,
                    occurrence,
                ));
            }
        };

        let slot = self.composer.ensure_slot(method)?;

        let factory = declaration
            .reference()
            .resolve(&declaring_type)
            .map_err(|source| ComposeError::factory_failed(annotation, method, source))?;
        let handle = AnnotationHandle {
            annotation_type: annotation.to_string(),
            attributes: occurrence.attributes.clone(),
            declaring_type,
            method: method.clone(),
            location: occurrence.location.clone(),
        };
        let binding = DecoratorBinding::new(factory)
            .with_context(DecoratorContext::new(handle, declaration.baggage().cloned()));

        let next = slot
            .current()
            .decorate_with(binding)
            .map_err(|source| ComposeError::factory_failed(annotation, method, source))?;
        let layers = next.layers();
        slot.replace(next);
        self.applied += 1;

        debug!(
            declaring_type = %self.composer.declaring_type(),
            method = %method,
            annotation,
            key = %slot.key(),
            layers,
            "applied decorator"
        );
        Ok(ApplyOutcome::Applied {
            key: slot.key().clone(),
            layers,
        })
    }

    /// Apply every occurrence of the plan in order.
    ///
    /// Nothing aborts the pass: failures are recorded as diagnostics and the
    /// next occurrence is processed.
    pub fn apply_plan(&mut self, plan: &DecorationPlan) {
        for planned in &plan.methods {
            for occurrence in &planned.annotations {
                if let Err(err) = self.apply(&planned.method, occurrence) {
                    self.fail(err, &planned.method, occurrence);
                }
            }
        }
    }

    /// End the pass
    pub fn finish(self) -> CompositionReport {
        CompositionReport {
            declaring_type: self.composer.declaring_type().to_string(),
            applied: self.applied,
            rejected: self.rejected,
            failed: self.failed,
            diagnostics: self.diagnostics,
        }
    }

    fn reject(
        &mut self,
        kind: DiagnosticKind,
        message: String,
        method: &MethodIdentity,
        occurrence: &AnnotationOccurrence,
    ) -> ApplyOutcome {
        warn!(
            declaring_type = %self.composer.declaring_type(),
            method = %method,
            annotation = %occurrence.annotation_type,
            "{message}"
        );
        self.rejected += 1;
        self.diagnostics.error(
            kind,
            message,
            self.composer.declaring_type(),
            Some(method.to_string()),
            occurrence.location.clone(),
        );
        ApplyOutcome::Rejected
    }

    fn fail(&mut self, err: ComposeError, method: &MethodIdentity, occurrence: &AnnotationOccurrence) {
        let kind = match &err {
            ComposeError::UnknownMethod { .. } => DiagnosticKind::UnknownMethod,
            ComposeError::FactoryFailed { .. } => DiagnosticKind::FactoryFailed,
            ComposeError::DuplicateMethod { .. } | ComposeError::Registry(_) => {
                DiagnosticKind::Internal
            }
        };
        let message = match std::error::Error::source(&err) {
            Some(source) => format!("{err}: {source}"),
            None => err.to_string(),
        };
        warn!(
            declaring_type = %self.composer.declaring_type(),
            method = %method,
            annotation = %occurrence.annotation_type,
            error = %message,
            "decorator application failed"
        );
        self.failed += 1;
        self.diagnostics.error(
            kind,
            message,
            self.composer.declaring_type(),
            Some(method.to_string()),
            occurrence.location.clone(),
        );
    }
}
