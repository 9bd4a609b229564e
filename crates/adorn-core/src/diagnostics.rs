//! Build-time diagnostics channel
//!
//! Configuration problems found while applying decorators are recorded here
//! instead of aborting composition. Each entry is keyed to the declaring
//! type, the method and, when the rewriter knows it, the source location.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an annotation or declaration in source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path as reported by the rewriter
    pub file: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

impl SourceLocation {
    /// Create a source location
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Annotation type exists but is not marked as declaring a decorator
    MissingDecoratorMarker,
    /// Annotation type was never registered in the catalog
    UnknownAnnotationType,
    /// Annotation targets a method the declaring type does not declare
    UnknownMethod,
    /// Decorator class or factory failed while building the wrapper
    FactoryFailed,
    /// Engine invariant violated
    Internal,
}

/// One build-time error; the annotation occurrence it names was not applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Category
    pub kind: DiagnosticKind,
    /// Human-readable message
    pub message: String,
    /// Declaring type being composed
    pub declaring_type: String,
    /// Method the annotation was placed on
    pub method: Option<String>,
    /// Where the annotation appears
    pub location: Option<SourceLocation>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "error: {}", self.message)
    }
}

/// Collected diagnostics for one composition pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Record an error
    pub fn error(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        declaring_type: &str,
        method: Option<String>,
        location: Option<SourceLocation>,
    ) {
        self.push(Diagnostic {
            kind,
            message: message.into(),
            declaring_type: declaring_type.to_string(),
            method,
            location,
        });
    }

    /// Append every entry of `other`
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of diagnostics
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries of one kind
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    /// Iterate in recording order
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Take the entries
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
