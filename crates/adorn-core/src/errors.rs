//! Error types for the composition engine
//!
//! Errors are split by concern: failures raised while a composed method runs
//! (`CallError`), failures while composing a declaring type (`ComposeError`,
//! `RegistryError`), argument access failures (`ArgumentError`) and
//! configuration loading failures (`ConfigError`).

use crate::types::Value;
use thiserror::Error;

/// Error raised by a method body or a decorator at invocation time.
///
/// The engine never wraps or inspects these: whatever a body or decorator
/// returns reaches the caller of `invoke` as the same boxed value.
pub type CallError = Box<dyn std::error::Error + Send + Sync>;

/// Result of invoking a composed method
pub type CallResult = std::result::Result<Value, CallError>;

/// Error accessing a positional argument
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// Index past the end of the argument list
    #[error("Argument {index} missing (got {len} arguments)")]
    Missing {
        /// Requested position
        index: usize,
        /// Number of arguments supplied
        len: usize,
    },

    /// Argument present but of the wrong kind
    #[error("Argument {index} is {actual}, expected {expected}")]
    TypeMismatch {
        /// Requested position
        index: usize,
        /// Kind the caller asked for
        expected: &'static str,
        /// Kind actually supplied
        actual: &'static str,
    },
}

/// Error type for slot registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Disambiguation probing did not terminate within the configured budget.
    ///
    /// Correct key construction never gets here; this is a registry defect.
    #[error("Collision probing for key '{key}' exceeded {limit} attempts")]
    CollisionExhausted {
        /// Raw key the probe started from
        key: String,
        /// Probe budget that was exceeded
        limit: usize,
    },
}

/// Error type for composing a declaring type
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Method was never declared on the declaring type
    #[error("Method {method} is not declared on {declaring_type}")]
    UnknownMethod {
        /// Type the method was looked up on
        declaring_type: String,
        /// Method as written in signature form
        method: String,
    },

    /// Method identity declared twice
    #[error("Method {method} is already declared on {declaring_type}")]
    DuplicateMethod {
        /// Type the method was declared on
        declaring_type: String,
        /// Method as written in signature form
        method: String,
    },

    /// Decorator class instantiation or factory invocation failed
    #[error("Decorator @{annotation} could not be applied to {method}")]
    FactoryFailed {
        /// Annotation type being applied
        annotation: String,
        /// Method being decorated
        method: String,
        /// Error raised by the class or factory
        #[source]
        source: CallError,
    },

    /// Slot registry invariant violated
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ComposeError {
    /// Create an unknown method error
    pub fn unknown_method(declaring_type: impl Into<String>, method: impl ToString) -> Self {
        Self::UnknownMethod {
            declaring_type: declaring_type.into(),
            method: method.to_string(),
        }
    }

    /// Create a factory failure error
    pub fn factory_failed(
        annotation: impl Into<String>,
        method: impl ToString,
        source: CallError,
    ) -> Self {
        Self::FactoryFailed {
            annotation: annotation.into(),
            method: method.to_string(),
            source,
        }
    }
}

/// Error type for loading and validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration text is not valid TOML for this schema
    #[error("Invalid configuration: {message}")]
    Parse {
        /// Parser message
        message: String,
    },

    /// A field holds an unusable value
    #[error("Field '{field}': {message}")]
    Invalid {
        /// Offending field
        field: String,
        /// Why the value is unusable
        message: String,
    },
}

impl ConfigError {
    /// Create an invalid field error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}
