//! Value model shared by callables, decorators and signatures
//!
//! Arguments travel as an ordered, positional list of dynamically typed
//! values. Parameter and return types are described by `TypeDescriptor`,
//! which only needs enough structure to derive signature keys.

use crate::errors::ArgumentError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dynamically typed value passed to and returned from composed methods
pub type Value = serde_json::Value;

/// Describes a parameter or return type
///
/// Renders as, and parses from, the familiar textual form: `int`,
/// `java.lang.String`, `List<String>`, `int[]`. A trailing `...` (varargs)
/// parses as an array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeDescriptor {
    /// A named (possibly qualified, possibly generic) type
    Named(String),
    /// An array of the element type
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Create a named type descriptor
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Create an array type descriptor
    pub fn array_of(element: TypeDescriptor) -> Self {
        Self::Array(Box::new(element))
    }

    /// Descriptor used for methods without a result
    pub fn void() -> Self {
        Self::named("void")
    }

    /// Parse the textual form of a type
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(element) = text.strip_suffix("[]") {
            return Self::array_of(Self::parse(element));
        }
        if let Some(element) = text.strip_suffix("...") {
            return Self::array_of(Self::parse(element));
        }
        Self::Named(text.to_string())
    }

    /// Whether this is an array type
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Element type of an array, `None` for named types
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Array(element) => Some(element),
            Self::Named(_) => None,
        }
    }

    /// Short label used in signature keys.
    ///
    /// Generic arguments are erased and the package or module path dropped;
    /// arrays are labeled as their element label followed by `Array`.
    pub fn label(&self) -> String {
        match self {
            Self::Named(name) => simple_name(name).to_string(),
            Self::Array(element) => format!("{}Array", element.label()),
        }
    }
}

fn simple_name(name: &str) -> &str {
    let erased = match name.find('<') {
        Some(index) => &name[..index],
        None => name,
    };
    let erased = erased.trim();
    let after_path = erased.rsplit("::").next().unwrap_or(erased);
    after_path.rsplit('.').next().unwrap_or(after_path)
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Array(element) => write!(f, "{element}[]"),
        }
    }
}

impl From<String> for TypeDescriptor {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<&str> for TypeDescriptor {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<TypeDescriptor> for String {
    fn from(descriptor: TypeDescriptor) -> Self {
        descriptor.to_string()
    }
}

/// Ordered, positional argument list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Vec<Value>);

impl Arguments {
    /// Create an argument list
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Create an empty argument list
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no arguments were passed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Argument at `index`, if present
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Iterate over the arguments in order
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// Borrow the arguments as a slice
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Take the underlying values
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }

    /// Replace the argument at `index`, returning the previous value
    pub fn replace(&mut self, index: usize, value: Value) -> Result<Value, ArgumentError> {
        let len = self.0.len();
        let slot = self
            .0
            .get_mut(index)
            .ok_or(ArgumentError::Missing { index, len })?;
        Ok(std::mem::replace(slot, value))
    }

    /// Argument at `index`, or a `Missing` error
    pub fn value(&self, index: usize) -> Result<&Value, ArgumentError> {
        self.0.get(index).ok_or(ArgumentError::Missing {
            index,
            len: self.0.len(),
        })
    }

    /// Integer argument at `index`
    pub fn i64(&self, index: usize) -> Result<i64, ArgumentError> {
        let value = self.value(index)?;
        value
            .as_i64()
            .ok_or_else(|| mismatch(index, "integer", value))
    }

    /// Floating point argument at `index`; integers are widened
    pub fn f64(&self, index: usize) -> Result<f64, ArgumentError> {
        let value = self.value(index)?;
        value.as_f64().ok_or_else(|| mismatch(index, "number", value))
    }

    /// String argument at `index`
    pub fn str(&self, index: usize) -> Result<&str, ArgumentError> {
        let value = self.value(index)?;
        value.as_str().ok_or_else(|| mismatch(index, "string", value))
    }

    /// Boolean argument at `index`
    pub fn bool(&self, index: usize) -> Result<bool, ArgumentError> {
        let value = self.value(index)?;
        value
            .as_bool()
            .ok_or_else(|| mismatch(index, "boolean", value))
    }
}

fn mismatch(index: usize, expected: &'static str, value: &Value) -> ArgumentError {
    ArgumentError::TypeMismatch {
        index,
        expected,
        actual: value_kind(value),
    }
}

/// Human-readable kind of a value, used in error messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[Value; N]> for Arguments {
    fn from(values: [Value; N]) -> Self {
        Self(values.into())
    }
}

impl FromIterator<Value> for Arguments {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Arguments {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
