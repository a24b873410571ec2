//! Cell values for rows, keys, and query parameters
//!
//! This module defines:
//! - Value: the unified enum for all cell types crossing the service
//!   boundary
//!
//! ## Type Rules
//!
//! - No implicit type coercions
//! - `Int(1) != Float(1.0)` - different types are NEVER equal
//! - `Bytes` are not `String`
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//!
//! Conversion between native application types and these wire cells is the
//! responsibility of the surrounding layer; this enum is the boundary
//! representation the client core moves around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical cell value for all client surfaces
///
/// Rows, primary keys, and query parameters are all sequences of these
/// values. Different types are never equal, even when they look alike:
/// `Int(1) != Float(1.0)` and `Bytes(b"a") != String("a")`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Timestamp with UTC zone, microsecond granularity on the wire
    Timestamp(DateTime<Utc>),
    /// Array of values
    Array(Vec<Value>),
}

// Custom PartialEq for IEEE-754 float semantics
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            // Different types are never equal
            _ => false,
        }
    }
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::Timestamp(_) => "Timestamp",
            Value::Array(_) => "Array",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Approximate in-memory size of this value in bytes
    ///
    /// Used to enforce the buffered-result ceiling. The estimate counts
    /// payload bytes plus a small fixed overhead per cell; it does not try
    /// to mirror the exact wire encoding.
    pub fn approximate_size(&self) -> usize {
        const CELL_OVERHEAD: usize = 8;
        CELL_OVERHEAD
            + match self {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Int(_) => 8,
                Value::Float(_) => 8,
                Value::String(s) => s.len(),
                Value::Bytes(b) => b.len(),
                Value::Timestamp(_) => 12,
                Value::Array(items) => items.iter().map(Value::approximate_size).sum(),
            }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}
