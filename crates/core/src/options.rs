//! Transaction and read options
//!
//! These types pin down the immutable parameters chosen when a transaction
//! handle is created, plus the per-call knobs for reads and queries.
//! Builder-style methods keep call sites short; every option has a
//! meaningful `Default`.

use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// How fresh the data observed by a read-only transaction must be
///
/// `MinReadTimestamp` and `MaxStaleness` leave the server room to pick a
/// timestamp and are therefore only meaningful for single-use transactions;
/// the server rejects them in a multi-use begin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimestampBound {
    /// Observe all writes committed before the read started
    Strong,
    /// Read at exactly this timestamp
    ReadTimestamp(DateTime<Utc>),
    /// Read at a server-chosen timestamp at or after this one (single-use only)
    MinReadTimestamp(DateTime<Utc>),
    /// Read at exactly now minus this staleness
    ExactStaleness(Duration),
    /// Read at a server-chosen timestamp at most this stale (single-use only)
    MaxStaleness(Duration),
}

impl TimestampBound {
    /// Whether this bound is only valid for single-use transactions
    pub fn is_single_use_only(&self) -> bool {
        matches!(
            self,
            TimestampBound::MinReadTimestamp(_) | TimestampBound::MaxStaleness(_)
        )
    }
}

impl Default for TimestampBound {
    fn default() -> Self {
        TimestampBound::Strong
    }
}

/// Immutable parameters of a read-only transaction
///
/// Strong semantics still materialize as a concrete options value, so every
/// begin attempt before the id is known re-sends identical options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadOnlyOptions {
    /// Staleness mode for all reads in the transaction
    pub bound: TimestampBound,
    /// Ask the server to report the timestamp it read at
    pub return_read_timestamp: bool,
}

impl ReadOnlyOptions {
    /// Options with the given staleness bound, read timestamp requested
    pub fn new(bound: TimestampBound) -> Self {
        Self {
            bound,
            return_read_timestamp: true,
        }
    }

    /// Do not ask the server for the read timestamp
    pub fn without_read_timestamp(mut self) -> Self {
        self.return_read_timestamp = false;
        self
    }
}

impl Default for ReadOnlyOptions {
    fn default() -> Self {
        Self::new(TimestampBound::Strong)
    }
}

/// Immutable parameters chosen when a transaction handle is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransactionOptions {
    /// Locking read-write transaction
    ReadWrite,
    /// Read-only transaction with a staleness bound
    ReadOnly(ReadOnlyOptions),
}

impl TransactionOptions {
    /// Read-only options with the given bound
    pub fn read_only(bound: TimestampBound) -> Self {
        TransactionOptions::ReadOnly(ReadOnlyOptions::new(bound))
    }

    /// Whether these are read-only options
    pub fn is_read_only(&self) -> bool {
        matches!(self, TransactionOptions::ReadOnly(_))
    }
}

/// Per-call options for table reads
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Maximum number of rows to return (None = unlimited)
    pub limit: Option<i64>,
}

impl ReadOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of returned rows
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Named parameters for a SQL query
///
/// Parameter order is irrelevant to the server; a sorted map keeps the
/// client's request shape deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    /// No parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a parameter by name
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Iterate parameters in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether no parameters are bound
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
