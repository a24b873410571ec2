//! Key filters for reads and deletes
//!
//! A `KeySet` names the rows an operation applies to: every row, a list of
//! point keys, key ranges, or any combination. Keys are tuples of cell
//! values matching the table's primary-key columns in order.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// One endpoint of a key range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyBound {
    /// The endpoint key is part of the range
    Included(Vec<Value>),
    /// The endpoint key is excluded from the range
    Excluded(Vec<Value>),
}

impl KeyBound {
    /// The key tuple at this endpoint
    pub fn key(&self) -> &[Value] {
        match self {
            KeyBound::Included(k) | KeyBound::Excluded(k) => k,
        }
    }
}

/// A contiguous range of primary keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRange {
    /// Range start
    pub start: KeyBound,
    /// Range end
    pub end: KeyBound,
}

impl KeyRange {
    /// Closed range: both endpoints included
    pub fn closed(start: Vec<Value>, end: Vec<Value>) -> Self {
        Self {
            start: KeyBound::Included(start),
            end: KeyBound::Included(end),
        }
    }

    /// Half-open range: start included, end excluded
    pub fn half_open(start: Vec<Value>, end: Vec<Value>) -> Self {
        Self {
            start: KeyBound::Included(start),
            end: KeyBound::Excluded(end),
        }
    }
}

/// The set of rows a read or delete applies to
///
/// An all-rows set ignores any listed keys or ranges. Point keys and ranges
/// compose: a row matches if it matches any entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeySet {
    all: bool,
    keys: Vec<Vec<Value>>,
    ranges: Vec<KeyRange>,
}

impl KeySet {
    /// Every row in the table
    pub fn all() -> Self {
        Self {
            all: true,
            ..Default::default()
        }
    }

    /// A single point key
    pub fn point(key: Vec<Value>) -> Self {
        Self {
            keys: vec![key],
            ..Default::default()
        }
    }

    /// A list of point keys
    pub fn keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        Self {
            keys: keys.into_iter().collect(),
            ..Default::default()
        }
    }

    /// A single key range
    pub fn range(range: KeyRange) -> Self {
        Self {
            ranges: vec![range],
            ..Default::default()
        }
    }

    /// Add a point key to this set
    pub fn add_key(mut self, key: Vec<Value>) -> Self {
        self.keys.push(key);
        self
    }

    /// Add a key range to this set
    pub fn add_range(mut self, range: KeyRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Whether this set names every row
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// The point keys in this set
    pub fn point_keys(&self) -> &[Vec<Value>] {
        &self.keys
    }

    /// The key ranges in this set
    pub fn key_ranges(&self) -> &[KeyRange] {
        &self.ranges
    }

    /// Whether this set matches nothing
    pub fn is_empty(&self) -> bool {
        !self.all && self.keys.is_empty() && self.ranges.is_empty()
    }
}
