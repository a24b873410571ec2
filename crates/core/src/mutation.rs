//! Row-level change operations queued for a commit
//!
//! A mutation names a table and either rows of values (writes) or a key
//! set (deletes). Mutations carry no local semantics: repeated records for
//! the same row are forwarded as-is and the server applies its own
//! per-kind rules (insert fails on an existing key, update on a missing
//! key, insert-or-update overwrites, replace nulls unset columns, delete
//! is idempotent).

use crate::keyset::KeySet;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Rows of values destined for one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Write {
    /// Target table
    pub table: String,
    /// Column names, one per cell position
    pub columns: Vec<String>,
    /// Row values; every row has one cell per column
    pub values: Vec<Vec<Value>>,
}

impl Write {
    /// Build a write for `table` over `columns` with the given rows
    pub fn new(table: impl Into<String>, columns: &[&str], values: Vec<Vec<Value>>) -> Self {
        Self {
            table: table.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values,
        }
    }
}

/// One row-level change operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    /// Insert new rows; fails if a key already exists
    Insert(Write),
    /// Update existing rows; fails if a key is missing
    Update(Write),
    /// Insert rows, overwriting any that already exist
    InsertOrUpdate(Write),
    /// Replace rows entirely; columns not listed become null
    Replace(Write),
    /// Delete the rows named by a key set; absent keys are ignored
    Delete {
        /// Target table
        table: String,
        /// Rows to delete
        key_set: KeySet,
    },
}

impl Mutation {
    /// The table this mutation targets
    pub fn table(&self) -> &str {
        match self {
            Mutation::Insert(w)
            | Mutation::Update(w)
            | Mutation::InsertOrUpdate(w)
            | Mutation::Replace(w) => &w.table,
            Mutation::Delete { table, .. } => table,
        }
    }

    /// Short name of the operation kind
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Insert(_) => "insert",
            Mutation::Update(_) => "update",
            Mutation::InsertOrUpdate(_) => "insert_or_update",
            Mutation::Replace(_) => "replace",
            Mutation::Delete { .. } => "delete",
        }
    }
}
