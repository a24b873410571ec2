//! Mutation buffering for a single commit
//!
//! A buffer accumulates row-level change records in issue order. Appending
//! is pure and local; the transaction layer consumes the buffer exactly
//! once when it flushes a commit RPC. No dedup and no coalescing: repeated
//! records for the same row are forwarded to the server as-is.

use meridian_core::{KeySet, Mutation, Value, Write};

/// Ordered sequence of mutations destined for one commit.
#[derive(Debug, Default)]
pub struct MutationBuffer {
    mutations: Vec<Mutation>,
}

impl MutationBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an insert. The commit fails if a key already exists.
    pub fn insert(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> &mut Self {
        self.mutations
            .push(Mutation::Insert(Write::new(table, columns, rows)));
        self
    }

    /// Append an update. The commit fails if a key is missing.
    pub fn update(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> &mut Self {
        self.mutations
            .push(Mutation::Update(Write::new(table, columns, rows)));
        self
    }

    /// Append an insert-or-update. Existing rows are overwritten.
    pub fn insert_or_update(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> &mut Self {
        self.mutations
            .push(Mutation::InsertOrUpdate(Write::new(table, columns, rows)));
        self
    }

    /// Append a replace. Columns not listed become null.
    pub fn replace(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> &mut Self {
        self.mutations
            .push(Mutation::Replace(Write::new(table, columns, rows)));
        self
    }

    /// Append a delete of the rows named by a key set.
    pub fn delete(&mut self, table: &str, key_set: KeySet) -> &mut Self {
        self.mutations.push(Mutation::Delete {
            table: table.to_string(),
            key_set,
        });
        self
    }

    /// Number of buffered mutations.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Whether nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// The buffered mutations, in append order.
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Consume the buffer, yielding the mutations in append order.
    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}
