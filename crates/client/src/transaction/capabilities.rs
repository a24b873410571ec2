//! Capability traits for transaction handles
//!
//! Two independent capabilities, implemented selectively by the closed set
//! of handle types:
//!
//! | Handle                 | Readable | Writable |
//! |------------------------|----------|----------|
//! | `AutoCommit`           | yes      | yes      |
//! | `SingleUseReadOnly`    | yes      | no       |
//! | `ReadOnlyTransaction`  | yes      | no       |
//! | `ReadWriteTransaction` | yes      | yes      |

use crate::buffer::MutationBuffer;
use crate::results::{RowSet, RowStream};
use meridian_core::{CommitResult, KeySet, QueryParams, ReadOptions, Result, Value};

/// Reads and queries against a transaction context.
///
/// Buffered calls materialize the whole response and fail with
/// `ResponseTooLarge` past the response-size ceiling; the `_stream`
/// variants return a lazy, single-pass row sequence instead.
pub trait Readable {
    /// Execute a SQL query, materializing all rows.
    fn query(&self, sql: &str, params: QueryParams) -> Result<RowSet>;

    /// Execute a SQL query, streaming rows as they arrive.
    fn query_stream(&self, sql: &str, params: QueryParams) -> Result<RowStream>;

    /// Read table rows by key set, materializing all rows.
    fn read(&self, table: &str, columns: &[&str], key_set: KeySet) -> Result<RowSet> {
        self.read_with(table, columns, key_set, ReadOptions::new())
    }

    /// Read table rows by key set with per-call options.
    fn read_with(
        &self,
        table: &str,
        columns: &[&str],
        key_set: KeySet,
        options: ReadOptions,
    ) -> Result<RowSet>;

    /// Read table rows by key set, streaming rows as they arrive.
    fn read_stream(&self, table: &str, columns: &[&str], key_set: KeySet) -> Result<RowStream>;
}

/// Mutations against a transaction context.
///
/// `commit` is the only flush point: it collects everything appended
/// inside the block and sends exactly one commit RPC. The single-call
/// methods are conveniences that append one record and flush immediately,
/// so each standalone call is its own commit. The block form is the only
/// way to combine heterogeneous mutation kinds atomically.
pub trait Writable {
    /// Buffer mutations inside the block, then send them in one commit RPC.
    fn commit<F>(&self, f: F) -> Result<CommitResult>
    where
        F: FnOnce(&mut MutationBuffer) -> Result<()>,
        Self: Sized;

    /// Insert rows and commit immediately. Fails if a key already exists.
    fn insert(&self, table: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Result<CommitResult>
    where
        Self: Sized,
    {
        self.commit(|buffer| {
            buffer.insert(table, columns, rows);
            Ok(())
        })
    }

    /// Update rows and commit immediately. Fails if a key is missing.
    fn update(&self, table: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Result<CommitResult>
    where
        Self: Sized,
    {
        self.commit(|buffer| {
            buffer.update(table, columns, rows);
            Ok(())
        })
    }

    /// Insert or overwrite rows and commit immediately.
    fn insert_or_update(
        &self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> Result<CommitResult>
    where
        Self: Sized,
    {
        self.commit(|buffer| {
            buffer.insert_or_update(table, columns, rows);
            Ok(())
        })
    }

    /// Replace rows entirely and commit immediately. Unset columns become
    /// null.
    fn replace(&self, table: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Result<CommitResult>
    where
        Self: Sized,
    {
        self.commit(|buffer| {
            buffer.replace(table, columns, rows);
            Ok(())
        })
    }

    /// Delete the rows named by a key set and commit immediately.
    fn delete(&self, table: &str, key_set: KeySet) -> Result<CommitResult>
    where
        Self: Sized,
    {
        self.commit(|buffer| {
            buffer.delete(table, key_set);
            Ok(())
        })
    }
}
