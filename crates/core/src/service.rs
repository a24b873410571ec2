//! The collaborator boundary: semantic RPC operations
//!
//! This module defines the `Service` trait the transaction layer calls
//! into. Implementations own everything below the semantic call: request
//! marshaling, credentials, channels, and retry of transient transport
//! failures. The transaction layer injects the resolved
//! `TransactionSelector` and never constructs wire messages itself.
//!
//! Thread safety: one service instance is shared read-mostly across many
//! sessions and transaction handles (requires Send + Sync); it holds no
//! per-transaction mutable state.

use crate::error::Result;
use crate::keyset::KeySet;
use crate::mutation::Mutation;
use crate::options::QueryParams;
use crate::selector::TransactionSelector;
use crate::types::{CommitResult, SessionName, TransactionId, TransactionInfo};
use crate::value::Value;

/// A fully-materialized query or read response
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// Transaction descriptor; present exactly when the request carried a
    /// `Begin` selector
    pub transaction: Option<TransactionInfo>,
    /// Column names, one per cell position
    pub columns: Vec<String>,
    /// Row values
    pub rows: Vec<Vec<Value>>,
}

/// One chunk of a streaming response
///
/// The first chunk carries the column names and, for begin requests, the
/// transaction descriptor; later chunks carry rows only.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    /// Transaction descriptor, first chunk of a begin request only
    pub transaction: Option<TransactionInfo>,
    /// Column names, first chunk only
    pub columns: Option<Vec<String>>,
    /// Row values in this chunk
    pub rows: Vec<Vec<Value>>,
}

/// Lazily-pulled sequence of response chunks
///
/// Single-pass and non-restartable; the caller drains it fully or
/// partially and the underlying network consumption follows the pulls.
pub type ResultStream = Box<dyn Iterator<Item = Result<StreamChunk>> + Send>;

/// Semantic RPC surface of the Meridian backend
///
/// All operations are synchronous and fallible. Server-reported errors are
/// returned verbatim; implementations do not reinterpret them.
pub trait Service: Send + Sync {
    /// Execute a SQL statement, materializing the full response
    ///
    /// # Errors
    ///
    /// Returns any server-reported or transport error unmodified.
    fn execute_sql(
        &self,
        session: &SessionName,
        sql: &str,
        params: &QueryParams,
        transaction: &TransactionSelector,
    ) -> Result<ResultSet>;

    /// Execute a SQL statement, streaming the response
    ///
    /// # Errors
    ///
    /// Returns any server-reported or transport error unmodified; errors
    /// after the first chunk surface through the stream items.
    fn streaming_execute_sql(
        &self,
        session: &SessionName,
        sql: &str,
        params: &QueryParams,
        transaction: &TransactionSelector,
    ) -> Result<ResultStream>;

    /// Read rows from a table by key set, materializing the full response
    ///
    /// # Errors
    ///
    /// Returns any server-reported or transport error unmodified.
    fn read(
        &self,
        session: &SessionName,
        table: &str,
        columns: &[String],
        key_set: &KeySet,
        limit: Option<i64>,
        transaction: &TransactionSelector,
    ) -> Result<ResultSet>;

    /// Read rows from a table by key set, streaming the response
    ///
    /// # Errors
    ///
    /// Returns any server-reported or transport error unmodified; errors
    /// after the first chunk surface through the stream items.
    fn streaming_read(
        &self,
        session: &SessionName,
        table: &str,
        columns: &[String],
        key_set: &KeySet,
        limit: Option<i64>,
        transaction: &TransactionSelector,
    ) -> Result<ResultStream>;

    /// Apply buffered mutations atomically
    ///
    /// The selector must name an existing transaction (`Id`) or request a
    /// single-use read-write transaction (`SingleUse`).
    ///
    /// # Errors
    ///
    /// Returns mutation conflicts (`AlreadyExists`, `NotFound`, `Aborted`)
    /// and transport errors unmodified.
    fn commit(
        &self,
        session: &SessionName,
        mutations: Vec<Mutation>,
        transaction: &TransactionSelector,
    ) -> Result<CommitResult>;

    /// Roll back a begun transaction
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the server no longer knows the transaction.
    fn rollback(&self, session: &SessionName, transaction_id: &TransactionId) -> Result<()>;
}
