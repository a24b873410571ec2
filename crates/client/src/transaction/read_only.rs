//! Read-only transaction handles

use super::capabilities::Readable;
use super::{LazyTransaction, ReadContext};
use crate::results::{RowSet, RowStream};
use crate::session::Session;
use chrono::{DateTime, Utc};
use meridian_core::{
    KeySet, QueryParams, ReadOnlyOptions, ReadOptions, Result, TransactionId, TransactionOptions,
    TransactionSelector,
};

/// Read-only transaction the server creates and discards per RPC.
///
/// Never acquires an id: every operation re-sends the full options inline,
/// so there is nothing to begin, commit, or roll back. The contract is one
/// operation per handle; further operations are discouraged but harmless,
/// each executing in its own fresh single-use context.
#[derive(Debug)]
pub struct SingleUseReadOnly<'a> {
    session: &'a Session,
    options: ReadOnlyOptions,
}

impl<'a> SingleUseReadOnly<'a> {
    pub(crate) fn new(session: &'a Session, options: ReadOnlyOptions) -> Self {
        Self { session, options }
    }

    /// The immutable options sent inline with every operation.
    pub fn options(&self) -> &ReadOnlyOptions {
        &self.options
    }

    fn context(&self) -> ReadContext<'a> {
        let selector =
            TransactionSelector::SingleUse(TransactionOptions::ReadOnly(self.options.clone()));
        ReadContext::new(self.session, selector, None)
    }
}

impl Readable for SingleUseReadOnly<'_> {
    fn query(&self, sql: &str, params: QueryParams) -> Result<RowSet> {
        self.context().query(sql, params)
    }

    fn query_stream(&self, sql: &str, params: QueryParams) -> Result<RowStream> {
        self.context().query_stream(sql, params)
    }

    fn read_with(
        &self,
        table: &str,
        columns: &[&str],
        key_set: KeySet,
        options: ReadOptions,
    ) -> Result<RowSet> {
        self.context().read(table, columns, key_set, options)
    }

    fn read_stream(&self, table: &str, columns: &[&str], key_set: KeySet) -> Result<RowStream> {
        self.context()
            .read_stream(table, columns, key_set, ReadOptions::new())
    }
}

/// Multi-use read-only transaction.
///
/// The first operation embeds a begin descriptor; the server's response
/// carries the assigned id and the read timestamp it chose, and every
/// later operation names that id. All reads observe the same snapshot.
#[derive(Debug)]
pub struct ReadOnlyTransaction<'a> {
    session: &'a Session,
    tx: LazyTransaction,
}

impl<'a> ReadOnlyTransaction<'a> {
    pub(crate) fn new(session: &'a Session, options: ReadOnlyOptions) -> Self {
        Self {
            session,
            tx: LazyTransaction::new(TransactionOptions::ReadOnly(options)),
        }
    }

    /// The server-assigned id, once the first operation has returned.
    pub fn transaction_id(&self) -> Option<TransactionId> {
        self.tx.id()
    }

    /// The timestamp the server chose to read at, once known.
    pub fn read_timestamp(&self) -> Option<DateTime<Utc>> {
        self.tx.read_timestamp()
    }

    fn context(&self) -> ReadContext<'a> {
        ReadContext::new(self.session, self.tx.selector(), Some(self.tx.cell()))
    }
}

impl Readable for ReadOnlyTransaction<'_> {
    fn query(&self, sql: &str, params: QueryParams) -> Result<RowSet> {
        self.context().query(sql, params)
    }

    fn query_stream(&self, sql: &str, params: QueryParams) -> Result<RowStream> {
        self.context().query_stream(sql, params)
    }

    fn read_with(
        &self,
        table: &str,
        columns: &[&str],
        key_set: KeySet,
        options: ReadOptions,
    ) -> Result<RowSet> {
        self.context().read(table, columns, key_set, options)
    }

    fn read_stream(&self, table: &str, columns: &[&str], key_set: KeySet) -> Result<RowStream> {
        self.context()
            .read_stream(table, columns, key_set, ReadOptions::new())
    }
}
