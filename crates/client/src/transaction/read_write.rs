//! Read-write transaction handle

use super::capabilities::{Readable, Writable};
use super::{commit_with, LazyTransaction, ReadContext};
use crate::buffer::MutationBuffer;
use crate::results::{RowSet, RowStream};
use crate::session::Session;
use meridian_core::{
    CommitResult, KeySet, QueryParams, ReadOptions, Result, TransactionId, TransactionOptions,
    TransactionSelector,
};
use tracing::debug;

/// Locking read-write transaction.
///
/// Reads begin the transaction on first use and reuse the captured id
/// thereafter. Commits name the captured id when one exists; a commit
/// before any read requests a single-use read-write transaction instead,
/// since no server-side transaction exists yet. Handles are single-shot:
/// a retry layer constructs a brand-new handle per attempt.
#[derive(Debug)]
pub struct ReadWriteTransaction<'a> {
    session: &'a Session,
    tx: LazyTransaction,
}

impl<'a> ReadWriteTransaction<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self {
            session,
            tx: LazyTransaction::new(TransactionOptions::ReadWrite),
        }
    }

    /// The server-assigned id, once the first read has returned.
    pub fn transaction_id(&self) -> Option<TransactionId> {
        self.tx.id()
    }

    /// Roll back the transaction on the server.
    ///
    /// If no id has been captured there is no server-side transaction to
    /// roll back; no RPC is sent and the call succeeds.
    pub fn rollback(&self) -> Result<()> {
        match self.tx.id() {
            Some(id) => {
                let service = self.session.service()?;
                debug!(id = %id, "rolling back");
                service.rollback(self.session.name(), &id)
            }
            None => {
                debug!("rollback before begin, nothing to do");
                Ok(())
            }
        }
    }

    fn context(&self) -> ReadContext<'a> {
        ReadContext::new(self.session, self.tx.selector(), Some(self.tx.cell()))
    }

    fn commit_selector(&self) -> TransactionSelector {
        match self.tx.id() {
            Some(id) => TransactionSelector::Id(id),
            None => TransactionSelector::SingleUse(TransactionOptions::ReadWrite),
        }
    }
}

impl Readable for ReadWriteTransaction<'_> {
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

impl Writable for ReadWriteTransaction<'_> {
    fn commit<F>(&self, f: F) -> Result<CommitResult>
    where
        F: FnOnce(&mut MutationBuffer) -> Result<()>,
    {
        commit_with(self.session, self.commit_selector(), f)
    }
}
