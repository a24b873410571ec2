//! Transactionless reads and auto-committed writes

use super::capabilities::{Readable, Writable};
use super::{commit_with, ReadContext};
use crate::buffer::MutationBuffer;
use crate::results::{RowSet, RowStream};
use crate::session::Session;
use meridian_core::{
    CommitResult, KeySet, QueryParams, ReadOptions, Result, TransactionOptions,
    TransactionSelector,
};

/// Handle for operations outside any explicit transaction.
///
/// Reads carry no transaction selector at all; the server executes each in
/// its own implicit single-use context. Every write commits immediately in
/// a single-use read-write transaction, so no transaction id ever exists
/// client-side.
#[derive(Debug)]
pub struct AutoCommit<'a> {
    session: &'a Session,
}

impl<'a> AutoCommit<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    fn context(&self) -> ReadContext<'a> {
        ReadContext::new(self.session, TransactionSelector::None, None)
    }
}

impl Readable for AutoCommit<'_> {
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

impl Writable for AutoCommit<'_> {
    fn commit<F>(&self, f: F) -> Result<CommitResult>
    where
        F: FnOnce(&mut MutationBuffer) -> Result<()>,
    {
        commit_with(
            self.session,
            TransactionSelector::SingleUse(TransactionOptions::ReadWrite),
            f,
        )
    }
}
