//! Transaction handles and lazy identity resolution
//!
//! A transaction does not exist on the server until the first RPC that
//! needs it. Each handle owns a capture cell: a mutex-gated slot for the
//! server-assigned id (and, for read-only transactions, the read
//! timestamp) that is written at most once. Selector resolution reads the
//! cell immediately before every RPC:
//!
//! - id captured → `Id`
//! - single-use handle → `SingleUse` with full options, every time
//! - otherwise → `Begin` with the handle's immutable options
//!
//! Handles are not safe for concurrent use. If two reads race on a fresh
//! handle, both send `Begin` and the first observed id wins the cell; the
//! mutex serializes only the local state update, not the network race.

mod auto_commit;
mod capabilities;
mod read_only;
mod read_write;

pub use auto_commit::AutoCommit;
pub use capabilities::{Readable, Writable};
pub use read_only::{ReadOnlyTransaction, SingleUseReadOnly};
pub use read_write::ReadWriteTransaction;

use crate::buffer::MutationBuffer;
use crate::results::{RowSet, RowStream};
use crate::session::Session;
use chrono::{DateTime, Utc};
use meridian_core::{
    CommitResult, KeySet, QueryParams, ReadOptions, Result, TransactionId, TransactionInfo,
    TransactionOptions, TransactionSelector,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Once-written slot for the server-assigned transaction identity.
///
/// Shared between a handle and any row streams it has produced, so a
/// streamed first operation can deliver the id when its first chunk is
/// pulled.
#[derive(Debug)]
pub(crate) struct CaptureCell {
    capture_read_timestamp: bool,
    state: Mutex<CaptureState>,
}

#[derive(Debug, Default)]
struct CaptureState {
    id: Option<TransactionId>,
    read_timestamp: Option<DateTime<Utc>>,
}

impl CaptureCell {
    pub(crate) fn new(capture_read_timestamp: bool) -> Self {
        Self {
            capture_read_timestamp,
            state: Mutex::new(CaptureState::default()),
        }
    }

    /// Record the descriptor from a begin response. First observed id wins;
    /// later descriptors are ignored.
    pub(crate) fn observe(&self, info: &TransactionInfo) {
        let mut state = self.state.lock();
        if state.id.is_some() {
            return;
        }
        debug!(id = %info.id, "transaction began");
        state.id = Some(info.id.clone());
        if self.capture_read_timestamp {
            state.read_timestamp = info.read_timestamp;
        }
    }

    pub(crate) fn id(&self) -> Option<TransactionId> {
        self.state.lock().id.clone()
    }

    pub(crate) fn read_timestamp(&self) -> Option<DateTime<Utc>> {
        self.state.lock().read_timestamp
    }
}

/// Immutable transaction options plus the capture cell: everything needed
/// to resolve a selector for the next RPC and absorb the begin response.
#[derive(Debug)]
pub(crate) struct LazyTransaction {
    options: TransactionOptions,
    cell: Arc<CaptureCell>,
}

impl LazyTransaction {
    pub(crate) fn new(options: TransactionOptions) -> Self {
        let capture_read_timestamp = options.is_read_only();
        Self {
            options,
            cell: Arc::new(CaptureCell::new(capture_read_timestamp)),
        }
    }

    /// Selector for the next read or query on this handle.
    pub(crate) fn selector(&self) -> TransactionSelector {
        match self.cell.id() {
            Some(id) => TransactionSelector::Id(id),
            None => TransactionSelector::Begin(self.options.clone()),
        }
    }

    pub(crate) fn cell(&self) -> Arc<CaptureCell> {
        Arc::clone(&self.cell)
    }

    pub(crate) fn id(&self) -> Option<TransactionId> {
        self.cell.id()
    }

    pub(crate) fn read_timestamp(&self) -> Option<DateTime<Utc>> {
        self.cell.read_timestamp()
    }
}

/// One read or query about to be issued: the session, the selector
/// resolved for this RPC, and the cell (if any) that absorbs a begin
/// response.
pub(crate) struct ReadContext<'a> {
    session: &'a Session,
    selector: TransactionSelector,
    capture: Option<Arc<CaptureCell>>,
}

impl<'a> ReadContext<'a> {
    pub(crate) fn new(
        session: &'a Session,
        selector: TransactionSelector,
        capture: Option<Arc<CaptureCell>>,
    ) -> Self {
        Self {
            session,
            selector,
            capture,
        }
    }

    fn observe(&self, info: Option<&TransactionInfo>) {
        if let (Some(cell), Some(info)) = (&self.capture, info) {
            cell.observe(info);
        }
    }

    pub(crate) fn query(self, sql: &str, params: QueryParams) -> Result<RowSet> {
        let service = self.session.service()?;
        let result = service.execute_sql(self.session.name(), sql, &params, &self.selector)?;
        self.observe(result.transaction.as_ref());
        RowSet::materialize(result)
    }

    pub(crate) fn query_stream(self, sql: &str, params: QueryParams) -> Result<RowStream> {
        let service = self.session.service()?;
        let chunks =
            service.streaming_execute_sql(self.session.name(), sql, &params, &self.selector)?;
        Ok(RowStream::new(chunks, self.capture))
    }

    pub(crate) fn read(
        self,
        table: &str,
        columns: &[&str],
        key_set: KeySet,
        options: ReadOptions,
    ) -> Result<RowSet> {
        let service = self.session.service()?;
        let columns = own_columns(columns);
        let result = service.read(
            self.session.name(),
            table,
            &columns,
            &key_set,
            options.limit,
            &self.selector,
        )?;
        self.observe(result.transaction.as_ref());
        RowSet::materialize(result)
    }

    pub(crate) fn read_stream(
        self,
        table: &str,
        columns: &[&str],
        key_set: KeySet,
        options: ReadOptions,
    ) -> Result<RowStream> {
        let service = self.session.service()?;
        let columns = own_columns(columns);
        let chunks = service.streaming_read(
            self.session.name(),
            table,
            &columns,
            &key_set,
            options.limit,
            &self.selector,
        )?;
        Ok(RowStream::new(chunks, self.capture))
    }
}

/// Flush one mutation block through a commit RPC.
///
/// The buffer append is pure and local; this is the only path that turns
/// buffered mutations into network I/O.
pub(crate) fn commit_with<F>(
    session: &Session,
    selector: TransactionSelector,
    f: F,
) -> Result<CommitResult>
where
    F: FnOnce(&mut MutationBuffer) -> Result<()>,
{
    let service = session.service()?;
    let mut buffer = MutationBuffer::new();
    f(&mut buffer)?;
    let mutations = buffer.into_mutations();
    debug!(mutations = mutations.len(), "committing");
    service.commit(session.name(), mutations, &selector)
}

fn own_columns(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}
