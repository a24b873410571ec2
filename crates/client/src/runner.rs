//! Unit-of-work orchestration for read-write transactions

use crate::session::Session;
use crate::transaction::ReadWriteTransaction;
use meridian_core::Result;
use tracing::warn;

/// Runs a caller-supplied unit of work against a fresh read-write
/// transaction.
///
/// Each `run` call is exactly one attempt on a brand-new handle. The
/// runner performs no retries itself: id capture is single-shot per
/// handle, so an outer policy layer that retries on [`abort`] does it by
/// calling `run` again, never by reusing a handle. If the work never
/// issues a read or write, no RPC is sent at all; empty transactions are
/// legal no-ops.
///
/// [`abort`]: meridian_core::Error::is_aborted
#[derive(Debug)]
pub struct TransactionRunner<'a> {
    session: &'a Session,
}

impl<'a> TransactionRunner<'a> {
    /// Bind a runner to a session.
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Invoke `f` once with a fresh read-write transaction.
    ///
    /// On success the work's result is returned as-is; its reads and
    /// writes have already driven begin-on-first-use and any commits. On
    /// error, a begun server-side transaction is rolled back best-effort
    /// (no RPC when nothing began) and the work's error is propagated.
    pub fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadWriteTransaction<'a>) -> Result<T>,
    {
        let tx = self.session.read_write();
        match f(&tx) {
            Ok(value) => Ok(value),
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "rollback after failed work");
                }
                Err(err)
            }
        }
    }
}
