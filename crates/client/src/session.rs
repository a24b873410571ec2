//! Session handles
//!
//! A session pairs the opaque server-side session name with the shared
//! service facade. Sessions are created and pooled by the surrounding
//! layer; here they are the anchor every transaction handle borrows. All
//! handle constructors live on the session so a transaction is bound to
//! exactly one session for its lifetime.

use crate::runner::TransactionRunner;
use crate::transaction::{
    AutoCommit, ReadOnlyTransaction, ReadWriteTransaction, SingleUseReadOnly,
};
use meridian_core::{
    Error, ReadOnlyOptions, Result, Service, SessionName, TimestampBound,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A client-side handle to one server session scope.
pub struct Session {
    name: SessionName,
    service: Arc<dyn Service>,
    connected: AtomicBool,
}

impl Session {
    /// Bind a session name to a service facade.
    pub fn new(service: Arc<dyn Service>, name: SessionName) -> Self {
        Self {
            name,
            service,
            connected: AtomicBool::new(true),
        }
    }

    /// The session's server-side name.
    pub fn name(&self) -> &SessionName {
        &self.name
    }

    /// Whether the session still has an active connection.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Detach the session from its service. Any later RPC attempt fails
    /// with `NotConnected` before reaching the network.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
    }

    /// The service facade, gated on the connection precondition.
    pub(crate) fn service(&self) -> Result<&dyn Service> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(self.service.as_ref())
    }

    /// Handle for transactionless reads and auto-committed writes.
    pub fn auto_commit(&self) -> AutoCommit<'_> {
        AutoCommit::new(self)
    }

    /// Single-use read-only transaction with the given staleness bound.
    pub fn single_use(&self, bound: TimestampBound) -> SingleUseReadOnly<'_> {
        self.single_use_with(ReadOnlyOptions::new(bound))
    }

    /// Single-use read-only transaction with full options.
    pub fn single_use_with(&self, options: ReadOnlyOptions) -> SingleUseReadOnly<'_> {
        SingleUseReadOnly::new(self, options)
    }

    /// Multi-use read-only transaction with the given staleness bound.
    pub fn read_only(&self, bound: TimestampBound) -> ReadOnlyTransaction<'_> {
        self.read_only_with(ReadOnlyOptions::new(bound))
    }

    /// Multi-use read-only transaction with full options.
    pub fn read_only_with(&self, options: ReadOnlyOptions) -> ReadOnlyTransaction<'_> {
        ReadOnlyTransaction::new(self, options)
    }

    /// Fresh read-write transaction handle.
    pub fn read_write(&self) -> ReadWriteTransaction<'_> {
        ReadWriteTransaction::new(self)
    }

    /// Run a unit of work against a fresh read-write transaction.
    ///
    /// Convenience for [`TransactionRunner::run`].
    pub fn run_read_write<'s, T, F>(&'s self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadWriteTransaction<'s>) -> Result<T>,
    {
        TransactionRunner::new(self).run(f)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("connected", &self.is_connected())
            .finish()
    }
}
