//! Error types for the Meridian client
//!
//! This module defines the single error enum used throughout the client.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Server-reported conditions (`AlreadyExists`, `NotFound`, `Aborted`,
//! `InvalidArgument`) are surfaced to the caller verbatim; the client never
//! reinterprets them. The only locally-raised failure before an RPC is
//! `NotConnected`.

use std::io;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Meridian client
#[derive(Debug, Error)]
pub enum Error {
    /// A mutation tried to insert a row whose key already exists
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A referenced row, table, or transaction does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The server aborted the transaction due to a conflict
    ///
    /// Callers may retry by running the work again on a fresh handle.
    #[error("transaction aborted: {0}")]
    Aborted(String),

    /// A buffered read or query exceeded the response-size ceiling
    ///
    /// Switch to the streaming variant of the call to consume results of
    /// this size.
    #[error("buffered result of {size} bytes exceeds the {limit} byte limit")]
    ResponseTooLarge {
        /// Measured size of the materialized result
        size: usize,
        /// The ceiling that was exceeded
        limit: usize,
    },

    /// The server rejected a malformed request
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport-level failure reported by the service
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The session is not connected to a service
    #[error("session is not connected")]
    NotConnected,

    /// I/O error from the underlying channel
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this error is a server-side transaction abort
    ///
    /// Aborts are the one condition an outer policy layer is expected to
    /// retry on a brand-new transaction handle.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted(_))
    }
}
