//! Transaction lifecycle management for the Meridian client
//!
//! This crate decides when a transaction begins on the server, how reads
//! and writes are associated with it, how mutations are buffered and
//! committed, and how lazily-resolved transaction identity is propagated
//! across round-trips. The RPC machinery itself lives behind the
//! [`Service`](meridian_core::Service) trait.
//!
//! # Quick start
//!
//! ```ignore
//! use meridian_client::{Readable, Session, Writable};
//! use meridian_client::core::{KeySet, QueryParams, SessionName, TimestampBound};
//!
//! let session = Session::new(service, SessionName::new("sessions/s1"));
//!
//! // Reads begin the transaction lazily; the first RPC carries a begin
//! // descriptor, later ones the captured id.
//! let result = session.run_read_write(|tx| {
//!     let rows = tx.read("accounts", &["id", "balance"], KeySet::all())?;
//!     tx.commit(|buffer| {
//!         buffer.update("accounts", &["id", "balance"], vec![/* ... */]);
//!         Ok(())
//!     })?;
//!     Ok(rows.len())
//! })?;
//! ```

#![warn(clippy::all)]

pub mod buffer;
pub mod results;
pub mod runner;
pub mod session;
pub mod testing;
pub mod transaction;

/// The core data model this client is built on.
pub use meridian_core as core;

pub use buffer::MutationBuffer;
pub use results::{Row, RowSet, RowStream};
pub use runner::TransactionRunner;
pub use session::Session;
pub use transaction::{
    AutoCommit, Readable, ReadOnlyTransaction, ReadWriteTransaction, SingleUseReadOnly, Writable,
};

// Flatten the most-used core types into this crate's root.
pub use meridian_core::{
    CommitResult, Error, KeyBound, KeyRange, KeySet, Mutation, QueryParams, ReadOnlyOptions,
    ReadOptions, Result, Service, SessionName, TimestampBound, TransactionId, TransactionInfo,
    TransactionOptions, TransactionSelector, Value, Write, MAX_BUFFERED_RESULT_BYTES,
};
