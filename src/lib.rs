//! Meridian - client library for the Meridian distributed SQL database
//!
//! The client manages the transaction lifecycle against a session-scoped
//! RPC backend: transactions begin on the server lazily with the first
//! operation that needs them, reads and queries resolve a fresh selector
//! per RPC, and mutations buffer locally until a commit flushes them.
//!
//! # Quick Start
//!
//! ```ignore
//! use meridiandb::{Readable, Session, SessionName, Writable};
//!
//! let session = Session::new(service, SessionName::new("sessions/s1"));
//!
//! // Auto-committed write: one mutation, one commit RPC
//! session.auto_commit().insert(
//!     "users",
//!     &["id", "name"],
//!     vec![vec![1i64.into(), "Ada".into()]],
//! )?;
//!
//! // Read-write transaction via the runner
//! session.run_read_write(|tx| {
//!     let rows = tx.query("SELECT id FROM users", Default::default())?;
//!     Ok(rows.len())
//! })?;
//! ```
//!
//! # Architecture
//!
//! All RPC plumbing lives behind the [`Service`] trait; the transaction
//! layer injects a resolved [`TransactionSelector`] into every call and
//! never constructs wire messages itself.

// Re-export the public API from meridian-client
pub use meridian_client::*;
