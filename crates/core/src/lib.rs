//! Core types and traits for the Meridian client
//!
//! This crate defines the data model the transaction layer moves across
//! the service boundary:
//! - SessionName, TransactionId, TransactionInfo: identity types
//! - Value: unified cell value enum
//! - KeySet: key filters for reads and deletes
//! - TimestampBound, TransactionOptions: immutable transaction parameters
//! - TransactionSelector: the per-RPC transaction context
//! - Mutation: row-level change records
//! - Service: the collaborator boundary trait
//! - Error: error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod keyset;
pub mod limits;
pub mod mutation;
pub mod options;
pub mod selector;
pub mod service;
pub mod types;
pub mod value;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use keyset::{KeyBound, KeyRange, KeySet};
pub use limits::MAX_BUFFERED_RESULT_BYTES;
pub use mutation::{Mutation, Write};
pub use options::{
    QueryParams, ReadOnlyOptions, ReadOptions, TimestampBound, TransactionOptions,
};
pub use selector::TransactionSelector;
pub use service::{ResultSet, ResultStream, Service, StreamChunk};
pub use types::{CommitResult, SessionName, TransactionId, TransactionInfo};
pub use value::Value;
