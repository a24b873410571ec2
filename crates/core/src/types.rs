//! Identity types shared across the client
//!
//! This module defines the foundational types:
//! - SessionName: opaque path of a server-side session scope
//! - TransactionId: opaque server-assigned transaction token
//! - TransactionInfo: the transaction descriptor embedded in responses
//! - CommitResult: outcome of a successful commit

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque path identifying a server-side session scope
///
/// Sessions are created and owned by the surrounding layer; the client core
/// only carries the name into every RPC. A transaction is bound to exactly
/// one session for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionName(String);

impl SessionName {
    /// Create a session name from its path string
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque server-assigned transaction token
///
/// The server mints the token when a transaction begins; the client treats
/// it as a byte string and echoes it back in later selectors. Display
/// renders standard base64 since the raw bytes are not text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Vec<u8>);

impl TransactionId {
    /// Wrap raw token bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The raw token bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BASE64.encode(&self.0))
    }
}

/// Transaction descriptor embedded in RPC responses
///
/// Present exactly when the request carried a "begin" selector; carries the
/// newly-assigned id and, for read-only transactions that asked for it, the
/// timestamp the server chose to read at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInfo {
    /// The server-assigned transaction id
    pub id: TransactionId,
    /// Read timestamp chosen by the server (read-only transactions)
    pub read_timestamp: Option<DateTime<Utc>>,
}

/// Outcome of a successful commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitResult {
    /// The timestamp the commit was applied at
    pub commit_timestamp: DateTime<Utc>,
}
