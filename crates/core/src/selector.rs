//! Per-RPC transaction selectors
//!
//! Every RPC carries a selector telling the server which transaction
//! context to use. Selectors are computed fresh from the handle's current
//! state immediately before each call and never persisted:
//!
//! - id already captured → `Id`
//! - single-use handle → `SingleUse` with full options, every time
//! - multi-use handle before first response → `Begin` with the handle's
//!   immutable options
//! - no transaction at all → `None`

use crate::options::TransactionOptions;
use crate::types::TransactionId;
use serde::{Deserialize, Serialize};

/// The transaction context attached to one RPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransactionSelector {
    /// No transaction; the server executes the call in its own implicit
    /// single-use context
    None,
    /// Execute in a single-use transaction the server creates and discards
    SingleUse(TransactionOptions),
    /// Begin a new transaction with these options and return its id
    Begin(TransactionOptions),
    /// Use the already-known transaction
    Id(TransactionId),
}

impl TransactionSelector {
    /// Whether this selector asks the server to begin a transaction
    pub fn is_begin(&self) -> bool {
        matches!(self, TransactionSelector::Begin(_))
    }

    /// The id, when this selector names an existing transaction
    pub fn id(&self) -> Option<&TransactionId> {
        match self {
            TransactionSelector::Id(id) => Some(id),
            _ => None,
        }
    }
}
