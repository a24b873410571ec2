//! Protocol limits
//!
//! Named constants for server-imposed ceilings the client enforces or
//! reports against.

/// Ceiling on a buffered (non-streaming) read or query response, in bytes
///
/// The server refuses to materialize larger unary responses; the client
/// applies the same ceiling when building a row set so callers get a
/// deterministic `ResponseTooLarge` and can switch to streaming.
pub const MAX_BUFFERED_RESULT_BYTES: usize = 10 * 1024 * 1024;
