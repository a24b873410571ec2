//! Client API Comprehensive Test Suite
//!
//! End-to-end coverage of the transaction lifecycle against the in-process
//! service: selector resolution, id capture, commit paths, streaming, and
//! error surfacing.
//!
//! ## Areas Covered
//!
//! - `lifecycle`: begin-on-first-use and id capture across handle kinds
//! - `commits`: eager and block-batched commit paths, rollback, mutation
//!   semantics
//! - `streaming`: lazy row streams, first-chunk capture, the buffered-size
//!   ceiling
//! - `errors`: verbatim error surfacing and the connection precondition
//! - `runner`: unit-of-work orchestration
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test client_api_comprehensive
//!
//! # Run one area
//! cargo test --test client_api_comprehensive lifecycle::
//! ```

use std::sync::Arc;

use meridiandb::testing::InProcessService;
use meridiandb::{Session, SessionName, Value};

/// Install a test-writer tracing subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Fresh in-process service plus a session bound to it.
pub fn harness() -> (Arc<InProcessService>, Session) {
    init_tracing();
    let service = Arc::new(InProcessService::new());
    let session = Session::new(
        Arc::clone(&service) as Arc<dyn meridiandb::Service>,
        SessionName::new("databases/test/sessions/s1"),
    );
    (service, session)
}

/// Single-cell key helper.
pub fn key(id: i64) -> Vec<Value> {
    vec![Value::Int(id)]
}

// Test modules by area
mod commits;
mod lifecycle;
mod runner;
