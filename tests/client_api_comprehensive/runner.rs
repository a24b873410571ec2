//! Unit-of-work orchestration

use crate::harness;
use meridiandb::testing::RecordedCall;
use meridiandb::{
    Error, KeySet, Readable, TransactionId, TransactionRunner, Value, Writable,
};
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_empty_work_sends_no_rpc() {
    let (service, session) = harness();

    let answer = session.run_read_write(|_tx| Ok(42)).unwrap();
    assert_eq!(answer, 42);
    assert!(service.calls().is_empty());
}

#[test]
fn test_work_result_is_returned_and_reads_begin_lazily() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);
    session
        .auto_commit()
        .insert("t", &["id"], vec![vec![Value::Int(1)], vec![Value::Int(2)]])
        .unwrap();

    let count = session
        .run_read_write(|tx| {
            let rows = tx.read("t", &["id"], KeySet::all())?;
            Ok(rows.len())
        })
        .unwrap();
    assert_eq!(count, 2);

    let read_call = &service.calls()[1];
    assert!(read_call.transaction().unwrap().is_begin());
}

#[test]
fn test_error_before_any_rpc_rolls_nothing_back() {
    let (service, session) = harness();

    let err = session
        .run_read_write::<(), _>(|_tx| Err(Error::InvalidArgument("bad input".into())))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(service.calls().is_empty());
}

#[test]
fn test_error_after_begin_triggers_one_rollback() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);

    let err = session
        .run_read_write::<(), _>(|tx| {
            tx.read("t", &["id"], KeySet::all())?;
            Err(Error::InvalidArgument("giving up".into()))
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let calls = service.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[1], RecordedCall::Rollback { .. }));
    assert_eq!(service.open_transactions(), 0);
}

#[test]
fn test_outer_retry_gets_a_fresh_handle_per_attempt() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);
    session
        .auto_commit()
        .insert("t", &["id"], vec![vec![Value::Int(1)]])
        .unwrap();

    let attempts = AtomicUsize::new(0);
    let runner = TransactionRunner::new(&session);

    // caller-driven retry loop: an aborted attempt is retried by calling
    // run() again, which constructs a brand-new handle
    let result = loop {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        let outcome = runner.run(|tx| {
            tx.read("t", &["id"], KeySet::all())?;
            if attempt == 0 {
                service.fail_next(Error::Aborted("conflict".into()));
            }
            tx.commit(|buffer| {
                buffer.update("t", &["id"], vec![vec![Value::Int(1)]]);
                Ok(())
            })
        });
        match outcome {
            Err(err) if err.is_aborted() => continue,
            other => break other,
        }
    };
    result.unwrap();
    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    // two distinct transactions began, one per attempt
    let begin_ids: Vec<TransactionId> = service
        .calls()
        .iter()
        .filter_map(|c| match c {
            RecordedCall::Commit { transaction, .. } => transaction.id().cloned(),
            _ => None,
        })
        .collect();
    assert_eq!(begin_ids.len(), 2);
    assert_ne!(begin_ids[0], begin_ids[1]);
}
