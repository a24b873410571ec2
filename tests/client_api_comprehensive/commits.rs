//! Eager and block-batched commit paths, rollback, mutation semantics

use crate::{harness, key};
use meridiandb::testing::RecordedCall;
use meridiandb::{
    Error, KeySet, Mutation, Readable, TransactionOptions, TransactionSelector, Value, Writable,
    Write,
};

#[test]
fn test_standalone_insert_is_one_single_mutation_commit() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);

    session
        .auto_commit()
        .insert("t", &["id"], vec![vec![Value::Int(2)]])
        .unwrap();

    let calls = service.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        RecordedCall::Commit {
            mutations,
            transaction,
        } => {
            assert_eq!(
                mutations,
                &vec![Mutation::Insert(Write::new(
                    "t",
                    &["id"],
                    vec![vec![Value::Int(2)]],
                ))]
            );
            // no prior id existed, so the commit asks for a single-use
            // read-write transaction
            assert_eq!(
                transaction,
                &TransactionSelector::SingleUse(TransactionOptions::ReadWrite)
            );
        }
        other => panic!("expected a commit, got {other:?}"),
    }
}

#[test]
fn test_each_standalone_write_is_its_own_commit() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);

    let auto = session.auto_commit();
    auto.insert("t", &["id"], vec![vec![Value::Int(1)]]).unwrap();
    auto.update("t", &["id"], vec![vec![Value::Int(1)]]).unwrap();

    let commits: Vec<_> = service
        .calls()
        .into_iter()
        .filter(|c| matches!(c, RecordedCall::Commit { .. }))
        .collect();
    assert_eq!(commits.len(), 2);
}

#[test]
fn test_block_commit_sends_one_rpc_in_append_order() {
    let (service, session) = harness();
    service.create_table("t", &["id", "name"]);

    session
        .auto_commit()
        .commit(|buffer| {
            buffer.insert("t", &["id"], vec![vec![Value::Int(1)]]);
            buffer.insert_or_update(
                "t",
                &["id", "name"],
                vec![vec![Value::Int(1), Value::String("ada".into())]],
            );
            buffer.delete("t", KeySet::point(key(9)));
            Ok(())
        })
        .unwrap();

    let calls = service.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        RecordedCall::Commit { mutations, .. } => {
            let kinds: Vec<&str> = mutations.iter().map(Mutation::kind).collect();
            assert_eq!(kinds, vec!["insert", "insert_or_update", "delete"]);
        }
        other => panic!("expected a commit, got {other:?}"),
    }
}

#[test]
fn test_commit_after_read_names_the_captured_id() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);

    let tx = session.read_write();
    tx.read("t", &["id"], KeySet::all()).unwrap();
    let id = tx.transaction_id().expect("begun by the read");

    tx.commit(|buffer| {
        buffer.insert("t", &["id"], vec![vec![Value::Int(1)]]);
        Ok(())
    })
    .unwrap();

    let calls = service.calls();
    assert_eq!(
        calls[1].transaction(),
        Some(&TransactionSelector::Id(id))
    );
    // the commit consumed the server-side transaction
    assert_eq!(service.open_transactions(), 0);
}

#[test]
fn test_commit_without_prior_read_requests_single_use() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);

    let tx = session.read_write();
    tx.commit(|buffer| {
        buffer.insert("t", &["id"], vec![vec![Value::Int(1)]]);
        Ok(())
    })
    .unwrap();

    assert_eq!(
        service.calls()[0].transaction(),
        Some(&TransactionSelector::SingleUse(TransactionOptions::ReadWrite))
    );
}

#[test]
fn test_rollback_before_begin_sends_no_rpc() {
    let (service, session) = harness();

    let tx = session.read_write();
    tx.rollback().unwrap();

    assert!(service.calls().is_empty());
}

#[test]
fn test_rollback_after_begin_names_the_id() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);

    let tx = session.read_write();
    tx.read("t", &["id"], KeySet::all()).unwrap();
    let id = tx.transaction_id().expect("begun by the read");

    tx.rollback().unwrap();

    match service.calls().last() {
        Some(RecordedCall::Rollback { transaction_id }) => assert_eq!(transaction_id, &id),
        other => panic!("expected a rollback, got {other:?}"),
    }
    assert_eq!(service.open_transactions(), 0);
}

#[test]
fn test_insert_existing_key_already_exists() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);

    let auto = session.auto_commit();
    auto.insert("t", &["id"], vec![vec![Value::Int(1)]]).unwrap();
    let err = auto
        .insert("t", &["id"], vec![vec![Value::Int(1)]])
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
}

#[test]
fn test_update_missing_key_not_found() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);

    let err = session
        .auto_commit()
        .update("t", &["id"], vec![vec![Value::Int(7)]])
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_replace_nulls_unset_columns() {
    let (service, session) = harness();
    service.create_table("t", &["id", "a", "b"]);

    let auto = session.auto_commit();
    auto.insert(
        "t",
        &["id", "a", "b"],
        vec![vec![Value::Int(1), Value::Int(10), Value::Int(20)]],
    )
    .unwrap();

    auto.replace("t", &["id", "a"], vec![vec![Value::Int(1), Value::Int(11)]])
        .unwrap();

    assert_eq!(
        service.table_rows("t"),
        vec![vec![Value::Int(1), Value::Int(11), Value::Null]]
    );
}

#[test]
fn test_insert_or_update_preserves_unlisted_columns() {
    let (service, session) = harness();
    service.create_table("t", &["id", "a", "b"]);

    let auto = session.auto_commit();
    auto.insert(
        "t",
        &["id", "a", "b"],
        vec![vec![Value::Int(1), Value::Int(10), Value::Int(20)]],
    )
    .unwrap();

    auto.insert_or_update("t", &["id", "a"], vec![vec![Value::Int(1), Value::Int(11)]])
        .unwrap();

    assert_eq!(
        service.table_rows("t"),
        vec![vec![Value::Int(1), Value::Int(11), Value::Int(20)]]
    );
}

#[test]
fn test_delete_is_idempotent() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);

    let auto = session.auto_commit();
    auto.insert("t", &["id"], vec![vec![Value::Int(1)]]).unwrap();

    auto.delete("t", KeySet::keys(vec![key(1), key(42)])).unwrap();
    auto.delete("t", KeySet::point(key(1))).unwrap();

    assert!(service.table_rows("t").is_empty());
}

#[test]
fn test_failed_commit_leaves_tables_untouched() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);

    let auto = session.auto_commit();
    auto.insert("t", &["id"], vec![vec![Value::Int(1)]]).unwrap();

    // second record collides, so the whole block must not apply
    let err = auto
        .commit(|buffer| {
            buffer.insert("t", &["id"], vec![vec![Value::Int(2)]]);
            buffer.insert("t", &["id"], vec![vec![Value::Int(1)]]);
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));

    assert_eq!(service.table_rows("t"), vec![vec![Value::Int(1)]]);
}

#[test]
fn test_repeated_records_forwarded_without_dedup() {
    let (service, session) = harness();
    service.create_table("t", &["id", "a"]);

    session
        .auto_commit()
        .commit(|buffer| {
            buffer.insert_or_update("t", &["id", "a"], vec![vec![Value::Int(1), Value::Int(1)]]);
            buffer.insert_or_update("t", &["id", "a"], vec![vec![Value::Int(1), Value::Int(2)]]);
            Ok(())
        })
        .unwrap();

    match &service.calls()[0] {
        RecordedCall::Commit { mutations, .. } => assert_eq!(mutations.len(), 2),
        other => panic!("expected a commit, got {other:?}"),
    }
    // last record wins server-side
    assert_eq!(
        service.table_rows("t"),
        vec![vec![Value::Int(1), Value::Int(2)]]
    );
}
