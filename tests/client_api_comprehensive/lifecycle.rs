//! Begin-on-first-use and id capture across handle kinds

use crate::{harness, key};
use meridiandb::testing::RecordedCall;
use meridiandb::{
    KeySet, QueryParams, Readable, ReadOnlyOptions, TimestampBound, TransactionOptions,
    TransactionSelector, Value, Writable,
};
use std::time::Duration;

#[test]
fn test_fresh_read_write_first_read_sends_begin() {
    let (service, session) = harness();
    service.create_table("accounts", &["id", "balance"]);

    let tx = session.read_write();
    tx.read("accounts", &["id"], KeySet::all()).unwrap();

    let calls = service.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].transaction(),
        Some(&TransactionSelector::Begin(TransactionOptions::ReadWrite))
    );
}

#[test]
fn test_second_read_reuses_captured_id() {
    let (service, session) = harness();
    service.create_table("accounts", &["id"]);

    let tx = session.read_write();
    tx.read("accounts", &["id"], KeySet::all()).unwrap();
    tx.read("accounts", &["id"], KeySet::all()).unwrap();

    let id = tx.transaction_id().expect("id captured by first read");
    let calls = service.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].transaction().unwrap().is_begin());
    assert_eq!(
        calls[1].transaction(),
        Some(&TransactionSelector::Id(id))
    );
    // exactly one server-side transaction exists
    assert_eq!(service.open_transactions(), 1);
}

#[test]
fn test_query_then_read_share_one_transaction() {
    let (service, session) = harness();
    service.create_table("accounts", &["id"]);
    service.stage_query("SELECT id FROM accounts", &["id"], vec![vec![Value::Int(1)]]);

    let tx = session.read_write();
    let rows = tx
        .query("SELECT id FROM accounts", QueryParams::new())
        .unwrap();
    assert_eq!(rows.len(), 1);
    tx.read("accounts", &["id"], KeySet::all()).unwrap();

    let calls = service.calls();
    assert!(calls[0].transaction().unwrap().is_begin());
    assert_eq!(
        calls[1].transaction().unwrap().id(),
        tx.transaction_id().as_ref()
    );
}

#[test]
fn test_single_use_never_caches_an_id() {
    let (service, session) = harness();
    service.create_table("accounts", &["id"]);

    let expected = TransactionSelector::SingleUse(TransactionOptions::ReadOnly(
        ReadOnlyOptions::new(TimestampBound::Strong),
    ));

    let su = session.single_use(TimestampBound::Strong);
    su.read("accounts", &["id"], KeySet::all()).unwrap();
    // a second operation is discouraged but still resolves to inline options
    su.read("accounts", &["id"], KeySet::all()).unwrap();

    let calls = service.calls();
    assert_eq!(calls[0].transaction(), Some(&expected));
    assert_eq!(calls[1].transaction(), Some(&expected));
    assert_eq!(service.open_transactions(), 0);
}

#[test]
fn test_read_only_captures_id_and_read_timestamp() {
    let (service, session) = harness();
    service.create_table("accounts", &["id"]);

    let ro = session.read_only(TimestampBound::Strong);
    assert!(ro.transaction_id().is_none());
    assert!(ro.read_timestamp().is_none());

    ro.read("accounts", &["id"], KeySet::all()).unwrap();

    let id = ro.transaction_id().expect("id captured");
    assert!(ro.read_timestamp().is_some());

    ro.read("accounts", &["id"], KeySet::all()).unwrap();
    assert_eq!(
        service.calls()[1].transaction(),
        Some(&TransactionSelector::Id(id))
    );
}

#[test]
fn test_exact_staleness_begin_carries_options() {
    let (service, session) = harness();
    service.create_table("accounts", &["id"]);

    let ro = session.read_only(TimestampBound::ExactStaleness(Duration::new(1, 2)));
    ro.read("accounts", &["id"], KeySet::all()).unwrap();

    let expected = TransactionSelector::Begin(TransactionOptions::ReadOnly(
        ReadOnlyOptions::new(TimestampBound::ExactStaleness(Duration::new(1, 2))),
    ));
    assert_eq!(service.calls()[0].transaction(), Some(&expected));
}

#[test]
fn test_auto_commit_reads_carry_no_transaction() {
    let (service, session) = harness();
    service.create_table("accounts", &["id"]);

    session
        .auto_commit()
        .read("accounts", &["id"], KeySet::all())
        .unwrap();

    assert_eq!(
        service.calls()[0].transaction(),
        Some(&TransactionSelector::None)
    );
    assert_eq!(service.open_transactions(), 0);
}

#[test]
fn test_read_returns_rows_in_key_order() {
    let (service, session) = harness();
    service.create_table("accounts", &["id", "balance"]);

    let auto = session.auto_commit();
    auto.commit(|buffer| {
        buffer.insert(
            "accounts",
            &["id", "balance"],
            vec![
                vec![Value::Int(2), Value::Int(20)],
                vec![Value::Int(1), Value::Int(10)],
                vec![Value::Int(3), Value::Int(30)],
            ],
        );
        Ok(())
    })
    .unwrap();

    let rows = auto.read("accounts", &["id", "balance"], KeySet::all()).unwrap();
    let ids: Vec<&Value> = rows.rows().iter().map(|r| r.get(0).unwrap()).collect();
    assert_eq!(ids, vec![&Value::Int(1), &Value::Int(2), &Value::Int(3)]);

    let row = &rows.rows()[1];
    assert_eq!(row.get_by_name("balance"), Some(&Value::Int(20)));
}

#[test]
fn test_read_by_point_keys_and_limit() {
    let (service, session) = harness();
    service.create_table("accounts", &["id"]);

    let auto = session.auto_commit();
    auto.insert(
        "accounts",
        &["id"],
        vec![vec![Value::Int(1)], vec![Value::Int(2)], vec![Value::Int(3)]],
    )
    .unwrap();

    let rows = auto
        .read(
            "accounts",
            &["id"],
            KeySet::keys(vec![key(1), key(3), key(9)]),
        )
        .unwrap();
    assert_eq!(rows.len(), 2);

    let limited = auto
        .read_with(
            "accounts",
            &["id"],
            KeySet::all(),
            meridiandb::ReadOptions::new().limit(2),
        )
        .unwrap();
    assert_eq!(limited.len(), 2);
}

#[test]
fn test_reads_visible_through_recording() {
    let (service, session) = harness();
    service.create_table("t", &["id"]);

    session
        .auto_commit()
        .read("t", &["id"], KeySet::all())
        .unwrap();

    match &service.calls()[0] {
        RecordedCall::Read { table, .. } => assert_eq!(table, "t"),
        other => panic!("expected a read, got {other:?}"),
    }
}
