//! In-process service for tests and benches
//!
//! `InProcessService` implements the full `Service` contract against
//! in-memory tables, so transaction lifecycle behavior can be exercised
//! end to end without a server:
//!
//! - begin selectors mint real transaction ids (UUID bytes) and return a
//!   descriptor, exactly once per begin
//! - commits apply mutations atomically with the server's per-kind rules
//!   (insert fails on an existing key, update on a missing key,
//!   insert-or-update overwrites, replace nulls unset columns, delete is
//!   idempotent)
//! - every call is recorded with the selector it carried, so tests can
//!   assert begin-then-id sequences
//! - arbitrary errors can be injected ahead of the next call
//!
//! Tables are keyed by their first column. SQL is not interpreted;
//! queries are served from staged results by exact statement text.

use chrono::Utc;
use dashmap::DashMap;
use meridian_core::{
    CommitResult, Error, KeyBound, KeySet, Mutation, QueryParams, Result, ResultSet,
    ResultStream, Service, SessionName, StreamChunk, TransactionId, TransactionInfo,
    TransactionOptions, TransactionSelector, Value, Write,
};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, VecDeque};
use uuid::Uuid;

/// One recorded RPC, with the transaction selector it carried.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// A unary query
    ExecuteSql {
        /// Statement text
        sql: String,
        /// Selector attached to the call
        transaction: TransactionSelector,
    },
    /// A streaming query
    StreamingExecuteSql {
        /// Statement text
        sql: String,
        /// Selector attached to the call
        transaction: TransactionSelector,
    },
    /// A unary table read
    Read {
        /// Target table
        table: String,
        /// Selector attached to the call
        transaction: TransactionSelector,
    },
    /// A streaming table read
    StreamingRead {
        /// Target table
        table: String,
        /// Selector attached to the call
        transaction: TransactionSelector,
    },
    /// A commit
    Commit {
        /// Mutations carried by the commit, in submission order
        mutations: Vec<Mutation>,
        /// Selector attached to the call
        transaction: TransactionSelector,
    },
    /// A rollback
    Rollback {
        /// The id being rolled back
        transaction_id: TransactionId,
    },
}

impl RecordedCall {
    /// The selector this call carried, if the call kind has one.
    pub fn transaction(&self) -> Option<&TransactionSelector> {
        match self {
            RecordedCall::ExecuteSql { transaction, .. }
            | RecordedCall::StreamingExecuteSql { transaction, .. }
            | RecordedCall::Read { transaction, .. }
            | RecordedCall::StreamingRead { transaction, .. }
            | RecordedCall::Commit { transaction, .. } => Some(transaction),
            RecordedCall::Rollback { .. } => None,
        }
    }
}

/// Key tuple with a total order so rows can live in a BTreeMap.
///
/// Cells of the same type order naturally (floats by total order); mixed
/// types order by a fixed type rank. Test-support ordering only - the
/// public `Value` keeps its strict no-coercion equality.
#[derive(Debug, Clone)]
struct OrderedKey(Vec<Value>);

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) => 2,
        Value::Float(_) => 3,
        Value::String(_) => 4,
        Value::Bytes(_) => 5,
        Value::Timestamp(_) => 6,
        Value::Array(_) => 7,
    }
}

fn cmp_cell(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bytes(x), Value::Bytes(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => cmp_tuple(x, y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn cmp_tuple(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match cmp_cell(x, y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

impl PartialEq for OrderedKey {
    fn eq(&self, other: &Self) -> bool {
        cmp_tuple(&self.0, &other.0) == Ordering::Equal
    }
}

impl Eq for OrderedKey {}

impl PartialOrd for OrderedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_tuple(&self.0, &other.0)
    }
}

#[derive(Debug, Clone)]
struct Table {
    name: String,
    columns: Vec<String>,
    rows: BTreeMap<OrderedKey, Vec<Value>>,
}

#[derive(Debug, Clone)]
struct StagedResult {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

#[derive(Clone, Copy)]
enum WriteMode {
    Insert,
    Update,
    InsertOrUpdate,
    Replace,
}

/// In-memory implementation of the full `Service` contract.
pub struct InProcessService {
    tables: DashMap<String, Table>,
    transactions: DashMap<Vec<u8>, TransactionOptions>,
    staged: Mutex<HashMap<String, StagedResult>>,
    calls: Mutex<Vec<RecordedCall>>,
    failures: Mutex<VecDeque<Error>>,
    chunk_rows: usize,
}

impl Default for InProcessService {
    fn default() -> Self {
        Self::new()
    }
}

impl InProcessService {
    /// Empty service with no tables.
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            transactions: DashMap::new(),
            staged: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            chunk_rows: 2,
        }
    }

    /// Rows per streaming chunk (default 2, so small results still span
    /// several chunks).
    pub fn with_chunk_rows(mut self, chunk_rows: usize) -> Self {
        self.chunk_rows = chunk_rows.max(1);
        self
    }

    /// Create an empty table. The first column is the primary key.
    pub fn create_table(&self, name: &str, columns: &[&str]) {
        self.tables.insert(
            name.to_string(),
            Table {
                name: name.to_string(),
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows: BTreeMap::new(),
            },
        );
    }

    /// Stage the result served for an exact SQL statement.
    pub fn stage_query(&self, sql: &str, columns: &[&str], rows: Vec<Vec<Value>>) {
        self.staged.lock().insert(
            sql.to_string(),
            StagedResult {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
        );
    }

    /// Fail the next call with this error instead of executing it.
    pub fn fail_next(&self, error: Error) {
        self.failures.lock().push_back(error);
    }

    /// Everything called so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Snapshot of a table's rows in key order. Empty if the table does
    /// not exist.
    pub fn table_rows(&self, table: &str) -> Vec<Vec<Value>> {
        self.tables
            .get(table)
            .map(|t| t.rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of begun transactions not yet committed or rolled back.
    pub fn open_transactions(&self) -> usize {
        self.transactions.len()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().push(call);
    }

    fn take_failure(&self) -> Option<Error> {
        self.failures.lock().pop_front()
    }

    /// Handle the selector of a read or query: mint an id for `Begin`,
    /// check existence for `Id`, pass the single-use forms through.
    fn resolve_read_selector(
        &self,
        selector: &TransactionSelector,
    ) -> Result<Option<TransactionInfo>> {
        match selector {
            TransactionSelector::None | TransactionSelector::SingleUse(_) => Ok(None),
            TransactionSelector::Begin(options) => {
                if let TransactionOptions::ReadOnly(ro) = options {
                    if ro.bound.is_single_use_only() {
                        return Err(Error::InvalidArgument(format!(
                            "{:?} requires a single-use transaction",
                            ro.bound
                        )));
                    }
                }
                let id = TransactionId::new(Uuid::new_v4().as_bytes().to_vec());
                self.transactions
                    .insert(id.as_bytes().to_vec(), options.clone());
                let read_timestamp = match options {
                    TransactionOptions::ReadOnly(ro) if ro.return_read_timestamp => {
                        Some(Utc::now())
                    }
                    _ => None,
                };
                Ok(Some(TransactionInfo { id, read_timestamp }))
            }
            TransactionSelector::Id(id) => {
                if self.transactions.contains_key(id.as_bytes()) {
                    Ok(None)
                } else {
                    Err(Error::NotFound(format!("transaction {id}")))
                }
            }
        }
    }

    /// Commits accept an existing id (consumed) or single-use read-write
    /// options; anything else is malformed.
    fn consume_commit_selector(&self, selector: &TransactionSelector) -> Result<()> {
        match selector {
            TransactionSelector::Id(id) => self
                .transactions
                .remove(id.as_bytes())
                .map(|_| ())
                .ok_or_else(|| Error::NotFound(format!("transaction {id}"))),
            TransactionSelector::SingleUse(TransactionOptions::ReadWrite) => Ok(()),
            _ => Err(Error::InvalidArgument(
                "commit requires a transaction id or single-use read-write options".to_string(),
            )),
        }
    }

    fn read_result(
        &self,
        table: &str,
        columns: &[String],
        key_set: &KeySet,
        limit: Option<i64>,
    ) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
        let snapshot = self
            .tables
            .get(table)
            .map(|t| t.value().clone())
            .ok_or_else(|| Error::NotFound(format!("table {table}")))?;

        let mut positions = Vec::with_capacity(columns.len());
        for column in columns {
            let index = snapshot
                .columns
                .iter()
                .position(|c| c == column)
                .ok_or_else(|| {
                    Error::InvalidArgument(format!("unknown column {column} in table {table}"))
                })?;
            positions.push(index);
        }

        let mut rows = Vec::new();
        for (key, row) in &snapshot.rows {
            if !key_set_matches(key_set, &key.0) {
                continue;
            }
            rows.push(positions.iter().map(|&i| row[i].clone()).collect());
            if let Some(limit) = limit {
                if rows.len() as i64 >= limit {
                    break;
                }
            }
        }
        Ok((columns.to_vec(), rows))
    }

    /// Apply a commit's mutations in submission order, atomically: work on
    /// cloned tables and publish only if every record applies.
    fn apply_mutations(&self, mutations: &[Mutation]) -> Result<()> {
        let mut touched: HashMap<String, Table> = HashMap::new();
        for mutation in mutations {
            let name = mutation.table();
            if !touched.contains_key(name) {
                let table = self
                    .tables
                    .get(name)
                    .map(|t| t.value().clone())
                    .ok_or_else(|| Error::NotFound(format!("table {name}")))?;
                touched.insert(name.to_string(), table);
            }
            if let Some(table) = touched.get_mut(name) {
                apply_one(table, mutation)?;
            }
        }
        for (name, table) in touched {
            self.tables.insert(name, table);
        }
        Ok(())
    }

    fn chunked(&self, result: ResultSet) -> ResultStream {
        let mut batches: Vec<Vec<Vec<Value>>> = result
            .rows
            .chunks(self.chunk_rows)
            .map(|c| c.to_vec())
            .collect();
        if batches.is_empty() {
            batches.push(Vec::new());
        }
        let transaction = result.transaction;
        let columns = result.columns;
        let chunks: Vec<Result<StreamChunk>> = batches
            .into_iter()
            .enumerate()
            .map(|(i, rows)| {
                Ok(StreamChunk {
                    transaction: if i == 0 { transaction.clone() } else { None },
                    columns: if i == 0 { Some(columns.clone()) } else { None },
                    rows,
                })
            })
            .collect();
        Box::new(chunks.into_iter())
    }
}

fn key_set_matches(key_set: &KeySet, key: &[Value]) -> bool {
    if key_set.is_all() {
        return true;
    }
    if key_set
        .point_keys()
        .iter()
        .any(|k| cmp_tuple(k, key) == Ordering::Equal)
    {
        return true;
    }
    key_set.key_ranges().iter().any(|range| {
        let after_start = match &range.start {
            KeyBound::Included(s) => cmp_tuple(key, s) != Ordering::Less,
            KeyBound::Excluded(s) => cmp_tuple(key, s) == Ordering::Greater,
        };
        let before_end = match &range.end {
            KeyBound::Included(e) => cmp_tuple(key, e) != Ordering::Greater,
            KeyBound::Excluded(e) => cmp_tuple(key, e) == Ordering::Less,
        };
        after_start && before_end
    })
}

fn apply_one(table: &mut Table, mutation: &Mutation) -> Result<()> {
    match mutation {
        Mutation::Insert(w) => apply_write(table, w, WriteMode::Insert),
        Mutation::Update(w) => apply_write(table, w, WriteMode::Update),
        Mutation::InsertOrUpdate(w) => apply_write(table, w, WriteMode::InsertOrUpdate),
        Mutation::Replace(w) => apply_write(table, w, WriteMode::Replace),
        Mutation::Delete { key_set, .. } => {
            // idempotent: absent keys simply do not match
            let doomed: Vec<OrderedKey> = table
                .rows
                .keys()
                .filter(|k| key_set_matches(key_set, &k.0))
                .cloned()
                .collect();
            for key in doomed {
                table.rows.remove(&key);
            }
            Ok(())
        }
    }
}

fn apply_write(table: &mut Table, write: &Write, mode: WriteMode) -> Result<()> {
    let mut positions = Vec::with_capacity(write.columns.len());
    for column in &write.columns {
        let index = table
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown column {column} in table {}",
                    table.name
                ))
            })?;
        positions.push(index);
    }
    let key_position = write
        .columns
        .iter()
        .position(|c| *c == table.columns[0])
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "write to {} is missing key column {}",
                table.name, table.columns[0]
            ))
        })?;

    for row in &write.values {
        if row.len() != write.columns.len() {
            return Err(Error::InvalidArgument(format!(
                "row width {} does not match {} columns",
                row.len(),
                write.columns.len()
            )));
        }
        let key = OrderedKey(vec![row[key_position].clone()]);
        let exists = table.rows.contains_key(&key);
        match mode {
            WriteMode::Insert if exists => {
                return Err(Error::AlreadyExists(format!(
                    "{}{:?}",
                    table.name, key.0
                )));
            }
            WriteMode::Update if !exists => {
                return Err(Error::NotFound(format!("{}{:?}", table.name, key.0)));
            }
            _ => {}
        }

        let fresh = matches!(mode, WriteMode::Insert | WriteMode::Replace) || !exists;
        if fresh {
            // unset columns are null
            let mut full = vec![Value::Null; table.columns.len()];
            for (cell, &position) in row.iter().zip(positions.iter()) {
                full[position] = cell.clone();
            }
            table.rows.insert(key, full);
        } else if let Some(existing) = table.rows.get_mut(&key) {
            for (cell, &position) in row.iter().zip(positions.iter()) {
                existing[position] = cell.clone();
            }
        }
    }
    Ok(())
}

impl Service for InProcessService {
    fn execute_sql(
        &self,
        _session: &SessionName,
        sql: &str,
        _params: &QueryParams,
        transaction: &TransactionSelector,
    ) -> Result<ResultSet> {
        self.record(RecordedCall::ExecuteSql {
            sql: sql.to_string(),
            transaction: transaction.clone(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let info = self.resolve_read_selector(transaction)?;
        let staged = self
            .staged
            .lock()
            .get(sql)
            .cloned()
            .ok_or_else(|| Error::InvalidArgument(format!("no staged result for query: {sql}")))?;
        Ok(ResultSet {
            transaction: info,
            columns: staged.columns,
            rows: staged.rows,
        })
    }

    fn streaming_execute_sql(
        &self,
        _session: &SessionName,
        sql: &str,
        _params: &QueryParams,
        transaction: &TransactionSelector,
    ) -> Result<ResultStream> {
        self.record(RecordedCall::StreamingExecuteSql {
            sql: sql.to_string(),
            transaction: transaction.clone(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let info = self.resolve_read_selector(transaction)?;
        let staged = self
            .staged
            .lock()
            .get(sql)
            .cloned()
            .ok_or_else(|| Error::InvalidArgument(format!("no staged result for query: {sql}")))?;
        Ok(self.chunked(ResultSet {
            transaction: info,
            columns: staged.columns,
            rows: staged.rows,
        }))
    }

    fn read(
        &self,
        _session: &SessionName,
        table: &str,
        columns: &[String],
        key_set: &KeySet,
        limit: Option<i64>,
        transaction: &TransactionSelector,
    ) -> Result<ResultSet> {
        self.record(RecordedCall::Read {
            table: table.to_string(),
            transaction: transaction.clone(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let info = self.resolve_read_selector(transaction)?;
        let (columns, rows) = self.read_result(table, columns, key_set, limit)?;
        Ok(ResultSet {
            transaction: info,
            columns,
            rows,
        })
    }

    fn streaming_read(
        &self,
        _session: &SessionName,
        table: &str,
        columns: &[String],
        key_set: &KeySet,
        limit: Option<i64>,
        transaction: &TransactionSelector,
    ) -> Result<ResultStream> {
        self.record(RecordedCall::StreamingRead {
            table: table.to_string(),
            transaction: transaction.clone(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let info = self.resolve_read_selector(transaction)?;
        let (columns, rows) = self.read_result(table, columns, key_set, limit)?;
        Ok(self.chunked(ResultSet {
            transaction: info,
            columns,
            rows,
        }))
    }

    fn commit(
        &self,
        _session: &SessionName,
        mutations: Vec<Mutation>,
        transaction: &TransactionSelector,
    ) -> Result<CommitResult> {
        self.record(RecordedCall::Commit {
            mutations: mutations.clone(),
            transaction: transaction.clone(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.consume_commit_selector(transaction)?;
        self.apply_mutations(&mutations)?;
        Ok(CommitResult {
            commit_timestamp: Utc::now(),
        })
    }

    fn rollback(&self, _session: &SessionName, transaction_id: &TransactionId) -> Result<()> {
        self.record(RecordedCall::Rollback {
            transaction_id: transaction_id.clone(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.transactions
            .remove(transaction_id.as_bytes())
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("transaction {transaction_id}")))
    }
}

impl std::fmt::Debug for InProcessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessService")
            .field("tables", &self.tables.len())
            .field("open_transactions", &self.transactions.len())
            .field("chunk_rows", &self.chunk_rows)
            .finish()
    }
}
