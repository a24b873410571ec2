//! Row sets and row streams
//!
//! Buffered reads materialize into a `RowSet`, checked against the
//! response-size ceiling so callers hit a deterministic `ResponseTooLarge`
//! instead of an opaque server refusal. Streaming reads yield a
//! `RowStream`: lazy, single-pass, non-restartable, pulling chunks from
//! the service only as rows are consumed.

use crate::transaction::CaptureCell;
use meridian_core::{
    Error, Result, ResultSet, ResultStream, Value, MAX_BUFFERED_RESULT_BYTES,
};
use std::collections::VecDeque;
use std::sync::Arc;

/// One result row: cell values plus a shared column header.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Row {
    fn new(columns: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Column names for this row.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Cell by position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Cell by column name.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == name)?;
        self.values.get(index)
    }

    /// All cells in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the row, yielding its cells.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Fully-materialized query or read result.
#[derive(Debug, Clone)]
pub struct RowSet {
    columns: Arc<Vec<String>>,
    rows: Vec<Row>,
}

impl RowSet {
    /// Build a row set from a unary response, enforcing the buffered-result
    /// ceiling.
    pub(crate) fn materialize(result: ResultSet) -> Result<Self> {
        Self::materialize_with_limit(result, MAX_BUFFERED_RESULT_BYTES)
    }

    fn materialize_with_limit(result: ResultSet, limit: usize) -> Result<Self> {
        let size: usize = result
            .rows
            .iter()
            .flat_map(|row| row.iter())
            .map(Value::approximate_size)
            .sum();
        if size > limit {
            return Err(Error::ResponseTooLarge { size, limit });
        }
        let columns = Arc::new(result.columns);
        let rows = result
            .rows
            .into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect();
        Ok(Self { columns, rows })
    }

    /// Column names of the result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The rows, in server order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl IntoIterator for RowSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Lazy, single-pass sequence of result rows.
///
/// Pulls chunks from the underlying service stream only as rows are
/// consumed; partial drains are fine. The first pulled chunk may carry the
/// transaction descriptor of a begin request, which the stream feeds into
/// the owning handle's capture cell.
pub struct RowStream {
    chunks: ResultStream,
    capture: Option<Arc<CaptureCell>>,
    columns: Option<Arc<Vec<String>>>,
    pending: VecDeque<Vec<Value>>,
    done: bool,
}

impl RowStream {
    pub(crate) fn new(chunks: ResultStream, capture: Option<Arc<CaptureCell>>) -> Self {
        Self {
            chunks,
            capture,
            columns: None,
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Column names, known once the first chunk has been pulled.
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref().map(|c| c.as_slice())
    }

    fn absorb_chunk(&mut self, chunk: meridian_core::StreamChunk) {
        if let (Some(cell), Some(info)) = (&self.capture, chunk.transaction.as_ref()) {
            cell.observe(info);
        }
        if self.columns.is_none() {
            if let Some(columns) = chunk.columns {
                self.columns = Some(Arc::new(columns));
            }
        }
        self.pending.extend(chunk.rows);
    }
}

impl Iterator for RowStream {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(values) = self.pending.pop_front() {
                let columns = self
                    .columns
                    .clone()
                    .unwrap_or_else(|| Arc::new(Vec::new()));
                return Some(Ok(Row::new(columns, values)));
            }
            if self.done {
                return None;
            }
            match self.chunks.next() {
                Some(Ok(chunk)) => self.absorb_chunk(chunk),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => self.done = true,
            }
        }
    }
}

impl std::fmt::Debug for RowStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("columns", &self.columns)
            .field("pending", &self.pending.len())
            .field("done", &self.done)
            .finish()
    }
}
