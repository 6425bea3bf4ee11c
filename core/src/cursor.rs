//! Row cursors: where flat rows come from.
//!
//! A [`RowCursor`] yields its column names once, then lends out one row at
//! a time. Rows are random access by column position through [`RawRow`], so
//! the binder can probe for NULLs before it commits any value.

use std::collections::VecDeque;

use compact_str::CompactString;

use crate::error::{ColumnError, Result};
use crate::value::{ColumnValue, Value};

#[cfg(feature = "rusqlite")]
mod rusqlite;
#[cfg(feature = "rusqlite")]
pub use self::rusqlite::SqliteRows;

/// One row positioned under a cursor.
pub trait RawRow {
    fn value(&self, index: usize) -> core::result::Result<ColumnValue<'_>, ColumnError>;
}

/// A forward-only source of rows sharing one column list.
pub trait RowCursor {
    /// Column names, in row order.
    fn columns(&mut self) -> Result<Vec<CompactString>>;

    /// Advance to the next row and hand it to `visit`.
    ///
    /// Returns `Ok(false)` once the cursor is exhausted. An error from
    /// `visit` is returned as is.
    fn next_row(&mut self, visit: &mut dyn FnMut(&dyn RawRow) -> Result<()>) -> Result<bool>;
}

impl RawRow for [Value] {
    fn value(&self, index: usize) -> core::result::Result<ColumnValue<'_>, ColumnError> {
        self.get(index)
            .map(Value::as_column)
            .ok_or_else(|| ColumnError::Invalid(format!("no column at position {index}")))
    }
}

impl RawRow for Vec<Value> {
    fn value(&self, index: usize) -> core::result::Result<ColumnValue<'_>, ColumnError> {
        self.as_slice().value(index)
    }
}

/// In-memory cursor over owned rows.
///
/// ```
/// use rowfold_core::{MemoryRows, Value};
///
/// let rows = MemoryRows::new(["id", "name"])
///     .row([Value::from(1), Value::from("Stirling Archer")])
///     .row([Value::from(2), Value::Null]);
/// assert_eq!(rows.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRows {
    columns: Vec<CompactString>,
    rows: VecDeque<Vec<Value>>,
}

impl MemoryRows {
    pub fn new<I>(columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: VecDeque::new(),
        }
    }

    /// Append a row; missing trailing columns read as NULL.
    pub fn row<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_row(values);
        self
    }

    pub fn push_row<I>(&mut self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut row: Vec<Value> = values.into_iter().map(Into::into).collect();
        row.resize(self.columns.len(), Value::Null);
        self.rows.push_back(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RowCursor for MemoryRows {
    fn columns(&mut self) -> Result<Vec<CompactString>> {
        Ok(self.columns.clone())
    }

    fn next_row(&mut self, visit: &mut dyn FnMut(&dyn RawRow) -> Result<()>) -> Result<bool> {
        let Some(row) = self.rows.pop_front() else {
            return Ok(false);
        };
        visit(&row)?;
        Ok(true)
    }
}

impl<C: RowCursor + ?Sized> RowCursor for &mut C {
    fn columns(&mut self) -> Result<Vec<CompactString>> {
        (**self).columns()
    }

    fn next_row(&mut self, visit: &mut dyn FnMut(&dyn RawRow) -> Result<()>) -> Result<bool> {
        (**self).next_row(visit)
    }
}
