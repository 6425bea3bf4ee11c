//! [`RowCursor`] over [`rusqlite::Rows`].

use ::rusqlite::types::ValueRef;
use ::rusqlite::{Params, Row, Rows, Statement};
use compact_str::CompactString;

use super::{RawRow, RowCursor};
use crate::error::{ColumnError, Result};
use crate::value::ColumnValue;

impl RawRow for Row<'_> {
    fn value(&self, index: usize) -> core::result::Result<ColumnValue<'_>, ColumnError> {
        Ok(match self.get_ref(index).map_err(ColumnError::other)? {
            ValueRef::Null => ColumnValue::Null,
            ValueRef::Integer(v) => ColumnValue::Integer(v),
            ValueRef::Real(v) => ColumnValue::Real(v),
            ValueRef::Text(bytes) => {
                ColumnValue::Text(core::str::from_utf8(bytes).map_err(ColumnError::other)?)
            }
            ValueRef::Blob(bytes) => ColumnValue::Blob(bytes),
        })
    }
}

/// Rows of an executing rusqlite statement.
///
/// ```
/// # fn main() -> rowfold_core::Result<()> {
/// use rowfold_core::{RowCursor, SqliteRows};
///
/// let conn = rusqlite::Connection::open_in_memory()?;
/// let mut stmt = conn.prepare("SELECT 1 AS id, 'Lana' AS name")?;
/// let mut rows = SqliteRows::query(&mut stmt, [])?;
/// assert_eq!(rows.columns()?, ["id", "name"]);
/// # Ok(())
/// # }
/// ```
pub struct SqliteRows<'stmt> {
    columns: Vec<CompactString>,
    rows: Rows<'stmt>,
}

impl<'stmt> SqliteRows<'stmt> {
    pub fn query<P: Params>(statement: &'stmt mut Statement<'_>, params: P) -> Result<Self> {
        let columns = statement
            .column_names()
            .into_iter()
            .map(CompactString::from)
            .collect();
        let rows = statement.query(params)?;
        Ok(Self { columns, rows })
    }
}

impl RowCursor for SqliteRows<'_> {
    fn columns(&mut self) -> Result<Vec<CompactString>> {
        Ok(self.columns.clone())
    }

    fn next_row(&mut self, visit: &mut dyn FnMut(&dyn RawRow) -> Result<()>) -> Result<bool> {
        match self.rows.next()? {
            Some(row) => {
                visit(row)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
