use compact_str::CompactString;
use thiserror::Error;

use crate::schema::Shape;

#[derive(Debug, Error)]
pub enum RowfoldError {
    /// Target type cannot be scanned into
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Two slots or children of one entity share an annotation name
    #[error("Binding error: `{entity}` binds `{name}` more than once")]
    Collision {
        entity: &'static str,
        name: CompactString,
    },

    /// Reading or converting a column failed
    #[error("Scan error in `{entity}` column `{column}`: {source}")]
    Scan {
        entity: &'static str,
        column: CompactString,
        #[source]
        source: ColumnError,
    },

    /// The row cursor itself failed
    #[error("Cursor error: {0}")]
    Cursor(#[source] ColumnError),

    /// Incoming entity shape disagrees with what has been bound or merged
    #[error("Structural error: `{entity}` has no child `{child}`")]
    Structural {
        entity: &'static str,
        child: CompactString,
    },

    /// An element was pushed into a collection of a different entity type
    #[error("Type mismatch: expected `{expected}`, found `{found}`")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// No top-level entity when exactly one was expected
    #[error("No rows found")]
    NotFound,

    /// More than one top-level entity when exactly one was expected
    #[error("Expected one entity, found {count}")]
    Ambiguous { count: usize },

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Rejection reasons produced by the schema compiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{shape} are not supported ({type_name}) on `{entity}.{field}`, consider using a Vec or a codec instead")]
    Unsupported {
        entity: &'static str,
        field: &'static str,
        shape: Shape,
        type_name: &'static str,
    },

    #[error("cyclic entities are not supported: {type_name} (path: {path})")]
    Cycle {
        type_name: &'static str,
        path: String,
    },

    #[error("`{entity}` declares the column name `{name}` more than once")]
    DuplicateName {
        entity: &'static str,
        name: &'static str,
    },

    #[error("`{type_name}` nests deeper than the configured limit of {limit}")]
    TooDeep {
        type_name: &'static str,
        limit: usize,
    },
}

/// Error raised while converting a single column value.
#[derive(Debug, Error)]
pub enum ColumnError {
    #[error("cannot convert {found} into {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value out of range for {0}")]
    OutOfRange(&'static str),

    #[error("invalid value: {0}")]
    Invalid(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl ColumnError {
    /// Wrap any error coming from a driver or a codec.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(err))
    }
}

/// Result type for scanning operations
pub type Result<T> = std::result::Result<T, RowfoldError>;
