//! Runtime of rowfold: binds flat, joined rows into nested entities and
//! merges repeated parents by content.
//!
//! Most users want the `rowfold` facade and its `#[derive(Entity)]`; this
//! crate holds the pieces the derive expands to.

pub mod bind;
pub mod codec;
pub mod config;
pub mod cursor;
pub mod entity;
pub mod error;
pub mod fingerprint;
pub mod merge;
pub mod profiling;
pub mod scan;
pub mod schema;
pub mod tracing;
pub mod value;

#[cfg(test)]
mod test_fixtures;

// Re-export key types and traits
pub use bind::{BoundEntity, ColumnIndex, Slot, SlotKind, bind, scan_row};
pub use codec::Codec;
#[cfg(feature = "serde")]
pub use codec::Json;
pub use config::{DEFAULT_MAX_DEPTH, DEFAULT_SEPARATOR, ScanConfig};
pub use cursor::{MemoryRows, RawRow, RowCursor};
#[cfg(feature = "rusqlite")]
pub use cursor::SqliteRows;
pub use entity::{
    Boxed, ChildSlot, CollectionSlot, Entity, FieldVisitor, Fields, Optional, OptionalBoxed,
    Required, ScalarSlot,
};
pub use error::{ColumnError, Result, RowfoldError, SchemaError};
pub use fingerprint::{Fingerprint, byte_print, fingerprint};
pub use merge::{Aggregator, MergeOutcome, Record, RecordIndex};
pub use scan::{Scanner, scan_all, scan_one};
pub use schema::{EntitySchema, FieldKind, FieldSchema, SchemaFn, Shape, validate, validate_schema};
pub use value::{ColumnValue, FromColumn, Value};
