//! # rowfold
//!
//! Folds flat, joined result rows into nested, deduplicated entities.
//!
//! A `JOIN` repeats parent columns once per child row. Annotate the target
//! structs with `#[scan("name")]`, derive [`Entity`], and rowfold binds each
//! row into a fresh instance, fingerprints it by content, and merges it into
//! the entities already seen: repeated parents collapse into one, and their
//! one-to-many children accumulate in arrival order.
//!
//! ## Quick Start
//!
//! ```rust
//! use rowfold::prelude::*;
//!
//! #[derive(Entity, Debug, Default, PartialEq)]
//! struct Agent {
//!     #[scan("id")]
//!     id: i64,
//!     #[scan("name")]
//!     name: String,
//!     #[scan("vehicle")]
//!     vehicles: Vec<Vehicle>,
//! }
//!
//! #[derive(Entity, Debug, Default, PartialEq)]
//! struct Vehicle {
//!     #[scan("type")]
//!     kind: String,
//! }
//!
//! # fn main() -> rowfold::Result<()> {
//! let rows = MemoryRows::new(["id", "name", "vehicle_type"])
//!     .row::<[Value; 3]>([1.into(), "Sterling Archer".into(), "car".into()])
//!     .row::<[Value; 3]>([1.into(), "Sterling Archer".into(), "plane".into()])
//!     .row::<[Value; 3]>([2.into(), "Lana Kane".into(), Value::Null]);
//!
//! let agents: Vec<Agent> = rowfold::scan_all(rows)?;
//!
//! assert_eq!(agents.len(), 2);
//! assert_eq!(agents[0].vehicles.len(), 2);
//! assert!(agents[1].vehicles.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! | Feature     | Adds                                              |
//! |-------------|---------------------------------------------------|
//! | `rusqlite`  | `SqliteRows`, a cursor over `rusqlite::Rows`      |
//! | `chrono`    | scalar impls for chrono dates and times           |
//! | `uuid`      | scalar impl for `uuid::Uuid`                      |
//! | `serde`     | the `Json<T>` codec                               |
//! | `tracing`   | scan events through `tracing`                     |
//! | `profiling` | puffin scopes around bind, fingerprint and merge  |

#![cfg_attr(docsrs, feature(doc_cfg))]

// =============================================================================
// Root-level exports
// =============================================================================

/// Result type for rowfold operations
pub use rowfold_core::error::Result;

/// Derive macro for scan targets
pub use rowfold_macros::Entity;

/// Trait implemented by the derive
pub use rowfold_core::Entity;

/// Entry points
pub use rowfold_core::{Scanner, scan_all, scan_one};

/// Error types
pub mod error {
    pub use rowfold_core::error::{ColumnError, RowfoldError, SchemaError};
}

// =============================================================================
// Core module - shared functionality
// =============================================================================

/// Runtime types and traits.
///
/// Generated code refers to everything through this module.
pub mod core {
    pub use rowfold_core::*;
}

/// Row sources.
pub mod cursor {
    pub use rowfold_core::cursor::{MemoryRows, RawRow, RowCursor};

    #[cfg(feature = "rusqlite")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rusqlite")))]
    pub use rowfold_core::cursor::SqliteRows;
}

/// Prelude - import this for entity declarations and scanning.
pub mod prelude {
    pub use rowfold_macros::Entity;

    pub use rowfold_core::{
        Codec, ColumnError, ColumnValue, Entity, FromColumn, MemoryRows, RowCursor,
        RowfoldError, ScanConfig, Scanner, Value, scan_all, scan_one,
    };

    #[cfg(feature = "serde")]
    pub use rowfold_core::Json;

    #[cfg(feature = "rusqlite")]
    pub use rowfold_core::SqliteRows;
}
