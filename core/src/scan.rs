//! Entry points: drain a cursor into a deduplicated `Vec<T>`.

use crate::bind::{ColumnIndex, bind, scan_row};
use crate::config::ScanConfig;
use crate::cursor::RowCursor;
use crate::entity::Entity;
use crate::error::{Result, RowfoldError};
use crate::merge::Aggregator;
use crate::schema::validate_schema;

/// Scan entry point carrying a [`ScanConfig`].
///
/// ```
/// use rowfold_core::{MemoryRows, ScanConfig, Scanner};
/// # use rowfold_core::{Entity, EntitySchema, FieldSchema, FieldVisitor, Fields, Result};
/// # #[derive(Debug, Default)]
/// # struct Agent { name: String }
/// # impl Fields for Agent {
/// #     fn entity_name(&self) -> &'static str { "Agent" }
/// #     fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
/// #         visitor.scalar("name", &mut self.name)
/// #     }
/// # }
/// # impl Entity for Agent {
/// #     fn schema() -> EntitySchema {
/// #         EntitySchema::of::<Self>("Agent", vec![FieldSchema::scalar("name", "name", "String")])
/// #     }
/// # }
///
/// let rows = MemoryRows::new(["name"])
///     .row(["Sterling Archer"])
///     .row(["Sterling Archer"])
///     .row(["Lana Kane"]);
///
/// let agents: Vec<Agent> = Scanner::new(ScanConfig::default()).all(rows)?;
/// assert_eq!(agents.len(), 2);
/// # Ok::<(), rowfold_core::RowfoldError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Bind every row of `cursor` and merge it into a deduplicated collection.
    ///
    /// The target type is validated before the first row is read. On any
    /// error nothing accumulated so far is returned.
    pub fn all<T, C>(&self, mut cursor: C) -> Result<Vec<T>>
    where
        T: Entity,
        C: RowCursor,
    {
        crate::rowfold_profile_function!();
        let schema = T::schema();
        if let Err(err) = validate_schema(&schema, &self.config) {
            crate::rowfold_trace_reject!(schema.name, err);
            return Err(err.into());
        }

        let columns = ColumnIndex::new(cursor.columns()?);
        crate::rowfold_trace_scan!(schema.name, columns.len());

        let mut aggregator = Aggregator::<T>::new();
        while cursor.next_row(&mut |row| {
            let mut entity = T::default();
            let mut bound = bind(&mut entity, &columns, &self.config)?;
            scan_row(&mut entity, &mut bound, row)?;
            let outcome = aggregator.merge(entity, &bound)?;
            crate::rowfold_trace_row!(schema.name, aggregator.rows(), outcome);
            Ok(())
        })? {}

        crate::rowfold_trace_done!(schema.name, aggregator.rows(), aggregator.len());
        Ok(aggregator.into_entries())
    }

    /// Like [`all`](Self::all), but expects exactly one top-level entity.
    pub fn one<T, C>(&self, cursor: C) -> Result<T>
    where
        T: Entity,
        C: RowCursor,
    {
        let mut entries = self.all::<T, C>(cursor)?;
        match (entries.pop(), entries.len()) {
            (Some(entity), 0) => Ok(entity),
            (Some(_), rest) => Err(RowfoldError::Ambiguous { count: rest + 1 }),
            (None, _) => Err(RowfoldError::NotFound),
        }
    }
}

/// Scan all rows of `cursor` into `Vec<T>` with the default configuration.
pub fn scan_all<T: Entity>(cursor: impl RowCursor) -> Result<Vec<T>> {
    Scanner::default().all(cursor)
}

/// Scan exactly one `T` from `cursor` with the default configuration.
pub fn scan_one<T: Entity>(cursor: impl RowCursor) -> Result<T> {
    Scanner::default().one(cursor)
}
