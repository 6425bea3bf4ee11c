//! Tracing hooks for scan observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level event when a scan starts.
///
/// ```ignore
/// rowfold_trace_scan!(schema.name, columns.len());
/// ```
#[macro_export]
macro_rules! rowfold_trace_scan {
    ($entity:expr, $columns:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(entity = $entity, columns = $columns, "rowfold.scan.start");
    };
}

/// Emit a trace-level event with the merge outcome of one row.
#[macro_export]
macro_rules! rowfold_trace_row {
    ($entity:expr, $row:expr, $outcome:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(entity = $entity, row = $row, outcome = ?$outcome, "rowfold.scan.row");
        #[cfg(not(feature = "tracing"))]
        let _ = &$outcome;
    };
}

/// Emit a debug-level event once the cursor is drained.
#[macro_export]
macro_rules! rowfold_trace_done {
    ($entity:expr, $rows:expr, $entities:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(
            entity = $entity,
            rows = $rows,
            entities = $entities,
            "rowfold.scan.done"
        );
    };
}

/// Emit a warn-level event when a target type is rejected by the schema compiler.
#[macro_export]
macro_rules! rowfold_trace_reject {
    ($entity:expr, $error:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!(entity = $entity, error = %$error, "rowfold.schema.rejected");
    };
}
