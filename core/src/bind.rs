//! Entity binder: turns one fresh instance into a tree of binding slots and
//! fills it from a row.
//!
//! A row is scanned in three passes over the same [`BoundEntity`] tree:
//!
//! 1. **probe**: every slot's column is checked for NULL, so presence is
//!    known before anything is written;
//! 2. **commit**: non-NULL columns are written into scalar slots, codec slots
//!    receive their column unconditionally;
//! 3. **collapse**: depth-first, an entity whose own slots all probed NULL is
//!    wholly absent. Absent one-to-one children are reset, absent
//!    one-to-many elements are removed from the collection they were
//!    appended to.

use compact_str::CompactString;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::codec::Codec;
use crate::config::ScanConfig;
use crate::cursor::RawRow;
use crate::entity::{ChildSlot, CollectionSlot, FieldVisitor, Fields, ScalarSlot};
use crate::error::{ColumnError, Result, RowfoldError};
use crate::value::ColumnValue;

/// Column names of a cursor, resolved to positions.
///
/// When a name repeats, the first position wins.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    names: Vec<CompactString>,
    positions: HashMap<CompactString, usize>,
}

impl ColumnIndex {
    pub fn new<I>(columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        let names: Vec<CompactString> = columns.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(position);
        }
        Self { names, positions }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    pub fn names(&self) -> &[CompactString] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Scalar,
    Codec,
}

/// A bound scalar or codec field and its null probe.
#[derive(Debug, Clone)]
pub struct Slot {
    name: &'static str,
    column: CompactString,
    kind: SlotKind,
    position: Option<usize>,
    present: bool,
}

impl Slot {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Full column name, including every parent prefix.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    /// Position in the cursor's columns, `None` when the query does not select it.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Whether the last probed row held a non-NULL value for this column.
    pub fn is_present(&self) -> bool {
        self.present
    }
}

/// Binding slots of one entity instance and its nested children, for one row.
#[derive(Debug, Clone)]
pub struct BoundEntity {
    entity: &'static str,
    prefix: CompactString,
    slots: SmallVec<[Slot; 8]>,
    one_to_one: Vec<(&'static str, BoundEntity)>,
    one_to_many: Vec<(&'static str, BoundEntity)>,
    absent: bool,
}

impl BoundEntity {
    fn new(entity: &'static str, prefix: CompactString) -> Self {
        Self {
            entity,
            prefix,
            slots: SmallVec::new(),
            one_to_one: Vec::new(),
            one_to_many: Vec::new(),
            absent: false,
        }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Column prefix of this entity; empty at the root.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Scalar and codec slots, in declaration order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    pub fn scalar_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|slot| slot.kind == SlotKind::Scalar)
    }

    pub fn codec_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|slot| slot.kind == SlotKind::Codec)
    }

    pub fn one_to_one(&self) -> impl Iterator<Item = (&'static str, &BoundEntity)> {
        self.one_to_one.iter().map(|(name, child)| (*name, child))
    }

    pub fn one_to_many(&self) -> impl Iterator<Item = (&'static str, &BoundEntity)> {
        self.one_to_many.iter().map(|(name, child)| (*name, child))
    }

    pub fn child(&self, name: &str) -> Option<&BoundEntity> {
        find(&self.one_to_one, name)
    }

    pub fn collection_child(&self, name: &str) -> Option<&BoundEntity> {
        find(&self.one_to_many, name)
    }

    /// Whether this entity was found wholly absent in the scanned row.
    pub fn is_absent(&self) -> bool {
        self.absent
    }

    fn contains(&self, name: &str) -> bool {
        self.slot(name).is_some()
            || self.child(name).is_some()
            || self.collection_child(name).is_some()
    }

    fn children_mut(&mut self) -> impl Iterator<Item = &mut BoundEntity> {
        self.one_to_one
            .iter_mut()
            .chain(self.one_to_many.iter_mut())
            .map(|(_, child)| child)
    }

    fn probe(&mut self, row: &dyn RawRow) -> Result<()> {
        let entity = self.entity;
        for slot in &mut self.slots {
            slot.present = match slot.position {
                Some(position) => !read(row, position, entity, &slot.column)?.is_null(),
                None => false,
            };
        }
        for child in self.children_mut() {
            child.probe(row)?;
        }
        Ok(())
    }

    /// Resolve absence bottom-up. An entity without slots of its own is
    /// present as long as one of its children is.
    fn resolve_presence(&mut self) -> bool {
        let mut any_child_present = false;
        for child in self.children_mut() {
            if !child.resolve_presence() {
                any_child_present = true;
            }
        }

        self.absent = if self.slots.is_empty() {
            !any_child_present
        } else {
            self.slots.iter().all(|slot| !slot.present)
        };
        if self.absent {
            self.mark_absent();
        }
        self.absent
    }

    fn mark_absent(&mut self) {
        self.absent = true;
        for child in self.children_mut() {
            child.mark_absent();
        }
    }
}

fn find<'b>(children: &'b [(&'static str, BoundEntity)], name: &str) -> Option<&'b BoundEntity> {
    children
        .iter()
        .find(|(child, _)| *child == name)
        .map(|(_, bound)| bound)
}

fn read<'r>(
    row: &'r dyn RawRow,
    position: usize,
    entity: &'static str,
    column: &str,
) -> Result<ColumnValue<'r>> {
    row.value(position)
        .map_err(|source| scan_error(entity, column, source))
}

fn scan_error(entity: &'static str, column: &str, source: ColumnError) -> RowfoldError {
    RowfoldError::Scan {
        entity,
        column: column.into(),
        source,
    }
}

fn unbound(entity: &'static str, name: &str) -> RowfoldError {
    RowfoldError::Structural {
        entity,
        child: name.into(),
    }
}

// =============================================================================
// Bind
// =============================================================================

/// Bind a freshly default-constructed `entity` against `columns`.
///
/// Nested one-to-one children are allocated on demand and every one-to-many
/// collection gets exactly one new element to receive this row's values.
pub fn bind(
    entity: &mut dyn Fields,
    columns: &ColumnIndex,
    config: &ScanConfig,
) -> Result<BoundEntity> {
    crate::rowfold_profile_scope!("rowfold", "bind");
    bind_prefixed(entity, CompactString::default(), columns, config)
}

fn bind_prefixed(
    entity: &mut dyn Fields,
    prefix: CompactString,
    columns: &ColumnIndex,
    config: &ScanConfig,
) -> Result<BoundEntity> {
    let mut binder = Binder {
        bound: BoundEntity::new(entity.entity_name(), prefix),
        columns,
        config,
    };
    entity.visit_fields(&mut binder)?;
    Ok(binder.bound)
}

struct Binder<'c> {
    bound: BoundEntity,
    columns: &'c ColumnIndex,
    config: &'c ScanConfig,
}

impl Binder<'_> {
    fn claim(&self, name: &'static str) -> Result<CompactString> {
        if self.bound.contains(name) {
            return Err(RowfoldError::Collision {
                entity: self.bound.entity,
                name: name.into(),
            });
        }
        Ok(self.config.column_name(&self.bound.prefix, name))
    }

    fn register(&mut self, name: &'static str, kind: SlotKind) -> Result<()> {
        let column = self.claim(name)?;
        let position = self.columns.position(&column);
        self.bound.slots.push(Slot {
            name,
            column,
            kind,
            position,
            present: false,
        });
        Ok(())
    }
}

impl FieldVisitor for Binder<'_> {
    fn scalar(&mut self, name: &'static str, _slot: &mut dyn ScalarSlot) -> Result<()> {
        self.register(name, SlotKind::Scalar)
    }

    fn codec(&mut self, name: &'static str, _slot: &mut dyn Codec) -> Result<()> {
        self.register(name, SlotKind::Codec)
    }

    fn one_to_one(&mut self, name: &'static str, slot: &mut dyn ChildSlot) -> Result<()> {
        let prefix = self.claim(name)?;
        let child = bind_prefixed(slot.materialize(), prefix, self.columns, self.config)?;
        self.bound.one_to_one.push((name, child));
        Ok(())
    }

    fn one_to_many(&mut self, name: &'static str, slot: &mut dyn CollectionSlot) -> Result<()> {
        let prefix = self.claim(name)?;
        let child = bind_prefixed(slot.append_default(), prefix, self.columns, self.config)?;
        self.bound.one_to_many.push((name, child));
        Ok(())
    }
}

// =============================================================================
// Scan
// =============================================================================

/// Fill a bound `entity` from `row`: probe, commit, then collapse absent
/// children. Column errors are returned verbatim, wrapped with the column
/// name.
pub fn scan_row(entity: &mut dyn Fields, bound: &mut BoundEntity, row: &dyn RawRow) -> Result<()> {
    bound.probe(row)?;
    entity.visit_fields(&mut Committer { bound: &*bound, row })?;
    bound.resolve_presence();
    entity.visit_fields(&mut Collapser { bound: &*bound })
}

struct Committer<'b, 'r> {
    bound: &'b BoundEntity,
    row: &'r dyn RawRow,
}

impl Committer<'_, '_> {
    fn slot(&self, name: &str) -> Result<&Slot> {
        self.bound
            .slot(name)
            .ok_or_else(|| unbound(self.bound.entity, name))
    }
}

impl FieldVisitor for Committer<'_, '_> {
    fn scalar(&mut self, name: &'static str, slot: &mut dyn ScalarSlot) -> Result<()> {
        let bound = self.slot(name)?;
        // NULL columns leave the field at its default
        let Some(position) = bound.position.filter(|_| bound.present) else {
            return Ok(());
        };
        let value = read(self.row, position, self.bound.entity, &bound.column)?;
        slot.assign(value)
            .map_err(|source| scan_error(self.bound.entity, &bound.column, source))
    }

    fn codec(&mut self, name: &'static str, slot: &mut dyn Codec) -> Result<()> {
        let bound = self.slot(name)?;
        let Some(position) = bound.position else {
            return Ok(());
        };
        let value = read(self.row, position, self.bound.entity, &bound.column)?;
        slot.scan(value)
            .map_err(|source| scan_error(self.bound.entity, &bound.column, source))
    }

    fn one_to_one(&mut self, name: &'static str, slot: &mut dyn ChildSlot) -> Result<()> {
        let child = self
            .bound
            .child(name)
            .ok_or_else(|| unbound(self.bound.entity, name))?;
        if let Some(entity) = slot.get_mut() {
            entity.visit_fields(&mut Committer {
                bound: child,
                row: self.row,
            })?;
        }
        Ok(())
    }

    fn one_to_many(&mut self, name: &'static str, slot: &mut dyn CollectionSlot) -> Result<()> {
        let child = self
            .bound
            .collection_child(name)
            .ok_or_else(|| unbound(self.bound.entity, name))?;
        if let Some(element) = last_element(slot) {
            element.visit_fields(&mut Committer {
                bound: child,
                row: self.row,
            })?;
        }
        Ok(())
    }
}

struct Collapser<'b> {
    bound: &'b BoundEntity,
}

impl FieldVisitor for Collapser<'_> {
    fn one_to_one(&mut self, name: &'static str, slot: &mut dyn ChildSlot) -> Result<()> {
        let child = self
            .bound
            .child(name)
            .ok_or_else(|| unbound(self.bound.entity, name))?;
        if child.absent {
            slot.clear();
        } else if let Some(entity) = slot.get_mut() {
            entity.visit_fields(&mut Collapser { bound: child })?;
        }
        Ok(())
    }

    fn one_to_many(&mut self, name: &'static str, slot: &mut dyn CollectionSlot) -> Result<()> {
        let child = self
            .bound
            .collection_child(name)
            .ok_or_else(|| unbound(self.bound.entity, name))?;
        if child.absent {
            slot.pop_element();
        } else if let Some(element) = last_element(slot) {
            element.visit_fields(&mut Collapser { bound: child })?;
        }
        Ok(())
    }
}

/// The element appended for the current row.
fn last_element(slot: &mut dyn CollectionSlot) -> Option<&mut dyn Fields> {
    let last = slot.len().checked_sub(1)?;
    slot.element_mut(last)
}
