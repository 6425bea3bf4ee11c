//! Merge engine: folds freshly bound entities into the accumulated output.
//!
//! The output is a plain `Vec<T>`. Next to it a [`RecordIndex`] mirrors its
//! nested shape: each record knows only the position of its entity in the
//! owning collection and, per one-to-many annotation, the index of that
//! child collection. Matched entities are always re-resolved by position
//! from their live parent, so no reference into a collection outlives the
//! step that grows it.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use smallvec::SmallVec;

use crate::bind::BoundEntity;
use crate::entity::{CollectionSlot, Entity, Fields, with_child, with_collection};
use crate::error::{Result, RowfoldError};
use crate::fingerprint::{Fingerprint, fingerprint};

/// What merging one row did at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The row was wholly NULL.
    Skipped,
    /// A new entity was appended.
    Inserted,
    /// The row matched an existing entity; its one-to-many children were
    /// merged into it.
    Merged,
}

/// Shadow entry for one entity in the output.
///
/// One-to-one children have no position of their own; their collections are
/// indexed by a nested record under the child's annotation.
#[derive(Debug, Clone, Default)]
pub struct Record {
    position: usize,
    children: SmallVec<[(&'static str, RecordIndex); 2]>,
    nested: Vec<(&'static str, Record)>,
}

impl Record {
    /// Position of the entity in its owning collection.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Index of the one-to-many collection annotated `name`.
    pub fn children(&self, name: &str) -> Option<&RecordIndex> {
        self.children
            .iter()
            .find(|(child, _)| *child == name)
            .map(|(_, index)| index)
    }

    fn children_mut(&mut self, name: &str) -> Option<&mut RecordIndex> {
        self.children
            .iter_mut()
            .find(|(child, _)| *child == name)
            .map(|(_, index)| index)
    }

    /// Record of the one-to-one child annotated `name`, if it was present.
    pub fn nested(&self, name: &str) -> Option<&Record> {
        self.nested
            .iter()
            .find(|(child, _)| *child == name)
            .map(|(_, record)| record)
    }

    fn nested_mut(&mut self, name: &str) -> Option<&mut Record> {
        self.nested
            .iter_mut()
            .find(|(child, _)| *child == name)
            .map(|(_, record)| record)
    }
}

/// Fingerprint-keyed records of one collection.
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    records: HashMap<Fingerprint, Record>,
}

impl RecordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Record> {
        self.records.get(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Owns the output of one scan and its shadow index.
#[derive(Debug)]
pub struct Aggregator<T> {
    entries: Vec<T>,
    index: RecordIndex,
    rows: usize,
}

impl<T: Entity> Default for Aggregator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Aggregator<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: RecordIndex::new(),
            rows: 0,
        }
    }

    /// Merge one scanned row, `entity` being the instance `bound` was bound to.
    pub fn merge(&mut self, entity: T, bound: &BoundEntity) -> Result<MergeOutcome> {
        crate::rowfold_profile_scope!("rowfold", "merge");
        self.rows += 1;
        merge_level(&mut self.index, &mut self.entries, Box::new(entity), bound)
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<T> {
        self.entries
    }

    pub fn index(&self) -> &RecordIndex {
        &self.index
    }

    /// Number of rows merged so far, skipped rows included.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn structural(entity: &'static str, child: &str) -> RowfoldError {
    RowfoldError::Structural {
        entity,
        child: child.into(),
    }
}

/// Merge `incoming` into `target`, the collection `index` mirrors.
fn merge_level(
    index: &mut RecordIndex,
    target: &mut dyn CollectionSlot,
    mut incoming: Box<dyn Fields>,
    bound: &BoundEntity,
) -> Result<MergeOutcome> {
    if bound.is_absent() {
        return Ok(MergeOutcome::Skipped);
    }

    let fingerprint = fingerprint(&mut *incoming, bound)?;
    match index.records.entry(fingerprint) {
        Entry::Vacant(entry) => {
            let record = seed(&mut *incoming, bound, target.len())?;
            target.push_element(incoming)?;
            entry.insert(record);
            Ok(MergeOutcome::Inserted)
        }
        Entry::Occupied(entry) => {
            let record = entry.into_mut();
            let matched = target
                .element_mut(record.position)
                .ok_or_else(|| structural(bound.entity(), bound.prefix()))?;
            merge_children(record, matched, &mut *incoming, bound)?;
            Ok(MergeOutcome::Merged)
        }
    }
}

/// Merge the one-to-many children of `incoming` into `matched`, an entity
/// with the same fingerprint, following one-to-one children down to any
/// collections they own.
fn merge_children(
    record: &mut Record,
    matched: &mut dyn Fields,
    incoming: &mut dyn Fields,
    bound: &BoundEntity,
) -> Result<()> {
    for (name, child) in bound.one_to_many() {
        let child_index = record
            .children_mut(name)
            .ok_or_else(|| structural(bound.entity(), name))?;

        let element = with_collection(&mut *incoming, name, |collection| {
            Ok(collection.pop_element())
        })?
        .ok_or_else(|| structural(bound.entity(), name))?;
        let Some(element) = element else {
            continue;
        };

        with_collection(&mut *matched, name, |collection| {
            merge_level(child_index, collection, element, child)
        })?
        .ok_or_else(|| structural(bound.entity(), name))?;
    }

    // Equal fingerprints mean equal presence, so an absent child is absent on
    // both sides.
    for (name, child) in bound.one_to_one().filter(|(_, child)| !child.is_absent()) {
        let nested = record
            .nested_mut(name)
            .ok_or_else(|| structural(bound.entity(), name))?;

        with_child(&mut *incoming, name, |incoming| {
            with_child(&mut *matched, name, |matched| {
                merge_children(nested, matched, incoming, child)
            })?
            .ok_or_else(|| structural(bound.entity(), name))
        })?
        .ok_or_else(|| structural(bound.entity(), name))?;
    }
    Ok(())
}

/// Build the record of a newly inserted entity, indexing the collection
/// elements its own row appended.
fn seed(entity: &mut dyn Fields, bound: &BoundEntity, position: usize) -> Result<Record> {
    let mut record = Record {
        position,
        ..Record::default()
    };

    for (name, child) in bound.one_to_many() {
        let mut index = RecordIndex::new();
        if !child.is_absent() {
            with_collection(&mut *entity, name, |collection| {
                let Some(position) = collection.len().checked_sub(1) else {
                    return Ok(());
                };
                let element = collection
                    .element_mut(position)
                    .ok_or_else(|| structural(child.entity(), name))?;
                let fingerprint = fingerprint(&mut *element, child)?;
                let seeded = seed(element, child, position)?;
                index.records.insert(fingerprint, seeded);
                Ok(())
            })?
            .ok_or_else(|| structural(bound.entity(), name))?;
        }
        record.children.push((name, index));
    }

    for (name, child) in bound.one_to_one().filter(|(_, child)| !child.is_absent()) {
        let nested = with_child(&mut *entity, name, |nested| seed(nested, child, 0))?
            .ok_or_else(|| structural(bound.entity(), name))?;
        record.nested.push((name, nested));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::{bind, scan_row};
    use crate::config::ScanConfig;
    use crate::test_fixtures::{Account, User, account_columns, user_columns};
    use crate::value::Value;

    fn scanned(values: [Value; 8]) -> (User, BoundEntity) {
        let mut user = User::default();
        let mut bound = bind(&mut user, &user_columns(), &ScanConfig::default()).unwrap();
        scan_row(&mut user, &mut bound, &values.to_vec()).unwrap();
        (user, bound)
    }

    fn row(id: i64, vehicle: Option<&str>, medium: Option<&str>) -> [Value; 8] {
        [
            id.into(),
            format!("user {id}").into(),
            Value::Null,
            Value::Null,
            Value::Null,
            vehicle.into(),
            vehicle.map(|_| "red").into(),
            medium.into(),
        ]
    }

    fn merge_rows(rows: impl IntoIterator<Item = [Value; 8]>) -> Aggregator<User> {
        let mut aggregator = Aggregator::new();
        for values in rows {
            let (user, bound) = scanned(values);
            aggregator.merge(user, &bound).unwrap();
        }
        aggregator
    }

    #[test]
    fn repeated_rows_do_not_duplicate() {
        let row = row(1, Some("car"), Some("land"));
        let aggregator = merge_rows([row.clone(), row.clone(), row]);

        assert_eq!(aggregator.rows(), 3);
        let users = aggregator.into_entries();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].vehicles.len(), 1);
        assert_eq!(users[0].vehicles[0].mediums.len(), 1);
    }

    #[test]
    fn children_accumulate_in_arrival_order() {
        let users = merge_rows([
            row(1, Some("car"), Some("land")),
            row(2, Some("boat"), Some("water")),
            row(1, Some("plane"), Some("air")),
            row(1, Some("car"), Some("water")),
        ])
        .into_entries();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, 1);
        assert_eq!(users[1].id, 2);

        let kinds: Vec<&str> = users[0].vehicles.iter().map(|v| v.kind.as_str()).collect();
        assert_eq!(kinds, ["car", "plane"]);

        let car_media: Vec<&str> = users[0].vehicles[0]
            .mediums
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(car_media, ["land", "water"]);
    }

    #[test]
    fn shadow_index_mirrors_output() {
        let aggregator = merge_rows([
            row(1, Some("car"), Some("land")),
            row(1, Some("plane"), None),
        ]);
        assert_eq!(aggregator.index().len(), 1);

        let (mut user, bound) = scanned(row(1, None, None));
        let key = fingerprint(&mut user, &bound).unwrap();
        let record = aggregator.index().get(&key).unwrap();
        assert_eq!(record.position(), 0);
        assert_eq!(record.children("vehicle").map(RecordIndex::len), Some(2));
    }

    #[test]
    fn parent_without_children_keeps_an_empty_collection() {
        let users = merge_rows([row(3, None, None), row(3, Some("car"), None)]).into_entries();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].vehicles.len(), 1);
        assert!(users[0].vehicles[0].mediums.is_empty());
    }

    #[test]
    fn null_rows_are_skipped() {
        let mut aggregator = Aggregator::new();
        let (user, bound) = scanned(core::array::from_fn(|_| Value::Null));
        assert_eq!(aggregator.merge(user, &bound).unwrap(), MergeOutcome::Skipped);
        assert!(aggregator.is_empty());
    }

    #[test]
    fn matched_record_without_child_index_is_structural() {
        let (mut user, bound) = scanned(row(1, Some("car"), None));
        let key = fingerprint(&mut user, &bound).unwrap();

        let mut index = RecordIndex::new();
        index.records.insert(key, Record::default());
        let mut users = vec![User::default()];

        let err = merge_level(&mut index, &mut users, Box::new(user), &bound).unwrap_err();
        assert!(matches!(
            err,
            RowfoldError::Structural { entity: "User", ref child } if child == "vehicle"
        ));
    }

    fn merge_accounts(rows: &[(i64, Option<&str>, Option<&str>)]) -> Aggregator<Account> {
        let mut aggregator = Aggregator::new();
        for &(id, title, permission) in rows {
            let values: Vec<Value> = vec![id.into(), title.into(), permission.into()];
            let mut account = Account::default();
            let mut bound = bind(&mut account, &account_columns(), &ScanConfig::default()).unwrap();
            scan_row(&mut account, &mut bound, &values).unwrap();
            aggregator.merge(account, &bound).unwrap();
        }
        aggregator
    }

    #[test]
    fn collections_under_one_to_one_children_accumulate() {
        let aggregator = merge_accounts(&[
            (1, Some("admin"), Some("read")),
            (1, Some("admin"), Some("write")),
            (1, Some("admin"), Some("read")),
            (2, Some("guest"), None),
            (1, Some("admin"), Some("delete")),
        ]);

        let record = aggregator.index().records.values().find(|r| r.position() == 0).unwrap();
        let profile = record.nested("profile").unwrap();
        assert_eq!(profile.children("permission").map(RecordIndex::len), Some(3));

        let accounts = aggregator.into_entries();
        assert_eq!(accounts.len(), 2);
        let names: Vec<&str> = accounts[0]
            .profile
            .as_ref()
            .unwrap()
            .permissions
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["read", "write", "delete"]);
        assert!(accounts[1].profile.as_ref().unwrap().permissions.is_empty());
    }

    #[test]
    fn absent_one_to_one_child_has_no_nested_record() {
        let aggregator = merge_accounts(&[(5, None, None), (5, None, None)]);

        assert_eq!(aggregator.len(), 1);
        let record = aggregator.index().records.values().next().unwrap();
        assert!(record.nested("profile").is_none());
        assert_eq!(aggregator.entries()[0].profile, None);
    }
}
