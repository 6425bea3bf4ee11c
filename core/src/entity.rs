//! Entity traits and the binding slots generated code hands out.
//!
//! `#[derive(Entity)]` implements two traits for a struct:
//!
//! - [`Entity`]: the static side, describing the struct's annotated fields
//!   as an [`EntitySchema`] for the schema compiler.
//! - [`Fields`]: the object-safe side, walking a live instance and offering
//!   each annotated field to a [`FieldVisitor`] as an addressable slot.
//!
//! Every phase of a scan (bind, commit, collapse, fingerprint, merge) is a
//! visitor over the same walk, so slots are never held across phases and
//! collection elements are always re-resolved by position.

use core::any::Any;

use crate::codec::Codec;
use crate::error::{ColumnError, Result, RowfoldError};
use crate::schema::EntitySchema;
use crate::value::{ColumnValue, FromColumn};

/// Object-safe walk over a composite value's annotated fields.
pub trait Fields: Any {
    /// Struct name, used in error messages.
    fn entity_name(&self) -> &'static str;

    /// Offer every annotated field to `visitor`, in declaration order.
    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()>;
}

/// A composite type rows can be folded into.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be scanned from rows",
    label = "this type does not implement Entity",
    note = "add #[derive(Entity)] to the struct"
)]
pub trait Entity: Fields + Default {
    fn schema() -> EntitySchema;
}

/// Receives the slots of one entity during a walk.
///
/// `name` is the field's column-binding annotation, not the Rust field name.
/// All methods default to ignoring the slot.
pub trait FieldVisitor {
    fn scalar(&mut self, name: &'static str, slot: &mut dyn ScalarSlot) -> Result<()> {
        let _ = (name, slot);
        Ok(())
    }

    fn codec(&mut self, name: &'static str, slot: &mut dyn Codec) -> Result<()> {
        let _ = (name, slot);
        Ok(())
    }

    fn one_to_one(&mut self, name: &'static str, slot: &mut dyn ChildSlot) -> Result<()> {
        let _ = (name, slot);
        Ok(())
    }

    fn one_to_many(&mut self, name: &'static str, slot: &mut dyn CollectionSlot) -> Result<()> {
        let _ = (name, slot);
        Ok(())
    }
}

// =============================================================================
// Scalar slots
// =============================================================================

/// A field holding a single column value.
pub trait ScalarSlot {
    fn assign(&mut self, value: ColumnValue<'_>) -> core::result::Result<(), ColumnError>;

    fn print(&self, out: &mut String);
}

impl<T: FromColumn> ScalarSlot for T {
    fn assign(&mut self, value: ColumnValue<'_>) -> core::result::Result<(), ColumnError> {
        *self = T::from_column(value)?;
        Ok(())
    }

    fn print(&self, out: &mut String) {
        FromColumn::print(self, out);
    }
}

// =============================================================================
// One-to-one slots
// =============================================================================

/// A field holding one nested entity, possibly behind `Box` or `Option`.
pub trait ChildSlot {
    /// Return the nested entity, default-constructing it if it is not allocated yet.
    fn materialize(&mut self) -> &mut dyn Fields;

    fn get_mut(&mut self) -> Option<&mut dyn Fields>;

    /// Reset the field to its empty state.
    fn clear(&mut self);
}

/// `C`
pub struct Required<'a, C>(pub &'a mut C);

/// `Box<C>`
pub struct Boxed<'a, C>(pub &'a mut Box<C>);

/// `Option<C>`
pub struct Optional<'a, C>(pub &'a mut Option<C>);

/// `Option<Box<C>>`
pub struct OptionalBoxed<'a, C>(pub &'a mut Option<Box<C>>);

impl<C: Entity> ChildSlot for Required<'_, C> {
    fn materialize(&mut self) -> &mut dyn Fields {
        &mut *self.0
    }

    fn get_mut(&mut self) -> Option<&mut dyn Fields> {
        Some(&mut *self.0 as &mut dyn Fields)
    }

    fn clear(&mut self) {
        *self.0 = C::default();
    }
}

impl<C: Entity> ChildSlot for Boxed<'_, C> {
    fn materialize(&mut self) -> &mut dyn Fields {
        &mut **self.0
    }

    fn get_mut(&mut self) -> Option<&mut dyn Fields> {
        Some(&mut **self.0 as &mut dyn Fields)
    }

    fn clear(&mut self) {
        **self.0 = C::default();
    }
}

impl<C: Entity> ChildSlot for Optional<'_, C> {
    fn materialize(&mut self) -> &mut dyn Fields {
        self.0.get_or_insert_with(C::default)
    }

    fn get_mut(&mut self) -> Option<&mut dyn Fields> {
        self.0.as_mut().map(|child| child as &mut dyn Fields)
    }

    fn clear(&mut self) {
        *self.0 = None;
    }
}

impl<C: Entity> ChildSlot for OptionalBoxed<'_, C> {
    fn materialize(&mut self) -> &mut dyn Fields {
        &mut **self.0.get_or_insert_with(Box::default)
    }

    fn get_mut(&mut self) -> Option<&mut dyn Fields> {
        self.0.as_deref_mut().map(|child| child as &mut dyn Fields)
    }

    fn clear(&mut self) {
        *self.0 = None;
    }
}

// =============================================================================
// One-to-many slots
// =============================================================================

/// A growable collection of nested entities.
///
/// Elements are only ever addressed by position; callers re-resolve an
/// element through [`element_mut`](Self::element_mut) right before use.
pub trait CollectionSlot {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Fields>;

    /// Push a default-constructed element and return it.
    fn append_default(&mut self) -> &mut dyn Fields;

    fn pop_element(&mut self) -> Option<Box<dyn Fields>>;

    /// Append an element taken from another instance of the same collection type.
    fn push_element(&mut self, element: Box<dyn Fields>) -> Result<()>;

    fn clear(&mut self);
}

impl<C: Entity> CollectionSlot for Vec<C> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Fields> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|element| element as &mut dyn Fields)
    }

    fn append_default(&mut self) -> &mut dyn Fields {
        let index = Vec::len(self);
        self.push(C::default());
        &mut self[index]
    }

    fn pop_element(&mut self) -> Option<Box<dyn Fields>> {
        self.pop().map(|element| Box::new(element) as Box<dyn Fields>)
    }

    fn push_element(&mut self, element: Box<dyn Fields>) -> Result<()> {
        let found = element.entity_name();
        let element: Box<dyn Any> = element;
        match element.downcast::<C>() {
            Ok(element) => {
                self.push(*element);
                Ok(())
            }
            Err(_) => Err(RowfoldError::Mismatch {
                expected: core::any::type_name::<C>(),
                found,
            }),
        }
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

// =============================================================================
// Lookups
// =============================================================================

struct CollectionLookup<'n, F, R> {
    name: &'n str,
    action: Option<F>,
    outcome: Option<Result<R>>,
}

impl<F, R> FieldVisitor for CollectionLookup<'_, F, R>
where
    F: FnOnce(&mut dyn CollectionSlot) -> Result<R>,
{
    fn one_to_many(&mut self, name: &'static str, slot: &mut dyn CollectionSlot) -> Result<()> {
        if name == self.name
            && let Some(action) = self.action.take()
        {
            self.outcome = Some(action(slot));
        }
        Ok(())
    }
}

/// Run `action` against the one-to-many collection annotated `name` on the
/// live `entity`. Returns `Ok(None)` when the entity has no such collection.
pub(crate) fn with_collection<R>(
    entity: &mut dyn Fields,
    name: &str,
    action: impl FnOnce(&mut dyn CollectionSlot) -> Result<R>,
) -> Result<Option<R>> {
    let mut lookup = CollectionLookup {
        name,
        action: Some(action),
        outcome: None,
    };
    entity.visit_fields(&mut lookup)?;
    lookup.outcome.transpose()
}

struct ChildLookup<'n, F, R> {
    name: &'n str,
    action: Option<F>,
    outcome: Option<Result<R>>,
}

impl<F, R> FieldVisitor for ChildLookup<'_, F, R>
where
    F: FnOnce(&mut dyn Fields) -> Result<R>,
{
    fn one_to_one(&mut self, name: &'static str, slot: &mut dyn ChildSlot) -> Result<()> {
        if name == self.name
            && let Some(child) = slot.get_mut()
            && let Some(action) = self.action.take()
        {
            self.outcome = Some(action(child));
        }
        Ok(())
    }
}

/// Run `action` against the allocated one-to-one child annotated `name` on
/// the live `entity`. Returns `Ok(None)` when there is no such child or it
/// is not allocated.
pub(crate) fn with_child<R>(
    entity: &mut dyn Fields,
    name: &str,
    action: impl FnOnce(&mut dyn Fields) -> Result<R>,
) -> Result<Option<R>> {
    let mut lookup = ChildLookup {
        name,
        action: Some(action),
        outcome: None,
    };
    entity.visit_fields(&mut lookup)?;
    lookup.outcome.transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{User, Vehicle, VehicleMedium};

    #[test]
    fn optional_child_materializes_on_demand() {
        let mut medium: Option<Box<VehicleMedium>> = None;
        let mut slot = OptionalBoxed(&mut medium);
        assert!(slot.get_mut().is_none());
        assert_eq!(slot.materialize().entity_name(), "VehicleMedium");
        assert!(slot.get_mut().is_some());
        slot.clear();
        assert!(medium.is_none());
    }

    #[test]
    fn collection_pushes_only_matching_elements() {
        let mut vehicles: Vec<Vehicle> = Vec::new();
        vehicles.append_default();
        assert_eq!(CollectionSlot::len(&vehicles), 1);

        let popped = vehicles.pop_element().unwrap();
        assert!(CollectionSlot::is_empty(&vehicles));
        vehicles.push_element(popped).unwrap();
        assert_eq!(vehicles.len(), 1);

        let stranger: Box<dyn Fields> = Box::new(VehicleMedium::default());
        assert!(matches!(
            vehicles.push_element(stranger),
            Err(RowfoldError::Mismatch {
                found: "VehicleMedium",
                ..
            })
        ));
    }

    #[test]
    fn with_child_skips_unallocated_children() {
        let mut user = User::default();
        let missing = with_child(&mut user, "role", |role| Ok(role.entity_name())).unwrap();
        assert_eq!(missing, None);

        user.role = Some(Box::default());
        let found = with_child(&mut user, "role", |role| Ok(role.entity_name())).unwrap();
        assert_eq!(found, Some("Role"));
    }

    #[test]
    fn with_collection_finds_by_annotation() {
        let mut vehicle = Vehicle::default();
        let pushed = with_collection(&mut vehicle, "medium", |media| {
            media.append_default();
            Ok(media.len())
        })
        .unwrap();
        assert_eq!(pushed, Some(1));
        assert_eq!(vehicle.mediums.len(), 1);

        let missing = with_collection(&mut vehicle, "wheels", |media| Ok(media.len())).unwrap();
        assert_eq!(missing, None);
    }
}
