//! Schema compiler: decides, before any row is read, whether a target type
//! can be scanned into.
//!
//! Each [`Entity`] describes its annotated fields as an [`EntitySchema`].
//! Nested composites are referenced through `fn() -> EntitySchema` pointers,
//! so describing a self-referential type never recurses on its own; the walk
//! here does, guarded by a path set.

use core::any::TypeId;
use core::fmt;

use hashbrown::HashSet;

use crate::config::ScanConfig;
use crate::entity::Entity;
use crate::error::SchemaError;

/// Lazily produced schema of a nested entity type.
pub type SchemaFn = fn() -> EntitySchema;

/// Field shapes the binder cannot fill structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `[T; N]`
    Array,
    /// `HashMap`, `BTreeMap`, sets
    Map,
    /// `Vec<Vec<T>>` and deeper
    NestedCollection,
    /// `fn(..)`, `dyn Fn(..)`
    Callable,
    /// `Sender<T>`, `Receiver<T>`
    Channel,
    /// `dyn Trait`, `impl Trait`
    Polymorphic,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Array => "arrays",
            Self::Map => "maps",
            Self::NestedCollection => "multi-dimensional collections",
            Self::Callable => "callables",
            Self::Channel => "channels",
            Self::Polymorphic => "trait objects",
        })
    }
}

#[derive(Clone, Copy)]
pub enum FieldKind {
    Scalar,
    Codec,
    OneToOne(SchemaFn),
    OneToMany(SchemaFn),
    Unsupported(Shape),
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("Scalar"),
            Self::Codec => f.write_str("Codec"),
            Self::OneToOne(schema) => write!(f, "OneToOne({})", schema().name),
            Self::OneToMany(schema) => write!(f, "OneToMany({})", schema().name),
            Self::Unsupported(shape) => write!(f, "Unsupported({shape:?})"),
        }
    }
}

/// One annotated field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    /// Column-binding annotation.
    pub name: &'static str,
    /// Rust field identifier.
    pub ident: &'static str,
    /// Declared type, as written.
    pub type_name: &'static str,
    pub kind: FieldKind,
}

impl FieldSchema {
    pub const fn new(
        name: &'static str,
        ident: &'static str,
        type_name: &'static str,
        kind: FieldKind,
    ) -> Self {
        Self {
            name,
            ident,
            type_name,
            kind,
        }
    }

    pub const fn scalar(name: &'static str, ident: &'static str, type_name: &'static str) -> Self {
        Self::new(name, ident, type_name, FieldKind::Scalar)
    }

    pub const fn codec(name: &'static str, ident: &'static str, type_name: &'static str) -> Self {
        Self::new(name, ident, type_name, FieldKind::Codec)
    }

    pub fn one_to_one<C: Entity>(
        name: &'static str,
        ident: &'static str,
        type_name: &'static str,
    ) -> Self {
        Self::new(name, ident, type_name, FieldKind::OneToOne(C::schema))
    }

    pub fn one_to_many<C: Entity>(
        name: &'static str,
        ident: &'static str,
        type_name: &'static str,
    ) -> Self {
        Self::new(name, ident, type_name, FieldKind::OneToMany(C::schema))
    }

    pub const fn unsupported(
        name: &'static str,
        ident: &'static str,
        type_name: &'static str,
        shape: Shape,
    ) -> Self {
        Self::new(name, ident, type_name, FieldKind::Unsupported(shape))
    }

    /// Schema of the nested entity, for one-to-one and one-to-many fields.
    pub fn nested(&self) -> Option<EntitySchema> {
        match self.kind {
            FieldKind::OneToOne(schema) | FieldKind::OneToMany(schema) => Some(schema()),
            _ => None,
        }
    }
}

/// Static description of an entity type's annotated fields.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    pub name: &'static str,
    pub type_id: TypeId,
    pub fields: Vec<FieldSchema>,
}

impl EntitySchema {
    pub fn of<T: Entity>(name: &'static str, fields: Vec<FieldSchema>) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validate `T` as a scan target.
pub fn validate<T: Entity>(config: &ScanConfig) -> Result<(), SchemaError> {
    validate_schema(&T::schema(), config)
}

/// Validate a schema tree, reporting the first violation.
///
/// The cycle walk has to finish before the shape walk: the shape walk
/// follows nested schemas and would never terminate on a cycle.
pub fn validate_schema(root: &EntitySchema, config: &ScanConfig) -> Result<(), SchemaError> {
    let mut path = Vec::new();
    check_cycles(root, &mut path, config.max_depth())?;

    let mut seen = HashSet::new();
    check_fields(root, &mut seen)
}

fn check_cycles(
    schema: &EntitySchema,
    path: &mut Vec<(TypeId, &'static str)>,
    limit: usize,
) -> Result<(), SchemaError> {
    if path.iter().any(|(id, _)| *id == schema.type_id) {
        let mut names: Vec<&str> = path.iter().map(|(_, name)| *name).collect();
        names.push(schema.name);
        return Err(SchemaError::Cycle {
            type_name: schema.name,
            path: names.join(" -> "),
        });
    }
    if path.len() >= limit {
        return Err(SchemaError::TooDeep {
            type_name: schema.name,
            limit,
        });
    }

    path.push((schema.type_id, schema.name));
    for nested in schema.fields.iter().filter_map(FieldSchema::nested) {
        check_cycles(&nested, path, limit)?;
    }
    path.pop();
    Ok(())
}

fn check_fields(schema: &EntitySchema, seen: &mut HashSet<TypeId>) -> Result<(), SchemaError> {
    if !seen.insert(schema.type_id) {
        return Ok(());
    }

    for (index, field) in schema.fields.iter().enumerate() {
        if schema.fields[..index].iter().any(|f| f.name == field.name) {
            return Err(SchemaError::DuplicateName {
                entity: schema.name,
                name: field.name,
            });
        }

        match field.kind {
            FieldKind::Unsupported(shape) => {
                return Err(SchemaError::Unsupported {
                    entity: schema.name,
                    field: field.ident,
                    shape,
                    type_name: field.type_name,
                });
            }
            FieldKind::OneToOne(nested) | FieldKind::OneToMany(nested) => {
                check_fields(&nested(), seen)?;
            }
            FieldKind::Scalar | FieldKind::Codec => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{Node, Pair, User, WithMap};

    #[test]
    fn accepts_nested_user() {
        assert_eq!(validate::<User>(&ScanConfig::default()), Ok(()));
    }

    #[test]
    fn rejects_cycles_before_shapes() {
        let err = validate::<Node>(&ScanConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::Cycle {
                type_name: "Node",
                path: "Node -> Link -> Node".into(),
            }
        );
    }

    #[test]
    fn rejects_unsupported_shapes_by_type_name() {
        let err = validate::<WithMap>(&ScanConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::Unsupported {
                entity: "WithMap",
                field: "lookup",
                shape: Shape::Map,
                type_name: "HashMap<String, i64>",
            }
        );
        assert!(err.to_string().contains("HashMap<String, i64>"));
    }

    #[test]
    fn rejects_duplicate_annotations() {
        let err = validate::<Pair>(&ScanConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateName {
                entity: "Pair",
                name: "id",
            }
        );
    }

    #[test]
    fn depth_limit_is_configurable() {
        let config = ScanConfig::default().with_max_depth(2);
        assert_eq!(
            validate::<User>(&config),
            Err(SchemaError::TooDeep {
                type_name: "VehicleMedium",
                limit: 2,
            })
        );
    }
}
