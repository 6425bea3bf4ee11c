//! Hand-written entities for unit tests, shaped like `#[derive(Entity)]`
//! output so the runtime can be tested without the derive crate.

use std::collections::HashMap;

use crate::bind::ColumnIndex;
use crate::codec::Codec;
use crate::entity::{Entity, FieldVisitor, Fields, Optional, OptionalBoxed};
use crate::error::{ColumnError, Result};
use crate::schema::{EntitySchema, FieldSchema, Shape};
use crate::value::ColumnValue;

/// Comma separated tags stored in one TEXT column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Characteristics(pub Vec<String>);

impl Codec for Characteristics {
    fn scan(&mut self, value: ColumnValue<'_>) -> core::result::Result<(), ColumnError> {
        match value {
            ColumnValue::Text(text) => {
                self.0 = text.split(',').map(str::to_owned).collect();
                Ok(())
            }
            other => Err(ColumnError::TypeMismatch {
                expected: "comma separated TEXT",
                found: other.type_name(),
            }),
        }
    }

    fn identity(&self) -> Option<Vec<u8>> {
        Some(self.0.join(",").into_bytes())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub characteristics: Option<Characteristics>,
    pub role: Option<Box<Role>>,
    pub vehicles: Vec<Vehicle>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Role {
    pub title: String,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vehicle {
    pub kind: String,
    pub colour: String,
    pub mediums: Vec<VehicleMedium>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleMedium {
    pub name: String,
}

/// Every column [`User`] binds, in the order test rows are written.
pub fn user_columns() -> ColumnIndex {
    ColumnIndex::new([
        "id",
        "name",
        "characteristics",
        "role_title",
        "role_department",
        "vehicle_type",
        "vehicle_colour",
        "vehicle_medium_name",
    ])
}

impl Fields for User {
    fn entity_name(&self) -> &'static str {
        "User"
    }

    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
        visitor.scalar("id", &mut self.id)?;
        visitor.scalar("name", &mut self.name)?;
        visitor.codec("characteristics", &mut self.characteristics)?;
        visitor.one_to_one("role", &mut OptionalBoxed(&mut self.role))?;
        visitor.one_to_many("vehicle", &mut self.vehicles)?;
        Ok(())
    }
}

impl Entity for User {
    fn schema() -> EntitySchema {
        EntitySchema::of::<Self>(
            "User",
            vec![
                FieldSchema::scalar("id", "id", "i64"),
                FieldSchema::scalar("name", "name", "String"),
                FieldSchema::codec("characteristics", "characteristics", "Option<Characteristics>"),
                FieldSchema::one_to_one::<Role>("role", "role", "Option<Box<Role>>"),
                FieldSchema::one_to_many::<Vehicle>("vehicle", "vehicles", "Vec<Vehicle>"),
            ],
        )
    }
}

impl Fields for Role {
    fn entity_name(&self) -> &'static str {
        "Role"
    }

    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
        visitor.scalar("title", &mut self.title)?;
        visitor.scalar("department", &mut self.department)
    }
}

impl Entity for Role {
    fn schema() -> EntitySchema {
        EntitySchema::of::<Self>(
            "Role",
            vec![
                FieldSchema::scalar("title", "title", "String"),
                FieldSchema::scalar("department", "department", "Option<String>"),
            ],
        )
    }
}

impl Fields for Vehicle {
    fn entity_name(&self) -> &'static str {
        "Vehicle"
    }

    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
        visitor.scalar("type", &mut self.kind)?;
        visitor.scalar("colour", &mut self.colour)?;
        visitor.one_to_many("medium", &mut self.mediums)
    }
}

impl Entity for Vehicle {
    fn schema() -> EntitySchema {
        EntitySchema::of::<Self>(
            "Vehicle",
            vec![
                FieldSchema::scalar("type", "kind", "String"),
                FieldSchema::scalar("colour", "colour", "String"),
                FieldSchema::one_to_many::<VehicleMedium>("medium", "mediums", "Vec<VehicleMedium>"),
            ],
        )
    }
}

impl Fields for VehicleMedium {
    fn entity_name(&self) -> &'static str {
        "VehicleMedium"
    }

    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
        visitor.scalar("name", &mut self.name)
    }
}

impl Entity for VehicleMedium {
    fn schema() -> EntitySchema {
        EntitySchema::of::<Self>("VehicleMedium", vec![FieldSchema::scalar("name", "name", "String")])
    }
}

// Account -> Profile -> [Permission]: a collection under a one-to-one child.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    pub id: i64,
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub title: String,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Permission {
    pub name: String,
}

pub fn account_columns() -> ColumnIndex {
    ColumnIndex::new(["id", "profile_title", "profile_permission_name"])
}

impl Fields for Account {
    fn entity_name(&self) -> &'static str {
        "Account"
    }

    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
        visitor.scalar("id", &mut self.id)?;
        visitor.one_to_one("profile", &mut Optional(&mut self.profile))
    }
}

impl Entity for Account {
    fn schema() -> EntitySchema {
        EntitySchema::of::<Self>(
            "Account",
            vec![
                FieldSchema::scalar("id", "id", "i64"),
                FieldSchema::one_to_one::<Profile>("profile", "profile", "Option<Profile>"),
            ],
        )
    }
}

impl Fields for Profile {
    fn entity_name(&self) -> &'static str {
        "Profile"
    }

    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
        visitor.scalar("title", &mut self.title)?;
        visitor.one_to_many("permission", &mut self.permissions)
    }
}

impl Entity for Profile {
    fn schema() -> EntitySchema {
        EntitySchema::of::<Self>(
            "Profile",
            vec![
                FieldSchema::scalar("title", "title", "String"),
                FieldSchema::one_to_many::<Permission>("permission", "permissions", "Vec<Permission>"),
            ],
        )
    }
}

impl Fields for Permission {
    fn entity_name(&self) -> &'static str {
        "Permission"
    }

    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
        visitor.scalar("name", &mut self.name)
    }
}

impl Entity for Permission {
    fn schema() -> EntitySchema {
        EntitySchema::of::<Self>("Permission", vec![FieldSchema::scalar("name", "name", "String")])
    }
}

// Node -> Link -> Node
#[derive(Debug, Default)]
pub struct Node {
    pub id: i64,
    pub link: Option<Box<Link>>,
}

#[derive(Debug, Default)]
pub struct Link {
    pub node: Option<Box<Node>>,
}

impl Fields for Node {
    fn entity_name(&self) -> &'static str {
        "Node"
    }

    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
        visitor.scalar("id", &mut self.id)?;
        visitor.one_to_one("link", &mut OptionalBoxed(&mut self.link))
    }
}

impl Entity for Node {
    fn schema() -> EntitySchema {
        EntitySchema::of::<Self>(
            "Node",
            vec![
                FieldSchema::scalar("id", "id", "i64"),
                FieldSchema::one_to_one::<Link>("link", "link", "Option<Box<Link>>"),
            ],
        )
    }
}

impl Fields for Link {
    fn entity_name(&self) -> &'static str {
        "Link"
    }

    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
        visitor.one_to_one("node", &mut OptionalBoxed(&mut self.node))
    }
}

impl Entity for Link {
    fn schema() -> EntitySchema {
        EntitySchema::of::<Self>(
            "Link",
            vec![FieldSchema::one_to_one::<Node>("node", "node", "Option<Box<Node>>")],
        )
    }
}

#[derive(Debug, Default)]
pub struct WithMap {
    pub id: i64,
    pub lookup: HashMap<String, i64>,
}

impl Fields for WithMap {
    fn entity_name(&self) -> &'static str {
        "WithMap"
    }

    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
        visitor.scalar("id", &mut self.id)
    }
}

impl Entity for WithMap {
    fn schema() -> EntitySchema {
        EntitySchema::of::<Self>(
            "WithMap",
            vec![
                FieldSchema::scalar("id", "id", "i64"),
                FieldSchema::unsupported("lookup", "lookup", "HashMap<String, i64>", Shape::Map),
            ],
        )
    }
}

/// Two fields bound to the same column.
#[derive(Debug, Default)]
pub struct Pair {
    pub left: i64,
    pub right: i64,
}

impl Fields for Pair {
    fn entity_name(&self) -> &'static str {
        "Pair"
    }

    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()> {
        visitor.scalar("id", &mut self.left)?;
        visitor.scalar("id", &mut self.right)
    }
}

impl Entity for Pair {
    fn schema() -> EntitySchema {
        EntitySchema::of::<Self>(
            "Pair",
            vec![
                FieldSchema::scalar("id", "left", "i64"),
                FieldSchema::scalar("id", "right", "i64"),
            ],
        )
    }
}
