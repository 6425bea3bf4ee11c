//! Content identity of a bound entity.
//!
//! The byte print of an entity is, in declaration order, every scalar as
//! `{column:text}` (or `{column}` when the column was NULL) and every codec
//! as `{column#len:identity}` (or `{column#}` when it has no identity),
//! followed by the byte prints of its one-to-one children, each wrapped as
//! `[prefix:...]`, or `[prefix]` when the child is absent. One-to-many
//! children never contribute.

use core::fmt;

use sha2::{Digest, Sha256};

use crate::bind::BoundEntity;
use crate::codec::Codec;
use crate::entity::{ChildSlot, FieldVisitor, Fields, ScalarSlot};
use crate::error::{Result, RowfoldError};

/// SHA-256 digest of an entity's byte print.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

/// Fingerprint the live `entity` as bound by `bound`.
pub fn fingerprint(entity: &mut dyn Fields, bound: &BoundEntity) -> Result<Fingerprint> {
    crate::rowfold_profile_scope!("rowfold", "fingerprint");
    Ok(Fingerprint::of(&byte_print(entity, bound)?))
}

/// The bytes [`fingerprint`] hashes. Useful when two rows unexpectedly
/// merge or split.
pub fn byte_print(entity: &mut dyn Fields, bound: &BoundEntity) -> Result<Vec<u8>> {
    let mut printer = Printer {
        bound,
        own: Vec::new(),
        children: Vec::new(),
        text: String::new(),
    };
    entity.visit_fields(&mut printer)?;

    let mut bytes = printer.own;
    bytes.extend_from_slice(&printer.children);
    Ok(bytes)
}

struct Printer<'b> {
    bound: &'b BoundEntity,
    own: Vec<u8>,
    children: Vec<u8>,
    text: String,
}

impl FieldVisitor for Printer<'_> {
    fn scalar(&mut self, name: &'static str, slot: &mut dyn ScalarSlot) -> Result<()> {
        let bound = self.bound.slot(name).ok_or_else(|| unbound(self.bound, name))?;
        self.own.push(b'{');
        self.own.extend_from_slice(bound.column().as_bytes());
        if bound.is_present() {
            self.text.clear();
            slot.print(&mut self.text);
            self.own.push(b':');
            self.own.extend_from_slice(self.text.as_bytes());
        }
        self.own.push(b'}');
        Ok(())
    }

    fn codec(&mut self, name: &'static str, slot: &mut dyn Codec) -> Result<()> {
        let bound = self.bound.slot(name).ok_or_else(|| unbound(self.bound, name))?;
        self.own.push(b'{');
        self.own.extend_from_slice(bound.column().as_bytes());
        self.own.push(b'#');
        if let Some(identity) = slot.identity() {
            self.own.extend_from_slice(identity.len().to_string().as_bytes());
            self.own.push(b':');
            self.own.extend_from_slice(&identity);
        }
        self.own.push(b'}');
        Ok(())
    }

    fn one_to_one(&mut self, name: &'static str, slot: &mut dyn ChildSlot) -> Result<()> {
        let child = self.bound.child(name).ok_or_else(|| unbound(self.bound, name))?;
        self.children.push(b'[');
        self.children.extend_from_slice(child.prefix().as_bytes());
        if !child.is_absent()
            && let Some(entity) = slot.get_mut()
        {
            let stream = byte_print(entity, child)?;
            self.children.push(b':');
            self.children.extend_from_slice(&stream);
        }
        self.children.push(b']');
        Ok(())
    }
}

fn unbound(bound: &BoundEntity, name: &str) -> RowfoldError {
    RowfoldError::Structural {
        entity: bound.entity(),
        child: name.into(),
    }
}
