#![recursion_limit = "128"]

extern crate proc_macro;

mod common;
mod entity;
mod paths;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `Entity` and `Fields` so rows can be folded into the struct.
///
/// Fields opt into binding with `#[scan("name")]`. Nested structs compose
/// column names with a separator, `_` by default, so `vehicle_colour` binds
/// the `colour` field of the child annotated `vehicle`.
///
/// # Field kinds
///
/// The binding is inferred from the field's type:
///
/// - integers, floats, `bool`, `char`, `String`, `Vec<u8>`, date/time and
///   uuid types, and `Option` of those: a scalar column;
/// - `Vec<T>`: a one-to-many child, merged across rows;
/// - `T`, `Box<T>`, `Option<T>`, `Option<Box<T>>`: a one-to-one child.
///
/// A flag overrides inference: `#[scan("name", codec)]` for types
/// implementing `Codec`, `scalar`, `one` or `many`.
///
/// Arrays, maps, nested collections, callables, channels and trait objects
/// are rejected when the schema is validated, before any row is read.
///
/// # Example
///
/// ```ignore
/// use rowfold::prelude::*;
///
/// #[derive(Entity, Default, Debug)]
/// struct User {
///     #[scan("id")]
///     id: i64,
///     #[scan("role")]
///     role: Option<Box<Role>>,
///     #[scan("vehicle")]
///     vehicles: Vec<Vehicle>,
/// }
///
/// #[derive(Entity, Default, Debug)]
/// struct Role {
///     #[scan("title")]
///     title: String,
/// }
///
/// #[derive(Entity, Default, Debug)]
/// struct Vehicle {
///     #[scan("type")]
///     kind: String,
/// }
///
/// // SELECT u.id, r.title AS role_title, v.type AS vehicle_type FROM ...
/// let users: Vec<User> = rowfold::scan_all(rows)?;
/// ```
#[proc_macro_derive(Entity, attributes(scan))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match entity::generate_entity(input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
