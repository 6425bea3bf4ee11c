//! Test that a collection of scalars fails to compile.

use rowfold::prelude::*;

#[derive(Entity, Default)]
struct User {
    #[scan("id")]
    id: i64,
    // ERROR: elements of a one-to-many field must be entities
    #[scan("nickname")]
    nicknames: Vec<String>,
}

fn main() {}
