//! Test that a nested struct without the derive fails to compile.

use rowfold::prelude::*;

#[derive(Default)]
struct Role {
    title: String,
}

#[derive(Entity, Default)]
struct User {
    #[scan("id")]
    id: i64,
    // ERROR: Role does not implement Entity
    #[scan("role")]
    role: Option<Role>,
}

fn main() {}
