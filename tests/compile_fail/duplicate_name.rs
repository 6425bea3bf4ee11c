//! Test that binding one column name twice fails to compile.

use rowfold::prelude::*;

#[derive(Entity, Default)]
struct User {
    #[scan("id")]
    id: i64,
    // ERROR: `id` is already bound
    #[scan("id")]
    legacy_id: i64,
}

fn main() {}
