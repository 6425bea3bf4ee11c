//! Test that an unknown scan flag fails to compile.

use rowfold::prelude::*;

#[derive(Entity, Default)]
struct User {
    // ERROR: flags are codec, scalar, one or many
    #[scan("id", primary)]
    id: i64,
}

fn main() {}
