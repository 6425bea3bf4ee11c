//! Test that an optional one-to-many field fails to compile.

use rowfold::prelude::*;

#[derive(Entity, Default)]
struct Vehicle {
    #[scan("type")]
    kind: String,
}

#[derive(Entity, Default)]
struct User {
    #[scan("id")]
    id: i64,
    // ERROR: a parent without children already gets an empty Vec
    #[scan("vehicle")]
    vehicles: Option<Vec<Vehicle>>,
}

fn main() {}
