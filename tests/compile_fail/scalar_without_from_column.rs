//! Test that forcing a non-column type to scalar fails to compile.

use rowfold::prelude::*;

#[derive(Default)]
struct Money {
    cents: i64,
}

#[derive(Entity, Default)]
struct Invoice {
    // ERROR: Money does not implement FromColumn
    #[scan("total", scalar)]
    total: Money,
}

fn main() {}
