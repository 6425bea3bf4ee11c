//! Test that deriving Entity on an enum fails to compile.

use rowfold::prelude::*;

// ERROR: only structs with named fields can be scanned into
#[derive(Entity, Default)]
enum Medium {
    #[default]
    Land,
    Sea,
}

fn main() {}
