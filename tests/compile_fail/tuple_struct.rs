//! Test that deriving Entity on a tuple struct fails to compile.

use rowfold::prelude::*;

// ERROR: fields need names to carry #[scan] annotations
#[derive(Entity, Default)]
struct Point(i64, i64);

fn main() {}
