//! SeaORM entity definitions for the roster database schema.

pub mod prelude;
pub mod profile;
