pub mod buildings;
pub mod common;
pub mod map;
