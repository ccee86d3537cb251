//! CLI command implementations.

pub mod common;
pub mod convert;
pub mod edges;
pub mod nodes;
pub mod path;
pub mod rank;
pub mod version;
