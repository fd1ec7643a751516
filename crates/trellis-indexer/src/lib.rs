//! Project-scoped type gathering for the structure engine

pub mod indexer;


pub use indexer::{GraphIndexer, ProjectIndex};
