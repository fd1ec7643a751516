//! Root finding, lazy tree expansion and path search over a model's
//! containment structure

pub mod node;
pub mod strategy;
pub mod tree;
pub mod paths;
pub mod config;
pub mod engine;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use node::{ChildEdge, ComponentNode, Strategy};
pub use strategy::{ExpansionContext, InheritedAssociationStrategy, RootContext, StrictStrategy, StructureStrategy};
pub use tree::TreeBuilder;
pub use paths::PathResolver;
pub use config::{ConfigError, DEFAULT_MAX_REFINEMENT_PASSES, EngineConfig};
pub use engine::{Scope, StructureEngine};
