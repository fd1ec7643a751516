//! Test utilities for the type arena

use crate::model::Type;
use crate::graph::TypeGraph;
use std::sync::Arc;

/// Build an arena over `types`, in the given order.
pub fn graph_of(types: Vec<Type>) -> TypeGraph {
    TypeGraph::from_types(types.into_iter().map(Arc::new))
}

/// Qualified names of `types`, for compact assertions.
pub fn names(types: &[Arc<Type>]) -> Vec<&str> {
    types.iter().map(|t| t.qualified_name.as_str()).collect()
}

/// A small policy model spread over a base project and a project `p`:
///
/// ```text
/// base.Policy ──composition──▶ base.Coverage
///     ▲                            ▲
/// p.HomePolicy ──aggregation──▶ p.FireCoverage
/// ```
pub fn two_layer_model() -> Vec<Type> {
    vec![
        Type::policy("p", "p.HomePolicy")
            .extends("base.Policy")
            .aggregates("p.FireCoverage"),
        Type::policy("p", "p.FireCoverage").extends("base.Coverage"),
        Type::policy("base", "base.Policy").composes("base.Coverage"),
        Type::policy("base", "base.Coverage"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_layer_model_resolves() {
        let graph = graph_of(two_layer_model());
        assert_eq!(graph.len(), 4);
        assert!(graph.resolve("base.Coverage").is_some());
    }
}
