//! Lazy, on-demand expansion of structure nodes

use crate::node::ComponentNode;
use crate::strategy::ExpansionContext;
use std::sync::Arc;
use trellis_core::{AssociationKinds, TypeRepository};

pub struct TreeBuilder<'a> {
    repository: &'a dyn TypeRepository,
    kinds: AssociationKinds,
    include_referenced: bool,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(repository: &'a dyn TypeRepository, kinds: AssociationKinds, include_referenced: bool) -> Self {
        TreeBuilder {
            repository,
            kinds,
            include_referenced,
        }
    }

    /// Subtype children first, then association children, each in source
    /// order. A repetition node has no children.
    pub fn children(&self, node: &ComponentNode) -> Vec<ComponentNode> {
        if node.is_repetition() {
            return Vec::new();
        }

        let ctx = ExpansionContext {
            repository: self.repository,
            graph: node.scope(),
            kinds: self.kinds,
            include_referenced: self.include_referenced,
        };
        let strategy = node.strategy.implementation();
        let project = &node.source_project;

        let edges = strategy
            .subtype_edges(&node.value, project, &ctx)
            .into_iter()
            .chain(strategy.association_edges(&node.value, project, &ctx))
            .collect::<Vec<_>>();
        if edges.is_empty() {
            return Vec::new();
        }

        let parent = Arc::new(node.clone());
        let children: Vec<ComponentNode> = edges
            .into_iter()
            .map(|edge| ComponentNode::child(&parent, edge))
            .collect();
        tracing::trace!("Expanded {} into {} children", node.value, children.len());
        children
    }

    pub fn has_children(&self, node: &ComponentNode) -> bool {
        !node.is_repetition() && !self.children(node).is_empty()
    }
}
