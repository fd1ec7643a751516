//! Root-finding and child-expansion strategies

pub mod strict;
pub mod inherited;

use crate::node::{ChildEdge, Strategy};
use std::collections::HashSet;
use std::sync::Arc;
use trellis_core::{AssociationKinds, CancellationToken, Outcome, ProjectId, Type, TypeGraph, TypeRepository};
use trellis_indexer::ProjectIndex;

pub use inherited::InheritedAssociationStrategy;
pub use strict::StrictStrategy;

/// Everything a root computation reads.
pub struct RootContext<'a> {
    pub repository: &'a dyn TypeRepository,
    pub index: &'a ProjectIndex,
    pub kinds: AssociationKinds,
    pub include_referenced: bool,
    pub max_refinement_passes: usize,
}

impl<'a> RootContext<'a> {
    pub fn graph(&self) -> &'a TypeGraph {
        &self.index.graph
    }

    pub fn project(&self) -> &'a ProjectId {
        &self.index.project
    }

    /// The context a tree expansion over the same snapshot would use.
    pub fn expansion(&self) -> ExpansionContext<'a> {
        ExpansionContext {
            repository: self.repository,
            graph: &self.index.graph,
            kinds: self.kinds,
            include_referenced: self.include_referenced,
        }
    }
}

/// Everything a child expansion reads.
#[derive(Clone, Copy)]
pub struct ExpansionContext<'a> {
    pub repository: &'a dyn TypeRepository,
    pub graph: &'a TypeGraph,
    pub kinds: AssociationKinds,
    /// Whether subtypes in referenced projects are visible.
    pub include_referenced: bool,
}

/// The scoping predicates that distinguish the structure variants.
pub trait StructureStrategy: Send + Sync {
    /// Roots of the whole project the context was indexed for.
    fn project_roots(&self, ctx: &RootContext<'_>, token: &CancellationToken) -> Outcome<Vec<Arc<Type>>>;

    /// Roots of the structure containing `ty`.
    fn type_roots(&self, ty: &Arc<Type>, ctx: &RootContext<'_>, token: &CancellationToken) -> Outcome<Vec<Arc<Type>>>;

    /// Subtype edges of `ty` as seen from `project`, in source order.
    fn subtype_edges(&self, ty: &Type, project: &ProjectId, ctx: &ExpansionContext<'_>) -> Vec<ChildEdge>;

    /// Association edges of `ty` as seen from `project`.
    fn association_edges(&self, ty: &Type, project: &ProjectId, ctx: &ExpansionContext<'_>) -> Vec<ChildEdge>;
}

static STRICT: StrictStrategy = StrictStrategy;
static INHERITED: InheritedAssociationStrategy = InheritedAssociationStrategy;

impl Strategy {
    pub fn implementation(self) -> &'static dyn StructureStrategy {
        match self {
            Strategy::Strict => &STRICT,
            Strategy::InheritedAssociation => &INHERITED,
        }
    }
}

/// Append the entries of `more` not yet in `into`, keeping order.
pub(crate) fn merge(into: &mut Vec<Arc<Type>>, more: Vec<Arc<Type>>) {
    for ty in more {
        if !into.contains(&ty) {
            into.push(ty);
        }
    }
}

/// Drop every root reachable from another root. When two roots reach each
/// other the earlier one is kept.
pub(crate) fn maximal_roots(graph: &TypeGraph, kinds: &AssociationKinds, roots: Vec<Arc<Type>>) -> Vec<Arc<Type>> {
    let mut kept: Vec<(Arc<Type>, HashSet<Arc<Type>>)> = Vec::new();

    for root in roots {
        if kept.iter().any(|(_, reach)| reach.contains(&root)) {
            tracing::trace!("Root {} is reachable from another root", root);
            continue;
        }
        let reach: HashSet<Arc<Type>> = graph.reachable_from(&root, kinds).into_iter().collect();
        kept.retain(|(other, _)| !reach.contains(other));
        kept.push((root, reach));
    }

    kept.into_iter().map(|(root, _)| root).collect()
}
