//! Type arena using petgraph::StableDiGraph, keyed by qualified name

use crate::model::*;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Edge payload of the type arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Supertype → subtype.
    Subtype,
    /// Declaring type → target. Holds the index into the declaring type's
    /// association list.
    Association(usize),
}

/// Immutable snapshot of the types visible in one computation.
///
/// Nodes are the types in snapshot order; supertype and association
/// references are resolved to edges once, by qualified name. Dangling
/// references produce no edge.
pub struct TypeGraph {
    inner: StableDiGraph<Arc<Type>, Relation>,
    by_name: HashMap<String, NodeIndex>,
}

impl std::fmt::Debug for TypeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeGraph")
            .field("type_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl TypeGraph {
    /// Build the arena. When two types share a qualified name the first one
    /// wins, so callers list the types of the project of interest first.
    pub fn from_types(types: impl IntoIterator<Item = Arc<Type>>) -> Self {
        let mut inner = StableDiGraph::new();
        let mut by_name = HashMap::new();

        for ty in types {
            if by_name.contains_key(&ty.qualified_name) {
                tracing::debug!(
                    "Shadowed type {} from project {}",
                    ty.qualified_name,
                    ty.project
                );
                continue;
            }
            let name = ty.qualified_name.clone();
            let idx = inner.add_node(ty);
            by_name.insert(name, idx);
        }

        let indices: Vec<NodeIndex> = inner.node_indices().collect();
        for idx in indices {
            let ty = Arc::clone(&inner[idx]);
            if let Some(sup) = ty.supertype.as_ref().and_then(|name| by_name.get(name)) {
                inner.add_edge(*sup, idx, Relation::Subtype);
            }
            for (position, association) in ty.associations.iter().enumerate() {
                if let Some(target) = by_name.get(&association.target) {
                    inner.add_edge(idx, *target, Relation::Association(position));
                }
            }
        }

        TypeGraph { inner, by_name }
    }

    /// Total number of types.
    pub fn len(&self) -> usize {
        self.inner.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Iterate over all types in snapshot order.
    pub fn types(&self) -> impl Iterator<Item = &Arc<Type>> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Types owned by `project`, in snapshot order.
    pub fn owned_by<'a>(&'a self, project: &'a ProjectId) -> impl Iterator<Item = &'a Arc<Type>> + 'a {
        self.types().filter(move |t| t.is_owned_by(project))
    }

    /// Find a type by qualified name.
    pub fn resolve(&self, qualified_name: &str) -> Option<&Arc<Type>> {
        self.by_name
            .get(qualified_name)
            .and_then(|idx| self.inner.node_weight(*idx))
    }

    /// Whether this exact type (same project and name) is part of the snapshot.
    pub fn contains(&self, ty: &Type) -> bool {
        self.resolve(&ty.qualified_name).is_some_and(|t| **t == *ty)
    }

    fn index_of(&self, ty: &Type) -> Option<NodeIndex> {
        self.by_name
            .get(&ty.qualified_name)
            .copied()
            .filter(|idx| *self.inner[*idx] == *ty)
    }

    /// The resolved supertype of `ty`, or `None` when absent or dangling.
    pub fn supertype(&self, ty: &Type) -> Option<&Arc<Type>> {
        ty.supertype.as_deref().and_then(|name| self.resolve(name))
    }

    /// Strict ancestors of `ty`, nearest first. Stops at a dangling
    /// reference or when the chain loops back on itself.
    pub fn ancestors(&self, ty: &Type) -> Vec<Arc<Type>> {
        let mut ancestors = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(ty.qualified_name.as_str());

        let mut current = self.supertype(ty);
        while let Some(sup) = current {
            if !seen.insert(sup.qualified_name.as_str()) {
                break;
            }
            ancestors.push(Arc::clone(sup));
            current = self.supertype(sup);
        }

        ancestors
    }

    /// Whether `ty` has a transitive subtype owned by `project`.
    pub fn has_subtype_in(&self, ty: &Type, project: &ProjectId) -> bool {
        let Some(start) = self.index_of(ty) else {
            return false;
        };
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for edge in self.inner.edges_directed(current, Direction::Outgoing) {
                if *edge.weight() != Relation::Subtype || !visited.insert(edge.target()) {
                    continue;
                }
                if self.inner[edge.target()].is_owned_by(project) {
                    return true;
                }
                queue.push_back(edge.target());
            }
        }

        false
    }

    /// Types declaring a qualifying association to `ty`, in snapshot order.
    pub fn associators(&self, ty: &Type, kinds: &AssociationKinds) -> Vec<Arc<Type>> {
        let Some(idx) = self.index_of(ty) else {
            return Vec::new();
        };
        let mut sources: Vec<NodeIndex> = self
            .inner
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| self.is_qualifying_association(e.source(), *e.weight(), kinds))
            .map(|e| e.source())
            .collect();
        sources.sort();
        sources.dedup();
        sources.into_iter().map(|i| Arc::clone(&self.inner[i])).collect()
    }

    /// Whether some type declares a qualifying association to `ty`.
    pub fn is_association_target(&self, ty: &Type, kinds: &AssociationKinds) -> bool {
        self.index_of(ty).is_some_and(|idx| {
            self.inner
                .edges_directed(idx, Direction::Incoming)
                .any(|e| self.is_qualifying_association(e.source(), *e.weight(), kinds))
        })
    }

    /// The qualifying associations declared on `ty` whose target resolves,
    /// in declaration order.
    pub fn associations_of<'a>(
        &'a self,
        ty: &'a Type,
        kinds: &'a AssociationKinds,
    ) -> impl Iterator<Item = (&'a Association, &'a Arc<Type>)> + 'a {
        ty.qualifying_associations(kinds)
            .filter_map(move |a| self.resolve(&a.target).map(|target| (a, target)))
    }

    /// Every type reachable from `ty` through one or more subtype or
    /// qualifying association edges, breadth-first. `ty` itself is only
    /// included when it lies on a cycle.
    pub fn reachable_from(&self, ty: &Type, kinds: &AssociationKinds) -> Vec<Arc<Type>> {
        let Some(start) = self.index_of(ty) else {
            return Vec::new();
        };
        let mut reached = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            let mut next: Vec<NodeIndex> = self
                .inner
                .edges_directed(current, Direction::Outgoing)
                .filter(|e| self.qualifies(current, *e.weight(), kinds))
                .map(|e| e.target())
                .collect();
            next.sort();
            for target in next {
                if visited.insert(target) {
                    reached.push(Arc::clone(&self.inner[target]));
                    queue.push_back(target);
                }
            }
        }

        reached
    }

    /// Subtype edges and qualifying association edges.
    fn qualifies(&self, source: NodeIndex, relation: Relation, kinds: &AssociationKinds) -> bool {
        relation == Relation::Subtype || self.is_qualifying_association(source, relation, kinds)
    }

    fn is_qualifying_association(
        &self,
        source: NodeIndex,
        relation: Relation,
        kinds: &AssociationKinds,
    ) -> bool {
        match relation {
            Relation::Subtype => false,
            Relation::Association(position) => self.inner[source]
                .associations
                .get(position)
                .is_some_and(|a| a.qualifies(kinds)),
        }
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        TypeGraph::from_types(Vec::new())
    }
}
