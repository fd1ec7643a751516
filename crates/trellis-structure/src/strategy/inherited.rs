//! Inherited association merging: associations declared on supertypes in
//! referenced projects count as the project type's own

use super::{ExpansionContext, RootContext, StructureStrategy};
use crate::node::ChildEdge;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, trace};
use trellis_core::{AssociationKinds, CancellationToken, Outcome, ProjectId, Type, TypeGraph};

pub struct InheritedAssociationStrategy;

impl StructureStrategy for InheritedAssociationStrategy {
    fn project_roots(&self, ctx: &RootContext<'_>, token: &CancellationToken) -> Outcome<Vec<Arc<Type>>> {
        let graph = ctx.graph();
        let project = ctx.project();
        let project_specific = ctx.index.project_specific();

        let mut candidates = Vec::new();
        for ty in &project_specific {
            if token.is_cancelled() {
                return Outcome::Cancelled(candidates);
            }
            let local_supertype = graph.supertype(ty).is_some_and(|s| s.is_owned_by(project));
            if local_supertype {
                continue;
            }
            if is_associated(graph, ty, &ctx.kinds, project) {
                trace!("{} is associated within {}", ty, project);
                continue;
            }
            candidates.push(Arc::clone(ty));
        }
        debug!(
            "Inherited roots for {}: {} of {} project types",
            project,
            candidates.len(),
            project_specific.len()
        );
        Outcome::Complete(candidates)
    }

    fn type_roots(&self, ty: &Arc<Type>, ctx: &RootContext<'_>, token: &CancellationToken) -> Outcome<Vec<Arc<Type>>> {
        let project_roots = match self.project_roots(ctx, token) {
            Outcome::Complete(roots) => roots,
            Outcome::Cancelled(partial) => return Outcome::Cancelled(partial),
        };

        let expansion = ctx.expansion();
        let mut roots = Vec::new();
        for root in project_roots {
            if token.is_cancelled() {
                return Outcome::Cancelled(roots);
            }
            if self.reaches(&root, ty, ctx.project(), &expansion) {
                roots.push(root);
            }
        }

        if roots.is_empty() {
            trace!("No project root reaches {}, using it as its own root", ty);
            roots.push(Arc::clone(ty));
        }
        debug!("Inherited roots for {}: {}", ty, roots.len());
        Outcome::Complete(roots)
    }

    fn subtype_edges(&self, ty: &Type, project: &ProjectId, ctx: &ExpansionContext<'_>) -> Vec<ChildEdge> {
        let mut edges = Vec::new();
        let mut visited: HashSet<Arc<Type>> = HashSet::new();
        let mut queue: VecDeque<Arc<Type>> = ctx
            .repository
            .find_subtypes(ty, true, ctx.include_referenced, project)
            .into();

        while let Some(sub) = queue.pop_front() {
            if !visited.insert(Arc::clone(&sub)) {
                continue;
            }
            if sub.is_owned_by(project) {
                edges.push(ChildEdge::subtype(sub));
            } else {
                // Flatten subtypes of other projects.
                queue.extend(ctx.repository.find_subtypes(&sub, true, ctx.include_referenced, project));
            }
        }

        edges
    }

    fn association_edges(&self, ty: &Type, project: &ProjectId, ctx: &ExpansionContext<'_>) -> Vec<ChildEdge> {
        let mut edges = Vec::new();

        for ancestor in ctx.graph.ancestors(ty) {
            if ancestor.is_owned_by(project) {
                break;
            }
            for (association, target) in ctx.graph.associations_of(&ancestor, &ctx.kinds) {
                if association.is_derived_union {
                    continue;
                }
                edges.push(ChildEdge::inherited(association, Arc::clone(target)));
            }
        }

        edges.extend(
            ctx.graph
                .associations_of(ty, &ctx.kinds)
                .map(|(association, target)| ChildEdge::association(association, Arc::clone(target))),
        );
        edges
    }
}

impl InheritedAssociationStrategy {
    /// Whether `target` appears in the tree below `root`.
    fn reaches(&self, root: &Arc<Type>, target: &Type, project: &ProjectId, ctx: &ExpansionContext<'_>) -> bool {
        let mut visited: HashSet<Arc<Type>> = HashSet::from([Arc::clone(root)]);
        let mut queue = VecDeque::from([Arc::clone(root)]);

        while let Some(current) = queue.pop_front() {
            if *current == *target {
                return true;
            }
            let edges = self
                .subtype_edges(&current, project, ctx)
                .into_iter()
                .chain(self.association_edges(&current, project, ctx));
            for edge in edges {
                if visited.insert(Arc::clone(&edge.target)) {
                    queue.push_back(edge.target);
                }
            }
        }

        false
    }
}

/// Whether `ty` is the target of a qualifying association, directly or
/// through one of its ancestors outside `project` whose associator belongs
/// to, or has a subtype in, `project`.
///
/// This also excludes every type another project type reaches through an
/// inherited association: that association is declared on an ancestor of
/// the other type, which then has a subtype in `project`.
fn is_associated(graph: &TypeGraph, ty: &Type, kinds: &AssociationKinds, project: &ProjectId) -> bool {
    if graph.is_association_target(ty, kinds) {
        return true;
    }

    graph
        .ancestors(ty)
        .iter()
        .take_while(|ancestor| !ancestor.is_owned_by(project))
        .any(|ancestor| {
            graph
                .associators(ancestor, kinds)
                .iter()
                .any(|associator| associator.is_owned_by(project) || graph.has_subtype_in(associator, project))
        })
}
