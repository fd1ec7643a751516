//! Strict containment: the structure exactly as declared

use super::{ExpansionContext, RootContext, StructureStrategy, maximal_roots, merge};
use crate::node::ChildEdge;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use trellis_core::{
    AssociationKinds, CancellationToken, Guarded, GuardedPath, IncomingEdge, Outcome, PathElement, ProjectId, Type,
    TypeGraph,
};

pub struct StrictStrategy;

impl StructureStrategy for StrictStrategy {
    fn project_roots(&self, ctx: &RootContext<'_>, token: &CancellationToken) -> Outcome<Vec<Arc<Type>>> {
        let graph = ctx.graph();
        let kinds = &ctx.kinds;

        let candidates: Vec<Arc<Type>> = graph
            .types()
            .filter(|t| graph.supertype(t).is_none())
            .cloned()
            .collect();
        let mut roots: Vec<Arc<Type>> = candidates
            .iter()
            .filter(|t| !graph.is_association_target(t, kinds))
            .cloned()
            .collect();
        debug!(
            "Strict roots for {}: {} candidates, {} unassociated",
            ctx.project(),
            candidates.len(),
            roots.len()
        );
        if token.is_cancelled() {
            return Outcome::Cancelled(roots);
        }

        // Candidates that are association targets are either reachable from a
        // root or sit on a cycle no root reaches; promote one of the latter
        // at a time until every candidate is accounted for.
        let mut remaining: Vec<Arc<Type>> = candidates.into_iter().filter(|c| !roots.contains(c)).collect();
        let mut reached: HashSet<Arc<Type>> = HashSet::new();
        let mut frontier: Vec<Arc<Type>> = roots.clone();
        while !remaining.is_empty() {
            if token.is_cancelled() {
                return Outcome::Cancelled(roots);
            }
            for root in frontier.drain(..) {
                reached.extend(graph.reachable_from(&root, kinds));
            }
            remaining.retain(|c| !reached.contains(c));
            if remaining.is_empty() {
                break;
            }
            let promoted = remaining.remove(0);
            trace!("Promoting {} to root", promoted);
            frontier.push(Arc::clone(&promoted));
            roots.push(promoted);
        }

        let mut scoped = Vec::with_capacity(roots.len());
        for root in roots {
            if token.is_cancelled() {
                return Outcome::Cancelled(scoped);
            }
            if reaches_project(graph, &root, kinds, ctx.project()) {
                scoped.push(root);
            } else {
                trace!("Dropping root {}: nothing below it belongs to {}", root, ctx.project());
            }
        }

        debug!("Strict roots for {}: {}", ctx.project(), scoped.len());
        Outcome::Complete(scoped)
    }

    fn type_roots(&self, ty: &Arc<Type>, ctx: &RootContext<'_>, token: &CancellationToken) -> Outcome<Vec<Arc<Type>>> {
        let graph = ctx.graph();
        let search = RootSearch {
            graph,
            kinds: &ctx.kinds,
            token,
            seeds: None,
        };
        let mut roots = search.collect(ty, IncomingEdge::SelfEdge, &GuardedPath::new());
        let mut passes = 1;
        trace!("Pass 1 for {}: {} candidates", ty, roots.len());

        loop {
            if token.is_cancelled() {
                return Outcome::Cancelled(roots);
            }
            if passes >= ctx.max_refinement_passes {
                if ctx.max_refinement_passes > 1 {
                    warn!(
                        "Roots of {} still changing after {} passes, keeping the last result",
                        ty, passes
                    );
                }
                break;
            }

            let seeded = RootSearch {
                seeds: Some(&roots),
                ..search
            };
            let refined = maximal_roots(
                graph,
                &ctx.kinds,
                seeded.collect(ty, IncomingEdge::SelfEdge, &GuardedPath::new()),
            );
            passes += 1;
            trace!("Pass {} for {}: {} roots", passes, ty, refined.len());

            if refined == roots {
                break;
            }
            roots = refined;
        }

        if token.is_cancelled() {
            return Outcome::Cancelled(roots);
        }
        debug!("Strict roots for {}: {} after {} passes", ty, roots.len(), passes);
        Outcome::Complete(roots)
    }

    fn subtype_edges(&self, ty: &Type, project: &ProjectId, ctx: &ExpansionContext<'_>) -> Vec<ChildEdge> {
        ctx.repository
            .find_subtypes(ty, true, ctx.include_referenced, project)
            .into_iter()
            .map(|sub| {
                let emphasized = ctx
                    .graph
                    .ancestors(&sub)
                    .iter()
                    .any(|a| ctx.graph.is_association_target(a, &ctx.kinds));
                ChildEdge {
                    has_inherited_association_target: emphasized,
                    ..ChildEdge::subtype(sub)
                }
            })
            .collect()
    }

    fn association_edges(&self, ty: &Type, _project: &ProjectId, ctx: &ExpansionContext<'_>) -> Vec<ChildEdge> {
        ctx.graph
            .associations_of(ty, &ctx.kinds)
            .map(|(association, target)| ChildEdge::association(association, Arc::clone(target)))
            .collect()
    }
}

/// Whether `root` or anything below it is owned by `project`.
fn reaches_project(graph: &TypeGraph, root: &Type, kinds: &AssociationKinds, project: &ProjectId) -> bool {
    root.is_owned_by(project)
        || graph
            .reachable_from(root, kinds)
            .iter()
            .any(|t| t.is_owned_by(project))
}

/// Upward search from one type towards the roots of its structure.
#[derive(Clone, Copy)]
struct RootSearch<'a> {
    graph: &'a TypeGraph,
    kinds: &'a AssociationKinds,
    token: &'a CancellationToken,
    /// Roots of the previous pass; reaching one ends the search there.
    seeds: Option<&'a [Arc<Type>]>,
}

impl RootSearch<'_> {
    fn is_seed(&self, ty: &Arc<Type>) -> bool {
        self.seeds.is_some_and(|seeds| seeds.contains(ty))
    }

    fn collect(&self, ty: &Arc<Type>, edge: IncomingEdge, path: &GuardedPath<PathElement>) -> Vec<Arc<Type>> {
        if self.token.is_cancelled() {
            return Vec::new();
        }
        let path = match path.enter(PathElement::new(Arc::clone(ty), edge)) {
            Guarded::Entered(path) => path,
            Guarded::Cycle => return Vec::new(),
        };
        if edge != IncomingEdge::SelfEdge && self.is_seed(ty) {
            return vec![Arc::clone(ty)];
        }

        let supertype = self.graph.supertype(ty).cloned();
        let associators = self.graph.associators(ty, self.kinds);
        if associators.is_empty() && supertype.is_none() && edge != IncomingEdge::Supertype {
            return vec![Arc::clone(ty)];
        }

        let mut roots = Vec::new();
        for associator in &associators {
            merge(&mut roots, self.collect(associator, IncomingEdge::Association, &path));
        }
        if let Some(supertype) = &supertype {
            merge(&mut roots, self.collect(supertype, IncomingEdge::Supertype, &path));
        }

        if roots.is_empty() {
            let fallback = match edge {
                IncomingEdge::Supertype => ty.has_qualifying_association(self.kinds),
                IncomingEdge::Association | IncomingEdge::SelfEdge => true,
            };
            if fallback {
                roots.push(Arc::clone(ty));
            }
        }
        roots
    }
}
