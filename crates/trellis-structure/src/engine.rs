//! The interface a presentation layer drives

use crate::config::EngineConfig;
use crate::node::{ComponentNode, Strategy};
use crate::paths::PathResolver;
use crate::strategy::RootContext;
use crate::tree::TreeBuilder;
use std::sync::Arc;
use tracing::{debug, info};
use trellis_core::{CancellationToken, Outcome, ProjectId, Type, TypeKind, TypeRepository};
use trellis_indexer::GraphIndexer;

/// What a root computation covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every structure of a project.
    Project(ProjectId),
    /// Only the structures containing one type, seen from its own project.
    Type(Arc<Type>),
}

impl Scope {
    pub fn project(&self) -> &ProjectId {
        match self {
            Scope::Project(project) => project,
            Scope::Type(ty) => &ty.project,
        }
    }
}

/// Computes structure roots over a [`TypeRepository`] and expands them
/// lazily. Type data is read fresh on every [`compute_roots`](Self::compute_roots).
pub struct StructureEngine<R> {
    repository: R,
    config: EngineConfig,
    last_roots: Vec<ComponentNode>,
}

impl<R: TypeRepository> StructureEngine<R> {
    pub fn new(repository: R) -> Self {
        Self::with_config(repository, EngineConfig::default())
    }

    pub fn with_config(repository: R, config: EngineConfig) -> Self {
        StructureEngine {
            repository,
            config,
            last_roots: Vec::new(),
        }
    }

    /// The most recent complete root set.
    pub fn last_roots(&self) -> &[ComponentNode] {
        &self.last_roots
    }

    /// Request cancellation of an in-flight computation observing `token`.
    pub fn cancel(token: &CancellationToken) {
        token.cancel();
    }

    /// Roots of `scope`. A cancelled computation yields its partial result,
    /// which must be discarded, and leaves the remembered root set as it was.
    pub fn compute_roots(
        &mut self,
        scope: &Scope,
        strategy: Strategy,
        kind: TypeKind,
        token: &CancellationToken,
    ) -> Outcome<Vec<ComponentNode>> {
        let project = scope.project();
        let index = GraphIndexer::new(&self.repository).index(project, kind, self.config.include_referenced_projects);
        let ctx = RootContext {
            repository: &self.repository,
            index: &index,
            kinds: self.config.kinds(),
            include_referenced: self.config.include_referenced_projects,
            max_refinement_passes: self.config.max_refinement_passes,
        };
        let implementation = strategy.implementation();

        let outcome = match scope {
            Scope::Project(_) => implementation.project_roots(&ctx, token),
            Scope::Type(ty) => match index.graph.resolve(&ty.qualified_name) {
                Some(resolved) if **resolved == **ty && resolved.kind == kind => {
                    implementation.type_roots(resolved, &ctx, token)
                }
                _ => {
                    debug!("{} is not a {} type of {}", ty, kind, project);
                    Outcome::Complete(Vec::new())
                }
            },
        };

        let outcome = outcome.map(|roots| {
            roots
                .into_iter()
                .map(|root| ComponentNode::root(root, project.clone(), strategy, Arc::clone(&index.graph)))
                .collect::<Vec<_>>()
        });

        match &outcome {
            Outcome::Complete(roots) => {
                info!("Computed {} {} roots for {} ({} side)", roots.len(), strategy, project, kind);
                self.last_roots = roots.clone();
            }
            Outcome::Cancelled(partial) => {
                info!("Root computation for {} cancelled after {} roots", project, partial.len());
            }
        }
        outcome
    }

    pub fn children(&self, node: &ComponentNode) -> Vec<ComponentNode> {
        self.tree().children(node)
    }

    pub fn has_children(&self, node: &ComponentNode) -> bool {
        self.tree().has_children(node)
    }

    /// Every route from the most recent roots to `target`.
    pub fn compute_paths(&self, target: &Type) -> Vec<Vec<ComponentNode>> {
        let tree = self.tree();
        PathResolver::new(&tree).compute_paths(target, &self.last_roots)
    }

    fn tree(&self) -> TreeBuilder<'_> {
        TreeBuilder::new(
            &self.repository,
            self.config.kinds(),
            self.config.include_referenced_projects,
        )
    }
}
