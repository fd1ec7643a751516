//! Gathers the type lists a structure computation runs over

use std::sync::Arc;
use trellis_core::{ProjectId, Type, TypeGraph, TypeKind, TypeRepository};

/// Pure filtering over the repository's output. Holds no cache.
pub struct GraphIndexer<'a> {
    repository: &'a dyn TypeRepository,
}

impl<'a> GraphIndexer<'a> {
    pub fn new(repository: &'a dyn TypeRepository) -> Self {
        GraphIndexer { repository }
    }

    /// Types of `kind` visible from `project`, in repository order.
    pub fn list_types(&self, project: &ProjectId, kind: TypeKind, include_referenced: bool) -> Vec<Arc<Type>> {
        self.repository.list_types(project, kind, include_referenced)
    }

    /// Read a fresh snapshot of the types visible from `project` and
    /// resolve it into an arena.
    pub fn index(&self, project: &ProjectId, kind: TypeKind, include_referenced: bool) -> ProjectIndex {
        let types = self.list_types(project, kind, include_referenced);
        let local = types.iter().filter(|t| t.is_owned_by(project)).count();
        tracing::debug!(
            "Indexed {} {} types for project {} ({} project-specific)",
            types.len(),
            kind,
            project,
            local
        );

        ProjectIndex {
            project: project.clone(),
            kind,
            graph: Arc::new(TypeGraph::from_types(types)),
        }
    }
}

/// The arena of one computation together with the project it was built for.
#[derive(Debug, Clone)]
pub struct ProjectIndex {
    pub project: ProjectId,
    pub kind: TypeKind,
    pub graph: Arc<TypeGraph>,
}

impl ProjectIndex {
    /// Types owned by the indexed project, in snapshot order.
    pub fn project_specific(&self) -> Vec<Arc<Type>> {
        self.graph.owned_by(&self.project).cloned().collect()
    }
}
