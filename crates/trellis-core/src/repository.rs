//! The type repository collaborator and an in-memory implementation

use crate::error::SnapshotError;
use crate::model::{ProjectId, Type, TypeKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Source of type metadata for the structure engine.
///
/// Implementations own parsing, validation and persistence; the engine only
/// consumes what these two queries return.
pub trait TypeRepository: Send + Sync {
    /// Types of `kind` owned by `project`, followed by those of the projects
    /// it references when `include_referenced` is set.
    fn list_types(&self, project: &ProjectId, kind: TypeKind, include_referenced: bool) -> Vec<Arc<Type>>;

    /// Subtypes of `ty` visible from `project`. `direct` restricts the result
    /// to immediate subtypes; otherwise the whole subtype closure is returned.
    fn find_subtypes(
        &self,
        ty: &Type,
        direct: bool,
        include_referenced: bool,
        project: &ProjectId,
    ) -> Vec<Arc<Type>>;
}

impl<R: TypeRepository + ?Sized> TypeRepository for Arc<R> {
    fn list_types(&self, project: &ProjectId, kind: TypeKind, include_referenced: bool) -> Vec<Arc<Type>> {
        (**self).list_types(project, kind, include_referenced)
    }

    fn find_subtypes(
        &self,
        ty: &Type,
        direct: bool,
        include_referenced: bool,
        project: &ProjectId,
    ) -> Vec<Arc<Type>> {
        (**self).find_subtypes(ty, direct, include_referenced, project)
    }
}

/// A project and the projects it references, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "name")]
    pub id: ProjectId,
    #[serde(default)]
    pub references: Vec<ProjectId>,
}

impl Project {
    pub fn new(id: impl Into<ProjectId>) -> Self {
        Project {
            id: id.into(),
            references: Vec::new(),
        }
    }

    pub fn referencing(mut self, reference: impl Into<ProjectId>) -> Self {
        self.references.push(reference.into());
        self
    }
}

/// Repository over types held in memory, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    projects: Vec<Project>,
    types: Vec<Arc<Type>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RepositoryBuilder {
        RepositoryBuilder::default()
    }

    /// Register a project. References are checked when types are listed,
    /// so projects may be added in any order.
    pub fn add_project(&mut self, project: Project) -> Result<(), SnapshotError> {
        if self.project(&project.id).is_some() {
            return Err(SnapshotError::DuplicateProject(project.id));
        }
        self.projects.push(project);
        Ok(())
    }

    /// Add a type to an already registered project.
    pub fn add_type(&mut self, ty: Type) -> Result<Arc<Type>, SnapshotError> {
        if self.project(&ty.project).is_none() {
            return Err(SnapshotError::UnknownTypeProject {
                type_name: ty.qualified_name,
                project: ty.project,
            });
        }
        if self.find_type(&ty.project, &ty.qualified_name).is_some() {
            return Err(SnapshotError::DuplicateType {
                type_name: ty.qualified_name,
                project: ty.project,
            });
        }
        let ty = Arc::new(ty);
        self.types.push(Arc::clone(&ty));
        Ok(ty)
    }

    /// Check that every project reference names a registered project.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for project in &self.projects {
            for reference in &project.references {
                if self.project(reference).is_none() {
                    return Err(SnapshotError::UnknownReference {
                        project: project.id.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn types(&self) -> &[Arc<Type>] {
        &self.types
    }

    pub fn find_type(&self, project: &ProjectId, qualified_name: &str) -> Option<&Arc<Type>> {
        self.types
            .iter()
            .find(|t| t.is_owned_by(project) && t.qualified_name == qualified_name)
    }

    /// `project` followed by the projects it references, transitively,
    /// in breadth-first order. Reference cycles are tolerated.
    pub fn visible_projects(&self, project: &ProjectId, include_referenced: bool) -> Vec<ProjectId> {
        let mut visible = vec![project.clone()];
        if !include_referenced {
            return visible;
        }

        let mut seen: HashSet<&ProjectId> = HashSet::from([project]);
        let mut queue = VecDeque::from([project]);
        while let Some(current) = queue.pop_front() {
            let Some(found) = self.project(current) else {
                continue;
            };
            for reference in &found.references {
                if seen.insert(reference) {
                    visible.push(reference.clone());
                    queue.push_back(reference);
                }
            }
        }

        visible
    }

    fn types_in<'a>(
        &'a self,
        projects: &'a [ProjectId],
        kind: TypeKind,
    ) -> impl Iterator<Item = &'a Arc<Type>> + 'a {
        projects.iter().flat_map(move |project| {
            self.types
                .iter()
                .filter(move |t| t.is_owned_by(project) && t.kind == kind)
        })
    }
}

impl TypeRepository for InMemoryRepository {
    fn list_types(&self, project: &ProjectId, kind: TypeKind, include_referenced: bool) -> Vec<Arc<Type>> {
        let projects = self.visible_projects(project, include_referenced);
        self.types_in(&projects, kind).cloned().collect()
    }

    fn find_subtypes(
        &self,
        ty: &Type,
        direct: bool,
        include_referenced: bool,
        project: &ProjectId,
    ) -> Vec<Arc<Type>> {
        let projects = self.visible_projects(project, include_referenced);
        let scope: Vec<&Arc<Type>> = self.types_in(&projects, ty.kind).collect();

        let mut found: Vec<Arc<Type>> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([ty.qualified_name.as_str()]);
        let mut queue: VecDeque<&str> = VecDeque::from([ty.qualified_name.as_str()]);

        while let Some(current) = queue.pop_front() {
            for candidate in &scope {
                if candidate.supertype.as_deref() != Some(current) {
                    continue;
                }
                if !seen.insert(candidate.qualified_name.as_str()) {
                    continue;
                }
                found.push(Arc::clone(candidate));
                if !direct {
                    queue.push_back(candidate.qualified_name.as_str());
                }
            }
        }

        found
    }
}

/// Fluent construction of an [`InMemoryRepository`].
#[derive(Debug, Default)]
pub struct RepositoryBuilder {
    projects: Vec<Project>,
    types: Vec<Type>,
}

impl RepositoryBuilder {
    pub fn project(mut self, name: &str, references: &[&str]) -> Self {
        let project = references
            .iter()
            .fold(Project::new(name), |p, r| p.referencing(*r));
        self.projects.push(project);
        self
    }

    pub fn with_projects(mut self, projects: impl IntoIterator<Item = Project>) -> Self {
        self.projects.extend(projects);
        self
    }

    pub fn with_type(mut self, ty: Type) -> Self {
        self.types.push(ty);
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = Type>) -> Self {
        self.types.extend(types);
        self
    }

    pub fn build(self) -> Result<InMemoryRepository, SnapshotError> {
        let mut repository = InMemoryRepository::new();
        for project in self.projects {
            repository.add_project(project)?;
        }
        repository.validate()?;
        for ty in self.types {
            repository.add_type(ty)?;
        }
        Ok(repository)
    }
}
