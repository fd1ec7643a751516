//! Type model, type arena, cycle guard and repository contract

pub mod model;
pub mod graph;
pub mod cycle;
pub mod cancel;
pub mod repository;
pub mod snapshot;
pub mod error;


#[cfg(test)]
pub mod test_utils;

pub use model::{
    Association, AssociationKind, AssociationKinds, Cardinality, IncomingEdge, PathElement, ProjectId, Type,
    TypeKind,
};
pub use graph::{Relation, TypeGraph};
pub use cycle::{Guarded, GuardedPath};
pub use cancel::{CancellationToken, Outcome};
pub use repository::{InMemoryRepository, Project, RepositoryBuilder, TypeRepository};
pub use snapshot::{ModelSnapshot, SnapshotFormat};
pub use error::SnapshotError;
