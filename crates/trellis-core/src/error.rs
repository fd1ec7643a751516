//! Errors raised while materializing a model snapshot

use crate::model::ProjectId;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML snapshot: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported snapshot format: {}", .0.display())]
    UnknownFormat(PathBuf),

    #[error("project `{0}` is declared more than once")]
    DuplicateProject(ProjectId),

    #[error("project `{project}` references unknown project `{reference}`")]
    UnknownReference {
        project: ProjectId,
        reference: ProjectId,
    },

    #[error("type `{type_name}` belongs to unknown project `{project}`")]
    UnknownTypeProject {
        type_name: String,
        project: ProjectId,
    },

    #[error("type `{type_name}` is declared twice in project `{project}`")]
    DuplicateType {
        type_name: String,
        project: ProjectId,
    },
}
