//! Model snapshots: the serialized form an in-memory repository is loaded from

use crate::error::SnapshotError;
use crate::model::Type;
use crate::repository::{InMemoryRepository, Project};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk snapshot formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(SnapshotFormat::Json),
            Some("yml") | Some("yaml") => Some(SnapshotFormat::Yaml),
            _ => None,
        }
    }
}

/// Projects and types as exported by the modeling tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub types: Vec<Type>,
}

impl ModelSnapshot {
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, SnapshotError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a snapshot file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let format = SnapshotFormat::from_path(path)
            .ok_or_else(|| SnapshotError::UnknownFormat(path.to_path_buf()))?;
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let snapshot = match format {
            SnapshotFormat::Json => Self::from_json_str(&content)?,
            SnapshotFormat::Yaml => Self::from_yaml_str(&content)?,
        };
        tracing::debug!(
            "Snapshot loaded from {}: {} projects, {} types",
            path.display(),
            snapshot.projects.len(),
            snapshot.types.len()
        );
        Ok(snapshot)
    }

    /// Materialize the snapshot as a repository, checking project references
    /// and type ownership. Dangling supertype or association targets are
    /// kept; the engine treats them as absent.
    pub fn into_repository(self) -> Result<InMemoryRepository, SnapshotError> {
        InMemoryRepository::builder()
            .with_projects(self.projects)
            .with_types(self.types)
            .build()
    }
}
