//! Engine configuration, loadable from TOML

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trellis_core::{AssociationKind, AssociationKinds};

/// Default cap on the refinement passes of single-type root finding.
pub const DEFAULT_MAX_REFINEMENT_PASSES: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("association kind `{0:?}` cannot be used as containment")]
    NonStructuralKind(AssociationKind),

    #[error("max_refinement_passes must be at least 1")]
    ZeroRefinementPasses,
}

/// Tunables of a [`StructureEngine`](crate::StructureEngine).
///
/// ```toml
/// association_kinds = ["aggregation"]
/// include_referenced_projects = true
/// max_refinement_passes = 8
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Association kinds treated as containment.
    pub association_kinds: Vec<AssociationKind>,
    /// Whether types of referenced projects take part in the computation.
    pub include_referenced_projects: bool,
    pub max_refinement_passes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            association_kinds: AssociationKinds::STRUCTURAL.kinds(),
            include_referenced_projects: true,
            max_refinement_passes: DEFAULT_MAX_REFINEMENT_PASSES,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Engine config loaded from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(kind) = self.association_kinds.iter().find(|k| !k.is_structural()) {
            return Err(ConfigError::NonStructuralKind(*kind));
        }
        if self.max_refinement_passes == 0 {
            return Err(ConfigError::ZeroRefinementPasses);
        }
        Ok(())
    }

    pub fn with_association_kinds(mut self, kinds: AssociationKinds) -> Self {
        self.association_kinds = kinds.kinds();
        self
    }

    /// The configured containment kinds as a set.
    pub fn kinds(&self) -> AssociationKinds {
        AssociationKinds::from_kinds(self.association_kinds.iter().copied())
    }
}
