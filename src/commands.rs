//! CLI command implementations

use crate::{TargetArgs, render};
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use trellis_core::{
    AssociationKind, AssociationKinds, CancellationToken, InMemoryRepository, ModelSnapshot, Outcome, ProjectId, Type,
    TypeKind, TypeRepository,
};
use trellis_structure::{ComponentNode, EngineConfig, Scope, Strategy, StructureEngine};

type Engine = StructureEngine<InMemoryRepository>;

/// Read the model snapshot and the engine configuration.
pub fn load(snapshot: &Path, config: Option<&Path>) -> anyhow::Result<(InMemoryRepository, EngineConfig)> {
    let repository = ModelSnapshot::load(snapshot)
        .and_then(ModelSnapshot::into_repository)
        .with_context(|| format!("Failed to load model snapshot {}", snapshot.display()))?;
    tracing::info!(
        "Loaded {} types in {} projects from {}",
        repository.types().len(),
        repository.projects().len(),
        snapshot.display()
    );

    let config = match config {
        Some(path) => {
            EngineConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    Ok((repository, config))
}

pub async fn roots(repository: InMemoryRepository, config: EngineConfig, target: TargetArgs) -> anyhow::Result<String> {
    let (_, roots) = compute(repository, config, &target).await?;
    Ok(render::roots(&roots))
}

pub async fn tree(
    repository: InMemoryRepository,
    config: EngineConfig,
    target: TargetArgs,
    depth: Option<usize>,
) -> anyhow::Result<String> {
    let (engine, roots) = compute(repository, config, &target).await?;
    Ok(render::tree(&engine, &roots, depth))
}

pub async fn paths(
    repository: InMemoryRepository,
    config: EngineConfig,
    target: TargetArgs,
    to: &str,
) -> anyhow::Result<String> {
    let project = ProjectId::from(target.project.as_str());
    let destination = visible_type(&repository, &project, target.side.into(), to)?;

    let (engine, _) = compute(repository, config, &target).await?;
    let paths = engine.compute_paths(&destination);
    if paths.is_empty() {
        tracing::warn!("No route from the roots of {} reaches {}", project, destination);
    }
    Ok(render::paths(&paths))
}

/// Run the root computation off the async runtime; Ctrl-C cancels it.
async fn compute(
    repository: InMemoryRepository,
    config: EngineConfig,
    target: &TargetArgs,
) -> anyhow::Result<(Engine, Vec<ComponentNode>)> {
    let project = ProjectId::from(target.project.as_str());
    let kind = TypeKind::from(target.side);
    let strategy = Strategy::from(target.strategy);
    let scope = scope_of(&repository, project, target.type_name.as_deref())?;

    let config = if target.kinds.is_empty() {
        config
    } else {
        config.with_association_kinds(AssociationKinds::from_kinds(
            target.kinds.iter().map(|k| AssociationKind::from(*k)),
        ))
    };

    let mut engine = StructureEngine::with_config(repository, config);
    let token = CancellationToken::new();
    let worker_token = token.clone();
    let mut task = tokio::task::spawn_blocking(move || {
        let outcome = engine.compute_roots(&scope, strategy, kind, &worker_token);
        (engine, outcome)
    });

    let (engine, outcome) = tokio::select! {
        joined = &mut task => joined?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, cancelling the computation");
            Engine::cancel(&token);
            task.await?
        }
    };

    match outcome {
        Outcome::Complete(roots) => Ok((engine, roots)),
        Outcome::Cancelled(_) => anyhow::bail!("Computation cancelled"),
    }
}

fn scope_of(repository: &InMemoryRepository, project: ProjectId, type_name: Option<&str>) -> anyhow::Result<Scope> {
    if repository.project(&project).is_none() {
        anyhow::bail!("Unknown project {}", project);
    }
    match type_name {
        Some(name) => {
            let ty = repository
                .find_type(&project, name)
                .with_context(|| format!("Project {} has no type {}", project, name))?;
            Ok(Scope::Type(Arc::clone(ty)))
        }
        None => Ok(Scope::Project(project)),
    }
}

fn visible_type(
    repository: &InMemoryRepository,
    project: &ProjectId,
    kind: TypeKind,
    name: &str,
) -> anyhow::Result<Arc<Type>> {
    repository
        .list_types(project, kind, true)
        .into_iter()
        .find(|t| t.qualified_name == name)
        .with_context(|| format!("No {} type {} is visible from project {}", kind, name, project))
}
