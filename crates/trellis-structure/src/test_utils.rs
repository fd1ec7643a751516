//! Test utilities for the structure engine

use crate::engine::{Scope, StructureEngine};
use crate::node::{ComponentNode, Strategy};
use std::fmt::Write;
use trellis_core::{CancellationToken, InMemoryRepository, Type, TypeKind, TypeRepository};

/// A repository with the single project `p`.
pub fn single_project(types: Vec<Type>) -> InMemoryRepository {
    InMemoryRepository::builder()
        .project("p", &[])
        .with_types(types)
        .build()
        .unwrap()
}

/// A repository where project `p` references project `base`.
pub fn layered(types: Vec<Type>) -> InMemoryRepository {
    InMemoryRepository::builder()
        .project("base", &[])
        .project("p", &["base"])
        .with_types(types)
        .build()
        .unwrap()
}

/// The cross-project coverage model:
///
/// ```text
/// base.BaseCoverageType ◀── p.CoverageType
/// p.ProductA ──aggregation──▶ p.Coverage ◀──aggregation── p.ProductB
/// ```
pub fn coverage_model() -> InMemoryRepository {
    layered(vec![
        Type::policy("base", "base.BaseCoverageType"),
        Type::policy("p", "p.CoverageType").extends("base.BaseCoverageType"),
        Type::policy("p", "p.ProductA").aggregates("p.Coverage"),
        Type::policy("p", "p.ProductB").aggregates("p.Coverage"),
        Type::policy("p", "p.Coverage"),
    ])
}

/// A home policy whose base type composes the coverage it specializes:
///
/// ```text
/// base.Policy ──composition──▶ base.Coverage
///     ▲                            ▲
/// p.HomePolicy ──aggregation──▶ p.FireCoverage
/// ```
pub fn home_policy_model() -> InMemoryRepository {
    layered(vec![
        Type::policy("base", "base.Policy").composes("base.Coverage"),
        Type::policy("base", "base.Coverage"),
        Type::policy("p", "p.HomePolicy")
            .extends("base.Policy")
            .aggregates("p.FireCoverage"),
        Type::policy("p", "p.FireCoverage").extends("base.Coverage"),
    ])
}

/// Complete roots of `scope`, policy side.
pub fn roots<R: TypeRepository>(engine: &mut StructureEngine<R>, scope: Scope, strategy: Strategy) -> Vec<ComponentNode> {
    engine
        .compute_roots(&scope, strategy, TypeKind::PolicySide, &CancellationToken::new())
        .complete()
        .unwrap()
}

pub fn project_roots<R: TypeRepository>(engine: &mut StructureEngine<R>, strategy: Strategy) -> Vec<ComponentNode> {
    roots(engine, Scope::Project("p".into()), strategy)
}

pub fn node_names(nodes: &[ComponentNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.value.qualified_name.as_str()).collect()
}

/// Render the fully expanded trees below `roots`, one node per line.
pub fn outline<R: TypeRepository>(engine: &StructureEngine<R>, roots: &[ComponentNode]) -> String {
    let mut out = String::new();
    for root in roots {
        write_node(engine, root, &mut out);
    }
    out
}

fn write_node<R: TypeRepository>(engine: &StructureEngine<R>, node: &ComponentNode, out: &mut String) {
    let _ = write!(out, "{}{}", "  ".repeat(node.depth()), node.value);
    if let Some(role) = node.role() {
        let _ = write!(out, " ({})", role);
    }
    if node.is_inherited {
        out.push_str(" [inherited]");
    }
    if node.is_repetition() {
        out.push_str(" [repeated]");
    }
    out.push('\n');

    for child in engine.children(node) {
        write_node(engine, &child, out);
    }
}
