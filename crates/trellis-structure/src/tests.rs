//! Unit tests for root finding, tree expansion and path search

use crate::test_utils::*;
use crate::*;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use trellis_core::{
    Association, AssociationKind, AssociationKinds, CancellationToken, InMemoryRepository, Outcome, ProjectId, Type,
    TypeKind, TypeRepository,
};
use trellis_indexer::GraphIndexer;

fn policy_and_coverage() -> Vec<Type> {
    vec![
        Type::policy("p", "Policy").composes("Coverage"),
        Type::policy("p", "Coverage"),
    ]
}

#[test]
fn test_strict_minimal_example() {
    let mut engine = StructureEngine::new(single_project(policy_and_coverage()));
    assert_eq!(node_names(&project_roots(&mut engine, Strategy::Strict)), ["Policy"]);

    let config = EngineConfig::default().with_association_kinds(AssociationKinds::only(AssociationKind::Aggregation));
    let mut engine = StructureEngine::with_config(single_project(policy_and_coverage()), config);
    assert_eq!(
        node_names(&project_roots(&mut engine, Strategy::Strict)),
        ["Policy", "Coverage"]
    );
}

#[test]
fn test_self_association_terminates() {
    let mut engine = StructureEngine::new(single_project(vec![Type::policy("p", "Folder").aggregates("Folder")]));
    let roots = project_roots(&mut engine, Strategy::Strict);
    assert_eq!(node_names(&roots), ["Folder"]);

    let children = engine.children(&roots[0]);
    assert_eq!(children.len(), 1);
    assert!(children[0].is_repetition());
    assert!(!engine.has_children(&children[0]));
    assert!(engine.has_children(&roots[0]));

    insta::assert_snapshot!(outline(&engine, &roots), @r"
Folder
  Folder (folder) [repeated]
");
}

#[test]
fn test_two_type_cycle_renders_repetition_once() {
    let mut engine = StructureEngine::new(single_project(vec![
        Type::policy("p", "A").aggregates("B"),
        Type::policy("p", "B").aggregates("A"),
    ]));
    let roots = project_roots(&mut engine, Strategy::Strict);
    assert_eq!(node_names(&roots), ["A"]);

    insta::assert_snapshot!(outline(&engine, &roots), @r"
A
  B (b)
    A (a) [repeated]
");
}

#[test]
fn test_strict_promotion_keeps_earlier_cycle_root() {
    // Y reaches X's cycle, but X was promoted first and stays a root.
    let mut engine = StructureEngine::new(single_project(vec![
        Type::policy("p", "X").aggregates("Z"),
        Type::policy("p", "Z").aggregates("X"),
        Type::policy("p", "Y").aggregates("W").aggregates("X"),
        Type::policy("p", "W").aggregates("Y"),
    ]));
    assert_eq!(node_names(&project_roots(&mut engine, Strategy::Strict)), ["X", "Y"]);
}

#[test]
fn test_every_type_covered_by_exactly_one_root() {
    let repo = single_project(vec![
        Type::policy("p", "Policy").composes("Coverage"),
        Type::policy("p", "Coverage"),
        Type::policy("p", "FireCoverage").extends("Coverage"),
        Type::policy("p", "Claim").aggregates("ClaimItem"),
        Type::policy("p", "ClaimItem"),
    ]);
    let mut engine = StructureEngine::new(repo);
    let roots = project_roots(&mut engine, Strategy::Strict);
    assert_eq!(node_names(&roots), ["Policy", "Claim"]);

    let reach: Vec<HashSet<String>> = roots.iter().map(|root| subtree_types(&engine, root)).collect();
    for name in ["Policy", "Coverage", "FireCoverage", "Claim", "ClaimItem"] {
        let covering = reach.iter().filter(|types| types.contains(name)).count();
        assert_eq!(covering, 1, "{} covered {} times", name, covering);
    }
    for (position, root) in roots.iter().enumerate() {
        let below_other = reach
            .iter()
            .enumerate()
            .any(|(other, types)| other != position && types.contains(&root.value.qualified_name));
        assert!(!below_other, "{} descends from another root", root.value);
    }
}

fn subtree_types<R: TypeRepository>(engine: &StructureEngine<R>, root: &ComponentNode) -> HashSet<String> {
    let mut types = HashSet::new();
    let mut queue = VecDeque::from([root.clone()]);
    while let Some(node) = queue.pop_front() {
        types.insert(node.value.qualified_name.clone());
        queue.extend(engine.children(&node));
    }
    types
}

#[test]
fn test_policy_and_product_roots_are_disjoint() {
    let repo = single_project(vec![
        Type::policy("p", "Policy").composes("Coverage"),
        Type::policy("p", "Coverage"),
        Type::product("p", "Product").composes("Policy"),
    ]);
    let mut engine = StructureEngine::new(repo);
    let token = CancellationToken::new();
    let scope = Scope::Project("p".into());

    let policy = engine
        .compute_roots(&scope, Strategy::Strict, TypeKind::PolicySide, &token)
        .into_inner();
    let product = engine
        .compute_roots(&scope, Strategy::Strict, TypeKind::ProductSide, &token)
        .into_inner();

    assert_eq!(node_names(&policy), ["Policy"]);
    assert_eq!(node_names(&product), ["Product"]);
    assert!(policy.iter().all(|p| product.iter().all(|q| p.value != q.value && p != q)));
    // The association across sides does not resolve within one side.
    assert!(engine.children(&product[0]).is_empty());
}

#[test]
fn test_lone_root_has_single_path() {
    let mut engine = StructureEngine::new(single_project(vec![Type::policy("p", "Lonely")]));
    project_roots(&mut engine, Strategy::Strict);

    let paths = engine.compute_paths(&Type::policy("p", "Lonely"));
    assert_eq!(paths.len(), 1);
    assert_eq!(node_names(&paths[0]), ["Lonely"]);
}

#[test]
fn test_paths_report_every_route() {
    let mut engine = StructureEngine::new(single_project(vec![
        Type::policy("p", "Policy").composes("Home").composes("Motor"),
        Type::policy("p", "Home").aggregates("Coverage"),
        Type::policy("p", "Motor").aggregates("Coverage"),
        Type::policy("p", "Coverage"),
    ]));
    project_roots(&mut engine, Strategy::Strict);

    let paths = engine.compute_paths(&Type::policy("p", "Coverage"));
    let routes: Vec<Vec<&str>> = paths.iter().map(|p| node_names(p)).collect();
    assert_eq!(routes, [["Policy", "Home", "Coverage"], ["Policy", "Motor", "Coverage"]]);

    // Each path is a parent chain.
    for path in &paths {
        let last = path.last().unwrap();
        assert_eq!(last.type_path(), path.iter().map(|n| Arc::clone(&n.value)).collect::<Vec<_>>());
    }
}

#[test]
fn test_paths_stop_at_repetition() {
    let mut engine = StructureEngine::new(single_project(vec![
        Type::policy("p", "A").aggregates("B"),
        Type::policy("p", "B").aggregates("A").aggregates("C"),
        Type::policy("p", "C"),
    ]));
    project_roots(&mut engine, Strategy::Strict);

    let paths = engine.compute_paths(&Type::policy("p", "C"));
    let routes: Vec<Vec<&str>> = paths.iter().map(|p| node_names(p)).collect();
    assert_eq!(routes, [["A", "B", "C"]]);
}

#[test]
fn test_paths_empty_before_any_computation() {
    let engine = StructureEngine::new(single_project(policy_and_coverage()));
    assert!(engine.compute_paths(&Type::policy("p", "Coverage")).is_empty());
    assert!(engine.last_roots().is_empty());
}

#[test]
fn test_cross_project_root_classification() {
    let mut engine = StructureEngine::new(coverage_model());

    let inherited = project_roots(&mut engine, Strategy::InheritedAssociation);
    assert_eq!(node_names(&inherited), ["p.CoverageType", "p.ProductA", "p.ProductB"]);

    // The strict variant sees the base type itself as the root.
    let strict = project_roots(&mut engine, Strategy::Strict);
    assert_eq!(node_names(&strict), ["p.ProductA", "p.ProductB", "base.BaseCoverageType"]);
    assert!(strict.iter().all(|r| r.source_project == ProjectId::from("p")));
}

#[test]
fn test_strict_drops_roots_outside_project() {
    let mut engine = StructureEngine::new(layered(vec![
        Type::policy("base", "base.Unrelated"),
        Type::policy("p", "p.Policy"),
    ]));
    assert_eq!(node_names(&project_roots(&mut engine, Strategy::Strict)), ["p.Policy"]);
}

#[test]
fn test_inherited_tree_merges_base_associations() {
    let mut engine = StructureEngine::new(home_policy_model());
    let roots = project_roots(&mut engine, Strategy::InheritedAssociation);
    assert_eq!(node_names(&roots), ["p.HomePolicy"]);

    let children = engine.children(&roots[0]);
    assert!(children[0].is_inherited && children[0].has_inherited_association_target);
    assert!(!children[1].is_inherited);

    insta::assert_snapshot!(outline(&engine, &roots), @r"
p.HomePolicy
  base.Coverage (coverage) [inherited]
    p.FireCoverage
  p.FireCoverage (fireCoverage)
");
}

#[test]
fn test_strict_tree_keeps_declared_structure() {
    let mut engine = StructureEngine::new(home_policy_model());
    let roots = project_roots(&mut engine, Strategy::Strict);
    assert_eq!(node_names(&roots), ["base.Policy"]);

    insta::assert_snapshot!(outline(&engine, &roots), @r"
base.Policy
  p.HomePolicy
    p.FireCoverage (fireCoverage)
  base.Coverage (coverage)
    p.FireCoverage
");
}

#[test]
fn test_strict_subtype_emphasis() {
    let mut engine = StructureEngine::new(home_policy_model());
    let roots = project_roots(&mut engine, Strategy::Strict);
    let children = engine.children(&roots[0]);

    let home = &children[0];
    assert_eq!(home.value.qualified_name, "p.HomePolicy");
    assert!(!home.has_inherited_association_target);

    let coverage = &children[1];
    let fire = &engine.children(coverage)[0];
    assert_eq!(fire.value.qualified_name, "p.FireCoverage");
    assert!(fire.has_inherited_association_target);
    assert!(!fire.is_inherited);
}

#[test]
fn test_inherited_subtypes_flatten_other_projects() {
    let repo = InMemoryRepository::builder()
        .project("base", &[])
        .project("mid", &["base"])
        .project("p", &["mid"])
        .with_type(Type::policy("base", "base.Coverage"))
        .with_type(Type::policy("mid", "mid.Coverage").extends("base.Coverage"))
        .with_type(Type::policy("p", "p.FireCoverage").extends("mid.Coverage"))
        .with_type(Type::policy("p", "p.TheftCoverage").extends("base.Coverage"))
        .build()
        .unwrap();
    let project = ProjectId::from("p");
    let index = GraphIndexer::new(&repo).index(&project, TypeKind::PolicySide, true);
    let base_coverage = Arc::clone(index.graph.resolve("base.Coverage").unwrap());
    let tree = TreeBuilder::new(&repo, AssociationKinds::STRUCTURAL, true);

    let inherited = ComponentNode::root(
        Arc::clone(&base_coverage),
        project.clone(),
        Strategy::InheritedAssociation,
        Arc::clone(&index.graph),
    );
    assert_eq!(node_names(&tree.children(&inherited)), ["p.TheftCoverage", "p.FireCoverage"]);

    let strict = ComponentNode::root(base_coverage, project, Strategy::Strict, index.graph);
    assert_eq!(node_names(&tree.children(&strict)), ["p.TheftCoverage", "mid.Coverage"]);

    // Without referenced projects only the project's own direct subtypes show.
    let local = TreeBuilder::new(&repo, AssociationKinds::STRUCTURAL, false);
    assert_eq!(node_names(&local.children(&inherited)), ["p.TheftCoverage"]);
    assert_eq!(node_names(&local.children(&strict)), ["p.TheftCoverage"]);
}

#[test]
fn test_inherited_associations_skip_derived_unions() {
    let mut engine = StructureEngine::new(layered(vec![
        Type::policy("base", "base.Policy")
            .composes("base.Coverage")
            .with_association(Association::aggregation("base.Part").derived_union()),
        Type::policy("base", "base.Coverage"),
        Type::policy("base", "base.Part"),
        Type::policy("p", "p.HomePolicy").extends("base.Policy"),
    ]));
    let roots = project_roots(&mut engine, Strategy::InheritedAssociation);
    assert_eq!(node_names(&roots), ["p.HomePolicy"]);
    assert_eq!(node_names(&engine.children(&roots[0])), ["base.Coverage"]);
}

#[test]
fn test_strict_type_scope() {
    let mut engine = StructureEngine::new(single_project(vec![
        Type::policy("p", "Policy").composes("Coverage"),
        Type::policy("p", "Coverage"),
        Type::policy("p", "Base").composes("Part"),
        Type::policy("p", "Special").extends("Base"),
        Type::policy("p", "Part"),
        Type::policy("p", "Abstract"),
        Type::policy("p", "Plain").extends("Abstract"),
    ]));

    let mut roots_of = |name: &str| {
        let scope = Scope::Type(Arc::new(Type::policy("p", name)));
        node_names(&roots(&mut engine, scope, Strategy::Strict))
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    };

    assert_eq!(roots_of("Coverage"), ["Policy"]);
    assert_eq!(roots_of("Policy"), ["Policy"]);
    assert_eq!(roots_of("Special"), ["Base"]);
    // A supertype chain without associations leaves the type its own root.
    assert_eq!(roots_of("Plain"), ["Plain"]);
}

#[test]
fn test_strict_type_scope_on_cycle_converges() {
    let repo = single_project(vec![
        Type::policy("p", "A").aggregates("B"),
        Type::policy("p", "B").aggregates("A"),
    ]);
    let a = Arc::new(Type::policy("p", "A"));

    let mut engine = StructureEngine::new(repo.clone());
    assert_eq!(node_names(&roots(&mut engine, Scope::Type(Arc::clone(&a)), Strategy::Strict)), ["A"]);

    // A single pass already finds the root on a plain cycle.
    let config = EngineConfig {
        max_refinement_passes: 1,
        ..EngineConfig::default()
    };
    let mut capped = StructureEngine::with_config(repo, config);
    assert_eq!(node_names(&roots(&mut capped, Scope::Type(a), Strategy::Strict)), ["A"]);
}

/// `C` contains `A`, which sits on a cycle with `B`.
fn cycle_entered_from_outside() -> InMemoryRepository {
    single_project(vec![
        Type::policy("p", "A").aggregates("B"),
        Type::policy("p", "B").aggregates("A"),
        Type::policy("p", "C").aggregates("A"),
    ])
}

fn capped(passes: usize) -> EngineConfig {
    EngineConfig {
        max_refinement_passes: passes,
        ..EngineConfig::default()
    }
}

#[test]
fn test_strict_type_scope_refinement_drops_cycle_member() {
    let b = Scope::Type(Arc::new(Type::policy("p", "B")));

    let mut engine = StructureEngine::new(cycle_entered_from_outside());
    assert_eq!(node_names(&roots(&mut engine, b.clone(), Strategy::Strict)), ["C"]);
    assert_eq!(node_names(&project_roots(&mut engine, Strategy::Strict)), ["C"]);

    // The first pass also keeps B, which it reached through the cycle.
    let mut first_pass = StructureEngine::with_config(cycle_entered_from_outside(), capped(1));
    assert_eq!(node_names(&roots(&mut first_pass, b, Strategy::Strict)), ["B", "C"]);
}

#[test]
fn test_strict_type_scope_keeps_last_pass_at_cap() {
    let b = Scope::Type(Arc::new(Type::policy("p", "B")));

    // Two passes stop before the result is seen to be stable; the second
    // pass is still returned as complete.
    let mut engine = StructureEngine::with_config(cycle_entered_from_outside(), capped(2));
    let outcome = engine.compute_roots(&b, Strategy::Strict, TypeKind::PolicySide, &CancellationToken::new());
    let found = outcome.complete().unwrap();
    assert_eq!(node_names(&found), ["C"]);
    assert_eq!(node_names(engine.last_roots()), ["C"]);
}

#[test]
fn test_inherited_association_target_is_not_a_root() {
    let mut engine = StructureEngine::new(layered(vec![
        Type::policy("base", "base.Policy").composes("base.Coverage"),
        Type::policy("base", "base.HomePolicy").extends("base.Policy"),
        Type::policy("base", "base.Coverage"),
        Type::policy("p", "p.HomePolicy").extends("base.HomePolicy"),
        Type::policy("p", "p.FireCoverage").extends("base.Coverage"),
    ]));

    let roots = project_roots(&mut engine, Strategy::InheritedAssociation);
    assert_eq!(node_names(&roots), ["p.HomePolicy"]);
    assert!(subtree_types(&engine, &roots[0]).contains("p.FireCoverage"));
}

#[test]
fn test_inherited_type_scope_keeps_roots_reaching_the_type() {
    let mut engine = StructureEngine::new(coverage_model());
    let coverage = Arc::new(Type::policy("p", "p.Coverage"));

    let roots = roots(&mut engine, Scope::Type(coverage), Strategy::InheritedAssociation);
    assert_eq!(node_names(&roots), ["p.ProductA", "p.ProductB"]);
    assert!(roots.iter().all(|r| r.strategy == Strategy::InheritedAssociation));
}

#[test]
fn test_type_scope_of_other_side_is_empty() {
    let mut engine = StructureEngine::new(single_project(policy_and_coverage()));
    let scope = Scope::Type(Arc::new(Type::policy("p", "Policy")));

    let outcome = engine.compute_roots(&scope, Strategy::Strict, TypeKind::ProductSide, &CancellationToken::new());
    assert_eq!(outcome.complete().map(|r| r.len()), Some(0));
}

#[test]
fn test_cancelled_computation_keeps_previous_roots() {
    let mut engine = StructureEngine::new(single_project(policy_and_coverage()));
    let scope = Scope::Project("p".into());

    let cancelled = CancellationToken::new();
    StructureEngine::<InMemoryRepository>::cancel(&cancelled);
    let outcome = engine.compute_roots(&scope, Strategy::Strict, TypeKind::PolicySide, &cancelled);
    assert!(outcome.is_cancelled());
    assert!(engine.last_roots().is_empty());

    project_roots(&mut engine, Strategy::Strict);
    assert_eq!(node_names(engine.last_roots()), ["Policy"]);

    let outcome = engine.compute_roots(&scope, Strategy::InheritedAssociation, TypeKind::PolicySide, &cancelled);
    assert!(matches!(outcome, Outcome::Cancelled(_)));
    assert_eq!(node_names(engine.last_roots()), ["Policy"]);
}

#[test]
fn test_dangling_references_degrade_to_absent() {
    let mut engine = StructureEngine::new(single_project(vec![
        Type::policy("p", "A").extends("Missing").composes("Nowhere"),
    ]));
    let roots = project_roots(&mut engine, Strategy::Strict);
    assert_eq!(node_names(&roots), ["A"]);
    assert!(!engine.has_children(&roots[0]));

    let inherited = project_roots(&mut engine, Strategy::InheritedAssociation);
    assert_eq!(node_names(&inherited), ["A"]);
    assert!(engine.children(&inherited[0]).is_empty());
}
