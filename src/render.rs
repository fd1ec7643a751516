//! Plain-text rendering of structure nodes

use std::fmt::Write;
use trellis_core::TypeRepository;
use trellis_structure::{ComponentNode, StructureEngine};

/// One line describing `node`, without indentation.
pub fn label(node: &ComponentNode) -> String {
    let mut label = node.value.qualified_name.clone();
    if let Some(association) = &node.association {
        label.push_str(" (");
        if !association.role_singular.is_empty() {
            let _ = write!(label, "{} ", association.role_singular);
        }
        let _ = write!(label, "{}..{})", association.min_cardinality, association.max_cardinality);
    }
    if node.value.is_abstract {
        label.push_str(" <abstract>");
    }
    if node.is_inherited {
        label.push_str(" [inherited]");
    } else if node.has_inherited_association_target {
        label.push_str(" [*]");
    }
    if node.is_repetition() {
        label.push_str(" [repeated]");
    }
    label
}

pub fn roots(roots: &[ComponentNode]) -> String {
    roots.iter().map(|root| format!("{}\n", label(root))).collect()
}

/// The trees below `roots`, expanded down to `depth` levels when given.
pub fn tree<R: TypeRepository>(engine: &StructureEngine<R>, roots: &[ComponentNode], depth: Option<usize>) -> String {
    let mut out = String::new();
    let mut stack: Vec<ComponentNode> = roots.iter().rev().cloned().collect();

    while let Some(node) = stack.pop() {
        let level = node.depth();
        let _ = writeln!(out, "{}{}", "  ".repeat(level), label(&node));
        if depth.is_some_and(|max| level >= max) {
            continue;
        }
        stack.extend(engine.children(&node).into_iter().rev());
    }

    out
}

pub fn paths(paths: &[Vec<ComponentNode>]) -> String {
    paths
        .iter()
        .map(|path| {
            let names: Vec<&str> = path.iter().map(|n| n.value.qualified_name.as_str()).collect();
            format!("{}\n", names.join(" > "))
        })
        .collect()
}
