//! Tree nodes handed out to the presentation layer

use std::fmt;
use std::sync::Arc;
use trellis_core::{Association, ProjectId, Type, TypeGraph};

/// The two semantic variants of the structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Containment exactly as declared.
    Strict,
    /// Associations declared in referenced projects are merged into the
    /// project's own types.
    InheritedAssociation,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Strict => f.write_str("strict"),
            Strategy::InheritedAssociation => f.write_str("inherited"),
        }
    }
}

/// What a strategy yields for one outgoing edge of a type; the tree
/// builder wraps it into a [`ComponentNode`].
#[derive(Debug, Clone)]
pub struct ChildEdge {
    pub target: Arc<Type>,
    /// `None` for subtype edges.
    pub association: Option<Association>,
    pub is_inherited: bool,
    pub has_inherited_association_target: bool,
}

impl ChildEdge {
    pub fn subtype(target: Arc<Type>) -> Self {
        ChildEdge {
            target,
            association: None,
            is_inherited: false,
            has_inherited_association_target: false,
        }
    }

    pub fn association(association: &Association, target: Arc<Type>) -> Self {
        ChildEdge {
            target,
            association: Some(association.clone()),
            is_inherited: false,
            has_inherited_association_target: false,
        }
    }

    pub fn inherited(association: &Association, target: Arc<Type>) -> Self {
        ChildEdge {
            is_inherited: true,
            has_inherited_association_target: true,
            ..ChildEdge::association(association, target)
        }
    }
}

/// A position in the structure tree wrapping one [`Type`].
///
/// The same type may be wrapped by many nodes. Two nodes are equal when
/// their values and whole parent chains are equal; repeated types are
/// detected via [`is_repetition`](Self::is_repetition), never merged.
#[derive(Clone)]
pub struct ComponentNode {
    pub value: Arc<Type>,
    pub parent: Option<Arc<ComponentNode>>,
    /// Project the structure was computed for.
    pub source_project: ProjectId,
    pub strategy: Strategy,
    /// The association that led here. `None` for roots and subtype children.
    pub association: Option<Association>,
    /// The edge to this node was pulled in from an out-of-project supertype.
    pub is_inherited: bool,
    /// Display emphasis: this node is the target of an inherited edge.
    pub has_inherited_association_target: bool,
    scope: Arc<TypeGraph>,
}

impl ComponentNode {
    pub fn root(value: Arc<Type>, source_project: ProjectId, strategy: Strategy, scope: Arc<TypeGraph>) -> Self {
        ComponentNode {
            value,
            parent: None,
            source_project,
            strategy,
            association: None,
            is_inherited: false,
            has_inherited_association_target: false,
            scope,
        }
    }

    pub fn child(parent: &Arc<ComponentNode>, edge: ChildEdge) -> Self {
        ComponentNode {
            value: edge.target,
            parent: Some(Arc::clone(parent)),
            source_project: parent.source_project.clone(),
            strategy: parent.strategy,
            association: edge.association,
            is_inherited: edge.is_inherited,
            has_inherited_association_target: edge.has_inherited_association_target,
            scope: Arc::clone(&parent.scope),
        }
    }

    /// The type snapshot this node was computed under.
    pub fn scope(&self) -> &Arc<TypeGraph> {
        &self.scope
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &ComponentNode> {
        std::iter::successors(self.parent.as_deref(), |node| node.parent.as_deref())
    }

    /// Whether this node's type already occurs among its ancestors.
    pub fn is_repetition(&self) -> bool {
        self.ancestors().any(|a| a.value == self.value)
    }

    /// Number of ancestors.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Types from the root down to this node.
    pub fn type_path(&self) -> Vec<Arc<Type>> {
        let mut path: Vec<Arc<Type>> = self.ancestors().map(|a| Arc::clone(&a.value)).collect();
        path.reverse();
        path.push(Arc::clone(&self.value));
        path
    }

    /// Role name of the association that led here, if any.
    pub fn role(&self) -> Option<&str> {
        self.association.as_ref().map(|a| a.role_singular.as_str())
    }
}

impl PartialEq for ComponentNode {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.value == other.value
            && match (&self.parent, &other.parent) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a == b,
                _ => false,
            }
    }
}

impl Eq for ComponentNode {}

impl fmt::Debug for ComponentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self
            .type_path()
            .iter()
            .map(|t| t.qualified_name.clone())
            .collect();
        f.debug_struct("ComponentNode")
            .field("path", &path.join(" > "))
            .field("source_project", &self.source_project)
            .field("strategy", &self.strategy)
            .field("is_inherited", &self.is_inherited)
            .finish()
    }
}
