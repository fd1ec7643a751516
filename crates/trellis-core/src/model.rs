//! Core data structures for the type model

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Name of a project owning a set of types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(name: impl Into<String>) -> Self {
        ProjectId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(name: &str) -> Self {
        ProjectId(name.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(name: String) -> Self {
        ProjectId(name)
    }
}

impl From<&ProjectId> for ProjectId {
    fn from(id: &ProjectId) -> Self {
        id.clone()
    }
}

/// The two parallel type hierarchies of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    PolicySide,
    ProductSide,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::PolicySide => f.write_str("policy"),
            TypeKind::ProductSide => f.write_str("product"),
        }
    }
}

/// What kind of relationship an association represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    // ── Structural (containment) ────────────────────────────
    Aggregation,
    CompositionMasterToDetail,

    // ── Everything else, ignored by the structure engine ────
    Other,
}

impl AssociationKind {
    /// Whether this kind can ever take part in root/child computation.
    pub fn is_structural(self) -> bool {
        !matches!(self, AssociationKind::Other)
    }
}

/// The set of association kinds that count as containment for one computation.
///
/// `Other` can never be part of the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssociationKinds {
    aggregation: bool,
    composition: bool,
}

impl AssociationKinds {
    /// Both structural kinds.
    pub const STRUCTURAL: AssociationKinds = AssociationKinds {
        aggregation: true,
        composition: true,
    };

    /// No kind qualifies; every association is ignored.
    pub const NONE: AssociationKinds = AssociationKinds {
        aggregation: false,
        composition: false,
    };

    pub fn from_kinds(kinds: impl IntoIterator<Item = AssociationKind>) -> Self {
        kinds
            .into_iter()
            .fold(AssociationKinds::NONE, |acc, kind| acc.with(kind))
    }

    pub fn only(kind: AssociationKind) -> Self {
        AssociationKinds::NONE.with(kind)
    }

    pub fn with(mut self, kind: AssociationKind) -> Self {
        match kind {
            AssociationKind::Aggregation => self.aggregation = true,
            AssociationKind::CompositionMasterToDetail => self.composition = true,
            AssociationKind::Other => {}
        }
        self
    }

    pub fn without(mut self, kind: AssociationKind) -> Self {
        match kind {
            AssociationKind::Aggregation => self.aggregation = false,
            AssociationKind::CompositionMasterToDetail => self.composition = false,
            AssociationKind::Other => {}
        }
        self
    }

    pub fn contains(&self, kind: AssociationKind) -> bool {
        match kind {
            AssociationKind::Aggregation => self.aggregation,
            AssociationKind::CompositionMasterToDetail => self.composition,
            AssociationKind::Other => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.aggregation && !self.composition
    }

    pub fn kinds(&self) -> Vec<AssociationKind> {
        let mut kinds = Vec::new();
        if self.aggregation {
            kinds.push(AssociationKind::Aggregation);
        }
        if self.composition {
            kinds.push(AssociationKind::CompositionMasterToDetail);
        }
        kinds
    }
}

impl Default for AssociationKinds {
    fn default() -> Self {
        AssociationKinds::STRUCTURAL
    }
}

/// Upper bound of an association end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "CardinalityRepr", into = "CardinalityRepr")]
pub enum Cardinality {
    Bounded(u32),
    #[default]
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Bounded(n) => write!(f, "{}", n),
            Cardinality::Many => f.write_str("*"),
        }
    }
}

/// Wire form of a cardinality: a number, or `"*"` for unbounded.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CardinalityRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<CardinalityRepr> for Cardinality {
    type Error = String;

    fn try_from(repr: CardinalityRepr) -> Result<Self, Self::Error> {
        match repr {
            CardinalityRepr::Number(n) => Ok(Cardinality::Bounded(n)),
            CardinalityRepr::Text(text) if text == "*" => Ok(Cardinality::Many),
            CardinalityRepr::Text(text) => text
                .parse::<u32>()
                .map(Cardinality::Bounded)
                .map_err(|_| format!("invalid cardinality `{}`", text)),
        }
    }
}

impl From<Cardinality> for CardinalityRepr {
    fn from(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::Bounded(n) => CardinalityRepr::Number(n),
            Cardinality::Many => CardinalityRepr::Text("*".to_string()),
        }
    }
}

/// A directed association declared on a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub kind: AssociationKind,
    /// Qualified name of the target type. May not resolve.
    pub target: String,
    #[serde(default)]
    pub min_cardinality: u32,
    #[serde(default)]
    pub max_cardinality: Cardinality,
    #[serde(default)]
    pub role_singular: String,
    #[serde(default)]
    pub role_plural: String,
    /// Abstract role that concrete associations subset; never navigable.
    #[serde(default)]
    pub is_derived_union: bool,
    #[serde(default)]
    pub is_subset_of_derived_union: bool,
    #[serde(default)]
    pub subsetted_derived_union: Option<String>,
}

impl Association {
    pub fn new(kind: AssociationKind, target: impl Into<String>) -> Self {
        let target = target.into();
        let role = default_role(&target);
        Association {
            kind,
            role_plural: format!("{}s", role),
            role_singular: role,
            target,
            min_cardinality: 0,
            max_cardinality: Cardinality::Many,
            is_derived_union: false,
            is_subset_of_derived_union: false,
            subsetted_derived_union: None,
        }
    }

    pub fn aggregation(target: impl Into<String>) -> Self {
        Association::new(AssociationKind::Aggregation, target)
    }

    pub fn composition(target: impl Into<String>) -> Self {
        Association::new(AssociationKind::CompositionMasterToDetail, target)
    }

    pub fn other(target: impl Into<String>) -> Self {
        Association::new(AssociationKind::Other, target)
    }

    pub fn roles(mut self, singular: impl Into<String>, plural: impl Into<String>) -> Self {
        self.role_singular = singular.into();
        self.role_plural = plural.into();
        self
    }

    pub fn cardinality(mut self, min: u32, max: Cardinality) -> Self {
        self.min_cardinality = min;
        self.max_cardinality = max;
        self
    }

    pub fn derived_union(mut self) -> Self {
        self.is_derived_union = true;
        self
    }

    pub fn subsets(mut self, derived_union: impl Into<String>) -> Self {
        self.is_subset_of_derived_union = true;
        self.subsetted_derived_union = Some(derived_union.into());
        self
    }

    /// Whether this association is a containment edge for the given kinds.
    pub fn qualifies(&self, kinds: &AssociationKinds) -> bool {
        kinds.contains(self.kind)
    }
}

fn default_role(target: &str) -> String {
    let name = unqualified(target);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn unqualified(qualified_name: &str) -> &str {
    qualified_name
        .rsplit('.')
        .next()
        .unwrap_or(qualified_name)
}

/// A policy or product component type, as read from the repository snapshot.
///
/// Identity is `(project, qualified_name)`; the remaining fields are not
/// compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Type {
    pub qualified_name: String,
    pub project: ProjectId,
    /// Qualified name of the supertype. May dangle.
    #[serde(default)]
    pub supertype: Option<String>,
    #[serde(default)]
    pub associations: Vec<Association>,
    pub kind: TypeKind,
    #[serde(default)]
    pub is_abstract: bool,
}

impl Type {
    pub fn new(project: impl Into<ProjectId>, qualified_name: impl Into<String>, kind: TypeKind) -> Self {
        Type {
            qualified_name: qualified_name.into(),
            project: project.into(),
            supertype: None,
            associations: Vec::new(),
            kind,
            is_abstract: false,
        }
    }

    pub fn policy(project: impl Into<ProjectId>, qualified_name: impl Into<String>) -> Self {
        Type::new(project, qualified_name, TypeKind::PolicySide)
    }

    pub fn product(project: impl Into<ProjectId>, qualified_name: impl Into<String>) -> Self {
        Type::new(project, qualified_name, TypeKind::ProductSide)
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn with_association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    pub fn composes(self, target: impl Into<String>) -> Self {
        self.with_association(Association::composition(target))
    }

    pub fn aggregates(self, target: impl Into<String>) -> Self {
        self.with_association(Association::aggregation(target))
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Last segment of the qualified name.
    pub fn name(&self) -> &str {
        unqualified(&self.qualified_name)
    }

    pub fn is_owned_by(&self, project: &ProjectId) -> bool {
        &self.project == project
    }

    /// Associations of this type that count as containment for `kinds`.
    pub fn qualifying_associations<'a>(
        &'a self,
        kinds: &'a AssociationKinds,
    ) -> impl Iterator<Item = &'a Association> + 'a {
        self.associations.iter().filter(move |a| a.qualifies(kinds))
    }

    pub fn has_qualifying_association(&self, kinds: &AssociationKinds) -> bool {
        self.qualifying_associations(kinds).next().is_some()
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.project == other.project && self.qualified_name == other.qualified_name
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.project.hash(state);
        self.qualified_name.hash(state);
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name)
    }
}

/// How the recursion of single-type root finding arrived at a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncomingEdge {
    /// The type the search started from.
    SelfEdge,
    /// Reached from a type it is associated to.
    Association,
    /// Reached as the supertype of the previous type.
    Supertype,
}

/// Cycle-detection key of single-type root finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathElement {
    pub ty: Arc<Type>,
    pub edge: IncomingEdge,
}

impl PathElement {
    pub fn new(ty: Arc<Type>, edge: IncomingEdge) -> Self {
        PathElement { ty, edge }
    }
}
