//! Path-membership guard against infinite recursion on cyclic graphs

/// Result of [`GuardedPath::enter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    /// The element was not on the path; carries the extended path.
    Entered(GuardedPath<T>),
    /// The element is already on the path.
    Cycle,
}

impl<T> Guarded<T> {
    pub fn is_cycle(&self) -> bool {
        matches!(self, Guarded::Cycle)
    }

    pub fn entered(self) -> Option<GuardedPath<T>> {
        match self {
            Guarded::Entered(path) => Some(path),
            Guarded::Cycle => None,
        }
    }
}

/// An ordered path whose elements are unique by value equality.
///
/// Recursive callers use [`enter`](Self::enter), which leaves the current
/// path untouched and hands back an extended copy. Depth-first searches
/// that backtrack use [`push`](Self::push) and [`pop`](Self::pop) instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedPath<T> {
    elements: Vec<T>,
}

impl<T: PartialEq + Clone> GuardedPath<T> {
    pub fn new() -> Self {
        GuardedPath {
            elements: Vec::new(),
        }
    }

    /// Extend the path with `element`, or report a cycle if it is already present.
    pub fn enter(&self, element: T) -> Guarded<T> {
        if self.contains(&element) {
            return Guarded::Cycle;
        }
        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.extend(self.elements.iter().cloned());
        elements.push(element);
        Guarded::Entered(GuardedPath { elements })
    }

    /// Append `element` in place. Returns `false`, leaving the path as it
    /// was, when the element is already present.
    pub fn push(&mut self, element: T) -> bool {
        if self.contains(&element) {
            return false;
        }
        self.elements.push(element);
        true
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        self.elements.pop()
    }

    pub fn contains(&self, element: &T) -> bool {
        self.elements.iter().any(|e| e == element)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn last(&self) -> Option<&T> {
        self.elements.last()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }
}

impl<T: PartialEq + Clone> Default for GuardedPath<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq + Clone> FromIterator<T> for GuardedPath<T> {
    /// Builds a path from `iter`, silently skipping repeated elements.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut path = GuardedPath::new();
        for element in iter {
            path.push(element);
        }
        path
    }
}
