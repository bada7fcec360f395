//! The element-shape contract required by the selector matcher.
//!
//! The matcher does not know about any concrete document model; it works
//! against anything implementing [`ElementLike`].  Host trees provide a cheap
//! clonable handle type (elements are values; identity is handle equality)
//! with parent/child/sibling navigation and attribute access.

use std::fmt;

use tinyvec::TinyVec;

use crate::rcstring::RcString;

/// A name with an optional namespace prefix.  Either part may be `*` in
/// selector contexts; an empty prefix means the default namespace.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub prefix: RcString,
    pub local: RcString,
}

impl QualifiedName {
    pub fn new(prefix: impl Into<RcString>, local: impl Into<RcString>) -> QualifiedName {
        QualifiedName {
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    /// A name with no namespace prefix.
    pub fn local(local: impl Into<RcString>) -> QualifiedName {
        QualifiedName::new("", local)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{}|{}", self.prefix, self.local)
        }
    }
}

/// Small vector of attribute names, returned by wildcard attribute queries.
pub type MatchingAttributes = TinyVec<[QualifiedName; 1]>;

/// The duck-typed interface the selector matcher requires of host trees.
///
/// Implementors are handles: `Clone` must be cheap, and `PartialEq` compares
/// identity, not content.
pub trait ElementLike: Clone + PartialEq {
    fn parent_element(&self) -> Option<Self>;
    fn first_child(&self) -> Option<Self>;
    fn last_child(&self) -> Option<Self>;
    fn previous_sibling(&self) -> Option<Self>;
    fn next_sibling(&self) -> Option<Self>;

    fn tag_name(&self) -> QualifiedName;

    /// The element's `class` attribute, if any.
    fn class_name(&self) -> Option<RcString>;

    fn get_attribute(&self, name: &QualifiedName) -> Option<RcString>;

    /// Returns the attribute names matching `name`, whose prefix may be the
    /// `*` wildcard.
    fn find_matching_attributes(&self, name: &QualifiedName) -> MatchingAttributes;
}

/// Lazily yields elements in one of the traversal orders selector matching
/// needs.  Restart by constructing a fresh traversal.
pub enum ElementTraversal<E: ElementLike> {
    /// Yields one element, then stops.
    Single(Option<E>),
    /// Walks up the parent chain; the starting element is not yielded.
    Parents(E),
    /// Walks left through previous siblings; the start is not yielded.
    PreviousSiblings(E),
    /// Pre-order depth-first over all descendants, via an explicit stack.
    Descendants(Vec<E>),
}

impl<E: ElementLike> ElementTraversal<E> {
    pub fn single(element: E) -> ElementTraversal<E> {
        ElementTraversal::Single(Some(element))
    }

    pub fn parents(element: E) -> ElementTraversal<E> {
        ElementTraversal::Parents(element)
    }

    pub fn previous_siblings(element: E) -> ElementTraversal<E> {
        ElementTraversal::PreviousSiblings(element)
    }

    pub fn descendants(element: &E) -> ElementTraversal<E> {
        let mut stack = Vec::new();
        let mut child = element.first_child();
        while let Some(c) = child {
            child = c.next_sibling();
            stack.push(c);
        }
        stack.reverse();
        ElementTraversal::Descendants(stack)
    }
}

impl<E: ElementLike> Iterator for ElementTraversal<E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        match self {
            ElementTraversal::Single(element) => element.take(),

            ElementTraversal::Parents(current) => {
                let parent = current.parent_element()?;
                *current = parent.clone();
                Some(parent)
            }

            ElementTraversal::PreviousSiblings(current) => {
                let sibling = current.previous_sibling()?;
                *current = sibling.clone();
                Some(sibling)
            }

            ElementTraversal::Descendants(stack) => {
                let current = stack.pop()?;

                let first_len = stack.len();
                let mut child = current.first_child();
                while let Some(c) = child {
                    child = c.next_sibling();
                    stack.push(c);
                }
                stack[first_len..].reverse();

                Some(current)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_tree::TestElement;
    use super::*;

    fn sample_tree() -> TestElement {
        // g
        // ├── path#a
        // ├── rect#b
        // │    └── path#c
        // └── path#d
        TestElement::build(
            "g",
            &[],
            vec![
                TestElement::build("path", &[("id", "a")], vec![]),
                TestElement::build(
                    "rect",
                    &[("id", "b")],
                    vec![TestElement::build("path", &[("id", "c")], vec![])],
                ),
                TestElement::build("path", &[("id", "d")], vec![]),
            ],
        )
    }

    fn id(element: &TestElement) -> String {
        element
            .get_attribute(&QualifiedName::local("id"))
            .map(|s| s.to_string())
            .unwrap_or_else(|| element.tag_name().to_string())
    }

    #[test]
    fn single_traversal_yields_once() {
        let root = sample_tree();
        let mut iter = ElementTraversal::single(root.clone());
        assert_eq!(iter.next(), Some(root));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn parents_traversal_walks_up() {
        let root = sample_tree();
        let c = root
            .first_child()
            .unwrap()
            .next_sibling()
            .unwrap()
            .first_child()
            .unwrap();
        assert_eq!(id(&c), "c");

        let chain: Vec<String> = ElementTraversal::parents(c).map(|e| id(&e)).collect();
        assert_eq!(chain, vec!["b", "g"]);
    }

    #[test]
    fn previous_siblings_traversal_walks_left() {
        let root = sample_tree();
        let d = root.last_child().unwrap();
        assert_eq!(id(&d), "d");

        let siblings: Vec<String> = ElementTraversal::previous_siblings(d)
            .map(|e| id(&e))
            .collect();
        assert_eq!(siblings, vec!["b", "a"]);
    }

    #[test]
    fn descendants_traversal_is_preorder() {
        let root = sample_tree();
        let order: Vec<String> = ElementTraversal::descendants(&root).map(|e| id(&e)).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn wildcard_attribute_lookup() {
        let e = TestElement::build("path", &[("d", "M 0 0"), ("id", "x")], vec![]);
        let matches = e.find_matching_attributes(&QualifiedName::new("*", "d"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].local.as_str(), "d");
    }
}
