//! Selector data model, specificity, and the matching engine.
//!
//! The model follows Selectors Level 4: a [`Selector`] is a comma-separated
//! list of [`ComplexSelector`]s, each a combinator-separated chain of
//! [`CompoundSelector`]s, each a list of simple selectors.
//!
//! Matching processes a complex selector compound-by-compound in
//! right-to-left order, walking the host tree through [`ElementTraversal`]
//! generators.  The matcher only needs the element-shape contract
//! ([`ElementLike`]), so it works against any host tree.

use std::cmp::Ordering;

use crate::css::anb::AnbValue;
use crate::css::component_value::ComponentValue;
use crate::element::{ElementLike, ElementTraversal, QualifiedName};
use crate::rcstring::RcString;

/// The `(a, b, c)` triple of a selector's specificity, compared
/// lexicographically.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Abc {
    /// Number of ID selectors.
    pub a: u32,
    /// Number of class, attribute, and pseudo-class selectors.
    pub b: u32,
    /// Number of type selectors and pseudo-elements.
    pub c: u32,
}

impl Abc {
    fn add(&mut self, other: Abc) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
    }
}

/// Rank of a specificity value before the `(a, b, c)` triple is considered.
/// Declaration order is comparison order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SpecificityRank {
    /// User-agent stylesheet; loses to everything.
    UserAgent,
    /// An ordinary selector, ranked by its `(a, b, c)` triple.
    Abc,
    /// A `style=""` attribute.
    StyleAttribute,
    /// An `!important` declaration.
    Important,
    /// Values forced from the host API; beats everything.
    Override,
}

/// A specificity: either an `(a, b, c)` triple or one of the special markers
/// that outrank (or underrank) every triple.
///
/// Ordering is a strict total order:
/// `user-agent < (a, b, c) < style attribute < !important < override`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Specificity {
    rank: SpecificityRank,
    abc: Abc,
}

impl Specificity {
    pub fn from_abc(a: u32, b: u32, c: u32) -> Specificity {
        Specificity {
            rank: SpecificityRank::Abc,
            abc: Abc { a, b, c },
        }
    }

    pub fn user_agent() -> Specificity {
        Specificity {
            rank: SpecificityRank::UserAgent,
            abc: Abc::default(),
        }
    }

    pub fn style_attribute() -> Specificity {
        Specificity {
            rank: SpecificityRank::StyleAttribute,
            abc: Abc::default(),
        }
    }

    pub fn important() -> Specificity {
        Specificity {
            rank: SpecificityRank::Important,
            abc: Abc::default(),
        }
    }

    /// For values forced from the host API.
    pub fn override_() -> Specificity {
        Specificity {
            rank: SpecificityRank::Override,
            abc: Abc::default(),
        }
    }

    pub fn abc(&self) -> Abc {
        self.abc
    }
}

impl Default for Specificity {
    fn default() -> Specificity {
        Specificity::from_abc(0, 0, 0)
    }
}

impl From<Abc> for Specificity {
    fn from(abc: Abc) -> Specificity {
        Specificity {
            rank: SpecificityRank::Abc,
            abc,
        }
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Specificity) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Specificity) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.abc.cmp(&other.abc))
    }
}

/// `foo`, `ns|foo`, `*|foo`, `|foo`, `ns|*`, or `*`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSelector {
    pub name: QualifiedName,
}

impl TypeSelector {
    pub fn new(name: QualifiedName) -> TypeSelector {
        TypeSelector { name }
    }

    /// `*` (in any namespace form) matches every element.
    pub fn is_universal(&self) -> bool {
        self.name.local.as_str() == "*"
    }

    pub fn is_valid(&self) -> bool {
        true
    }

    pub fn matches<E: ElementLike>(&self, element: &E) -> bool {
        let tag = element.tag_name();

        let ns_matches =
            self.name.prefix.as_str() == "*" || self.name.prefix == tag.prefix;
        let local_matches = self.name.local.as_str() == "*" || self.name.local == tag.local;

        ns_matches && local_matches
    }
}

/// `#id`
#[derive(Debug, Clone, PartialEq)]
pub struct IdSelector {
    pub name: RcString,
}

impl IdSelector {
    pub fn is_valid(&self) -> bool {
        true
    }

    pub fn matches<E: ElementLike>(&self, element: &E) -> bool {
        element
            .get_attribute(&QualifiedName::local("id"))
            .map(|id| id == self.name)
            .unwrap_or(false)
    }
}

/// `.class`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSelector {
    pub name: RcString,
}

impl ClassSelector {
    pub fn is_valid(&self) -> bool {
        true
    }

    pub fn matches<E: ElementLike>(&self, element: &E) -> bool {
        element
            .class_name()
            .map(|classes| {
                classes
                    .split_whitespace()
                    .any(|class| class == self.name.as_str())
            })
            .unwrap_or(false)
    }
}

/// The operator of an attribute matcher, e.g. the `^=` in `[href^="https"]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttrMatcher {
    /// `~=`: value is in the whitespace-separated list.
    Includes,
    /// `|=`: value equals, or starts with value followed by `-`.
    DashMatch,
    /// `^=`
    PrefixMatch,
    /// `$=`
    SuffixMatch,
    /// `*=`
    SubstringMatch,
    /// `=`
    Eq,
}

/// The value-matching condition of an attribute selector.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrMatcherSpec {
    pub op: AttrMatcher,
    pub value: RcString,
    pub case_insensitive: bool,
}

impl AttrMatcherSpec {
    fn value_matches(&self, value: &str) -> bool {
        let expected = self.value.as_str();
        let ci = self.case_insensitive;

        // Prefix/suffix comparisons work on bytes so that a prefix length
        // falling inside a multi-byte character cannot panic.
        let eq_bytes = |a: &[u8], b: &[u8]| {
            if ci {
                a.eq_ignore_ascii_case(b)
            } else {
                a == b
            }
        };
        let v = value.as_bytes();
        let e = expected.as_bytes();

        match self.op {
            AttrMatcher::Includes => value
                .split_whitespace()
                .any(|item| eq_bytes(item.as_bytes(), e)),
            AttrMatcher::DashMatch => {
                eq_bytes(v, e)
                    || (v.len() > e.len()
                        && v[e.len()] == b'-'
                        && eq_bytes(&v[..e.len()], e))
            }
            AttrMatcher::PrefixMatch => v.len() >= e.len() && eq_bytes(&v[..e.len()], e),
            AttrMatcher::SuffixMatch => v.len() >= e.len() && eq_bytes(&v[v.len() - e.len()..], e),
            AttrMatcher::SubstringMatch => {
                if ci {
                    value
                        .to_ascii_lowercase()
                        .contains(&expected.to_ascii_lowercase())
                } else {
                    value.contains(expected)
                }
            }
            AttrMatcher::Eq => eq_bytes(v, e),
        }
    }
}

/// `[attr]`, `[attr=value]`, `[ns|attr^="v" i]`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: QualifiedName,
    pub matcher: Option<AttrMatcherSpec>,
}

impl AttributeSelector {
    pub fn is_valid(&self) -> bool {
        true
    }

    pub fn matches<E: ElementLike>(&self, element: &E) -> bool {
        if self.name.prefix.as_str() != "*" {
            let Some(value) = element.get_attribute(&self.name) else {
                return false;
            };

            // Without a matcher, the attribute existing is enough.
            match &self.matcher {
                None => true,
                Some(matcher) => matcher.value_matches(&value),
            }
        } else {
            // A wildcard namespace may hit several attributes.
            for attr_name in element.find_matching_attributes(&self.name) {
                let Some(value) = element.get_attribute(&attr_name) else {
                    continue;
                };
                match &self.matcher {
                    None => return true,
                    Some(matcher) => {
                        if matcher.value_matches(&value) {
                            return true;
                        }
                    }
                }
            }
            false
        }
    }
}

/// `:name` or `:name(args)`.
///
/// For An+B pseudo-classes, `anb` holds the reparsed coefficients and
/// `selector` the `of S` tail.  For `:is`/`:not`/`:where`/`:has`, `selector`
/// holds the nested selector list.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoClassSelector {
    pub ident: RcString,
    pub args: Option<Vec<ComponentValue>>,
    pub anb: Option<AnbValue>,
    pub selector: Option<Box<Selector>>,
}

impl PseudoClassSelector {
    pub fn new(ident: RcString) -> PseudoClassSelector {
        PseudoClassSelector {
            ident,
            args: None,
            anb: None,
            selector: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        if self.args.is_none() {
            return self.ident.equals_lowercase("root")
                || self.ident.equals_lowercase("empty")
                || self.ident.equals_lowercase("first-child")
                || self.ident.equals_lowercase("last-child")
                || self.ident.equals_lowercase("only-child")
                || self.ident.equals_lowercase("first-of-type")
                || self.ident.equals_lowercase("last-of-type")
                || self.ident.equals_lowercase("only-of-type");
        }

        if self.anb.is_some() {
            return self.ident.equals_lowercase("nth-child")
                || self.ident.equals_lowercase("nth-last-child")
                || self.ident.equals_lowercase("nth-of-type")
                || self.ident.equals_lowercase("nth-last-of-type");
        }

        // Forgiving inner lists may be empty; :not() requires a parsed list.
        if self.ident.equals_lowercase("is")
            || self.ident.equals_lowercase("where")
            || self.ident.equals_lowercase("has")
        {
            return self.selector.is_some();
        }
        if self.ident.equals_lowercase("not") {
            return self.selector.is_some();
        }

        false
    }

    /// Specificity per
    /// <https://www.w3.org/TR/selectors-4/#specificity-rules>.
    pub fn specificity(&self) -> Abc {
        if self.ident.equals_lowercase("is")
            || self.ident.equals_lowercase("not")
            || self.ident.equals_lowercase("has")
        {
            // Replaced by the most specific complex selector in the argument.
            self.selector
                .as_ref()
                .map(|s| s.max_specificity())
                .unwrap_or_default()
        } else if self.ident.equals_lowercase("nth-child")
            || self.ident.equals_lowercase("nth-last-child")
        {
            // The pseudo-class itself plus the most specific `of S` entry.
            let mut result = self
                .selector
                .as_ref()
                .map(|s| s.max_specificity())
                .unwrap_or_default();
            result.b += 1;
            result
        } else if self.ident.equals_lowercase("where") {
            Abc::default()
        } else {
            Abc { a: 0, b: 1, c: 0 }
        }
    }

    pub fn matches<E: ElementLike>(&self, element: &E) -> bool {
        if self.args.is_none() {
            if self.ident.equals_lowercase("root") {
                return element.parent_element().is_none();
            } else if self.ident.equals_lowercase("empty") {
                return element.first_child().is_none();
            } else if self.ident.equals_lowercase("first-child") {
                return element.previous_sibling().is_none();
            } else if self.ident.equals_lowercase("last-child") {
                return element.next_sibling().is_none();
            } else if self.ident.equals_lowercase("only-child") {
                return element.previous_sibling().is_none() && element.next_sibling().is_none();
            } else if self.ident.equals_lowercase("first-of-type") {
                return is_first_of_type(element, &element.tag_name());
            } else if self.ident.equals_lowercase("last-of-type") {
                return is_last_of_type(element, &element.tag_name());
            } else if self.ident.equals_lowercase("only-of-type") {
                let tag = element.tag_name();
                return is_first_of_type(element, &tag) && is_last_of_type(element, &tag);
            }

            return false;
        }

        if self.ident.equals_lowercase("not") {
            return match &self.selector {
                Some(selector) => !selector.matches(element).matched,
                None => false,
            };
        } else if self.ident.equals_lowercase("is") || self.ident.equals_lowercase("where") {
            return match &self.selector {
                Some(selector) => selector.matches(element).matched,
                None => false,
            };
        } else if self.ident.equals_lowercase("has") {
            return match &self.selector {
                Some(selector) => selector.matches_relative(element),
                None => false,
            };
        }

        // The nth-* family needs a parent to count within.
        let Some(parent) = element.parent_element() else {
            return false;
        };

        if let Some(anb) = &self.anb {
            if self.ident.equals_lowercase("nth-child") {
                let index = index_in_parent(&parent, element, false, self.selector.as_deref());
                return index > 0 && anb.evaluate(index);
            } else if self.ident.equals_lowercase("nth-last-child") {
                let index = index_in_parent(&parent, element, true, self.selector.as_deref());
                return index > 0 && anb.evaluate(index);
            } else if self.ident.equals_lowercase("nth-of-type") {
                let filter = Selector::from_type(TypeSelector::new(element.tag_name()));
                let index = index_in_parent(&parent, element, false, Some(&filter));
                return index > 0 && anb.evaluate(index);
            } else if self.ident.equals_lowercase("nth-last-of-type") {
                let filter = Selector::from_type(TypeSelector::new(element.tag_name()));
                let index = index_in_parent(&parent, element, true, Some(&filter));
                return index > 0 && anb.evaluate(index);
            }
        }

        false
    }
}

/// 1-based index of `element` among `parent`'s children, counting only the
/// children matching `filter` (if any), from the front or the back.
/// Returns -1 if the element is skipped by the filter.
fn index_in_parent<E: ElementLike>(
    parent: &E,
    element: &E,
    from_end: bool,
    filter: Option<&Selector>,
) -> i32 {
    let mut index = 1;

    let mut child = if from_end {
        parent.last_child()
    } else {
        parent.first_child()
    };

    while let Some(current) = child {
        let next = if from_end {
            current.previous_sibling()
        } else {
            current.next_sibling()
        };

        let counted = match filter {
            Some(selector) => selector.matches(&current).matched,
            None => true,
        };

        if counted {
            if &current == element {
                return index;
            }
            index += 1;
        } else if &current == element {
            return -1;
        }

        child = next;
    }

    -1
}

fn is_first_of_type<E: ElementLike>(element: &E, tag: &QualifiedName) -> bool {
    let mut sibling = element.previous_sibling();
    while let Some(current) = sibling {
        if &current.tag_name() == tag {
            return false;
        }
        sibling = current.previous_sibling();
    }
    true
}

fn is_last_of_type<E: ElementLike>(element: &E, tag: &QualifiedName) -> bool {
    let mut sibling = element.next_sibling();
    while let Some(current) = sibling {
        if &current.tag_name() == tag {
            return false;
        }
        sibling = current.next_sibling();
    }
    true
}

/// `::name` or `::name(args)`.  Parsed and carried, but the host trees have
/// no pseudo-element boxes, so these never match.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoElementSelector {
    pub ident: RcString,
    pub args: Option<Vec<ComponentValue>>,
}

impl PseudoElementSelector {
    pub fn is_valid(&self) -> bool {
        true
    }

    pub fn matches<E: ElementLike>(&self, _element: &E) -> bool {
        false
    }
}

/// One entry in a compound selector.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleSelector {
    PseudoElement(PseudoElementSelector),
    Type(TypeSelector),
    Id(IdSelector),
    Class(ClassSelector),
    PseudoClass(PseudoClassSelector),
    Attribute(AttributeSelector),
}

impl SimpleSelector {
    fn is_valid(&self) -> bool {
        match self {
            SimpleSelector::PseudoElement(s) => s.is_valid(),
            SimpleSelector::Type(s) => s.is_valid(),
            SimpleSelector::Id(s) => s.is_valid(),
            SimpleSelector::Class(s) => s.is_valid(),
            SimpleSelector::PseudoClass(s) => s.is_valid(),
            SimpleSelector::Attribute(s) => s.is_valid(),
        }
    }

    fn matches<E: ElementLike>(&self, element: &E) -> bool {
        match self {
            SimpleSelector::PseudoElement(s) => s.matches(element),
            SimpleSelector::Type(s) => s.matches(element),
            SimpleSelector::Id(s) => s.matches(element),
            SimpleSelector::Class(s) => s.matches(element),
            SimpleSelector::PseudoClass(s) => s.matches(element),
            SimpleSelector::Attribute(s) => s.matches(element),
        }
    }
}

/// A run of simple selectors that all constrain one element, like
/// `path.withColor#p1`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CompoundSelector {
    pub entries: Vec<SimpleSelector>,
}

impl CompoundSelector {
    pub fn is_valid(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|entry| entry.is_valid())
    }

    pub fn matches<E: ElementLike>(&self, element: &E) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|entry| entry.matches(element))
    }
}

/// How two compound selectors in a complex selector relate in the tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace.
    Descendant,
    /// `>`
    Child,
    /// `+`
    NextSibling,
    /// `~`
    SubsequentSibling,
    /// `||`; parses, but the host tree model has no column relation, so it
    /// never matches.
    Column,
}

/// One combinator + compound step of a complex selector.
///
/// The first entry's combinator is `Descendant` for ordinary selectors; for
/// relative selectors it is the leading combinator (`:has(> div)`).
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelectorEntry {
    pub combinator: Combinator,
    pub compound: CompoundSelector,
}

/// Result of matching a selector against an element.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SelectorMatchResult {
    pub matched: bool,
    pub specificity: Specificity,
}

impl SelectorMatchResult {
    pub fn none() -> SelectorMatchResult {
        SelectorMatchResult {
            matched: false,
            specificity: Specificity::default(),
        }
    }

    pub fn matched(specificity: Specificity) -> SelectorMatchResult {
        SelectorMatchResult {
            matched: true,
            specificity,
        }
    }
}

/// A chain of compound selectors separated by combinators, like
/// `g > path.withColor`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ComplexSelector {
    pub entries: Vec<ComplexSelectorEntry>,
}

impl ComplexSelector {
    pub fn is_valid(&self) -> bool {
        !self.entries.is_empty()
            && self
                .entries
                .iter()
                .all(|entry| entry.compound.is_valid())
    }

    /// Specificity of the whole chain.
    pub fn specificity(&self) -> Abc {
        let mut result = Abc::default();

        for entry in &self.entries {
            for simple in &entry.compound.entries {
                match simple {
                    SimpleSelector::Id(_) => result.a += 1,
                    SimpleSelector::Class(_) | SimpleSelector::Attribute(_) => result.b += 1,
                    SimpleSelector::PseudoClass(pseudo) => result.add(pseudo.specificity()),
                    SimpleSelector::Type(type_selector) => {
                        if !type_selector.is_universal() {
                            result.c += 1;
                        }
                    }
                    SimpleSelector::PseudoElement(_) => result.c += 1,
                }
            }
        }

        result
    }

    /// Matches right-to-left, per
    /// <https://www.w3.org/TR/selectors-4/#match-against-element>.
    pub fn matches<E: ElementLike>(&self, target: &E) -> SelectorMatchResult {
        match self.match_leftmost(target) {
            Some(_) => SelectorMatchResult::matched(Specificity::from(self.specificity())),
            None => SelectorMatchResult::none(),
        }
    }

    /// The right-to-left walk.  On success returns the element the leftmost
    /// compound matched, which relative matching checks against its anchor.
    fn match_leftmost<E: ElementLike>(&self, target: &E) -> Option<E> {
        enum NextElements<E: ElementLike> {
            Single(E),
            Parents(E),
            PreviousSiblings(E),
        }

        let mut source = NextElements::Single(target.clone());

        for (position, entry) in self.entries.iter().enumerate().rev() {
            let mut elements = match &source {
                NextElements::Single(e) => ElementTraversal::single(e.clone()),
                NextElements::Parents(e) => ElementTraversal::parents(e.clone()),
                NextElements::PreviousSiblings(e) => {
                    ElementTraversal::previous_siblings(e.clone())
                }
            };

            // Take the first element the compound selector accepts.
            let current = elements.find(|element| entry.compound.matches(element))?;

            if position == 0 {
                return Some(current);
            }

            // Rebind the generator through this entry's combinator.
            source = match entry.combinator {
                Combinator::Descendant => NextElements::Parents(current),
                Combinator::Child => NextElements::Single(current.parent_element()?),
                Combinator::NextSibling => NextElements::Single(current.previous_sibling()?),
                Combinator::SubsequentSibling => NextElements::PreviousSiblings(current),
                // No column relation in the host trees.
                Combinator::Column => return None,
            };
        }

        None
    }

    /// Matches this selector as a relative selector anchored at `anchor`:
    /// the first entry's combinator relates the leftmost element to the
    /// anchor.  This is how `:has()` evaluates its argument.
    fn matches_relative<E: ElementLike>(&self, anchor: &E) -> bool {
        let Some(first) = self.entries.first() else {
            return false;
        };
        let leading = first.combinator;

        let mut candidates: Vec<E> = Vec::new();
        match leading {
            Combinator::Descendant | Combinator::Child => {
                candidates.extend(ElementTraversal::descendants(anchor));
            }
            Combinator::NextSibling | Combinator::SubsequentSibling => {
                let mut sibling = anchor.next_sibling();
                while let Some(current) = sibling {
                    sibling = current.next_sibling();
                    candidates.push(current.clone());
                    candidates.extend(ElementTraversal::descendants(&current));
                }
            }
            Combinator::Column => return false,
        }

        candidates.into_iter().any(|candidate| {
            let Some(leftmost) = self.match_leftmost(&candidate) else {
                return false;
            };
            relates_to(&leftmost, anchor, leading)
        })
    }
}

/// Whether `element` relates to `anchor` via `combinator` (e.g. for `Child`,
/// whether the anchor is the element's parent).
fn relates_to<E: ElementLike>(element: &E, anchor: &E, combinator: Combinator) -> bool {
    match combinator {
        Combinator::Descendant => {
            ElementTraversal::parents(element.clone()).any(|ancestor| &ancestor == anchor)
        }
        Combinator::Child => element
            .parent_element()
            .map(|parent| &parent == anchor)
            .unwrap_or(false),
        Combinator::NextSibling => element
            .previous_sibling()
            .map(|sibling| &sibling == anchor)
            .unwrap_or(false),
        Combinator::SubsequentSibling => {
            ElementTraversal::previous_siblings(element.clone()).any(|sibling| &sibling == anchor)
        }
        Combinator::Column => false,
    }
}

/// A comma-separated selector list, the prelude of a style rule.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Selector {
    pub entries: Vec<ComplexSelector>,
}

impl Selector {
    /// A selector holding a single bare type selector; used for the implicit
    /// filter of `:nth-of-type()`.
    fn from_type(type_selector: TypeSelector) -> Selector {
        Selector {
            entries: vec![ComplexSelector {
                entries: vec![ComplexSelectorEntry {
                    combinator: Combinator::Descendant,
                    compound: CompoundSelector {
                        entries: vec![SimpleSelector::Type(type_selector)],
                    },
                }],
            }],
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|entry| entry.is_valid())
    }

    /// First matching complex selector wins and provides the specificity.
    pub fn matches<E: ElementLike>(&self, element: &E) -> SelectorMatchResult {
        for entry in &self.entries {
            let result = entry.matches(element);
            if result.matched {
                return result;
            }
        }

        SelectorMatchResult::none()
    }

    /// Matches any entry as a relative selector anchored at `anchor`.
    pub fn matches_relative<E: ElementLike>(&self, anchor: &E) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.matches_relative(anchor))
    }

    /// The largest specificity among the list's entries; used by
    /// `:is()`-style pseudo-classes.
    pub fn max_specificity(&self) -> Abc {
        self.entries
            .iter()
            .map(|entry| entry.specificity())
            .max()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::test_tree::TestElement;

    fn compound(simple: Vec<SimpleSelector>) -> CompoundSelector {
        CompoundSelector { entries: simple }
    }

    fn type_selector(name: &str) -> SimpleSelector {
        SimpleSelector::Type(TypeSelector::new(QualifiedName::local(name)))
    }

    fn class_selector(name: &str) -> SimpleSelector {
        SimpleSelector::Class(ClassSelector {
            name: RcString::from(name),
        })
    }

    fn complex(entries: Vec<(Combinator, CompoundSelector)>) -> ComplexSelector {
        ComplexSelector {
            entries: entries
                .into_iter()
                .map(|(combinator, compound)| ComplexSelectorEntry {
                    combinator,
                    compound,
                })
                .collect(),
        }
    }

    fn sample_tree() -> TestElement {
        TestElement::build(
            "svg",
            &[],
            vec![TestElement::build(
                "g",
                &[("class", "layer main")],
                vec![
                    TestElement::build("path", &[("id", "p1")], vec![]),
                    TestElement::build("rect", &[("id", "r1"), ("width", "10")], vec![]),
                    TestElement::build("path", &[("id", "p2"), ("class", "thick")], vec![]),
                ],
            )],
        )
    }

    fn find(root: &TestElement, id: &str) -> TestElement {
        let mut matching = None;
        for e in ElementTraversal::descendants(root) {
            if e.get_attribute(&QualifiedName::local("id"))
                .map(|v| v == id)
                .unwrap_or(false)
            {
                matching = Some(e);
            }
        }
        matching.expect("test id not found")
    }

    #[test]
    fn type_and_class_match() {
        let root = sample_tree();
        let g = root.first_child().unwrap();

        assert!(TypeSelector::new(QualifiedName::local("g")).matches(&g));
        assert!(!TypeSelector::new(QualifiedName::local("path")).matches(&g));
        assert!(TypeSelector::new(QualifiedName::local("*")).matches(&g));

        let class = ClassSelector {
            name: RcString::from("layer"),
        };
        assert!(class.matches(&g));
        let class = ClassSelector {
            name: RcString::from("lay"),
        };
        assert!(!class.matches(&g));
    }

    #[test]
    fn attribute_matchers() {
        let root = sample_tree();
        let r1 = find(&root, "r1");

        let exists = AttributeSelector {
            name: QualifiedName::local("width"),
            matcher: None,
        };
        assert!(exists.matches(&r1));

        let eq = AttributeSelector {
            name: QualifiedName::local("width"),
            matcher: Some(AttrMatcherSpec {
                op: AttrMatcher::Eq,
                value: RcString::from("10"),
                case_insensitive: false,
            }),
        };
        assert!(eq.matches(&r1));

        let prefix = AttributeSelector {
            name: QualifiedName::local("id"),
            matcher: Some(AttrMatcherSpec {
                op: AttrMatcher::PrefixMatch,
                value: RcString::from("r"),
                case_insensitive: false,
            }),
        };
        assert!(prefix.matches(&r1));

        let ci = AttributeSelector {
            name: QualifiedName::local("id"),
            matcher: Some(AttrMatcherSpec {
                op: AttrMatcher::Eq,
                value: RcString::from("R1"),
                case_insensitive: true,
            }),
        };
        assert!(ci.matches(&r1));
    }

    #[test]
    fn dash_match() {
        let spec = AttrMatcherSpec {
            op: AttrMatcher::DashMatch,
            value: RcString::from("en"),
            case_insensitive: false,
        };
        assert!(spec.value_matches("en"));
        assert!(spec.value_matches("en-US"));
        assert!(!spec.value_matches("enu"));
    }

    #[test]
    fn descendant_and_child_combinators() {
        let root = sample_tree();
        let p1 = find(&root, "p1");

        // "svg path"
        let selector = complex(vec![
            (Combinator::Descendant, compound(vec![type_selector("svg")])),
            (Combinator::Descendant, compound(vec![type_selector("path")])),
        ]);
        assert!(selector.matches(&p1).matched);

        // "svg > path" does not match (path is a grandchild)
        let selector = complex(vec![
            (Combinator::Descendant, compound(vec![type_selector("svg")])),
            (Combinator::Child, compound(vec![type_selector("path")])),
        ]);
        assert!(!selector.matches(&p1).matched);

        // "g > path" matches
        let selector = complex(vec![
            (Combinator::Descendant, compound(vec![type_selector("g")])),
            (Combinator::Child, compound(vec![type_selector("path")])),
        ]);
        assert!(selector.matches(&p1).matched);
    }

    #[test]
    fn sibling_combinators() {
        let root = sample_tree();
        let p2 = find(&root, "p2");
        let r1 = find(&root, "r1");

        // "rect + path"
        let selector = complex(vec![
            (Combinator::Descendant, compound(vec![type_selector("rect")])),
            (Combinator::NextSibling, compound(vec![type_selector("path")])),
        ]);
        assert!(selector.matches(&p2).matched);
        assert!(!selector.matches(&r1).matched);

        // "path ~ path"
        let selector = complex(vec![
            (Combinator::Descendant, compound(vec![type_selector("path")])),
            (
                Combinator::SubsequentSibling,
                compound(vec![type_selector("path")]),
            ),
        ]);
        assert!(selector.matches(&p2).matched);
        let p1 = find(&root, "p1");
        assert!(!selector.matches(&p1).matched);
    }

    #[test]
    fn column_combinator_never_matches() {
        let root = sample_tree();
        let p2 = find(&root, "p2");

        let selector = complex(vec![
            (Combinator::Descendant, compound(vec![type_selector("g")])),
            (Combinator::Column, compound(vec![type_selector("path")])),
        ]);
        assert!(!selector.matches(&p2).matched);
    }

    #[test]
    fn tree_structural_pseudo_classes() {
        let root = sample_tree();
        let g = root.first_child().unwrap();
        let p1 = find(&root, "p1");
        let p2 = find(&root, "p2");
        let r1 = find(&root, "r1");

        let pseudo = |name: &str| PseudoClassSelector::new(RcString::from(name));

        assert!(pseudo("root").matches(&root));
        assert!(!pseudo("root").matches(&g));

        assert!(pseudo("empty").matches(&p1));
        assert!(!pseudo("empty").matches(&g));

        assert!(pseudo("first-child").matches(&p1));
        assert!(!pseudo("first-child").matches(&r1));
        assert!(pseudo("last-child").matches(&p2));
        assert!(pseudo("only-child").matches(&g));
        assert!(!pseudo("only-child").matches(&r1));

        assert!(pseudo("first-of-type").matches(&p1));
        assert!(pseudo("first-of-type").matches(&r1));
        assert!(!pseudo("first-of-type").matches(&p2));
        assert!(pseudo("last-of-type").matches(&p2));
        assert!(pseudo("only-of-type").matches(&r1));
        assert!(!pseudo("only-of-type").matches(&p1));
    }

    #[test]
    fn nth_child() {
        let root = sample_tree();
        let p1 = find(&root, "p1");
        let r1 = find(&root, "r1");

        let mut nth = PseudoClassSelector::new(RcString::from("nth-child"));
        nth.args = Some(vec![]);
        nth.anb = Some(AnbValue::new(2, 0));

        // even children: r1 is the 2nd child
        assert!(!nth.matches(&p1));
        assert!(nth.matches(&r1));
    }

    #[test]
    fn nth_child_of_selector() {
        let root = sample_tree();
        let p2 = find(&root, "p2");
        let p1 = find(&root, "p1");

        // :nth-child(2n of path): count only path children
        let mut nth = PseudoClassSelector::new(RcString::from("nth-child"));
        nth.args = Some(vec![]);
        nth.anb = Some(AnbValue::new(2, 0));
        nth.selector = Some(Box::new(Selector::from_type(TypeSelector::new(
            QualifiedName::local("path"),
        ))));

        assert!(nth.matches(&p2), "p2 is the 2nd path child");
        assert!(!nth.matches(&p1));

        // An element skipped by the filter never matches.
        let r1 = find(&root, "r1");
        assert!(!nth.matches(&r1));
    }

    #[test]
    fn nth_last_child() {
        let root = sample_tree();
        let p2 = find(&root, "p2");
        let r1 = find(&root, "r1");

        let mut nth = PseudoClassSelector::new(RcString::from("nth-last-child"));
        nth.args = Some(vec![]);
        nth.anb = Some(AnbValue::new(0, 1));

        assert!(nth.matches(&p2));
        assert!(!nth.matches(&r1));
    }

    #[test]
    fn not_and_is() {
        let root = sample_tree();
        let p1 = find(&root, "p1");
        let r1 = find(&root, "r1");

        let path_selector = Selector::from_type(TypeSelector::new(QualifiedName::local("path")));

        let mut not = PseudoClassSelector::new(RcString::from("not"));
        not.args = Some(vec![]);
        not.selector = Some(Box::new(path_selector.clone()));
        assert!(!not.matches(&p1));
        assert!(not.matches(&r1));

        let mut is = PseudoClassSelector::new(RcString::from("is"));
        is.args = Some(vec![]);
        is.selector = Some(Box::new(path_selector));
        assert!(is.matches(&p1));
        assert!(!is.matches(&r1));
    }

    #[test]
    fn has_relative_matching() {
        let root = sample_tree();
        let g = root.first_child().unwrap();
        let p1 = find(&root, "p1");

        // g:has(path) -- g has path descendants
        let mut has = PseudoClassSelector::new(RcString::from("has"));
        has.args = Some(vec![]);
        has.selector = Some(Box::new(Selector::from_type(TypeSelector::new(
            QualifiedName::local("path"),
        ))));
        assert!(has.matches(&g));
        assert!(!has.matches(&p1));

        // p1:has(+ rect) -- next sibling is a rect
        let mut has_next = PseudoClassSelector::new(RcString::from("has"));
        has_next.args = Some(vec![]);
        let mut relative = Selector::from_type(TypeSelector::new(QualifiedName::local("rect")));
        relative.entries[0].entries[0].combinator = Combinator::NextSibling;
        has_next.selector = Some(Box::new(relative));
        assert!(has_next.matches(&p1));

        let p2 = find(&root, "p2");
        assert!(!has_next.matches(&p2));
    }

    #[test]
    fn specificity_aggregation() {
        // path.withColor => (0, 1, 1)
        let selector = complex(vec![(
            Combinator::Descendant,
            compound(vec![type_selector("path"), class_selector("withColor")]),
        )]);
        assert_eq!(selector.specificity(), Abc { a: 0, b: 1, c: 1 });

        // universal selector contributes nothing
        let selector = complex(vec![(
            Combinator::Descendant,
            compound(vec![type_selector("*")]),
        )]);
        assert_eq!(selector.specificity(), Abc { a: 0, b: 0, c: 0 });
    }

    #[test]
    fn specificity_of_pseudo_classes() {
        // :where() is zero
        let mut where_ = PseudoClassSelector::new(RcString::from("where"));
        where_.args = Some(vec![]);
        where_.selector = Some(Box::new(Selector::from_type(TypeSelector::new(
            QualifiedName::local("path"),
        ))));
        assert_eq!(where_.specificity(), Abc::default());

        // :is(path) takes the inner specificity
        let mut is = PseudoClassSelector::new(RcString::from("is"));
        is.args = Some(vec![]);
        is.selector = Some(Box::new(Selector::from_type(TypeSelector::new(
            QualifiedName::local("path"),
        ))));
        assert_eq!(is.specificity(), Abc { a: 0, b: 0, c: 1 });

        // :nth-child(2n of path) adds b=1 on top of the inner specificity
        let mut nth = PseudoClassSelector::new(RcString::from("nth-child"));
        nth.args = Some(vec![]);
        nth.anb = Some(AnbValue::new(2, 0));
        nth.selector = Some(Box::new(Selector::from_type(TypeSelector::new(
            QualifiedName::local("path"),
        ))));
        assert_eq!(nth.specificity(), Abc { a: 0, b: 1, c: 1 });
    }

    #[test]
    fn specificity_total_order() {
        let abc_low = Specificity::from_abc(0, 0, 1);
        let abc_high = Specificity::from_abc(1, 0, 0);

        assert!(Specificity::user_agent() < abc_low);
        assert!(abc_low < abc_high);
        assert!(abc_high < Specificity::style_attribute());
        assert!(Specificity::style_attribute() < Specificity::important());
        assert!(Specificity::important() < Specificity::override_());
    }

    #[test]
    fn match_result_identical_for_equal_elements() {
        let root = sample_tree();
        let p1 = find(&root, "p1");
        let p1_again = find(&root, "p1");

        let selector = complex(vec![(
            Combinator::Descendant,
            compound(vec![type_selector("path")]),
        )]);

        assert_eq!(selector.matches(&p1), selector.matches(&p1_again));
    }

    proptest::proptest! {
        #[test]
        fn specificity_order_is_asymmetric_and_transitive(
            a1 in 0u32..3, b1 in 0u32..3, c1 in 0u32..3,
            a2 in 0u32..3, b2 in 0u32..3, c2 in 0u32..3,
            a3 in 0u32..3, b3 in 0u32..3, c3 in 0u32..3,
        ) {
            let x = Specificity::from_abc(a1, b1, c1);
            let y = Specificity::from_abc(a2, b2, c2);
            let z = Specificity::from_abc(a3, b3, c3);

            // asymmetric
            if x < y {
                proptest::prop_assert!(!(y < x));
            }

            // transitive
            if x < y && y < z {
                proptest::prop_assert!(x < z);
            }

            // total
            proptest::prop_assert!(x < y || y < x || x == y);
        }
    }
}
