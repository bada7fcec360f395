//! Recursive-descent selector parser over component values.
//!
//! Implements the Selectors Level 4 grammar:
//!
//! ```text
//! <selector-list> = <complex-selector-list>
//! <complex-selector-list> = <complex-selector>#
//! <complex-selector> = <compound-selector> [ <combinator>? <compound-selector> ]*
//! <compound-selector> = [ <type-selector>? <subclass-selector>*
//!                         [ <pseudo-element-selector> <pseudo-class-selector>* ]* ]!
//! <combinator> = '>' | '+' | '~' | [ '|' '|' ]
//! <type-selector> = <wq-name> | <ns-prefix>? '*'
//! <ns-prefix> = [ <ident-token> | '*' ]? '|'
//! <wq-name> = <ns-prefix>? <ident-token>
//! <subclass-selector> = <id-selector> | <class-selector> |
//!                       <attribute-selector> | <pseudo-class-selector>
//! ```
//!
//! Three entry points: the strict parser (errors abort), the forgiving list
//! (invalid complex selectors are dropped), and the forgiving *relative* list
//! (entries may begin with a combinator), used by `:has()`.

use crate::css::anb::AnbParser;
use crate::css::component_value::{
    parse_list_of_component_values, BlockKind, ComponentValue, Function, SimpleBlock,
    WhitespaceHandling,
};
use crate::css::selector::{
    AttrMatcher, AttrMatcherSpec, AttributeSelector, ClassSelector, Combinator, ComplexSelector,
    ComplexSelectorEntry, CompoundSelector, IdSelector, PseudoClassSelector,
    PseudoElementSelector, Selector, SimpleSelector, TypeSelector,
};
use crate::css::token::{Token, TokenKind};
use crate::element::QualifiedName;
use crate::error::{FileOffset, ParseError, ParseResult};
use crate::rcstring::RcString;

/// Parser entry points for selectors.
pub struct SelectorParser;

impl SelectorParser {
    /// Strict parse of a selector list from source text.
    pub fn parse(input: &str) -> ParseResult<Selector> {
        let components = parse_list_of_component_values(input, WhitespaceHandling::Keep);
        Self::parse_components(&components)
    }

    /// Strict parse of a selector list from component values (e.g. a rule
    /// prelude).
    pub fn parse_components(components: &[ComponentValue]) -> ParseResult<Selector> {
        let mut parser = SelectorParserImpl::new(components);
        parser.parse()
    }

    /// Forgiving list: invalid complex selectors are silently dropped, per
    /// <https://www.w3.org/TR/selectors-4/#parse-as-a-forgiving-selector-list>.
    pub fn parse_forgiving_selector_list(components: &[ComponentValue]) -> Selector {
        let mut parser = SelectorParserImpl::new(components);
        parser.parse_forgiving_selector_list()
    }

    /// Forgiving relative list: entries may start with a combinator, per
    /// <https://www.w3.org/TR/selectors-4/#parse-relative-selector>.
    pub fn parse_forgiving_relative_selector_list(components: &[ComponentValue]) -> Selector {
        let mut parser = SelectorParserImpl::new(components);
        parser.parse_forgiving_relative_selector_list()
    }
}

struct SelectorParserImpl<'a> {
    components: &'a [ComponentValue],
    error: Option<ParseError>,
}

impl<'a> SelectorParserImpl<'a> {
    fn new(components: &'a [ComponentValue]) -> SelectorParserImpl<'a> {
        SelectorParserImpl {
            components,
            error: None,
        }
    }

    fn parse(&mut self) -> ParseResult<Selector> {
        match self.handle_complex_selector_list() {
            Some(selector) => Ok(selector),
            None => Err(self.take_error()),
        }
    }

    /// Parses the `of S` tail of `:nth-child(An+B of S)`.
    fn parse_microsyntax_type_suffix(&mut self) -> ParseResult<Selector> {
        self.skip_whitespace();

        match self.next_ident() {
            Some(ident) if ident.equals_lowercase("of") => self.advance(1),
            _ => {
                self.set_error("Expected 'of' keyword");
                return Err(self.take_error());
            }
        }

        self.skip_whitespace();

        let selector = self.parse_forgiving_selector_list();
        if selector.entries.is_empty() {
            self.set_error("Failed to parse selector after 'of' keyword");
            return Err(self.take_error());
        }

        self.skip_whitespace();

        if self.is_eof() {
            Ok(selector)
        } else {
            self.set_error("Expected end of microsyntax type suffix");
            Err(self.take_error())
        }
    }

    fn parse_forgiving_selector_list(&mut self) -> Selector {
        let mut result = Selector::default();
        let mut first = true;

        self.skip_whitespace();

        while !self.is_eof() {
            if first {
                first = false;
            } else {
                // Complex selectors only end at a comma or EOF.
                debug_assert!(self.next_token_is_comma());
                self.advance(1);
            }

            self.skip_whitespace();

            match self.handle_complex_selector() {
                Some(complex) => {
                    if complex.is_valid() {
                        result.entries.push(complex);
                    }
                }
                None => {
                    self.error = None;
                    self.skip_until_comma();
                }
            }
        }

        result
    }

    fn parse_forgiving_relative_selector_list(&mut self) -> Selector {
        let mut result = Selector::default();
        let mut first = true;

        self.skip_whitespace();

        while !self.is_eof() {
            if first {
                first = false;
            } else {
                debug_assert!(self.next_token_is_comma());
                self.advance(1);
            }

            self.skip_whitespace();

            match self.handle_relative_selector() {
                Some(complex) => {
                    if complex.is_valid() {
                        result.entries.push(complex);
                    }
                }
                None => {
                    self.error = None;
                    self.skip_until_comma();
                }
            }
        }

        result
    }

    fn handle_complex_selector_list(&mut self) -> Option<Selector> {
        self.skip_whitespace();

        if self.is_eof() {
            self.set_error("No selectors found");
            return None;
        }

        let mut result = Selector::default();
        result.entries.push(self.handle_complex_selector()?);

        while !self.is_eof() {
            self.skip_whitespace();
            if self.is_eof() {
                break;
            }

            if !self.next_token_is_comma() {
                self.set_error("Expected ',' between selectors");
                return None;
            }
            self.advance(1);
            self.skip_whitespace();

            result.entries.push(self.handle_complex_selector()?);
        }

        Some(result)
    }

    fn handle_complex_selector(&mut self) -> Option<ComplexSelector> {
        let mut result = ComplexSelector::default();
        result.entries.push(ComplexSelectorEntry {
            combinator: Combinator::Descendant,
            compound: self.handle_compound_selector()?,
        });

        // After a compound selector, whitespace is ambiguous: it may be a
        // descendant combinator or just separation before a comma/EOF.  Look
        // ahead to decide.
        while !self.is_eof() {
            if self.next_is_whitespace() {
                self.advance(1);
            }

            if self.is_eof() || self.next_token_is_comma() {
                break;
            }

            let combinator = self.handle_combinator().unwrap_or(Combinator::Descendant);
            self.skip_whitespace();

            result.entries.push(ComplexSelectorEntry {
                combinator,
                compound: self.handle_compound_selector()?,
            });
        }

        Some(result)
    }

    fn handle_relative_selector(&mut self) -> Option<ComplexSelector> {
        // <relative-selector> = <combinator>? <complex-selector>
        let combinator = self.handle_combinator().unwrap_or(Combinator::Descendant);

        self.skip_whitespace();

        let mut complex = self.handle_complex_selector()?;
        if let Some(first) = complex.entries.first_mut() {
            first.combinator = combinator;
        }

        Some(complex)
    }

    fn handle_compound_selector(&mut self) -> Option<CompoundSelector> {
        let mut result = CompoundSelector::default();

        let mut first = true;
        loop {
            let mut had_error = false;
            let mut added_entry = false;

            {
                let mut push = |entry: Option<SimpleSelector>| match entry {
                    Some(entry) => {
                        result.entries.push(entry);
                        added_entry = true;
                    }
                    None => had_error = true,
                };

                match self.front() {
                    Some(ComponentValue::Token(token)) => match &token.kind {
                        TokenKind::Ident(_) => {
                            push(self.handle_type_selector().map(SimpleSelector::Type))
                        }
                        TokenKind::Delim('|') | TokenKind::Delim('*') => {
                            push(self.handle_type_selector().map(SimpleSelector::Type))
                        }
                        TokenKind::Delim('.') => push(self.handle_subclass_selector()),
                        TokenKind::Colon => {
                            // A second colon means a pseudo-element.
                            if self.next_is_colon(1) {
                                push(
                                    self.handle_pseudo_element_selector()
                                        .map(SimpleSelector::PseudoElement),
                                );
                            } else {
                                push(self.handle_subclass_selector());
                            }
                        }
                        TokenKind::Hash { .. } => push(self.handle_subclass_selector()),
                        _ => (),
                    },
                    Some(ComponentValue::Block(_)) => push(self.handle_subclass_selector()),
                    _ => (),
                }
            }

            if had_error {
                return None;
            }

            if !added_entry {
                if first {
                    self.set_error("Unexpected token when parsing compound selector");
                    return None;
                }
                break;
            }

            first = false;
        }

        Some(result)
    }

    fn handle_combinator(&mut self) -> Option<Combinator> {
        match self.front() {
            Some(component) if component.is_delim('>') => {
                self.advance(1);
                Some(Combinator::Child)
            }
            Some(component) if component.is_delim('+') => {
                self.advance(1);
                Some(Combinator::NextSibling)
            }
            Some(component) if component.is_delim('~') => {
                self.advance(1);
                Some(Combinator::SubsequentSibling)
            }
            Some(component) if component.is_delim('|') && self.next_delim_is('|', 1) => {
                self.advance(2);
                Some(Combinator::Column)
            }
            _ => None,
        }
    }

    fn handle_type_selector(&mut self) -> Option<TypeSelector> {
        // <type-selector> = <wq-name> | <ns-prefix>? '*'
        let prefix_length = match self.front() {
            Some(ComponentValue::Token(token)) => match &token.kind {
                // Needs to be `<ident> |` to be a prefix.
                TokenKind::Ident(_) => 2,
                TokenKind::Delim('|') => 1,
                TokenKind::Delim('*') => {
                    if self.next_delim_is('|', 1) {
                        2
                    } else {
                        self.advance(1);
                        return Some(TypeSelector::new(QualifiedName::local("*")));
                    }
                }
                _ => 0,
            },
            _ => 0,
        };

        if prefix_length == 0 {
            return None;
        }

        // Disambiguate `<ns-prefix> '*'` from a plain <wq-name> by looking
        // past the prefix for a '*'.
        if !self.next_is_whitespace_at(1) && self.next_delim_is('*', prefix_length) {
            let prefix = self.handle_ns_prefix()?;
            debug_assert!(self.front().map(|c| c.is_delim('*')).unwrap_or(false));
            self.advance(1);
            Some(TypeSelector::new(QualifiedName::new(prefix, "*")))
        } else {
            let name = self.handle_wq_name()?;
            Some(TypeSelector::new(name))
        }
    }

    fn handle_ns_prefix(&mut self) -> Option<RcString> {
        // <ns-prefix> = [ <ident-token> | '*' ]? '|'
        let mut ns = RcString::new();

        match self.front() {
            Some(ComponentValue::Token(token)) => match &token.kind {
                TokenKind::Ident(name) => {
                    ns = name.clone();
                    self.advance(1);
                }
                TokenKind::Delim('*') => {
                    ns = RcString::from("*");
                    self.advance(1);
                }
                _ => (),
            },
            _ => (),
        }

        if self.front().map(|c| c.is_delim('|')).unwrap_or(false) {
            self.advance(1);
            Some(ns)
        } else {
            self.set_error("Expected '|' when parsing namespace prefix");
            None
        }
    }

    fn handle_wq_name(&mut self) -> Option<QualifiedName> {
        // <wq-name> = <ns-prefix>? <ident-token>
        const INVALID_TOKEN: &str = "Expected ident, '*' or '|' when parsing name";

        let (is_ident, is_prefix_delim) = match self.front() {
            Some(ComponentValue::Token(token)) => match &token.kind {
                TokenKind::Ident(_) => (true, false),
                TokenKind::Delim('|') | TokenKind::Delim('*') => (false, true),
                _ => {
                    self.set_error(INVALID_TOKEN);
                    return None;
                }
            },
            _ => {
                self.set_error(INVALID_TOKEN);
                return None;
            }
        };

        // `ident|name` has a prefix, but `ident|=...` is an attribute
        // matcher, not a prefixed name.
        let has_prefix =
            (is_ident && self.next_delim_is('|', 1) && !self.next_delim_is('=', 2))
                || is_prefix_delim;

        let prefix = if has_prefix {
            self.handle_ns_prefix()?
        } else {
            RcString::new()
        };

        match self.next_ident() {
            Some(name) => {
                let name = name.clone();
                self.advance(1);
                Some(QualifiedName::new(prefix, name))
            }
            None => {
                self.set_error(if prefix.is_empty() {
                    "Expected ident when parsing name"
                } else {
                    "Expected ident after namespace prefix when parsing name"
                });
                None
            }
        }
    }

    fn handle_subclass_selector(&mut self) -> Option<SimpleSelector> {
        // <subclass-selector> = <id-selector> | <class-selector> |
        //                       <attribute-selector> | <pseudo-class-selector>
        match self.front() {
            Some(ComponentValue::Token(token)) => match &token.kind {
                TokenKind::Hash { value, .. } => {
                    let result = IdSelector {
                        name: value.clone(),
                    };
                    self.advance(1);
                    Some(SimpleSelector::Id(result))
                }
                TokenKind::Delim('.') => self.handle_class_selector().map(SimpleSelector::Class),
                TokenKind::Colon => {
                    let mut pseudo = self.handle_pseudo_class_selector()?;
                    self.attach_pseudo_class_arguments(&mut pseudo);
                    Some(SimpleSelector::PseudoClass(pseudo))
                }
                _ => None,
            },
            Some(ComponentValue::Block(_)) => self
                .handle_attribute_selector()
                .map(SimpleSelector::Attribute),
            _ => None,
        }
    }

    /// Reparses a functional pseudo-class's arguments: An+B (with an optional
    /// `of S` tail) for the nth-* family, nested selector lists for
    /// `:is`/`:not`/`:where`/`:has`.  Failures leave the pseudo-class without
    /// an An+B value or selector, which makes it invalid.
    fn attach_pseudo_class_arguments(&mut self, pseudo: &mut PseudoClassSelector) {
        let Some(args) = &pseudo.args else {
            return;
        };

        let anb_with_selector = pseudo.ident.equals_lowercase("nth-child")
            || pseudo.ident.equals_lowercase("nth-last-child");
        let anb_only = pseudo.ident.equals_lowercase("nth-of-type")
            || pseudo.ident.equals_lowercase("nth-last-of-type");

        if anb_with_selector || anb_only {
            let Ok(anb) = AnbParser::parse(args) else {
                return;
            };

            if anb.remaining.is_empty() {
                pseudo.anb = Some(anb.value);
            } else if anb_with_selector {
                let mut tail_parser = SelectorParserImpl::new(anb.remaining);
                if let Ok(selector) = tail_parser.parse_microsyntax_type_suffix() {
                    pseudo.anb = Some(anb.value);
                    pseudo.selector = Some(Box::new(selector));
                }
            }
            // Extra components after the An+B of an *-of-type form: discard
            // the value, leaving the pseudo-class invalid.
            return;
        }

        if pseudo.ident.equals_lowercase("is") || pseudo.ident.equals_lowercase("where") {
            let mut parser = SelectorParserImpl::new(args);
            pseudo.selector = Some(Box::new(parser.parse_forgiving_selector_list()));
        } else if pseudo.ident.equals_lowercase("not") {
            let mut parser = SelectorParserImpl::new(args);
            if let Ok(selector) = parser.parse() {
                pseudo.selector = Some(Box::new(selector));
            }
        } else if pseudo.ident.equals_lowercase("has") {
            let mut parser = SelectorParserImpl::new(args);
            pseudo.selector = Some(Box::new(parser.parse_forgiving_relative_selector_list()));
        }
    }

    fn handle_pseudo_element_selector(&mut self) -> Option<PseudoElementSelector> {
        // <pseudo-element-selector> = ':' <pseudo-class-selector>
        debug_assert!(self.next_is_colon(0));
        self.advance(1);

        let pseudo = self.handle_pseudo_class_selector()?;
        Some(PseudoElementSelector {
            ident: pseudo.ident,
            args: pseudo.args,
        })
    }

    fn handle_pseudo_class_selector(&mut self) -> Option<PseudoClassSelector> {
        // <pseudo-class-selector> = ':' <ident-token> |
        //                           ':' <function-token> <any-value> ')'
        debug_assert!(self.next_is_colon(0));
        self.advance(1);

        match self.front() {
            Some(ComponentValue::Token(token)) => {
                if let TokenKind::Ident(name) = &token.kind {
                    let result = PseudoClassSelector::new(name.clone());
                    self.advance(1);
                    return Some(result);
                }
            }
            Some(ComponentValue::Function(Function { name, values, .. })) => {
                let mut result = PseudoClassSelector::new(name.clone());
                result.args = Some(values.clone());
                self.advance(1);
                return Some(result);
            }
            _ => (),
        }

        self.set_error("Expected ident or function after ':' for pseudo class selector");
        None
    }

    fn handle_class_selector(&mut self) -> Option<ClassSelector> {
        // <class-selector> = '.' <ident-token>
        debug_assert!(self.front().map(|c| c.is_delim('.')).unwrap_or(false));
        self.advance(1);

        match self.next_ident() {
            Some(name) => {
                let result = ClassSelector { name: name.clone() };
                self.advance(1);
                Some(result)
            }
            None => {
                self.set_error("Expected ident when parsing class selector");
                None
            }
        }
    }

    fn handle_attribute_selector(&mut self) -> Option<AttributeSelector> {
        // <attribute-selector> = '[' <wq-name> ']' |
        //                        '[' <wq-name> <attr-matcher>
        //                            [ <string-token> | <ident-token> ]
        //                            <attr-modifier>? ']'
        let block = match self.front() {
            Some(ComponentValue::Block(block)) => block,
            _ => unreachable!("caller checked for a simple block"),
        };

        if block.kind != BlockKind::Square {
            self.set_error("Unexpected block type, expected '[' delimiter");
            return None;
        }

        let result = self.parse_attribute_block(block);
        if result.is_some() {
            self.advance(1);
        }
        result
    }

    fn parse_attribute_block(&mut self, block: &SimpleBlock) -> Option<AttributeSelector> {
        let mut sub = SelectorParserImpl::new(&block.values);
        sub.skip_whitespace();

        let Some(name) = sub.handle_wq_name() else {
            self.set_error("Expected name when parsing attribute selector");
            return None;
        };
        sub.skip_whitespace();

        let mut result = AttributeSelector {
            name,
            matcher: None,
        };

        if sub.is_eof() {
            return Some(result);
        }

        let Some(op) = sub.handle_attr_matcher() else {
            self.error = Some(sub.take_error());
            return None;
        };

        sub.skip_whitespace();

        let value = match sub.front() {
            Some(ComponentValue::Token(token)) => match &token.kind {
                TokenKind::Ident(value) | TokenKind::String(value) => {
                    let value = value.clone();
                    sub.advance(1);
                    Some(value)
                }
                _ => None,
            },
            _ => None,
        };
        let Some(value) = value else {
            self.set_error(
                "Expected string or ident after matcher ('~=', '|=', '^=', '$=', '*=', or '=')",
            );
            return None;
        };

        sub.skip_whitespace();

        // <attr-modifier>: an 'i' or 's' ident.
        let mut case_insensitive = false;
        if let Some(modifier) = sub.next_ident() {
            if modifier.equals_lowercase("i") {
                case_insensitive = true;
                sub.advance(1);
            } else if modifier.equals_lowercase("s") {
                sub.advance(1);
            }
        }

        sub.skip_whitespace();

        if !sub.is_eof() {
            self.set_error("Expected end of attribute selector, but found more items");
            return None;
        }

        result.matcher = Some(AttrMatcherSpec {
            op,
            value,
            case_insensitive,
        });
        Some(result)
    }

    fn handle_attr_matcher(&mut self) -> Option<AttrMatcher> {
        // <attr-matcher> = [ '~' | '|' | '^' | '$' | '*' ]? '='
        let op = match self.front() {
            Some(ComponentValue::Token(token)) => match &token.kind {
                TokenKind::Delim('~') => Some(AttrMatcher::Includes),
                TokenKind::Delim('|') => Some(AttrMatcher::DashMatch),
                TokenKind::Delim('^') => Some(AttrMatcher::PrefixMatch),
                TokenKind::Delim('$') => Some(AttrMatcher::SuffixMatch),
                TokenKind::Delim('*') => Some(AttrMatcher::SubstringMatch),
                TokenKind::Delim('=') => {
                    self.advance(1);
                    return Some(AttrMatcher::Eq);
                }
                _ => None,
            },
            _ => None,
        };

        if let Some(op) = op {
            self.advance(1);
            if self.front().map(|c| c.is_delim('=')).unwrap_or(false) {
                self.advance(1);
                return Some(op);
            }
        }

        self.set_error(
            "Invalid attribute matcher, it must be either '~=', '|=', '^=', '$=', '*=', or '='",
        );
        None
    }

    // Cursor helpers.

    fn is_eof(&self) -> bool {
        self.components.is_empty()
    }

    // Peeks return `'a` references into the component span, not borrows of
    // the parser, so the cursor can advance while they are held.
    fn front(&self) -> Option<&'a ComponentValue> {
        self.components.first()
    }

    fn advance(&mut self, amount: usize) {
        self.components = &self.components[amount..];
    }

    fn next_is_whitespace(&self) -> bool {
        self.next_is_whitespace_at(0)
    }

    fn next_is_whitespace_at(&self, advance: usize) -> bool {
        self.components
            .get(advance)
            .map(|c| c.is_whitespace())
            .unwrap_or(false)
    }

    fn next_token_is_comma(&self) -> bool {
        matches!(
            self.components.first(),
            Some(ComponentValue::Token(Token {
                kind: TokenKind::Comma,
                ..
            }))
        )
    }

    fn next_is_colon(&self, advance: usize) -> bool {
        matches!(
            self.components.get(advance),
            Some(ComponentValue::Token(Token {
                kind: TokenKind::Colon,
                ..
            }))
        )
    }

    fn next_delim_is(&self, delim: char, advance: usize) -> bool {
        self.components
            .get(advance)
            .map(|c| c.is_delim(delim))
            .unwrap_or(false)
    }

    fn next_ident(&self) -> Option<&'a RcString> {
        self.components.first().and_then(|c| c.as_ident())
    }

    fn skip_whitespace(&mut self) {
        while self.next_is_whitespace() {
            self.advance(1);
        }
    }

    fn skip_until_comma(&mut self) {
        while !self.is_eof() && !self.next_token_is_comma() {
            self.advance(1);
        }
    }

    fn set_error(&mut self, reason: &str) {
        let location = self
            .components
            .first()
            .map(|c| FileOffset::Offset(c.source_offset()))
            .unwrap_or(FileOffset::EndOfString);
        self.error = Some(ParseError::new(reason, location));
    }

    fn take_error(&mut self) -> ParseError {
        self.error
            .take()
            .unwrap_or_else(|| ParseError::new("Selector parse error", FileOffset::EndOfString))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::anb::AnbValue;
    use crate::css::selector::Abc;

    fn parse(s: &str) -> Selector {
        SelectorParser::parse(s).unwrap()
    }

    fn first_compound(selector: &Selector) -> &CompoundSelector {
        &selector.entries[0].entries[0].compound
    }

    fn forgiving(s: &str) -> Selector {
        let components = parse_list_of_component_values(s, WhitespaceHandling::Keep);
        SelectorParser::parse_forgiving_selector_list(&components)
    }

    #[test]
    fn parses_type_selectors() {
        let selector = parse("path");
        match &first_compound(&selector).entries[0] {
            SimpleSelector::Type(t) => {
                assert_eq!(t.name, QualifiedName::local("path"));
                assert!(!t.is_universal());
            }
            other => panic!("unexpected {other:?}"),
        }

        let selector = parse("*");
        match &first_compound(&selector).entries[0] {
            SimpleSelector::Type(t) => assert!(t.is_universal()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_namespaced_type_selectors() {
        for (input, prefix, local) in [
            ("svg|circle", "svg", "circle"),
            ("*|circle", "*", "circle"),
            ("|circle", "", "circle"),
            ("svg|*", "svg", "*"),
        ] {
            let selector = parse(input);
            match &first_compound(&selector).entries[0] {
                SimpleSelector::Type(t) => {
                    assert_eq!(t.name.prefix.as_str(), prefix, "for {input}");
                    assert_eq!(t.name.local.as_str(), local, "for {input}");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn parses_compound_selector() {
        let selector = parse("path.withColor#p1");
        let compound = first_compound(&selector);
        assert_eq!(compound.entries.len(), 3);
        assert!(matches!(compound.entries[0], SimpleSelector::Type(_)));
        assert!(matches!(compound.entries[1], SimpleSelector::Class(_)));
        assert!(matches!(compound.entries[2], SimpleSelector::Id(_)));
    }

    #[test]
    fn parses_combinators() {
        let selector = parse("a b > c + d ~ e || f");
        let entries = &selector.entries[0].entries;
        let combinators: Vec<Combinator> = entries.iter().map(|e| e.combinator).collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Descendant,
                Combinator::Descendant,
                Combinator::Child,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
                Combinator::Column,
            ]
        );
    }

    #[test]
    fn parses_selector_list() {
        let selector = parse("a, .b , #c");
        assert_eq!(selector.entries.len(), 3);
    }

    #[test]
    fn parses_attribute_selectors() {
        let selector = parse("[href]");
        match &first_compound(&selector).entries[0] {
            SimpleSelector::Attribute(a) => {
                assert_eq!(a.name, QualifiedName::local("href"));
                assert!(a.matcher.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }

        let selector = parse("a[href^=\"https\" i]");
        let compound = first_compound(&selector);
        match &compound.entries[1] {
            SimpleSelector::Attribute(a) => {
                let matcher = a.matcher.as_ref().unwrap();
                assert_eq!(matcher.op, AttrMatcher::PrefixMatch);
                assert_eq!(matcher.value.as_str(), "https");
                assert!(matcher.case_insensitive);
            }
            other => panic!("unexpected {other:?}"),
        }

        // `ident|=` is a dash matcher, not a namespace prefix.
        let selector = parse("[lang|=en]");
        match &first_compound(&selector).entries[0] {
            SimpleSelector::Attribute(a) => {
                assert_eq!(a.name, QualifiedName::local("lang"));
                assert_eq!(a.matcher.as_ref().unwrap().op, AttrMatcher::DashMatch);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_all_attr_matchers() {
        for (input, op) in [
            ("[a=b]", AttrMatcher::Eq),
            ("[a~=b]", AttrMatcher::Includes),
            ("[a|=b]", AttrMatcher::DashMatch),
            ("[a^=b]", AttrMatcher::PrefixMatch),
            ("[a$=b]", AttrMatcher::SuffixMatch),
            ("[a*=b]", AttrMatcher::SubstringMatch),
        ] {
            let selector = parse(input);
            match &first_compound(&selector).entries[0] {
                SimpleSelector::Attribute(a) => {
                    assert_eq!(a.matcher.as_ref().unwrap().op, op, "for {input}")
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn parses_pseudo_classes() {
        let selector = parse(":first-child");
        match &first_compound(&selector).entries[0] {
            SimpleSelector::PseudoClass(p) => {
                assert_eq!(p.ident.as_str(), "first-child");
                assert!(p.args.is_none());
                assert!(p.is_valid());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_nth_child_with_anb() {
        let selector = parse(":nth-child(2n+1)");
        match &first_compound(&selector).entries[0] {
            SimpleSelector::PseudoClass(p) => {
                assert_eq!(p.anb, Some(AnbValue::new(2, 1)));
                assert!(p.selector.is_none());
                assert!(p.is_valid());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_nth_child_of_selector() {
        let selector = parse(":nth-child(2n of path)");
        match &first_compound(&selector).entries[0] {
            SimpleSelector::PseudoClass(p) => {
                assert_eq!(p.anb, Some(AnbValue::new(2, 0)));
                let inner = p.selector.as_ref().unwrap();
                assert_eq!(inner.entries.len(), 1);
                assert!(p.is_valid());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nth_of_type_rejects_of_selector() {
        // `of S` is only for nth-child/nth-last-child; the An+B value is
        // discarded and the selector becomes invalid.
        let result = SelectorParser::parse(":nth-of-type(2n of path)");
        match result {
            Ok(selector) => assert!(!selector.is_valid()),
            Err(_) => (),
        }
    }

    #[test]
    fn parses_is_not_where_has() {
        let selector = parse(":is(path, rect)");
        match &first_compound(&selector).entries[0] {
            SimpleSelector::PseudoClass(p) => {
                assert_eq!(p.selector.as_ref().unwrap().entries.len(), 2);
                assert!(p.is_valid());
            }
            other => panic!("unexpected {other:?}"),
        }

        let selector = parse(":not(.a)");
        match &first_compound(&selector).entries[0] {
            SimpleSelector::PseudoClass(p) => {
                assert!(p.selector.is_some());
                assert!(p.is_valid());
            }
            other => panic!("unexpected {other:?}"),
        }

        let selector = parse(":has(> path)");
        match &first_compound(&selector).entries[0] {
            SimpleSelector::PseudoClass(p) => {
                let inner = p.selector.as_ref().unwrap();
                assert_eq!(inner.entries[0].entries[0].combinator, Combinator::Child);
                assert!(p.is_valid());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_pseudo_element() {
        let selector = parse("path::before");
        let compound = first_compound(&selector);
        assert_eq!(compound.entries.len(), 2);
        match &compound.entries[1] {
            SimpleSelector::PseudoElement(p) => assert_eq!(p.ident.as_str(), "before"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn strict_errors() {
        assert!(SelectorParser::parse("").is_err());
        assert!(SelectorParser::parse("   ").is_err());
        assert!(SelectorParser::parse(".").is_err());
        assert!(SelectorParser::parse("a,").is_err());
        assert!(SelectorParser::parse("[a=]").is_err());
        assert!(SelectorParser::parse("[a!b]").is_err());
        assert!(SelectorParser::parse("a b }").is_err());
    }

    #[test]
    fn error_has_offset() {
        let err = SelectorParser::parse("a, .").unwrap_err();
        assert!(matches!(err.location, FileOffset::Offset(_) | FileOffset::EndOfString));
    }

    #[test]
    fn forgiving_list_drops_invalid_entries() {
        let selector = forgiving("path, ., rect");
        assert_eq!(selector.entries.len(), 2);

        let selector = forgiving(":nonsense, rect");
        assert_eq!(selector.entries.len(), 1);

        let selector = forgiving("");
        assert!(selector.entries.is_empty());
    }

    #[test]
    fn forgiving_entries_are_subsequence_of_strict() {
        for input in ["a, b.c, #d", "a, ., b", "x > y, :bogus, z"] {
            let components = parse_list_of_component_values(input, WhitespaceHandling::Keep);
            let forgiving = SelectorParser::parse_forgiving_selector_list(&components);

            // Each forgiving entry must equal the strict parse of one of the
            // comma-separated pieces.
            let mut strict_entries = Vec::new();
            for piece in input.split(',') {
                if let Ok(selector) = SelectorParser::parse(piece) {
                    if selector.is_valid() {
                        strict_entries.extend(selector.entries);
                    }
                }
            }

            let mut strict_iter = strict_entries.iter();
            for entry in &forgiving.entries {
                assert!(
                    strict_iter.any(|s| s == entry),
                    "forgiving entry not found in order for {input:?}"
                );
            }
        }
    }

    #[test]
    fn relative_selector_list() {
        let components = parse_list_of_component_values("> path, ~ rect", WhitespaceHandling::Keep);
        let selector = SelectorParser::parse_forgiving_relative_selector_list(&components);
        assert_eq!(selector.entries.len(), 2);
        assert_eq!(
            selector.entries[0].entries[0].combinator,
            Combinator::Child
        );
        assert_eq!(
            selector.entries[1].entries[0].combinator,
            Combinator::SubsequentSibling
        );
    }

    #[test]
    fn specificity_of_parsed_selectors() {
        assert_eq!(
            parse("path.withColor").entries[0].specificity(),
            Abc { a: 0, b: 1, c: 1 }
        );
        assert_eq!(
            parse("g > :nth-child(2n of path)").entries[0].specificity(),
            Abc { a: 0, b: 1, c: 2 }
        );
        assert_eq!(
            parse("#a #b.c").entries[0].specificity(),
            Abc { a: 2, b: 1, c: 0 }
        );
    }

    #[test]
    fn whitespace_descendant_vs_list() {
        // "one two" is one complex selector with a descendant combinator;
        // "one , two" is two complex selectors.
        let selector = parse("one two");
        assert_eq!(selector.entries.len(), 1);
        assert_eq!(selector.entries[0].entries.len(), 2);

        let selector = parse("one , two");
        assert_eq!(selector.entries.len(), 2);
    }
}
