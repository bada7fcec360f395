//! Declarations and declaration-list parsing.

use crate::css::component_value::{
    parse_list_of_component_values, BlockKind, ComponentValue, WhitespaceHandling,
};
use crate::css::rule::AtRule;
use crate::css::token::TokenKind;
use crate::rcstring::RcString;

/// A CSS name/value pair, such as `fill: red`.
///
/// The tokens for a trailing `!important` are not part of `values`; they only
/// set the `important` flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: RcString,
    pub values: Vec<ComponentValue>,
    pub source_offset: usize,
    pub important: bool,
}

/// An item of a declaration list: declaration lists may also contain at-rules,
/// and invalid chunks are reported so callers can warn about them.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationListItem {
    Declaration(Declaration),
    AtRule(AtRule),
    /// A chunk that did not parse as either; skipped up to the next `;`.
    Invalid,
}

/// Parser for `style=""` attributes and rule bodies.
pub struct DeclarationListParser;

impl DeclarationListParser {
    /// Parses a declaration list from raw text (e.g. a style attribute),
    /// returning declarations and at-rules in order.
    pub fn parse(input: &str) -> Vec<DeclarationListItem> {
        let components = parse_list_of_component_values(input, WhitespaceHandling::Keep);
        consume_list_of_declarations(&components)
    }

    /// Like [`DeclarationListParser::parse`], but keeps only the declarations.
    /// This is what rule blocks use.
    pub fn parse_declarations_only(components: &[ComponentValue]) -> Vec<Declaration> {
        consume_list_of_declarations(components)
            .into_iter()
            .filter_map(|item| match item {
                DeclarationListItem::Declaration(declaration) => Some(declaration),
                _ => None,
            })
            .collect()
    }
}

/// Consume a list of declarations, per
/// <https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations>.
fn consume_list_of_declarations(components: &[ComponentValue]) -> Vec<DeclarationListItem> {
    let mut result = Vec::new();
    let mut rest = components;

    loop {
        match rest.first() {
            None => break,

            Some(component) if component.is_whitespace() => {
                rest = &rest[1..];
            }

            Some(ComponentValue::Token(token))
                if matches!(token.kind, TokenKind::Semicolon) =>
            {
                rest = &rest[1..];
            }

            Some(ComponentValue::Token(token))
                if matches!(token.kind, TokenKind::AtKeyword(_)) =>
            {
                let (at_rule, remaining) = consume_at_rule_components(rest);
                result.push(DeclarationListItem::AtRule(at_rule));
                rest = remaining;
            }

            Some(ComponentValue::Token(token)) if matches!(token.kind, TokenKind::Ident(_)) => {
                let (chunk, remaining) = split_at_semicolon(rest);
                rest = remaining;
                match consume_declaration(chunk) {
                    Some(declaration) => {
                        result.push(DeclarationListItem::Declaration(declaration))
                    }
                    None => result.push(DeclarationListItem::Invalid),
                }
            }

            Some(_) => {
                // Parse error: discard everything up to the next semicolon.
                let (_, remaining) = split_at_semicolon(rest);
                rest = remaining;
                result.push(DeclarationListItem::Invalid);
            }
        }
    }

    result
}

/// Splits off the components before the next top-level `;`.  The semicolon
/// itself is consumed but returned with neither half.
fn split_at_semicolon(components: &[ComponentValue]) -> (&[ComponentValue], &[ComponentValue]) {
    for (i, component) in components.iter().enumerate() {
        if let ComponentValue::Token(token) = component {
            if matches!(token.kind, TokenKind::Semicolon) {
                return (&components[..i], &components[i + 1..]);
            }
        }
    }

    (components, &[])
}

/// Consumes an at-rule that appears inside a declaration list.  The prelude
/// runs to the first `;` or `{}` block.
fn consume_at_rule_components(components: &[ComponentValue]) -> (AtRule, &[ComponentValue]) {
    let name = match components.first() {
        Some(ComponentValue::Token(token)) => match &token.kind {
            TokenKind::AtKeyword(name) => name.clone(),
            _ => unreachable!("caller checked for an at-keyword"),
        },
        _ => unreachable!("caller checked for an at-keyword"),
    };

    let mut prelude = Vec::new();
    let mut rest = &components[1..];

    loop {
        match rest.first() {
            None => {
                return (
                    AtRule {
                        name,
                        prelude,
                        block: None,
                    },
                    rest,
                );
            }

            Some(ComponentValue::Token(token))
                if matches!(token.kind, TokenKind::Semicolon) =>
            {
                return (
                    AtRule {
                        name,
                        prelude,
                        block: None,
                    },
                    &rest[1..],
                );
            }

            Some(ComponentValue::Block(block)) if block.kind == BlockKind::Curly => {
                return (
                    AtRule {
                        name,
                        prelude,
                        block: Some(block.clone()),
                    },
                    &rest[1..],
                );
            }

            Some(component) => {
                prelude.push(component.clone());
                rest = &rest[1..];
            }
        }
    }
}

/// Consume a declaration, per
/// <https://www.w3.org/TR/css-syntax-3/#consume-declaration>.
///
/// `components` holds the ident and everything up to (not including) the
/// terminating semicolon.
fn consume_declaration(components: &[ComponentValue]) -> Option<Declaration> {
    let (name, source_offset) = match components.first() {
        Some(ComponentValue::Token(token)) => match &token.kind {
            TokenKind::Ident(name) => (name.clone(), token.offset),
            _ => return None,
        },
        _ => return None,
    };

    // Skip whitespace, then require a colon.
    let mut rest = &components[1..];
    while rest.first().map(|c| c.is_whitespace()).unwrap_or(false) {
        rest = &rest[1..];
    }
    match rest.first() {
        Some(ComponentValue::Token(token)) if matches!(token.kind, TokenKind::Colon) => {
            rest = &rest[1..];
        }
        _ => return None,
    }

    let mut declaration = Declaration {
        name,
        values: Vec::new(),
        source_offset,
        important: false,
    };

    // Collect the value while tracking a possible trailing `! important`,
    // which must be stripped from the value list along with any whitespace
    // around it.
    let mut last_was_important_bang = false;
    let mut hit_non_whitespace = false;
    let mut trailing_whitespace = 0;

    for component in rest {
        if component.is_whitespace() {
            if hit_non_whitespace {
                declaration.values.push(component.clone());
                trailing_whitespace += 1;
            }
            continue;
        }

        hit_non_whitespace = true;

        if let ComponentValue::Token(token) = component {
            let is_important_ident = matches!(&token.kind, TokenKind::Ident(name)
                if name.equals_lowercase("important"));

            if last_was_important_bang && is_important_ident {
                declaration.important = true;
                last_was_important_bang = false;
            } else {
                last_was_important_bang = token.is_delim('!');
                if !last_was_important_bang || declaration.important {
                    trailing_whitespace = 0;
                }
                declaration.important = false;
            }
        } else {
            last_was_important_bang = false;
            declaration.important = false;
            trailing_whitespace = 0;
        }

        declaration.values.push(component.clone());
    }

    if declaration.important {
        debug_assert!(declaration.values.len() >= 2);
        declaration.values.pop();
        declaration.values.pop();
    }

    for _ in 0..trailing_whitespace {
        declaration.values.pop();
    }

    Some(declaration)
}
