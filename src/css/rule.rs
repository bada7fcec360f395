//! Rule-level parsing: stylesheets, qualified rules, and at-rules.

use crate::css::component_value::{
    consume_component_value, consume_simple_block, BlockKind, ComponentValue, ParsingDepth,
    SimpleBlock,
};
use crate::css::token::{Token, TokenKind};
use crate::css::tokenizer::Tokenizer;
use crate::rcstring::RcString;

/// A rule with a selector-ish prelude and a `{}` block.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedRule {
    pub prelude: Vec<ComponentValue>,
    pub block: SimpleBlock,
}

/// An `@name prelude;` or `@name prelude { ... }` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: RcString,
    pub prelude: Vec<ComponentValue>,
    pub block: Option<SimpleBlock>,
}

/// Why a rule was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidRuleKind {
    /// The rule did not parse.
    Invalid,
    /// A single-rule parse had trailing input after the rule.
    ExtraInput,
}

/// Placeholder for a rule that failed to parse; surrounding rules still parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRule {
    pub kind: InvalidRuleKind,
}

impl InvalidRule {
    fn invalid() -> InvalidRule {
        InvalidRule {
            kind: InvalidRuleKind::Invalid,
        }
    }
}

/// Any rule in a stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Qualified(QualifiedRule),
    At(AtRule),
    Invalid(InvalidRule),
}

#[derive(PartialEq)]
enum ListOfRulesFlags {
    None,
    TopLevel,
}

/// Parser for rule lists and single rules.
pub struct RuleParser;

impl RuleParser {
    /// Parses a stylesheet's rules.  A leading `@charset "...";` is removed
    /// first, per the fallback-encoding rules; any other `@charset` becomes an
    /// invalid rule.
    pub fn parse_stylesheet(input: &str) -> Vec<Rule> {
        let input = maybe_remove_charset(input);
        consume_list_of_rules(&mut Tokenizer::new(input), ListOfRulesFlags::TopLevel)
    }

    /// Parses a list of rules without the top-level flag: CDO/CDC start
    /// qualified rules instead of being skipped.
    pub fn parse_list_of_rules(input: &str) -> Vec<Rule> {
        let input = maybe_remove_charset(input);
        consume_list_of_rules(&mut Tokenizer::new(input), ListOfRulesFlags::None)
    }

    /// Parses exactly one rule; trailing input yields
    /// [`InvalidRuleKind::ExtraInput`], and an empty input yields `None`.
    pub fn parse_rule(input: &str) -> Option<Rule> {
        let mut tokenizer = Tokenizer::new(input);

        let result = loop {
            let token = tokenizer.next();
            match token.kind {
                TokenKind::Whitespace(_) => continue,
                TokenKind::Eof => return None,
                TokenKind::AtKeyword(name) => {
                    let at_rule = consume_at_rule(&mut tokenizer, name);
                    if at_rule.name.equals_lowercase("charset") {
                        return Some(Rule::Invalid(InvalidRule::invalid()));
                    }
                    break Rule::At(at_rule);
                }
                _ => match consume_qualified_rule(&mut tokenizer, token) {
                    Some(rule) => break Rule::Qualified(rule),
                    None => return Some(Rule::Invalid(InvalidRule::invalid())),
                },
            }
        };

        loop {
            let token = tokenizer.next();
            match token.kind {
                TokenKind::Whitespace(_) => continue,
                TokenKind::Eof => return Some(result),
                _ => {
                    return Some(Rule::Invalid(InvalidRule {
                        kind: InvalidRuleKind::ExtraInput,
                    }))
                }
            }
        }
    }
}

/// Removes a leading `@charset "...";` per
/// <https://www.w3.org/TR/css-syntax-3/#determine-the-fallback-encoding>.
fn maybe_remove_charset(input: &str) -> &str {
    const CHARSET_START: &str = "@charset \"";

    if !input.starts_with(CHARSET_START) {
        return input;
    }

    let bytes = input.as_bytes();
    let charset_region = input.len().min(1024);
    let mut i = CHARSET_START.len();
    while i < charset_region {
        if input[i..].starts_with("\";") {
            return &input[i + 2..];
        } else if bytes[i] == 0x22 || bytes[i] > 0x7f {
            break;
        }
        i += 1;
    }

    input
}

/// Consume a list of rules, per
/// <https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules>.
fn consume_list_of_rules(tokenizer: &mut Tokenizer<'_>, flags: ListOfRulesFlags) -> Vec<Rule> {
    let mut result = Vec::new();

    loop {
        let token = tokenizer.next();
        match token.kind {
            TokenKind::Whitespace(_) => continue,
            TokenKind::Eof => break,

            TokenKind::Cdo | TokenKind::Cdc => {
                if flags == ListOfRulesFlags::TopLevel {
                    continue;
                }
                match consume_qualified_rule(tokenizer, token) {
                    Some(rule) => result.push(Rule::Qualified(rule)),
                    None => result.push(Rule::Invalid(InvalidRule::invalid())),
                }
            }

            TokenKind::AtKeyword(name) => {
                let at_rule = consume_at_rule(tokenizer, name);

                // @charset is valid only as the leading bytes of the source,
                // which were already stripped.
                if at_rule.name.equals_lowercase("charset") {
                    result.push(Rule::Invalid(InvalidRule::invalid()));
                } else {
                    result.push(Rule::At(at_rule));
                }
            }

            _ => match consume_qualified_rule(tokenizer, token) {
                Some(rule) => result.push(Rule::Qualified(rule)),
                None => result.push(Rule::Invalid(InvalidRule::invalid())),
            },
        }
    }

    result
}

/// Consume an at-rule, per
/// <https://www.w3.org/TR/css-syntax-3/#consume-at-rule>.
pub(crate) fn consume_at_rule(tokenizer: &mut Tokenizer<'_>, name: RcString) -> AtRule {
    let mut result = AtRule {
        name,
        prelude: Vec::new(),
        block: None,
    };
    let mut depth = ParsingDepth::default();

    loop {
        let token = tokenizer.next();
        match token.kind {
            TokenKind::Semicolon => return result,
            TokenKind::CurlyOpen => {
                result.block = Some(consume_simple_block(
                    tokenizer,
                    BlockKind::Curly,
                    token.offset,
                    &mut depth,
                ));
                return result;
            }
            // EOF here is a parse error; return the rule as collected.
            TokenKind::Eof => return result,
            _ => {
                result
                    .prelude
                    .push(consume_component_value(tokenizer, token, &mut depth));
            }
        }
    }
}

/// Consume a qualified rule, per
/// <https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule>.
///
/// EOF before the block is a parse error and returns `None`.
fn consume_qualified_rule(
    tokenizer: &mut Tokenizer<'_>,
    first_token: Token,
) -> Option<QualifiedRule> {
    let mut prelude = Vec::new();
    let mut depth = ParsingDepth::default();
    let mut token = first_token;

    loop {
        match token.kind {
            TokenKind::Eof => return None,
            TokenKind::CurlyOpen => {
                let block =
                    consume_simple_block(tokenizer, BlockKind::Curly, token.offset, &mut depth);
                return Some(QualifiedRule { prelude, block });
            }
            _ => {
                prelude.push(consume_component_value(tokenizer, token, &mut depth));
            }
        }

        token = tokenizer.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_stylesheet() {
        let rules = RuleParser::parse_stylesheet("foo { fill: red; } .bar {}");
        assert_eq!(rules.len(), 2);

        match &rules[0] {
            Rule::Qualified(rule) => {
                // "foo" plus trailing whitespace.
                assert_eq!(rule.prelude.len(), 2);
                assert_eq!(rule.prelude[0].as_ident().unwrap().as_str(), "foo");
                assert!(!rule.block.values.is_empty());
            }
            other => panic!("unexpected rule {other:?}"),
        }

        assert!(matches!(rules[1], Rule::Qualified(_)));
    }

    #[test]
    fn at_rule_with_and_without_block() {
        let rules = RuleParser::parse_stylesheet("@import url(foo.css); @media screen { a {} }");
        assert_eq!(rules.len(), 2);

        match &rules[0] {
            Rule::At(rule) => {
                assert_eq!(rule.name.as_str(), "import");
                assert!(rule.block.is_none());
                assert!(!rule.prelude.is_empty());
            }
            other => panic!("unexpected rule {other:?}"),
        }

        match &rules[1] {
            Rule::At(rule) => {
                assert_eq!(rule.name.as_str(), "media");
                assert!(rule.block.is_some());
            }
            other => panic!("unexpected rule {other:?}"),
        }
    }

    #[test]
    fn strips_leading_charset() {
        let rules = RuleParser::parse_stylesheet("@charset \"utf-8\";a{}");
        assert_eq!(rules.len(), 1);
        assert!(matches!(rules[0], Rule::Qualified(_)));
    }

    #[test]
    fn charset_elsewhere_is_invalid() {
        let rules = RuleParser::parse_stylesheet("a{} @charset \"utf-8\";");
        assert_eq!(rules.len(), 2);
        assert!(matches!(
            rules[1],
            Rule::Invalid(InvalidRule {
                kind: InvalidRuleKind::Invalid
            })
        ));
    }

    #[test]
    fn cdo_cdc_skipped_at_top_level_only() {
        let rules = RuleParser::parse_stylesheet("<!-- a{} -->");
        assert_eq!(rules.len(), 1);
        assert!(matches!(rules[0], Rule::Qualified(_)));

        // Not at top level, CDO starts a (garbage) qualified rule that eats
        // up to the next block.
        let rules = RuleParser::parse_list_of_rules("<!-- a{} -->");
        assert_eq!(rules.len(), 2);
        assert!(matches!(rules[0], Rule::Qualified(_)));
        assert!(matches!(rules[1], Rule::Invalid(_)));
    }

    #[test]
    fn eof_before_block_drops_the_rule() {
        let rules = RuleParser::parse_stylesheet("a{} b.c ");
        assert_eq!(rules.len(), 2);
        assert!(matches!(rules[0], Rule::Qualified(_)));
        assert!(matches!(
            rules[1],
            Rule::Invalid(InvalidRule {
                kind: InvalidRuleKind::Invalid
            })
        ));
    }

    #[test]
    fn parse_rule_rejects_trailing_input() {
        assert!(matches!(
            RuleParser::parse_rule("a {}"),
            Some(Rule::Qualified(_))
        ));
        assert!(matches!(
            RuleParser::parse_rule("a {} b {}"),
            Some(Rule::Invalid(InvalidRule {
                kind: InvalidRuleKind::ExtraInput
            }))
        ));
        assert_eq!(RuleParser::parse_rule("   "), None);
    }
}
