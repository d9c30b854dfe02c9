//! This module contains functions for parsing CSS/SCSS into the owned
//! syntax tree defined in `crate::ast`.
//!
//! It uses the `cssparser` tokenizer, which tracks exact source locations,
//! so every rule, declaration, and dimension carries the position that later
//! shows up in diagnostics. Parse errors never abort the run: the offending
//! rule or declaration is skipped with a warning and parsing resumes.

use crate::ast::{
    Declaration, Dimension, Position, Selector, SimpleSelector, StyleRule, Stylesheet, Value,
    ValueComponent,
};
use crate::error::Result;
use cssparser::{
    Delimiter, ParseError as CssParseError, Parser, ParserInput, SourceLocation, Token,
};

/// Parse a stylesheet string into a `Stylesheet` tree.
///
/// Rules that fail to parse are skipped with a warning logged; the function
/// itself only fails for catastrophic errors (currently never).
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let rules = parse_rule_list(&mut parser);
    Ok(Stylesheet { rules })
}

/// `cssparser` lines are 0-based; diagnostics use 1-based lines.
fn pos(loc: SourceLocation) -> Position {
    Position::new(loc.line + 1, loc.column)
}

/// Parse a sequence of rules. At-rules with a block (`@media` and friends)
/// are flattened into their inner style rules; other at-rules are skipped.
fn parse_rule_list(parser: &mut Parser<'_, '_>) -> Vec<StyleRule> {
    let mut rules = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let start = parser.state();
        let token = match parser.next() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        if let Token::Delim('$') = token {
            // top-level SCSS variable assignment, not a rule
            let _ = parser.parse_until_after(Delimiter::Semicolon, |p| {
                while p.next().is_ok() {}
                Ok::<_, CssParseError<'_, ()>>(())
            });
            continue;
        }

        if let Token::AtKeyword(name) = token {
            log::debug!("flattening at-rule @{}", name);
            scan_until_delimiter(parser, Delimiter::Semicolon | Delimiter::CurlyBracketBlock);
            match parser.next() {
                Ok(Token::CurlyBracketBlock) => {
                    let inner = parser
                        .parse_nested_block(|p| Ok::<_, CssParseError<'_, ()>>(parse_rule_list(p)));
                    if let Ok(inner) = inner {
                        rules.extend(inner);
                    }
                }
                _ => {} // block-less at-rule, nothing to keep
            }
            continue;
        }

        parser.reset(&start);
        match parse_rule(parser) {
            Ok(rule) => rules.push(rule),
            Err(e) => {
                log::warn!("stylesheet parse error: {}", e);
                skip_to_next_rule(parser);
            }
        }
    }

    rules
}

/// Parse a single rule: `selector-group { block }`.
fn parse_rule(parser: &mut Parser<'_, '_>) -> Result<StyleRule> {
    parser.skip_whitespace();
    let rule_loc = parser.current_source_location();

    let selectors = parser
        .parse_until_before(Delimiter::CurlyBracketBlock, |p| parse_selector_group(p))
        .map_err(|e: CssParseError<'_, ()>| {
            crate::Error::parse(
                format!("failed to parse selector: {:?}", e),
                rule_loc.line + 1,
                rule_loc.column,
            )
        })?;

    let block_loc = parser.current_source_location();
    match parser.next() {
        Ok(Token::CurlyBracketBlock) => {
            let (declarations, nested) = parser
                .parse_nested_block(|p| Ok::<_, CssParseError<'_, ()>>(parse_block(p)))
                .map_err(|e| {
                    crate::Error::parse(
                        format!("failed to parse declaration block: {:?}", e),
                        block_loc.line + 1,
                        block_loc.column,
                    )
                })?;
            Ok(StyleRule {
                selectors,
                declarations,
                nested,
                position: pos(rule_loc),
                block_position: pos(block_loc),
            })
        }
        _ => Err(crate::Error::parse(
            "expected '{' after selector",
            block_loc.line + 1,
            block_loc.column,
        )),
    }
}

/// Parse a comma-separated selector group. Combinators and attribute
/// conditions are consumed but not retained; the lint rules only care about
/// the simple-selector components.
fn parse_selector_group<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<Vec<Selector>, CssParseError<'i, ()>> {
    let mut group = Vec::new();
    let mut current = Selector::default();

    loop {
        let token = match parser.next() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        match token {
            Token::Comma => {
                if !current.parts.is_empty() {
                    group.push(std::mem::take(&mut current));
                }
            }
            Token::Ident(name) => {
                current.parts.push(SimpleSelector::Type(name.to_string()));
            }
            Token::Delim('.') => {
                let class = parser.expect_ident()?;
                current.parts.push(SimpleSelector::Class(class.to_string()));
            }
            Token::Delim('*') => {
                current.parts.push(SimpleSelector::Universal);
            }
            Token::Delim('&') => {
                current.parts.push(SimpleSelector::Parent);
            }
            Token::IDHash(id) | Token::Hash(id) => {
                current.parts.push(SimpleSelector::Id(id.to_string()));
            }
            Token::Colon => {
                let state = parser.state();
                let next = parser.next().map(|t| t.clone());
                match next {
                    Ok(Token::Colon) => {
                        let name = parser.expect_ident()?;
                        current
                            .parts
                            .push(SimpleSelector::PseudoElement(name.to_string()));
                    }
                    Ok(Token::Ident(name)) => {
                        current
                            .parts
                            .push(SimpleSelector::PseudoClass(name.to_string()));
                    }
                    Ok(Token::Function(name)) => {
                        // functional pseudo like :not(...) or :nth-child(...);
                        // record the name, drop the argument
                        let name = name.to_string();
                        parser.parse_nested_block(|p| {
                            while p.next().is_ok() {}
                            Ok::<_, CssParseError<'_, ()>>(())
                        })?;
                        current.parts.push(SimpleSelector::PseudoClass(name));
                    }
                    _ => {
                        parser.reset(&state);
                    }
                }
            }
            Token::SquareBracketBlock => {
                // attribute condition, irrelevant to the lint rules
                parser.parse_nested_block(|p| {
                    while p.next().is_ok() {}
                    Ok::<_, CssParseError<'_, ()>>(())
                })?;
            }
            // combinators are not retained
            Token::Delim('>') | Token::Delim('+') | Token::Delim('~') => {}
            Token::Delim('%') => {
                // SCSS placeholder selector, keep the name as a type
                let name = parser.expect_ident()?;
                current.parts.push(SimpleSelector::Type(name.to_string()));
            }
            _ => {}
        }
    }

    if !current.parts.is_empty() {
        group.push(current);
    }
    Ok(group)
}

/// Parse the contents of a declaration block: declarations plus any nested
/// (SCSS-style) rules.
fn parse_block(parser: &mut Parser<'_, '_>) -> (Vec<Declaration>, Vec<StyleRule>) {
    let mut declarations = Vec::new();
    let mut nested = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        // Look ahead to the chunk terminator: `{` means a nested rule,
        // `;` (or end of block) means a declaration.
        let start = parser.state();
        scan_until_delimiter(parser, Delimiter::Semicolon | Delimiter::CurlyBracketBlock);
        let next_is_block = matches!(parser.next(), Ok(Token::CurlyBracketBlock));
        parser.reset(&start);

        if next_is_block {
            match parse_rule(parser) {
                Ok(rule) => nested.push(rule),
                Err(e) => {
                    log::warn!("stylesheet parse error: {}", e);
                    skip_to_next_rule(parser);
                }
            }
        } else {
            match parser.parse_until_after(Delimiter::Semicolon, |p| parse_declaration(p)) {
                Ok(Some(decl)) => declarations.push(decl),
                Ok(None) => {}
                Err(e) => {
                    log::debug!("skipping unparsable declaration: {:?}", e);
                }
            }
        }
    }

    (declarations, nested)
}

/// Parse one `property: value` declaration. Returns `Ok(None)` for empty
/// chunks (stray semicolons) and SCSS variable assignments.
fn parse_declaration<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<Option<Declaration>, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    if parser.is_exhausted() {
        return Ok(None);
    }

    let decl_loc = parser.current_source_location();
    let property = match parser.next()?.clone() {
        Token::Ident(name) => name.to_string().to_lowercase(),
        Token::Delim('$') => {
            // `$var: value;` — SCSS variable assignment, not a declaration
            while parser.next().is_ok() {}
            return Ok(None);
        }
        _ => return Err(parser.new_custom_error(())),
    };
    parser.expect_colon()?;
    let value = parse_value(parser)?;

    Ok(Some(Declaration {
        property,
        value,
        position: pos(decl_loc),
    }))
}

/// Parse the value expression of a declaration into its components.
fn parse_value<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<Value, CssParseError<'i, ()>> {
    let mut components = Vec::new();

    loop {
        parser.skip_whitespace();
        let loc = parser.current_source_location();
        let token = match parser.next() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        let component = match token {
            Token::Number { value, .. } => ValueComponent::Number(value),
            Token::Percentage { unit_value, .. } => ValueComponent::Percentage(unit_value * 100.0),
            Token::Dimension { value, unit, .. } => ValueComponent::Dimension(Dimension {
                value,
                unit: unit.to_string(),
                position: pos(loc),
            }),
            Token::Hash(hash) | Token::IDHash(hash) => ValueComponent::HexColor(hash.to_string()),
            Token::Ident(name) => ValueComponent::Ident(name.to_string()),
            Token::QuotedString(text) => ValueComponent::QuotedString(text.to_string()),
            Token::Delim('$') => match parser.expect_ident() {
                Ok(name) => ValueComponent::Variable(name.to_string()),
                Err(_) => continue,
            },
            Token::Function(name) => {
                let name = name.to_string();
                let args = parser.parse_nested_block(|p| parse_value_components(p))?;
                ValueComponent::Function { name, args }
            }
            Token::Delim('!') => {
                // `!important` is not part of the value expression
                let _ = parser.try_parse(|p| p.expect_ident().map(|_| ()));
                continue;
            }
            _ => continue,
        };
        components.push(component);
    }

    Ok(Value::new(components))
}

/// Parse function-call arguments; commas separate but are not retained.
fn parse_value_components<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<Vec<ValueComponent>, CssParseError<'i, ()>> {
    let mut args = Vec::new();

    loop {
        parser.skip_whitespace();
        let loc = parser.current_source_location();
        let token = match parser.next() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        let arg = match token {
            Token::Number { value, .. } => ValueComponent::Number(value),
            Token::Percentage { unit_value, .. } => ValueComponent::Percentage(unit_value * 100.0),
            Token::Dimension { value, unit, .. } => ValueComponent::Dimension(Dimension {
                value,
                unit: unit.to_string(),
                position: pos(loc),
            }),
            Token::Hash(hash) | Token::IDHash(hash) => ValueComponent::HexColor(hash.to_string()),
            Token::Ident(name) => ValueComponent::Ident(name.to_string()),
            Token::QuotedString(text) => ValueComponent::QuotedString(text.to_string()),
            Token::Delim('$') => match parser.expect_ident() {
                Ok(name) => ValueComponent::Variable(name.to_string()),
                Err(_) => continue,
            },
            Token::Function(name) => {
                let name = name.to_string();
                let inner = parser.parse_nested_block(|p| parse_value_components(p))?;
                ValueComponent::Function { name, args: inner }
            }
            Token::Comma => continue,
            _ => continue,
        };
        args.push(arg);
    }

    Ok(args)
}

/// Consume tokens up to (but not including) one of the given delimiters.
fn scan_until_delimiter(parser: &mut Parser<'_, '_>, delimiters: cssparser::Delimiters) {
    let _ = parser.parse_until_before(delimiters, |p| {
        while p.next().is_ok() {}
        Ok::<_, CssParseError<'_, ()>>(())
    });
}

/// Skip to the next rule (error recovery).
fn skip_to_next_rule(parser: &mut Parser<'_, '_>) {
    loop {
        match parser.next() {
            Ok(Token::CurlyBracketBlock) => {
                let _ = parser.parse_nested_block(|p| {
                    while !p.is_exhausted() {
                        let _ = p.next();
                    }
                    Ok::<_, CssParseError<'_, ()>>(())
                });
                return;
            }
            Ok(Token::Semicolon) => return,
            Err(_) => return,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_simple_rule() {
        let sheet = parse_stylesheet("div { color: red; }").unwrap();
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(
            rule.selectors[0].parts,
            vec![SimpleSelector::Type("div".to_string())]
        );
        assert_eq!(rule.declarations.len(), 1);
        assert_eq!(rule.declarations[0].property, "color");
        assert_eq!(rule.declarations[0].value.to_css_string(), "red");
    }

    #[test]
    fn parse_comma_group_shares_block() {
        let sheet = parse_stylesheet("a:hover, b:focus { color: #fff; }").unwrap();
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.selectors.len(), 2);
        assert!(rule.selectors[0]
            .parts
            .contains(&SimpleSelector::PseudoClass("hover".to_string())));
        assert!(rule.selectors[1]
            .parts
            .contains(&SimpleSelector::PseudoClass("focus".to_string())));
    }

    #[test]
    fn parse_pseudo_element_double_colon() {
        let sheet = parse_stylesheet("p::before { content: \"x\"; }").unwrap();
        assert!(sheet.rules[0].selectors[0]
            .parts
            .contains(&SimpleSelector::PseudoElement("before".to_string())));
    }

    #[test]
    fn parse_positions_are_one_based() {
        let sheet = parse_stylesheet("div {\n  color: red;\n}").unwrap();
        let rule = &sheet.rules[0];
        assert_eq!(rule.position, Position::new(1, 1));
        assert_eq!(rule.block_position, Position::new(1, 5));
        assert_eq!(rule.declarations[0].position, Position::new(2, 3));
    }

    #[test]
    fn parse_dimension_with_position() {
        let sheet = parse_stylesheet("div { font-size: 12px; }").unwrap();
        let dims: Vec<_> = sheet.rules[0].declarations[0].value.dimensions().collect();
        assert_eq!(dims.len(), 1);
        assert_eq!(dims[0].value, 12.0);
        assert_eq!(dims[0].unit, "px");
        assert_eq!(dims[0].position, Position::new(1, 18));
    }

    #[test]
    fn parse_hex_color_in_value() {
        let sheet = parse_stylesheet("div { color: #aabbcc; }").unwrap();
        assert_eq!(
            sheet.rules[0].declarations[0].value.first(),
            Some(&ValueComponent::HexColor("aabbcc".to_string()))
        );
    }

    #[test]
    fn parse_function_value() {
        let sheet = parse_stylesheet("div { color: rgb(10, 20, 30); }").unwrap();
        match sheet.rules[0].declarations[0].value.first() {
            Some(ValueComponent::Function { name, args }) => {
                assert_eq!(name, "rgb");
                assert_eq!(args.len(), 3);
            }
            other => panic!("expected function component, got {:?}", other),
        }
    }

    #[test]
    fn parse_nested_rules() {
        let sheet = parse_stylesheet("nav { color: #000; a { color: #111; } }").unwrap();
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.declarations.len(), 1);
        assert_eq!(rule.nested.len(), 1);
        assert_eq!(rule.nested[0].declarations[0].property, "color");
    }

    #[test]
    fn parse_scss_parent_selector() {
        let sheet = parse_stylesheet("a { &:hover { color: red; } }").unwrap();
        let nested = &sheet.rules[0].nested[0];
        assert_eq!(
            nested.selectors[0].parts,
            vec![
                SimpleSelector::Parent,
                SimpleSelector::PseudoClass("hover".to_string()),
            ]
        );
    }

    #[test]
    fn parse_scss_variables() {
        let sheet = parse_stylesheet("$base: 10px;\ndiv { margin: $base; }").unwrap();
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(
            sheet.rules[0].declarations[0].value.first(),
            Some(&ValueComponent::Variable("base".to_string()))
        );
    }

    #[test]
    fn parse_media_block_is_flattened() {
        let sheet =
            parse_stylesheet("@media screen { div { color: red; } }\np { color: blue; }").unwrap();
        assert_eq!(sheet.rules.len(), 2);
    }

    #[test]
    fn parse_recovers_after_bad_rule() {
        let sheet = parse_stylesheet("} garbage {{ div { color: red; }").unwrap();
        // recovery may eat the garbage, but must not panic or loop
        assert!(sheet.rules.len() <= 1);
    }

    #[test]
    fn parse_important_is_dropped_from_value() {
        let sheet = parse_stylesheet("div { display: none !important; }").unwrap();
        assert_eq!(
            sheet.rules[0].declarations[0].value.to_css_string(),
            "none"
        );
    }
}
