// crates/plugin-config-parser/src/syntax/parser.rs
// ============================================================================
// Module: Block Syntax Parser
// Description: Recursive-descent parser for bodies and expressions.
// Purpose: Build a schema-agnostic tree while recovering from errors.
// Dependencies: crate::syntax::{ast, lexer, template}, plugin-config-core
// ============================================================================

//! ## Overview
//! Bodies are newline-delimited: each line holds one attribute or opens one
//! block. When a line fails to parse, the error is recorded and the parser
//! resumes at the next line of the same body, so a single pass reports every
//! malformed line. Expressions use conventional precedence (`*` and `/` bind
//! tighter than `+` and `-`) and ignore newlines inside brackets.
//! Invariants:
//! - Block and expression nesting never exceeds the configured maximum.
//! - An attribute name appears at most once per body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use plugin_config_core::DynamicValue;
use plugin_config_core::parse_decimal;

use super::ast::Attribute;
use super::ast::BinaryOp;
use super::ast::Block;
use super::ast::Body;
use super::ast::BodyItem;
use super::ast::Expr;
use super::lexer::Lexer;
use super::lexer::SpannedToken;
use super::lexer::SyntaxError;
use super::lexer::Token;
use super::template::Escapes;
use super::template::parse_template;
use crate::diagnostics::Position;

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Parses a complete body, returning the recovered tree and every error found.
pub(crate) fn parse_body(input: &str, max_nesting: usize) -> (Body, Vec<SyntaxError>) {
    let (tokens, mut errors) = Lexer::new(input, Position::START).lex();
    let mut parser = Parser::new(tokens, 0, max_nesting);
    let body = parser.parse_body(false);
    errors.append(&mut parser.errors);
    errors.sort_by_key(|error| error.position);
    (body, errors)
}

/// Parses a standalone expression such as the inside of `${...}`.
///
/// `depth` is the nesting already consumed by the enclosing expression.
pub(crate) fn parse_expression(
    input: &str,
    origin: Position,
    depth: usize,
    max_nesting: usize,
) -> Result<Expr, SyntaxError> {
    let (tokens, errors) = Lexer::new(input, origin).lex();
    if let Some(error) = errors.into_iter().next() {
        return Err(error);
    }
    let tokens = tokens.into_iter().filter(|token| token.token != Token::Newline).collect();
    let mut parser = Parser::new(tokens, depth, max_nesting);
    let expr = parser.parse_expr()?;
    let trailing = parser.peek();
    if trailing.token != Token::Eof {
        return Err(SyntaxError {
            message: format!("unexpected `{}` after expression", trailing.token.describe()),
            position: trailing.position,
        });
    }
    Ok(expr)
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Recursive-descent parser over a token list.
struct Parser<'a> {
    /// Token stream; always terminated by [`Token::Eof`].
    tokens: Vec<SpannedToken<'a>>,
    /// Index of the next token.
    index: usize,
    /// Current nesting depth.
    depth: usize,
    /// Maximum nesting depth.
    max_nesting: usize,
    /// Errors recorded during recovery.
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    /// Creates a parser starting at the given depth.
    const fn new(tokens: Vec<SpannedToken<'a>>, depth: usize, max_nesting: usize) -> Self {
        Self {
            tokens,
            index: 0,
            depth,
            max_nesting,
            errors: Vec::new(),
        }
    }

    /// Returns the next token without consuming it.
    fn peek(&self) -> SpannedToken<'a> {
        self.tokens.get(self.index).or_else(|| self.tokens.last()).copied().unwrap_or(
            SpannedToken {
                token: Token::Eof,
                position: Position::START,
            },
        )
    }

    /// Consumes and returns the next token.
    fn advance(&mut self) -> SpannedToken<'a> {
        let token = self.peek();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    /// Consumes the next token when it equals `token`.
    fn matches(&mut self, token: Token<'_>) -> bool {
        if self.peek().token == token {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes `token` or fails with a positioned error.
    fn expect(&mut self, token: Token<'_>) -> Result<(), SyntaxError> {
        if self.matches(token) {
            return Ok(());
        }
        let found = self.peek();
        Err(SyntaxError {
            message: format!("expected `{}`, found `{}`", token.describe(), found.token.describe()),
            position: found.position,
        })
    }

    /// Skips newline tokens.
    fn skip_newlines(&mut self) {
        while self.matches(Token::Newline) {}
    }

    /// Enters one nesting level, failing when the limit is exceeded.
    fn descend(&mut self, position: Position) -> Result<(), SyntaxError> {
        if self.depth >= self.max_nesting {
            return Err(SyntaxError {
                message: format!("nesting exceeds the limit of {}", self.max_nesting),
                position,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Runs `f` one nesting level deeper, failing when the limit is exceeded.
    fn with_nesting<T>(
        &mut self,
        position: Position,
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        let depth = self.depth;
        self.descend(position)?;
        let result = f(self);
        self.depth = depth;
        result
    }

    // ------------------------------------------------------------------------
    // Bodies
    // ------------------------------------------------------------------------

    /// Parses body items until end of input or, when `nested`, a closing brace.
    fn parse_body(&mut self, nested: bool) -> Body {
        let mut body = Body::default();
        loop {
            self.skip_newlines();
            let next = self.peek();
            match next.token {
                Token::Eof => {
                    if nested {
                        self.errors.push(SyntaxError {
                            message: "expected `}` to close block".to_string(),
                            position: next.position,
                        });
                    }
                    return body;
                }
                Token::RBrace if nested => {
                    self.advance();
                    return body;
                }
                _ => {}
            }
            match self.parse_item(nested) {
                Ok(item) => {
                    if let BodyItem::Attribute(attribute) = &item
                        && let Some(previous) = body.attribute(&attribute.name)
                    {
                        self.errors.push(SyntaxError {
                            message: format!(
                                "argument `{}` was already set at {}",
                                attribute.name, previous.position
                            ),
                            position: attribute.position,
                        });
                    } else {
                        body.items.push(item);
                    }
                }
                Err(error) => {
                    self.errors.push(error);
                    self.recover();
                }
            }
        }
    }

    /// Parses one attribute or block.
    fn parse_item(&mut self, nested: bool) -> Result<BodyItem, SyntaxError> {
        let start = self.advance();
        let Token::Ident(name) = start.token else {
            return Err(SyntaxError {
                message: format!(
                    "expected an argument or block, found `{}`",
                    start.token.describe()
                ),
                position: start.position,
            });
        };

        if self.matches(Token::Equals) {
            let expr = self.parse_expr()?;
            self.end_of_item(nested)?;
            return Ok(BodyItem::Attribute(Attribute {
                name: name.to_string(),
                expr,
                position: start.position,
            }));
        }

        let mut labels = Vec::new();
        loop {
            let next = self.peek();
            match next.token {
                Token::Ident(label) => {
                    self.advance();
                    labels.push(label.to_string());
                }
                Token::Str(raw) => {
                    self.advance();
                    labels.push(self.parse_label(raw, next.position)?);
                }
                Token::LBrace => break,
                _ => {
                    return Err(SyntaxError {
                        message: format!(
                            "expected `=` or `{{` after `{name}`, found `{}`",
                            next.token.describe()
                        ),
                        position: next.position,
                    });
                }
            }
        }
        self.expect(Token::LBrace)?;
        let body = self.with_nesting(start.position, |parser| Ok(parser.parse_body(true)))?;
        Ok(BodyItem::Block(Block {
            kind: name.to_string(),
            labels,
            body,
            position: start.position,
        }))
    }

    /// Parses a quoted block label, which must not contain interpolation.
    fn parse_label(&self, raw: &str, position: Position) -> Result<String, SyntaxError> {
        let template =
            parse_template(raw, Escapes::Quoted, position, self.depth, self.max_nesting)?;
        template.as_literal().ok_or_else(|| SyntaxError {
            message: "block labels cannot contain interpolation".to_string(),
            position,
        })
    }

    /// Requires an item to end at a newline, end of input, or closing brace.
    fn end_of_item(&mut self, nested: bool) -> Result<(), SyntaxError> {
        let next = self.peek();
        match next.token {
            Token::Newline => {
                self.advance();
                Ok(())
            }
            Token::Eof => Ok(()),
            Token::RBrace if nested => Ok(()),
            other => Err(SyntaxError {
                message: format!(
                    "expected a newline after the argument, found `{}`",
                    other.describe()
                ),
                position: next.position,
            }),
        }
    }

    /// Skips to the start of the next item in the current body.
    ///
    /// Stops at a newline outside any brackets, or before an unmatched `}` so
    /// the enclosing block still closes.
    fn recover(&mut self) {
        let mut depth = 0_usize;
        loop {
            match self.peek().token {
                Token::Eof => return,
                Token::Newline if depth == 0 => {
                    self.advance();
                    return;
                }
                Token::RBrace if depth == 0 => return,
                Token::LBrace | Token::LBracket | Token::LParen => depth += 1,
                Token::RBrace | Token::RBracket | Token::RParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    /// Parses an expression.
    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_additive()
    }

    /// Parses `+` and `-` chains.
    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_chain(Self::parse_multiplicative, |token| match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Subtract),
            _ => None,
        })
    }

    /// Parses `*` and `/` chains.
    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_chain(Self::parse_unary, |token| match token {
            Token::Star => Some(BinaryOp::Multiply),
            Token::Slash => Some(BinaryOp::Divide),
            _ => None,
        })
    }

    /// Parses a left-associative operator chain.
    ///
    /// Every operator nests the tree built so far one level deeper, so each
    /// one counts against the nesting limit.
    fn parse_chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, SyntaxError>,
        operator: fn(Token<'_>) -> Option<BinaryOp>,
    ) -> Result<Expr, SyntaxError> {
        let depth = self.depth;
        let result = self.chain_from(operand, operator);
        self.depth = depth;
        result
    }

    /// Loop behind [`Parser::parse_chain`]; leaves `depth` raised by the chain length.
    fn chain_from(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, SyntaxError>,
        operator: fn(Token<'_>) -> Option<BinaryOp>,
    ) -> Result<Expr, SyntaxError> {
        let mut lhs = operand(self)?;
        loop {
            let next = self.peek();
            let Some(op) = operator(next.token) else {
                return Ok(lhs);
            };
            self.descend(next.position)?;
            self.advance();
            let rhs = operand(self)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    /// Parses unary minus.
    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let next = self.peek();
        if next.token == Token::Minus {
            self.advance();
            return self.with_nesting(next.position, |parser| {
                Ok(Expr::Negate(Box::new(parser.parse_unary()?)))
            });
        }
        self.parse_primary()
    }

    /// Parses literals, references, collections, and parenthesized expressions.
    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let next = self.advance();
        match next.token {
            Token::Number(text) => parse_decimal(text)
                .map(|number| Expr::Literal(DynamicValue::Number(number)))
                .ok_or_else(|| SyntaxError {
                    message: format!("number `{text}` is malformed or out of range"),
                    position: next.position,
                }),
            Token::Str(raw) => {
                let (depth, limit) = (self.depth, self.max_nesting);
                let template = parse_template(raw, Escapes::Quoted, next.position, depth, limit)?;
                Ok(match template.as_literal() {
                    Some(text) => Expr::Literal(DynamicValue::String(text)),
                    None => Expr::Template(template),
                })
            }
            Token::Ident("true") => Ok(Expr::Literal(DynamicValue::Bool(true))),
            Token::Ident("false") => Ok(Expr::Literal(DynamicValue::Bool(false))),
            Token::Ident("null") => Ok(Expr::Literal(DynamicValue::Null)),
            Token::Ident(name) => {
                let mut reference = name.to_string();
                while self.peek().token == Token::Dot {
                    self.advance();
                    let segment = self.advance();
                    let Token::Ident(segment) = segment.token else {
                        return Err(SyntaxError {
                            message: format!(
                                "expected an attribute name after `.`, found `{}`",
                                segment.token.describe()
                            ),
                            position: segment.position,
                        });
                    };
                    reference.push('.');
                    reference.push_str(segment);
                }
                Ok(Expr::Variable(reference))
            }
            Token::LBracket => self.with_nesting(next.position, Self::parse_list),
            Token::LBrace => self.with_nesting(next.position, Self::parse_object),
            Token::LParen => self.with_nesting(next.position, |parser| {
                parser.skip_newlines();
                let expr = parser.parse_expr()?;
                parser.skip_newlines();
                parser.expect(Token::RParen)?;
                Ok(expr)
            }),
            other => Err(SyntaxError {
                message: format!("expected an expression, found `{}`", other.describe()),
                position: next.position,
            }),
        }
    }

    /// Parses list items after `[`.
    fn parse_list(&mut self) -> Result<Expr, SyntaxError> {
        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            if self.matches(Token::RBracket) {
                return Ok(Expr::List(items));
            }
            items.push(self.parse_expr()?);
            self.skip_newlines();
            if !self.matches(Token::Comma) {
                self.skip_newlines();
                self.expect(Token::RBracket)?;
                return Ok(Expr::List(items));
            }
        }
    }

    /// Parses object entries after `{`; entries are separated by commas or newlines.
    fn parse_object(&mut self) -> Result<Expr, SyntaxError> {
        let mut entries = Vec::new();
        loop {
            self.skip_newlines();
            if self.matches(Token::RBrace) {
                return Ok(Expr::Object(entries));
            }
            let key = self.advance();
            let key_text = match key.token {
                Token::Ident(name) => name.to_string(),
                Token::Str(raw) => self.parse_label(raw, key.position)?,
                other => {
                    return Err(SyntaxError {
                        message: format!("expected an object key, found `{}`", other.describe()),
                        position: key.position,
                    });
                }
            };
            if !self.matches(Token::Colon) {
                self.expect(Token::Equals)?;
            }
            let value = self.parse_expr()?;
            entries.push((key_text, value));
            let separated = self.matches(Token::Comma) | self.matches(Token::Newline);
            if !separated {
                self.skip_newlines();
                self.expect(Token::RBrace)?;
                return Ok(Expr::Object(entries));
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
