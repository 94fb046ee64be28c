// crates/plugin-config-parser/src/syntax/lexer.rs
// ============================================================================
// Module: Block Syntax Lexer
// Description: Tokenizer for block-structured configuration text.
// Purpose: Produce positioned tokens and keep going past malformed input.
// Dependencies: crate::diagnostics
// ============================================================================

//! ## Overview
//! The lexer is byte-oriented for structure and only inspects UTF-8 inside
//! identifiers and strings. Quoted strings are returned raw (without quotes);
//! the template parser applies escapes and splits interpolations. Lexical
//! errors are collected and replaced by [`Token::Invalid`] so the parser can
//! keep reporting later problems.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::diagnostics::Position;

// ============================================================================
// SECTION: Tokens
// ============================================================================

/// Lexer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Identifier or keyword.
    Ident(&'a str),
    /// Numeric literal text.
    Number(&'a str),
    /// Raw quoted string contents.
    Str(&'a str),
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `=`
    Equals,
    /// `:`
    Colon,
    /// `.`
    Dot,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// End of line.
    Newline,
    /// Placeholder for input that failed to lex; already reported.
    Invalid,
    /// End-of-input marker.
    Eof,
}

impl Token<'_> {
    /// Formats the token for diagnostics.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Ident(text) | Self::Number(text) => (*text).to_string(),
            Self::Str(_) => "string".to_string(),
            Self::LBrace => "{".to_string(),
            Self::RBrace => "}".to_string(),
            Self::LBracket => "[".to_string(),
            Self::RBracket => "]".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
            Self::Comma => ",".to_string(),
            Self::Equals => "=".to_string(),
            Self::Colon => ":".to_string(),
            Self::Dot => ".".to_string(),
            Self::Plus => "+".to_string(),
            Self::Minus => "-".to_string(),
            Self::Star => "*".to_string(),
            Self::Slash => "/".to_string(),
            Self::Newline => "newline".to_string(),
            Self::Invalid => "invalid input".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

/// Token paired with its source position.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpannedToken<'a> {
    /// Token value.
    pub(crate) token: Token<'a>,
    /// Position of the first character.
    pub(crate) position: Position,
}

/// Lexical or syntactic failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    /// Explanation.
    pub(crate) message: String,
    /// Position of the failure.
    pub(crate) position: Position,
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Tokenizer over one source text.
pub(crate) struct Lexer<'a> {
    /// Source input being tokenized.
    input: &'a str,
    /// Current byte offset into the input.
    offset: usize,
    /// Line of the current offset.
    line: usize,
    /// Column of the current offset.
    column: usize,
    /// Collected lexical errors.
    errors: Vec<SyntaxError>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer whose first character sits at `origin`.
    pub(crate) const fn new(input: &'a str, origin: Position) -> Self {
        Self {
            input,
            offset: 0,
            line: origin.line,
            column: origin.column,
            errors: Vec::new(),
        }
    }

    /// Lexes the whole input; the token list always ends with [`Token::Eof`].
    pub(crate) fn lex(mut self) -> (Vec<SpannedToken<'a>>, Vec<SyntaxError>) {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        while let Some(&byte) = bytes.get(self.offset) {
            let position = self.position();
            let token = match byte {
                b' ' | b'\t' | b'\r' => {
                    self.bump(1);
                    continue;
                }
                b'\n' => {
                    self.bump(1);
                    Token::Newline
                }
                b'#' => {
                    self.skip_line_comment();
                    continue;
                }
                b'/' if bytes.get(self.offset + 1) == Some(&b'/') => {
                    self.skip_line_comment();
                    continue;
                }
                b'/' if bytes.get(self.offset + 1) == Some(&b'*') => {
                    self.skip_block_comment(position);
                    continue;
                }
                b'"' => self.lex_string(position),
                b'0' ..= b'9' => self.lex_number(),
                b'{' => self.single(Token::LBrace),
                b'}' => self.single(Token::RBrace),
                b'[' => self.single(Token::LBracket),
                b']' => self.single(Token::RBracket),
                b'(' => self.single(Token::LParen),
                b')' => self.single(Token::RParen),
                b',' => self.single(Token::Comma),
                b'=' => self.single(Token::Equals),
                b':' => self.single(Token::Colon),
                b'.' => self.single(Token::Dot),
                b'+' => self.single(Token::Plus),
                b'-' => self.single(Token::Minus),
                b'*' => self.single(Token::Star),
                b'/' => self.single(Token::Slash),
                _ => {
                    let ch = self.input[self.offset ..].chars().next().unwrap_or('\u{fffd}');
                    if ch.is_alphabetic() || ch == '_' {
                        self.lex_ident()
                    } else {
                        self.error(format!("unexpected character `{ch}`"), position);
                        self.bump(ch.len_utf8());
                        Token::Invalid
                    }
                }
            };
            tokens.push(SpannedToken {
                token,
                position,
            });
        }

        tokens.push(SpannedToken {
            token: Token::Eof,
            position: self.position(),
        });
        (tokens, self.errors)
    }

    /// Returns the current position.
    const fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    /// Advances by `len` bytes, tracking lines and columns.
    fn bump(&mut self, len: usize) {
        let end = (self.offset + len).min(self.input.len());
        for ch in self.input[self.offset .. end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = end;
    }

    /// Consumes one byte and returns the given token.
    fn single(&mut self, token: Token<'a>) -> Token<'a> {
        self.bump(1);
        token
    }

    /// Records a lexical error.
    fn error(&mut self, message: String, position: Position) {
        self.errors.push(SyntaxError {
            message,
            position,
        });
    }

    /// Skips to the end of the line, leaving the newline in place.
    fn skip_line_comment(&mut self) {
        let rest = &self.input[self.offset ..];
        let len = rest.find('\n').unwrap_or(rest.len());
        self.bump(len);
    }

    /// Skips a `/* ... */` comment.
    fn skip_block_comment(&mut self, start: Position) {
        let rest = &self.input[self.offset + 2 ..];
        if let Some(end) = rest.find("*/") {
            self.bump(end + 4);
        } else {
            self.error("unterminated block comment".to_string(), start);
            self.bump(rest.len() + 2);
        }
    }

    /// Lexes an identifier (letters, digits, `_` and `-` after the first character).
    fn lex_ident(&mut self) -> Token<'a> {
        let start = self.offset;
        let len = self.input[start ..]
            .char_indices()
            .find(|(index, ch)| {
                !(ch.is_alphanumeric() || *ch == '_' || (*ch == '-' && *index > 0))
            })
            .map_or(self.input.len() - start, |(index, _)| index);
        self.bump(len);
        Token::Ident(&self.input[start .. start + len])
    }

    /// Lexes an unsigned decimal literal with optional fraction and exponent.
    fn lex_number(&mut self) -> Token<'a> {
        let bytes = self.input.as_bytes();
        let start = self.offset;
        let mut end = start;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            end += 1;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exponent = end + 1;
            if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
                exponent += 1;
            }
            if bytes.get(exponent).is_some_and(u8::is_ascii_digit) {
                end = exponent;
                while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                    end += 1;
                }
            }
        }
        self.bump(end - start);
        Token::Number(&self.input[start .. end])
    }

    /// Lexes a quoted string, skipping over `${ ... }` interpolations so
    /// quotes nested inside them do not terminate the string.
    fn lex_string(&mut self, start: Position) -> Token<'a> {
        let bytes = self.input.as_bytes();
        let content_start = self.offset + 1;
        let mut cursor = content_start;
        let mut depth = 0_usize;

        loop {
            let Some(&byte) = bytes.get(cursor) else {
                break;
            };
            match byte {
                b'\\' => cursor += 2,
                b'\n' if depth == 0 => break,
                b'"' if depth == 0 => {
                    let raw = &self.input[content_start .. cursor];
                    self.bump(cursor + 1 - self.offset);
                    return Token::Str(raw);
                }
                b'"' => cursor = skip_nested_string(bytes, cursor),
                b'$' if bytes.get(cursor + 1) == Some(&b'$') => cursor += 2,
                b'$' if bytes.get(cursor + 1) == Some(&b'{') => {
                    depth += 1;
                    cursor += 2;
                }
                b'{' if depth > 0 => {
                    depth += 1;
                    cursor += 1;
                }
                b'}' if depth > 0 => {
                    depth -= 1;
                    cursor += 1;
                }
                _ => cursor += 1,
            }
        }

        self.error("unterminated string".to_string(), start);
        let rest = &self.input[self.offset ..];
        let len = rest.find('\n').unwrap_or(rest.len());
        self.bump(len);
        Token::Invalid
    }
}

/// Returns the offset just past a quoted string starting at `open`.
pub(crate) fn skip_nested_string(bytes: &[u8], open: usize) -> usize {
    let mut cursor = open + 1;
    while let Some(&byte) = bytes.get(cursor) {
        match byte {
            b'\\' => cursor += 2,
            b'"' => return cursor + 1,
            b'\n' => return cursor,
            _ => cursor += 1,
        }
    }
    cursor
}

// ============================================================================
// SECTION: Tests
// ============================================================================
