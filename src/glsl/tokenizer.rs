//! GLSL Lexer
//!
//! A superficial tokenizer: it classifies source text into the token classes
//! the include resolver needs and nothing more. It does not validate syntax.
//! Concatenating the `data` of every token reproduces the input exactly.

use super::GlslVersion;
use super::keywords::{OPERATORS, is_builtin, is_keyword};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    Ident,
    Operator,
    Builtin,
    Keyword,
    Integer,
    Float,
    /// A whole directive line (`#...`), continuation lines included.
    Preprocessor,
    BlockComment,
    LineComment,
    /// Zero-length end-of-input marker.
    Eof,
}

impl TokenKind {
    #[inline]
    #[must_use]
    pub fn is_comment(self) -> bool {
        matches!(self, Self::BlockComment | Self::LineComment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub data: String,
    /// 1-based line the token starts on.
    pub line: u32,
}

/// Lexes `source` into a token stream terminated by a [`TokenKind::Eof`] token.
#[must_use]
pub fn tokenize(source: &str, version: GlslVersion) -> Vec<Token> {
    Lexer::new(source, version).run()
}

/// Serializes a token stream back into source text.
#[must_use]
pub fn tokens_to_string(tokens: &[Token]) -> String {
    let capacity = tokens.iter().map(|t| t.data.len()).sum();
    tokens.iter().fold(String::with_capacity(capacity), |mut out, t| {
        out.push_str(&t.data);
        out
    })
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    version: GlslVersion,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, version: GlslVersion) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            version,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        let src = self.src;
        while let Some(c) = self.peek() {
            let start = self.pos;
            let rest = &src[start..];

            let kind = if c.is_whitespace() {
                self.eat_while(char::is_whitespace);
                TokenKind::Whitespace
            } else if rest.starts_with("//") {
                self.eat_while(|c| c != '\n');
                TokenKind::LineComment
            } else if rest.starts_with("/*") {
                self.pos += rest[2..].find("*/").map_or(rest.len(), |i| i + 4);
                TokenKind::BlockComment
            } else if c == '#' {
                self.eat_directive();
                TokenKind::Preprocessor
            } else if c.is_ascii_digit()
                || (c == '.' && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()))
            {
                self.eat_number()
            } else if c.is_ascii_alphabetic() || c == '_' {
                self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
                self.classify_word(&src[start..self.pos])
            } else {
                self.eat_operator(c);
                TokenKind::Operator
            };

            self.push(kind, start);
        }

        self.tokens.push(Token {
            kind: TokenKind::Eof,
            data: String::new(),
            line: self.line,
        });
        self.tokens
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let data = &self.src[start..self.pos];
        let line = self.line;
        self.line += u32::try_from(data.matches('\n').count()).unwrap_or(u32::MAX);
        self.tokens.push(Token {
            kind,
            data: data.to_string(),
            line,
        });
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    #[inline]
    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        let rest = &self.src[self.pos..];
        self.pos += rest.find(|c| !pred(c)).unwrap_or(rest.len());
    }

    /// Consumes up to (not including) the first newline that is not escaped
    /// by a trailing backslash.
    fn eat_directive(&mut self) {
        let bytes = self.src.as_bytes();
        let mut i = self.pos;
        while i < bytes.len() {
            if bytes[i] == b'\n' && !is_line_continuation(&bytes[self.pos..i]) {
                break;
            }
            i += 1;
        }
        self.pos = i;
    }

    fn eat_number(&mut self) -> TokenKind {
        let bytes = self.src.as_bytes();
        let digits = |i: &mut usize, pred: fn(&u8) -> bool| {
            while bytes.get(*i).is_some_and(pred) {
                *i += 1;
            }
        };

        let mut i = self.pos;
        let mut float = false;

        if bytes[i] == b'0' && matches!(bytes.get(i + 1), Some(b'x' | b'X')) {
            i += 2;
            digits(&mut i, u8::is_ascii_hexdigit);
        } else {
            digits(&mut i, u8::is_ascii_digit);
            if bytes.get(i) == Some(&b'.') {
                float = true;
                i += 1;
                digits(&mut i, u8::is_ascii_digit);
            }
            if matches!(bytes.get(i), Some(b'e' | b'E')) {
                let mut j = i + 1;
                if matches!(bytes.get(j), Some(b'+' | b'-')) {
                    j += 1;
                }
                if bytes.get(j).is_some_and(u8::is_ascii_digit) {
                    float = true;
                    i = j;
                    digits(&mut i, u8::is_ascii_digit);
                }
            }
            if float && matches!(bytes.get(i), Some(b'f' | b'F')) {
                i += 1;
            }
        }

        if !float && matches!(bytes.get(i), Some(b'u' | b'U')) {
            i += 1;
        }

        self.pos = i;
        if float { TokenKind::Float } else { TokenKind::Integer }
    }

    fn eat_operator(&mut self, c: char) {
        let rest = &self.src[self.pos..];
        self.pos += OPERATORS
            .iter()
            .find(|op| rest.starts_with(**op))
            .map_or(c.len_utf8(), |op| op.len());
    }

    fn classify_word(&self, word: &str) -> TokenKind {
        if is_keyword(word, self.version) {
            TokenKind::Keyword
        } else if is_builtin(word, self.version) {
            TokenKind::Builtin
        } else {
            TokenKind::Ident
        }
    }
}

fn is_line_continuation(line: &[u8]) -> bool {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    line.last() == Some(&b'\\')
}
