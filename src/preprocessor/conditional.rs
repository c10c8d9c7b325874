//! Conditional Directives
//!
//! Evaluates `#if` / `#ifdef` / `#ifndef` / `#elif` / `#else` / `#endif`
//! over a fully assembled source and keeps only the active regions.
//! Conditional directives themselves are removed; `#define` and `#undef` in
//! active regions update the symbol table and are kept, as is every other
//! directive. Whitespace-only lines are dropped.
//!
//! `#if` expressions follow the C preprocessor grammar restricted to integer
//! arithmetic: literals, identifiers (undefined → 0), `defined X`,
//! `defined(X)`, unary `! ~ - +`, the usual binary operators and parentheses.

use rustc_hash::FxHashMap;

use super::{directive_body, directive_name};
use crate::errors::{Result, ShaderError};
use crate::glsl::{GlslVersion, Token, TokenKind, tokenize};

/// Identifier expansion limit for `#if` expressions.
const MAX_EXPANSION_DEPTH: usize = 16;

#[derive(Debug)]
struct Branch {
    /// Whether the enclosing region is active.
    parent_active: bool,
    /// Whether some arm of this chain has already been taken.
    taken: bool,
    active: bool,
    seen_else: bool,
    line: usize,
}

/// Conditional pass over a single source string.
#[derive(Debug, Clone)]
pub struct ConditionalPass {
    symbols: FxHashMap<String, String>,
    version: GlslVersion,
}

impl ConditionalPass {
    /// A pass with `GL_ES` and `__VERSION__` predefined.
    #[must_use]
    pub fn new(version: GlslVersion) -> Self {
        let mut symbols = FxHashMap::default();
        symbols.insert("GL_ES".to_string(), "1".to_string());
        symbols.insert("__VERSION__".to_string(), version.number().to_string());
        Self { symbols, version }
    }

    pub fn define(&mut self, name: &str, value: &str) -> &mut Self {
        self.symbols.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Evaluates every conditional in `source`.
    ///
    /// Symbols defined along the way stay in the table afterwards.
    pub fn run(&mut self, source: &str) -> Result<String> {
        let mut branches: Vec<Branch> = Vec::new();
        let mut out: Vec<&str> = Vec::new();

        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let active = branches.last().is_none_or(|b| b.active);

            let Some(name) = directive_name(raw) else {
                if active && !raw.trim().is_empty() {
                    out.push(raw);
                }
                continue;
            };

            match name {
                "ifdef" | "ifndef" => {
                    let condition = if active {
                        let symbol = first_word(directive_body(raw, name)).ok_or_else(|| {
                            directive_error(line, format!("#{name} without a macro name"))
                        })?;
                        self.is_defined(symbol) == (name == "ifdef")
                    } else {
                        false
                    };
                    branches.push(Branch::open(active, condition, line));
                }
                "if" => {
                    let condition = active && self.condition(directive_body(raw, name), line)?;
                    branches.push(Branch::open(active, condition, line));
                }
                "elif" => {
                    let branch = branches
                        .last_mut()
                        .ok_or_else(|| directive_error(line, "#elif without #if"))?;
                    if branch.seen_else {
                        return Err(directive_error(line, "#elif after #else"));
                    }
                    if branch.parent_active && !branch.taken {
                        let condition = self.condition(directive_body(raw, name), line)?;
                        branch.active = condition;
                        branch.taken = condition;
                    } else {
                        branch.active = false;
                    }
                }
                "else" => {
                    let branch = branches
                        .last_mut()
                        .ok_or_else(|| directive_error(line, "#else without #if"))?;
                    if branch.seen_else {
                        return Err(directive_error(line, "duplicate #else"));
                    }
                    branch.active = branch.parent_active && !branch.taken;
                    branch.taken = true;
                    branch.seen_else = true;
                }
                "endif" => {
                    if branches.pop().is_none() {
                        return Err(directive_error(line, "#endif without #if"));
                    }
                }
                "define" if active => {
                    let (symbol, value) = split_define(directive_body(raw, name))
                        .ok_or_else(|| directive_error(line, "#define without a macro name"))?;
                    self.symbols.insert(symbol.to_string(), value.to_string());
                    out.push(raw);
                }
                "undef" if active => {
                    if let Some(symbol) = first_word(directive_body(raw, name)) {
                        self.symbols.remove(symbol);
                    }
                    out.push(raw);
                }
                _ => {
                    if active {
                        out.push(raw);
                    }
                }
            }
        }

        if let Some(branch) = branches.last() {
            return Err(directive_error(branch.line, "unterminated conditional directive"));
        }

        Ok(out.join("\n"))
    }

    fn condition(&self, expression: &str, line: usize) -> Result<bool> {
        let scope = Scope {
            symbols: &self.symbols,
            version: self.version,
            line,
        };
        Ok(scope.evaluate(expression, 0)? != 0)
    }
}

impl Branch {
    fn open(parent_active: bool, condition: bool, line: usize) -> Self {
        Self {
            parent_active,
            taken: condition,
            active: parent_active && condition,
            seen_else: false,
            line,
        }
    }
}

fn directive_error(line: usize, message: impl Into<String>) -> ShaderError {
    ShaderError::Directive {
        line,
        message: message.into(),
    }
}

fn first_word(body: &str) -> Option<&str> {
    body.split_whitespace().next()
}

/// `NAME VALUE` / `NAME(args) VALUE` → `(NAME, VALUE)`.
fn split_define(body: &str) -> Option<(&str, &str)> {
    let end = body
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(body.len());
    if end == 0 {
        return None;
    }
    let (name, rest) = body.split_at(end);
    Some((name, rest.trim()))
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnaryOp {
    Not,
    BitNot,
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    fn from_operator(op: &str) -> Option<Self> {
        Some(match op {
            "||" => Self::Or,
            "&&" => Self::And,
            "|" => Self::BitOr,
            "^" => Self::BitXor,
            "&" => Self::BitAnd,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            _ => return None,
        })
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::BitOr => 3,
            Self::BitXor => 4,
            Self::BitAnd => 5,
            Self::Eq | Self::Ne => 6,
            Self::Lt | Self::Gt | Self::Le | Self::Ge => 7,
            Self::Shl | Self::Shr => 8,
            Self::Add | Self::Sub => 9,
            Self::Mul | Self::Div | Self::Rem => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Int(i64),
    Ident(String),
    Defined(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

struct Scope<'a> {
    symbols: &'a FxHashMap<String, String>,
    version: GlslVersion,
    line: usize,
}

impl Scope<'_> {
    fn error(&self, message: impl Into<String>) -> ShaderError {
        ShaderError::Expression {
            line: self.line,
            message: message.into(),
        }
    }

    fn evaluate(&self, expression: &str, depth: usize) -> Result<i64> {
        let tokens: Vec<Token> = tokenize(expression, self.version)
            .into_iter()
            .filter(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::Eof) && !t.kind.is_comment())
            .collect();

        let mut parser = Parser {
            scope: self,
            tokens: &tokens,
            pos: 0,
        };
        let expr = parser.expression(1)?;
        if let Some(extra) = parser.peek() {
            return Err(self.error(format!("unexpected token '{}'", extra.data)));
        }
        self.eval(&expr, depth)
    }

    fn eval(&self, expr: &Expr, depth: usize) -> Result<i64> {
        Ok(match expr {
            Expr::Int(value) => *value,
            Expr::Defined(name) => i64::from(self.symbols.contains_key(name)),
            Expr::Ident(name) => match self.symbols.get(name) {
                None => 0,
                Some(_) if depth >= MAX_EXPANSION_DEPTH => {
                    return Err(self.error(format!("macro expansion of '{name}' is too deep")));
                }
                Some(value) => self.evaluate(value, depth + 1)?,
            },
            Expr::Unary(op, operand) => {
                let value = self.eval(operand, depth)?;
                match op {
                    UnaryOp::Not => i64::from(value == 0),
                    UnaryOp::BitNot => !value,
                    UnaryOp::Neg => value.wrapping_neg(),
                    UnaryOp::Plus => value,
                }
            }
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                i64::from(self.eval(lhs, depth)? != 0 && self.eval(rhs, depth)? != 0)
            }
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                i64::from(self.eval(lhs, depth)? != 0 || self.eval(rhs, depth)? != 0)
            }
            Expr::Binary(op, lhs, rhs) => {
                let a = self.eval(lhs, depth)?;
                let b = self.eval(rhs, depth)?;
                self.apply(*op, a, b)?
            }
        })
    }

    fn apply(&self, op: BinaryOp, a: i64, b: i64) -> Result<i64> {
        let shift = |b: i64| u32::try_from(b.rem_euclid(64)).unwrap_or(0);
        Ok(match op {
            BinaryOp::BitOr => a | b,
            BinaryOp::BitXor => a ^ b,
            BinaryOp::BitAnd => a & b,
            BinaryOp::Eq => i64::from(a == b),
            BinaryOp::Ne => i64::from(a != b),
            BinaryOp::Lt => i64::from(a < b),
            BinaryOp::Gt => i64::from(a > b),
            BinaryOp::Le => i64::from(a <= b),
            BinaryOp::Ge => i64::from(a >= b),
            BinaryOp::Shl => a.wrapping_shl(shift(b)),
            BinaryOp::Shr => a.wrapping_shr(shift(b)),
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div => a.checked_div(b).ok_or_else(|| self.error("division by zero"))?,
            BinaryOp::Rem => a.checked_rem(b).ok_or_else(|| self.error("division by zero"))?,
            BinaryOp::And => i64::from(a != 0 && b != 0),
            BinaryOp::Or => i64::from(a != 0 || b != 0),
        })
    }
}

struct Parser<'s, 't> {
    scope: &'s Scope<'s>,
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'_, 't> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn expect(&mut self, data: &str) -> Result<()> {
        match self.next() {
            Some(token) if token.data == data => Ok(()),
            Some(token) => Err(self
                .scope
                .error(format!("expected '{data}', found '{}'", token.data))),
            None => Err(self.scope.error(format!("expected '{data}'"))),
        }
    }

    /// Precedence climbing over binary operators.
    fn expression(&mut self, min_precedence: u8) -> Result<Expr> {
        let mut lhs = self.unary()?;

        while let Some(op) = self
            .peek()
            .filter(|t| t.kind == TokenKind::Operator)
            .and_then(|t| BinaryOp::from_operator(&t.data))
        {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            let rhs = self.expression(precedence + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr> {
        let Some(token) = self.next().cloned() else {
            return Err(self.scope.error("expected expression"));
        };

        match token.kind {
            TokenKind::Operator => {
                let op = match token.data.as_str() {
                    "(" => {
                        let inner = self.expression(1)?;
                        self.expect(")")?;
                        return Ok(inner);
                    }
                    "!" => UnaryOp::Not,
                    "~" => UnaryOp::BitNot,
                    "-" => UnaryOp::Neg,
                    "+" => UnaryOp::Plus,
                    other => return Err(self.scope.error(format!("unexpected token '{other}'"))),
                };
                Ok(Expr::Unary(op, Box::new(self.unary()?)))
            }
            TokenKind::Integer => parse_integer(&token.data)
                .map(Expr::Int)
                .ok_or_else(|| self.scope.error(format!("invalid integer literal '{}'", token.data))),
            TokenKind::Float => Err(self
                .scope
                .error(format!("floating point literal '{}' in preprocessor expression", token.data))),
            TokenKind::Ident | TokenKind::Keyword | TokenKind::Builtin if token.data == "defined" => {
                self.defined()
            }
            TokenKind::Ident | TokenKind::Keyword | TokenKind::Builtin => Ok(Expr::Ident(token.data)),
            _ => Err(self.scope.error(format!("unexpected token '{}'", token.data))),
        }
    }

    fn defined(&mut self) -> Result<Expr> {
        let parenthesized = self.peek().is_some_and(|t| t.data == "(");
        if parenthesized {
            self.pos += 1;
        }

        let name = match self.next() {
            Some(t) if matches!(t.kind, TokenKind::Ident | TokenKind::Keyword | TokenKind::Builtin) => {
                t.data.clone()
            }
            _ => return Err(self.scope.error("'defined' requires a macro name")),
        };

        if parenthesized {
            self.expect(")")?;
        }
        Ok(Expr::Defined(name))
    }
}

/// Decimal, `0x` hex and leading-zero octal, with an optional `u` suffix.
fn parse_integer(literal: &str) -> Option<i64> {
    let digits = literal.trim_end_matches(['u', 'U']);
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()
    } else {
        digits.parse().ok()
    }
}
