//! Include Resolution
//!
//! Walks a token stream and expands every `#include` in place with the
//! compiled form of the target fragment. `<path>` targets resolve against the
//! store root, `"path"` targets against the directory of the including unit.
//!
//! Along the way comments are dropped and value-less `#define NAME` lines get
//! the conventional `1`. Every other token is passed through unchanged.

use crate::errors::{IncludeStack, Result, ShaderError};
use crate::glsl::{Token, TokenKind, tokenize};
use crate::library::ShaderLib;

use super::{directive_body, directive_name};

const EXPECTED_OPENING: &str = "'<' or '\"'";

pub(crate) struct IncludeResolver<'a> {
    lib: &'a mut ShaderLib,
    stack: &'a mut IncludeStack,
}

impl<'a> IncludeResolver<'a> {
    pub(crate) fn new(lib: &'a mut ShaderLib, stack: &'a mut IncludeStack) -> Self {
        Self { lib, stack }
    }

    /// Tokenizes `source` and returns the flattened stream, without the
    /// end-of-input marker.
    pub(crate) fn resolve(&mut self, source: &str, root: &str) -> Result<Vec<Token>> {
        let tokens = tokenize(source, self.lib.version());
        let mut out = Vec::with_capacity(tokens.len());

        for token in tokens {
            match token.kind {
                TokenKind::Eof => {}
                kind if kind.is_comment() => {}
                TokenKind::Preprocessor => self.visit_directive(token, root, &mut out)?,
                _ => out.push(token),
            }
        }

        Ok(out)
    }

    fn visit_directive(&mut self, mut token: Token, root: &str, out: &mut Vec<Token>) -> Result<()> {
        match directive_name(&token.data) {
            Some("define") => {
                if is_valueless_define(&token.data) {
                    let trimmed = token.data.trim_end().len();
                    token.data.truncate(trimmed);
                    token.data.push_str(" 1");
                }
                out.push(token);
            }
            Some("include") => {
                let compiled = self.include(&token, root)?;
                out.extend(
                    tokenize(&compiled, self.lib.version())
                        .into_iter()
                        .filter(|t| t.kind != TokenKind::Eof),
                );
            }
            _ => out.push(token),
        }
        Ok(())
    }

    fn include(&mut self, token: &Token, root: &str) -> Result<String> {
        let argument = directive_body(&token.data, "include");
        let (closing, base) = match argument.chars().next() {
            Some('<') => ('>', "/"),
            Some('"') => ('"', root),
            other => {
                return Err(ShaderError::IncludeSyntax {
                    found: other.map(String::from).unwrap_or_default(),
                    expected: EXPECTED_OPENING.to_string(),
                    stack: self.stack.clone(),
                });
            }
        };

        let last = argument.chars().last();
        if argument.len() < 2 || last != Some(closing) {
            return Err(ShaderError::IncludeSyntax {
                found: last.filter(|_| argument.len() > 1).map(String::from).unwrap_or_default(),
                expected: format!("'{closing}'"),
                stack: self.stack.clone(),
            });
        }

        let target = argument[1..argument.len() - 1].trim();
        let relative = if target.starts_with('.') {
            target.to_string()
        } else {
            format!("./{target}")
        };
        let path = self.lib.resolve(&relative, base);

        let limit = self.lib.max_include_depth();
        if self.stack.depth() >= limit {
            return Err(ShaderError::IncludeDepthExceeded {
                path,
                limit,
                stack: self.stack.clone(),
            });
        }

        log::trace!("Including '{path}' (line {}, depth {})", token.line, self.stack.depth());
        self.stack.push(path.clone(), token.line);
        let compiled = self.lib.get_with_stack(&path, self.stack)?;
        self.stack.pop();

        match compiled {
            Some(compiled) => Ok(compiled.to_string()),
            None => Err(ShaderError::IncludeNotFound {
                path,
                directive: argument.to_string(),
                stack: self.stack.clone(),
            }),
        }
    }
}

/// `#define NAME` with nothing after the name.
fn is_valueless_define(line: &str) -> bool {
    let body = directive_body(line, "define");
    !body.is_empty() && !body.contains(char::is_whitespace)
}
