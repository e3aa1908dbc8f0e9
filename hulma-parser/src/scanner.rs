//! Twig-flavoured scanner: markup text → [`Node::Source`] tree.
//!
//! Two lexical modes. In raw mode characters accumulate verbatim until a `{`
//! followed by `{`, `%` or `#`. In tag mode whitespace between tokens is
//! skipped and the expression grammar applies:
//!
//! ```text
//! display   := "{{" expr ("|" ident)* "}}"
//! expr      := ident postfix? | string
//! postfix   := "." field postfix? | "(" (arg ("," arg)*)? ")"
//! field     := ident | [0-9] ident-char*
//! arg       := (ident "=")? expr ("|" ident)*
//! string    := '"' .* '"' | "'" .* "'"      (no escapes)
//! ```
//!
//! Postfix operators must follow the identifier immediately; filter pipes may
//! be surrounded by whitespace.

use hulma_core::{Argument, Expr, Node};

use crate::error::{ParseError, Position};

/// Maximum depth of nested selectors, calls and call arguments.
pub const MAX_NESTING: usize = 64;

pub(crate) struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Scanner { src, pos: 0, depth: 0 }
    }

    // -----------------------------------------------------------------------
    // Raw mode
    // -----------------------------------------------------------------------

    pub(crate) fn scan(mut self) -> Result<Node, ParseError> {
        let mut children = Vec::new();
        let mut raw_start = self.pos;

        while let Some(c) = self.peek() {
            let opener = match (c, self.peek_second()) {
                ('{', Some(next @ ('{' | '%' | '#'))) => next,
                _ => {
                    self.bump();
                    continue;
                }
            };

            if raw_start < self.pos {
                children.push(Node::Content(self.src[raw_start..self.pos].to_string()));
            }
            let tag_start = self.pos;
            self.pos += 2;

            match opener {
                '{' => children.push(self.scan_display(tag_start)?),
                '#' => children.push(self.scan_comment(tag_start)?),
                _ => {
                    return Err(ParseError::Unimplemented {
                        feature: "statement tags",
                        at: self.position(tag_start),
                    })
                }
            }
            raw_start = self.pos;
        }

        if raw_start < self.pos {
            children.push(Node::Content(self.src[raw_start..].to_string()));
        }
        Ok(Node::Source(children))
    }

    fn scan_comment(&mut self, tag_start: usize) -> Result<Node, ParseError> {
        let rest = &self.src[self.pos..];
        let Some(end) = rest.find("#}") else {
            return Err(ParseError::UnterminatedComment {
                opened: self.position(tag_start),
            });
        };
        let text = rest[..end].to_string();
        self.pos += end + 2;
        Ok(Node::Comment(text))
    }

    // -----------------------------------------------------------------------
    // Tag mode
    // -----------------------------------------------------------------------

    fn scan_display(&mut self, tag_start: usize) -> Result<Node, ParseError> {
        let expr = self.scan_expression(tag_start)?;
        let expr = self.scan_filters(expr, tag_start)?;
        self.skip_whitespace();
        if self.src[self.pos..].starts_with("}}") {
            self.pos += 2;
            return Ok(Node::Display(expr));
        }
        Err(self.unclosed(tag_start))
    }

    /// `expr | a | b` → `filter(b, filter(a, expr))`.
    fn scan_filters(&mut self, mut expr: Expr, tag_start: usize) -> Result<Expr, ParseError> {
        loop {
            self.skip_whitespace();
            if !self.eat('|') {
                return Ok(expr);
            }
            self.skip_whitespace();
            let at = self.pos;
            match self.scan_expression(tag_start)? {
                Expr::Variable(name) => expr = Expr::filter(name, expr),
                _ => {
                    return Err(ParseError::ExpectedFilterName {
                        at: self.position(at),
                    })
                }
            }
        }
    }

    fn scan_expression(&mut self, tag_start: usize) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        let at = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => {
                let name = self.scan_ident();
                self.scan_postfix(name, tag_start)
            }
            Some(quote @ ('"' | '\'')) => self.scan_string(quote),
            Some(token) => Err(ParseError::UnknownToken {
                token,
                at: self.position(at),
            }),
            None => Err(self.unclosed(tag_start)),
        }
    }

    fn scan_postfix(&mut self, name: String, tag_start: usize) -> Result<Expr, ParseError> {
        match self.peek() {
            Some('.') => {
                self.bump();
                let at = self.pos;
                let accessor = self.nested(at, |sc| match sc.peek() {
                    Some(c) if is_ident_continue(c) => {
                        let inner = sc.scan_ident();
                        sc.scan_postfix(inner, tag_start)
                    }
                    Some(token) => Err(ParseError::UnknownToken {
                        token,
                        at: sc.position(at),
                    }),
                    None => Err(sc.unclosed(tag_start)),
                })?;
                Ok(Expr::selector(Expr::Variable(name), accessor))
            }
            Some('(') => {
                self.bump();
                let at = self.pos;
                let args = self.nested(at, |sc| sc.scan_arguments(tag_start))?;
                Ok(Expr::function(name, args))
            }
            _ => Ok(Expr::Variable(name)),
        }
    }

    fn scan_arguments(&mut self, tag_start: usize) -> Result<Vec<Argument>, ParseError> {
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.eat(')') {
            return Ok(args);
        }

        loop {
            self.skip_whitespace();
            let arg_start = self.pos;
            let arg = self.scan_argument(tag_start)?;
            if let Some(name) = &arg.name {
                if args.iter().any(|prior| prior.name.as_ref() == Some(name)) {
                    return Err(ParseError::DuplicateArgument {
                        name: name.clone(),
                        at: self.position(arg_start),
                    });
                }
            }
            args.push(arg);
            self.skip_whitespace();
            let at = self.pos;
            match self.bump() {
                Some(')') => return Ok(args),
                Some(',') => {}
                Some(token) => {
                    return Err(ParseError::UnknownToken {
                        token,
                        at: self.position(at),
                    })
                }
                None => return Err(self.unclosed(tag_start)),
            }
        }
    }

    fn scan_argument(&mut self, tag_start: usize) -> Result<Argument, ParseError> {
        self.skip_whitespace();
        let checkpoint = self.pos;
        if self.peek().is_some_and(is_ident_start) {
            let name = self.scan_ident();
            self.skip_whitespace();
            if self.eat('=') {
                let expr = self.scan_expression(tag_start)?;
                let expr = self.scan_filters(expr, tag_start)?;
                return Ok(Argument::named(name, expr));
            }
            self.pos = checkpoint;
        }
        let expr = self.scan_expression(tag_start)?;
        let expr = self.scan_filters(expr, tag_start)?;
        Ok(Argument::positional(expr))
    }

    fn scan_ident(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn scan_string(&mut self, quote: char) -> Result<Expr, ParseError> {
        let start = self.pos;
        self.bump();
        let content_start = self.pos;
        while let Some(c) = self.bump() {
            if c == quote {
                let content = &self.src[content_start..self.pos - quote.len_utf8()];
                return Ok(Expr::content(content));
            }
        }
        Err(ParseError::UnterminatedString {
            at: self.position(start),
        })
    }

    // -----------------------------------------------------------------------
    // Cursor helpers
    // -----------------------------------------------------------------------

    fn nested<T>(
        &mut self,
        at: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING,
                at: self.position(at),
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn unclosed(&self, tag_start: usize) -> ParseError {
        ParseError::UnclosedTag {
            opened: self.position(tag_start),
            found: self.peek(),
            at: self.position(self.pos),
        }
    }

    fn position(&self, offset: usize) -> Position {
        Position::locate(self.src, offset)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
