//! Error types for hulma-parser.

use std::fmt;

use thiserror::Error;

/// 1-based line/column of a character in the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Locate byte `offset` within `source`.
    pub fn locate(source: &str, offset: usize) -> Self {
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Position {
            line,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// All errors that can arise while scanning template markup.
///
/// Parsing stops at the first error; there is no recovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown token `{token}` at {at}")]
    UnknownToken { token: char, at: Position },

    #[error("unterminated string literal starting at {at}")]
    UnterminatedString { at: Position },

    /// A `{{` tag without its closing `}}`.
    #[error("display tag opened at {opened} is not closed (found {} at {at})", describe(.found))]
    UnclosedTag {
        opened: Position,
        found: Option<char>,
        at: Position,
    },

    #[error("comment opened at {opened} is not closed")]
    UnterminatedComment { opened: Position },

    #[error("{feature} are not implemented yet (at {at})")]
    Unimplemented { feature: &'static str, at: Position },

    #[error("expected a filter name at {at}")]
    ExpectedFilterName { at: Position },

    #[error("expression nesting exceeds {limit} levels at {at}")]
    NestingTooDeep { limit: usize, at: Position },

    #[error("argument `{name}` is named more than once (at {at})")]
    DuplicateArgument { name: String, at: Position },
}

impl ParseError {
    /// Where the error was detected.
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnknownToken { at, .. }
            | ParseError::UnterminatedString { at }
            | ParseError::UnclosedTag { at, .. }
            | ParseError::Unimplemented { at, .. }
            | ParseError::ExpectedFilterName { at }
            | ParseError::NestingTooDeep { at, .. }
            | ParseError::DuplicateArgument { at, .. } => *at,
            ParseError::UnterminatedComment { opened } => *opened,
        }
    }
}

fn describe(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("`{c}`"),
        None => "end of input".to_string(),
    }
}
