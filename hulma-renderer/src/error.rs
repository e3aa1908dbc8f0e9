//! Error types for hulma-renderer.

use thiserror::Error;

use hulma_core::NodeError;
use hulma_parser::ParseError;

use crate::registry::CallbackError;

/// All errors that can arise while registering or rendering templates.
///
/// The first error aborts a render; output already written to the renderer
/// stays written.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template markup failed to scan.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Malformed node tree or recursive block declaration.
    #[error("invalid template: {0}")]
    Node(#[from] NodeError),

    /// Persisted template document could not be decoded.
    #[error("template document error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("variable `{0}` does not exist")]
    UnknownVariable(String),

    #[error("field `{0}` does not exist")]
    UnknownField(String),

    #[error("filter `{0}` does not exist")]
    UnknownFilter(String),

    #[error("function `{0}` does not exist")]
    UnknownFunction(String),

    #[error("template `{0}` does not exist")]
    UnknownTemplate(String),

    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error("cannot iterate over {found} value in loop `{variable}`")]
    NotIterable {
        variable: String,
        found: &'static str,
    },

    #[error("circular include: {}", .chain.join(" -> "))]
    CircularInclude { chain: Vec<String> },

    /// A block override yields itself, directly or through other overrides.
    #[error("recursive yield: {}", .chain.join(" -> "))]
    RecursiveYield { chain: Vec<String> },

    #[error("include depth exceeds {limit} templates")]
    IncludeDepthExceeded { limit: usize },

    /// A host filter returned an error.
    #[error("filter `{name}` failed: {source}")]
    Filter {
        name: String,
        #[source]
        source: CallbackError,
    },

    /// A host function returned an error.
    #[error("function `{name}` failed: {source}")]
    Function {
        name: String,
        #[source]
        source: CallbackError,
    },

    /// The renderer sink failed to write.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`RenderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Lookup,
    Structural,
    Inheritance,
    Callback,
    Io,
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Parse(_) | RenderError::Json(_) => ErrorKind::Parse,
            RenderError::Node(err) if err.is_inheritance() => ErrorKind::Inheritance,
            RenderError::RecursiveYield { .. } => ErrorKind::Inheritance,
            RenderError::Node(_)
            | RenderError::InvalidSelector(_)
            | RenderError::NotIterable { .. }
            | RenderError::CircularInclude { .. }
            | RenderError::IncludeDepthExceeded { .. } => ErrorKind::Structural,
            RenderError::UnknownVariable(_)
            | RenderError::UnknownField(_)
            | RenderError::UnknownFilter(_)
            | RenderError::UnknownFunction(_)
            | RenderError::UnknownTemplate(_) => ErrorKind::Lookup,
            RenderError::Filter { .. } | RenderError::Function { .. } => ErrorKind::Callback,
            RenderError::Io(_) => ErrorKind::Io,
        }
    }
}
