//! Error types for hulma-core.

use thiserror::Error;

use crate::types::{Layer, NodeKind};

/// Errors raised while lowering a persisted tree or scanning its blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// A tag appeared where its layer is not accepted.
    #[error("invalid {layer} node `{kind}` (belongs to the {} layer)", .kind.layer())]
    InvalidKind { layer: Layer, kind: NodeKind },

    #[error("`{kind}` node should have {expected}, found {found}")]
    Arity {
        kind: NodeKind,
        expected: &'static str,
        found: usize,
    },

    #[error("`{kind}` node requires a non-empty name")]
    MissingName { kind: NodeKind },

    #[error("argument value should not be a literal and an expression at the same time")]
    AmbiguousArgument,

    #[error("parameter `{0}` is not followed by an argument")]
    DanglingParameter(String),

    #[error("argument `{0}` is named more than once")]
    DuplicateArgument(String),

    #[error("invalid conditional node: {0}")]
    InvalidConditional(&'static str),

    /// A block declared directly inside a block of the same name.
    #[error("`{0}` block should not be recursive")]
    RecursiveBlock(String),
}

impl NodeError {
    /// `true` for block/yield inheritance failures, `false` for malformed trees.
    pub fn is_inheritance(&self) -> bool {
        matches!(self, NodeError::RecursiveBlock(_))
    }
}
