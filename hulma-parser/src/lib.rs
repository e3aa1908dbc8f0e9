//! # hulma-parser
//!
//! Scanner for Twig-flavoured template markup. Produces the typed tree from
//! [`hulma_core`]: a [`Node::Source`] whose children are raw text, display tags
//! and comments.
//!
//! ```rust
//! use hulma_core::{Expr, Node};
//!
//! let root = hulma_parser::parse("Hello {{ name }}!").unwrap();
//! assert_eq!(
//!     root,
//!     Node::Source(vec![
//!         Node::Content("Hello ".into()),
//!         Node::Display(Expr::variable("name")),
//!         Node::Content("!".into()),
//!     ])
//! );
//! ```
//!
//! Statement tags (`{% %}`) are recognised but rejected with
//! [`ParseError::Unimplemented`].

pub mod error;
pub mod scanner;

use hulma_core::Node;

pub use error::{ParseError, Position};
pub use scanner::MAX_NESTING;

/// Parse template markup into a [`Node::Source`] tree.
pub fn parse(input: &str) -> Result<Node, ParseError> {
    let root = scanner::Scanner::new(input).scan()?;
    tracing::trace!(
        bytes = input.len(),
        nodes = root.children().len(),
        "parsed template markup"
    );
    Ok(root)
}
