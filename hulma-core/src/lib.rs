//! Hulma core library — node taxonomy, typed template tree, persisted form.
//!
//! - [`types`] — [`NodeKind`] taxonomy and the typed tree ([`Node`], [`Expr`], [`Statement`])
//! - [`raw`] — the `{"Type", "Value", "Children"}` wire form and lowering
//! - [`template`] — [`Template`] and its derived [`BlockMap`]
//! - [`error`] — [`NodeError`]

pub mod error;
pub mod raw;
pub mod template;
pub mod types;

pub use error::NodeError;
pub use raw::RawNode;
pub use template::{BlockMap, Template, TemplateDocument};
pub use types::{
    Alternative, ArgValue, Argument, Block, Cond, Expr, Layer, Node, NodeKind, Statement,
};
