//! Node taxonomy and the typed template tree.
//!
//! On the wire a template is one flat, string-tagged tree (see [`crate::raw`]).
//! In memory every semantic layer gets its own closed enum so evaluation can
//! dispatch exhaustively:
//!
//! - [`Node`] — structural layer, the things that produce output
//! - [`Expr`] — expression layer, the things that produce a value
//! - [`Statement`] — control flow (`cond`, `yield`, `loop`, `assign`)
//! - [`Argument`] — function-call arguments
//! - [`Cond`] / [`Alternative`] — conditional branches

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::raw::RawNode;

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// Every tag a persisted node may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Source,
    Display,
    Statement,
    Include,
    Block,
    Comment,

    Content,
    Variable,
    Filter,
    Function,

    Cond,
    Yield,
    Loop,
    Assign,

    #[serde(alias = "filter_parameter")]
    Parameter,
    #[serde(alias = "filter_argument")]
    Argument,

    CondExpression,
    CondConsequence,
    CondAlternative,
}

/// The semantic layer a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Structural,
    Expression,
    Statement,
    Argument,
    Conditional,
}

impl NodeKind {
    /// All tags in declaration order.
    pub const ALL: [NodeKind; 19] = [
        NodeKind::Source,
        NodeKind::Display,
        NodeKind::Statement,
        NodeKind::Include,
        NodeKind::Block,
        NodeKind::Comment,
        NodeKind::Content,
        NodeKind::Variable,
        NodeKind::Filter,
        NodeKind::Function,
        NodeKind::Cond,
        NodeKind::Yield,
        NodeKind::Loop,
        NodeKind::Assign,
        NodeKind::Parameter,
        NodeKind::Argument,
        NodeKind::CondExpression,
        NodeKind::CondConsequence,
        NodeKind::CondAlternative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Source => "source",
            NodeKind::Display => "display",
            NodeKind::Statement => "statement",
            NodeKind::Include => "include",
            NodeKind::Block => "block",
            NodeKind::Comment => "comment",
            NodeKind::Content => "content",
            NodeKind::Variable => "variable",
            NodeKind::Filter => "filter",
            NodeKind::Function => "function",
            NodeKind::Cond => "cond",
            NodeKind::Yield => "yield",
            NodeKind::Loop => "loop",
            NodeKind::Assign => "assign",
            NodeKind::Parameter => "parameter",
            NodeKind::Argument => "argument",
            NodeKind::CondExpression => "cond_expression",
            NodeKind::CondConsequence => "cond_consequence",
            NodeKind::CondAlternative => "cond_alternative",
        }
    }

    /// Layer the tag is declared in.
    ///
    /// `content` is declared as an expression but is also accepted wherever a
    /// structural node is expected.
    pub fn layer(&self) -> Layer {
        match self {
            NodeKind::Source
            | NodeKind::Display
            | NodeKind::Statement
            | NodeKind::Include
            | NodeKind::Block
            | NodeKind::Comment => Layer::Structural,
            NodeKind::Content | NodeKind::Variable | NodeKind::Filter | NodeKind::Function => {
                Layer::Expression
            }
            NodeKind::Cond | NodeKind::Yield | NodeKind::Loop | NodeKind::Assign => {
                Layer::Statement
            }
            NodeKind::Parameter | NodeKind::Argument => Layer::Argument,
            NodeKind::CondExpression | NodeKind::CondConsequence | NodeKind::CondAlternative => {
                Layer::Conditional
            }
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Structural => write!(f, "structural"),
            Layer::Expression => write!(f, "expression"),
            Layer::Statement => write!(f, "statement"),
            Layer::Argument => write!(f, "argument"),
            Layer::Conditional => write!(f, "conditional"),
        }
    }
}

// ---------------------------------------------------------------------------
// Structural layer
// ---------------------------------------------------------------------------

/// A structural node: the unit the interpreter writes output for.
///
/// Serializes through [`RawNode`], so a `Node` reads and writes the persisted
/// `{"Type", "Value", "Children"}` shape directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum Node {
    Source(Vec<Node>),
    Content(String),
    Comment(String),
    Display(Expr),
    Statement(Statement),
    /// Renders the named template in place.
    Include(String),
    Block(Block),
}

/// Named override content for a `yield` of the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    pub children: Vec<Node>,
}

impl Node {
    /// Direct children for container nodes (`source`, `block`); empty otherwise.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Source(children) => children,
            Node::Block(block) => &block.children,
            _ => &[],
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Source(_) => NodeKind::Source,
            Node::Content(_) => NodeKind::Content,
            Node::Comment(_) => NodeKind::Comment,
            Node::Display(_) => NodeKind::Display,
            Node::Statement(_) => NodeKind::Statement,
            Node::Include(_) => NodeKind::Include,
            Node::Block(_) => NodeKind::Block,
        }
    }
}

// ---------------------------------------------------------------------------
// Expression layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal text.
    Content(String),
    Variable(String),
    /// `base.accessor`; chains nest to the right.
    Selector {
        base: Box<Expr>,
        accessor: Box<Expr>,
    },
    Filter {
        name: String,
        input: Box<Expr>,
    },
    Function {
        name: String,
        args: Vec<Argument>,
    },
}

impl Expr {
    pub fn content(text: impl Into<String>) -> Self {
        Expr::Content(text.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn selector(base: Expr, accessor: Expr) -> Self {
        Expr::Selector {
            base: Box::new(base),
            accessor: Box::new(accessor),
        }
    }

    pub fn filter(name: impl Into<String>, input: Expr) -> Self {
        Expr::Filter {
            name: name.into(),
            input: Box::new(input),
        }
    }

    pub fn function(name: impl Into<String>, args: Vec<Argument>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    /// Persisted tag; a selector travels as a `variable` with two children.
    pub fn kind(&self) -> NodeKind {
        match self {
            Expr::Content(_) => NodeKind::Content,
            Expr::Variable(_) | Expr::Selector { .. } => NodeKind::Variable,
            Expr::Filter { .. } => NodeKind::Filter,
            Expr::Function { .. } => NodeKind::Function,
        }
    }
}

/// One argument of a function call.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Set when preceded by a `parameter` node.
    pub name: Option<String>,
    pub value: ArgValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Literal(String),
    Expr(Expr),
}

impl Argument {
    pub fn positional(expr: Expr) -> Self {
        Argument {
            name: None,
            value: ArgValue::Expr(expr),
        }
    }

    pub fn named(name: impl Into<String>, expr: Expr) -> Self {
        Argument {
            name: Some(name.into()),
            value: ArgValue::Expr(expr),
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Argument {
            name: None,
            value: ArgValue::Literal(text.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Statement layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Cond(Cond),
    /// Overridable insertion point; `default` renders when no block matches.
    Yield {
        name: String,
        default: Vec<Node>,
    },
    Loop {
        variable: String,
        iterable: Expr,
        body: Vec<Node>,
    },
    Assign {
        name: String,
        value: Expr,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cond {
    pub test: Expr,
    pub consequence: Vec<Node>,
    pub alternative: Option<Alternative>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alternative {
    ElseIf(Box<Cond>),
    Else(Vec<Node>),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_snake_case_tag() {
        for kind in NodeKind::ALL {
            let json = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn legacy_argument_tags_are_accepted() {
        let kind: NodeKind = serde_json::from_str("\"filter_parameter\"").expect("alias");
        assert_eq!(kind, NodeKind::Parameter);
        let kind: NodeKind = serde_json::from_str("\"filter_argument\"").expect("alias");
        assert_eq!(kind, NodeKind::Argument);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(serde_json::from_str::<NodeKind>("\"macro\"").is_err());
    }

    #[test]
    fn layers() {
        assert_eq!(NodeKind::Comment.layer(), Layer::Structural);
        assert_eq!(NodeKind::Function.layer(), Layer::Expression);
        assert_eq!(NodeKind::Assign.layer(), Layer::Statement);
        assert_eq!(NodeKind::Parameter.layer(), Layer::Argument);
        assert_eq!(NodeKind::CondAlternative.layer(), Layer::Conditional);
    }

    #[test]
    fn children_only_for_containers() {
        let block = Node::Block(Block {
            name: "title".into(),
            children: vec![Node::Content("x".into())],
        });
        assert_eq!(block.children().len(), 1);
        assert!(Node::Content("x".into()).children().is_empty());
        assert_eq!(block.kind(), NodeKind::Block);
    }
}
