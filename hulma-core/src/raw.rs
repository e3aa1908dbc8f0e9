//! Persisted node form and its conversion to and from the typed tree.
//!
//! A [`RawNode`] is what templates look like on disk:
//!
//! ```text
//! {"Type": "display", "Value": "", "Children": [{"Type": "variable", "Value": "name"}]}
//! ```
//!
//! Lowering (`Node::try_from(raw)`) decides how each tag is read from the layer
//! that consumes it and enforces child counts, so malformed trees are rejected
//! before anything is rendered. Raising (`RawNode::from(&node)`) never fails.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::NodeError;
use crate::types::{
    Alternative, ArgValue, Argument, Block, Cond, Expr, Layer, Node, NodeKind, Statement,
};

/// One node of the persisted, string-tagged tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(rename = "Type")]
    pub kind: NodeKind,
    #[serde(rename = "Value", default)]
    pub value: String,
    #[serde(rename = "Children", default, deserialize_with = "null_as_empty")]
    pub children: Vec<RawNode>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RawNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<RawNode>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl RawNode {
    pub fn new(kind: NodeKind, value: impl Into<String>, children: Vec<RawNode>) -> Self {
        RawNode {
            kind,
            value: value.into(),
            children,
        }
    }

    pub fn leaf(kind: NodeKind, value: impl Into<String>) -> Self {
        Self::new(kind, value, Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Lowering
// ---------------------------------------------------------------------------

impl TryFrom<RawNode> for Node {
    type Error = NodeError;

    fn try_from(raw: RawNode) -> Result<Self, NodeError> {
        lower_node(raw)
    }
}

impl TryFrom<RawNode> for Expr {
    type Error = NodeError;

    fn try_from(raw: RawNode) -> Result<Self, NodeError> {
        lower_expr(raw)
    }
}

fn lower_nodes(children: Vec<RawNode>) -> Result<Vec<Node>, NodeError> {
    children.into_iter().map(lower_node).collect()
}

fn lower_node(raw: RawNode) -> Result<Node, NodeError> {
    match raw.kind {
        NodeKind::Source => Ok(Node::Source(lower_nodes(raw.children)?)),
        NodeKind::Content => Ok(Node::Content(raw.value)),
        NodeKind::Comment => Ok(Node::Comment(raw.value)),
        NodeKind::Include => Ok(Node::Include(require_name(NodeKind::Include, raw.value)?)),
        NodeKind::Display => {
            let child = single_child(NodeKind::Display, raw.children)?;
            Ok(Node::Display(lower_expr(child)?))
        }
        NodeKind::Statement => {
            let child = single_child(NodeKind::Statement, raw.children)?;
            Ok(Node::Statement(lower_statement(child)?))
        }
        NodeKind::Block => Ok(Node::Block(Block {
            name: require_name(NodeKind::Block, raw.value)?,
            children: lower_nodes(raw.children)?,
        })),
        kind => Err(NodeError::InvalidKind {
            layer: Layer::Structural,
            kind,
        }),
    }
}

fn lower_expr(raw: RawNode) -> Result<Expr, NodeError> {
    match raw.kind {
        NodeKind::Content => Ok(Expr::Content(raw.value)),
        NodeKind::Variable => {
            let found = raw.children.len();
            let mut children = raw.children.into_iter();
            match (children.next(), children.next()) {
                (None, _) => Ok(Expr::Variable(require_name(NodeKind::Variable, raw.value)?)),
                (Some(base), Some(accessor)) if found == 2 => {
                    Ok(Expr::selector(lower_expr(base)?, lower_expr(accessor)?))
                }
                _ => Err(NodeError::Arity {
                    kind: NodeKind::Variable,
                    expected: "zero or two children",
                    found,
                }),
            }
        }
        NodeKind::Filter => {
            let name = require_name(NodeKind::Filter, raw.value)?;
            let input = single_child(NodeKind::Filter, raw.children)?;
            Ok(Expr::filter(name, lower_expr(input)?))
        }
        NodeKind::Function => {
            let name = require_name(NodeKind::Function, raw.value)?;
            Ok(Expr::function(name, lower_arguments(raw.children)?))
        }
        kind => Err(NodeError::InvalidKind {
            layer: Layer::Expression,
            kind,
        }),
    }
}

fn lower_arguments(children: Vec<RawNode>) -> Result<Vec<Argument>, NodeError> {
    let mut args: Vec<Argument> = Vec::with_capacity(children.len());
    let mut pending: Option<String> = None;

    for child in children {
        match child.kind {
            NodeKind::Parameter => {
                let name = require_name(NodeKind::Parameter, child.value)?;
                if args.iter().any(|arg| arg.name.as_deref() == Some(name.as_str())) {
                    return Err(NodeError::DuplicateArgument(name));
                }
                if let Some(previous) = pending.replace(name) {
                    return Err(NodeError::DanglingParameter(previous));
                }
            }
            NodeKind::Argument => {
                let value = lower_argument_value(child)?;
                args.push(Argument {
                    name: pending.take(),
                    value,
                });
            }
            kind => {
                return Err(NodeError::InvalidKind {
                    layer: Layer::Argument,
                    kind,
                })
            }
        }
    }

    match pending {
        Some(name) => Err(NodeError::DanglingParameter(name)),
        None => Ok(args),
    }
}

fn lower_argument_value(raw: RawNode) -> Result<ArgValue, NodeError> {
    if raw.children.is_empty() {
        return Ok(ArgValue::Literal(raw.value));
    }
    if !raw.value.is_empty() {
        return Err(NodeError::AmbiguousArgument);
    }
    let child = single_child(NodeKind::Argument, raw.children)?;
    Ok(ArgValue::Expr(lower_expr(child)?))
}

fn lower_statement(raw: RawNode) -> Result<Statement, NodeError> {
    match raw.kind {
        NodeKind::Cond => Ok(Statement::Cond(lower_cond(raw)?)),
        NodeKind::Yield => Ok(Statement::Yield {
            name: require_name(NodeKind::Yield, raw.value)?,
            default: lower_nodes(raw.children)?,
        }),
        NodeKind::Loop => {
            let variable = require_name(NodeKind::Loop, raw.value)?;
            let mut children = raw.children.into_iter();
            let iterable = children.next().ok_or(NodeError::Arity {
                kind: NodeKind::Loop,
                expected: "an iterable expression",
                found: 0,
            })?;
            Ok(Statement::Loop {
                variable,
                iterable: lower_expr(iterable)?,
                body: lower_nodes(children.collect())?,
            })
        }
        NodeKind::Assign => {
            let name = require_name(NodeKind::Assign, raw.value)?;
            let value = single_child(NodeKind::Assign, raw.children)?;
            Ok(Statement::Assign {
                name,
                value: lower_expr(value)?,
            })
        }
        kind => Err(NodeError::InvalidKind {
            layer: Layer::Statement,
            kind,
        }),
    }
}

fn lower_cond(raw: RawNode) -> Result<Cond, NodeError> {
    let mut children = raw.children.into_iter();
    let (Some(test), Some(consequence)) = (children.next(), children.next()) else {
        return Err(NodeError::InvalidConditional(
            "expected a test and a consequence",
        ));
    };
    let alternative = children.next();
    if children.next().is_some() {
        return Err(NodeError::InvalidConditional(
            "expected at most one alternative",
        ));
    }

    if test.kind != NodeKind::CondExpression {
        return Err(NodeError::InvalidConditional(
            "first child must be a cond_expression",
        ));
    }
    let test = lower_expr(single_child(NodeKind::CondExpression, test.children)?)?;

    if consequence.kind != NodeKind::CondConsequence {
        return Err(NodeError::InvalidConditional(
            "second child must be a cond_consequence",
        ));
    }
    let consequence = lower_nodes(consequence.children)?;

    let alternative = match alternative {
        None => None,
        Some(alt) if alt.kind == NodeKind::Cond => {
            Some(Alternative::ElseIf(Box::new(lower_cond(alt)?)))
        }
        Some(alt) if alt.kind == NodeKind::CondAlternative => {
            Some(Alternative::Else(lower_nodes(alt.children)?))
        }
        Some(_) => {
            return Err(NodeError::InvalidConditional(
                "third child must be a cond or a cond_alternative",
            ))
        }
    };

    Ok(Cond {
        test,
        consequence,
        alternative,
    })
}

fn require_name(kind: NodeKind, value: String) -> Result<String, NodeError> {
    if value.is_empty() {
        Err(NodeError::MissingName { kind })
    } else {
        Ok(value)
    }
}

fn single_child(kind: NodeKind, children: Vec<RawNode>) -> Result<RawNode, NodeError> {
    let found = children.len();
    let mut children = children.into_iter();
    match (children.next(), children.next()) {
        (Some(child), None) => Ok(child),
        _ => Err(NodeError::Arity {
            kind,
            expected: "exactly one child",
            found,
        }),
    }
}

// ---------------------------------------------------------------------------
// Raising
// ---------------------------------------------------------------------------

impl From<&Node> for RawNode {
    fn from(node: &Node) -> Self {
        match node {
            Node::Source(children) => RawNode::new(NodeKind::Source, "", raise_nodes(children)),
            Node::Content(text) => RawNode::leaf(NodeKind::Content, text.as_str()),
            Node::Comment(text) => RawNode::leaf(NodeKind::Comment, text.as_str()),
            Node::Display(expr) => RawNode::new(NodeKind::Display, "", vec![expr.into()]),
            Node::Statement(stmt) => RawNode::new(NodeKind::Statement, "", vec![stmt.into()]),
            Node::Include(name) => RawNode::leaf(NodeKind::Include, name.as_str()),
            Node::Block(block) => RawNode::new(
                NodeKind::Block,
                block.name.as_str(),
                raise_nodes(&block.children),
            ),
        }
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        RawNode::from(&node)
    }
}

impl From<&Expr> for RawNode {
    fn from(expr: &Expr) -> Self {
        match expr {
            Expr::Content(text) => RawNode::leaf(NodeKind::Content, text.as_str()),
            Expr::Variable(name) => RawNode::leaf(NodeKind::Variable, name.as_str()),
            Expr::Selector { base, accessor } => RawNode::new(
                NodeKind::Variable,
                "",
                vec![base.as_ref().into(), accessor.as_ref().into()],
            ),
            Expr::Filter { name, input } => {
                RawNode::new(NodeKind::Filter, name.as_str(), vec![input.as_ref().into()])
            }
            Expr::Function { name, args } => {
                let mut children = Vec::with_capacity(args.len());
                for arg in args {
                    if let Some(param) = &arg.name {
                        children.push(RawNode::leaf(NodeKind::Parameter, param.as_str()));
                    }
                    children.push(match &arg.value {
                        ArgValue::Literal(text) => RawNode::leaf(NodeKind::Argument, text.as_str()),
                        ArgValue::Expr(expr) => {
                            RawNode::new(NodeKind::Argument, "", vec![expr.into()])
                        }
                    });
                }
                RawNode::new(NodeKind::Function, name.as_str(), children)
            }
        }
    }
}

impl From<&Statement> for RawNode {
    fn from(stmt: &Statement) -> Self {
        match stmt {
            Statement::Cond(cond) => cond.into(),
            Statement::Yield { name, default } => {
                RawNode::new(NodeKind::Yield, name.as_str(), raise_nodes(default))
            }
            Statement::Loop {
                variable,
                iterable,
                body,
            } => {
                let mut children = vec![RawNode::from(iterable)];
                children.extend(raise_nodes(body));
                RawNode::new(NodeKind::Loop, variable.as_str(), children)
            }
            Statement::Assign { name, value } => {
                RawNode::new(NodeKind::Assign, name.as_str(), vec![value.into()])
            }
        }
    }
}

impl From<&Cond> for RawNode {
    fn from(cond: &Cond) -> Self {
        let mut children = vec![
            RawNode::new(NodeKind::CondExpression, "", vec![(&cond.test).into()]),
            RawNode::new(NodeKind::CondConsequence, "", raise_nodes(&cond.consequence)),
        ];
        match &cond.alternative {
            Some(Alternative::ElseIf(next)) => children.push(next.as_ref().into()),
            Some(Alternative::Else(body)) => children.push(RawNode::new(
                NodeKind::CondAlternative,
                "",
                raise_nodes(body),
            )),
            None => {}
        }
        RawNode::new(NodeKind::Cond, "", children)
    }
}

fn raise_nodes(nodes: &[Node]) -> Vec<RawNode> {
    nodes.iter().map(RawNode::from).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn raw(kind: NodeKind, value: &str, children: Vec<RawNode>) -> RawNode {
        RawNode::new(kind, value, children)
    }

    fn var(name: &str) -> RawNode {
        RawNode::leaf(NodeKind::Variable, name)
    }

    #[test]
    fn decodes_wire_shape_with_missing_and_null_fields() {
        let json = r#"{"Type":"display","Children":[{"Type":"variable","Value":"name","Children":null}]}"#;
        let node: RawNode = serde_json::from_str(json).expect("decode");
        assert_eq!(node.value, "");
        assert_eq!(node.children[0].value, "name");
        assert!(node.children[0].children.is_empty());
    }

    #[test]
    fn lowers_display_of_variable() {
        let node = Node::try_from(raw(NodeKind::Display, "", vec![var("name")])).expect("lower");
        assert_eq!(node, Node::Display(Expr::variable("name")));
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![var("a"), var("b")])]
    fn display_requires_exactly_one_child(#[case] children: Vec<RawNode>) {
        let err = Node::try_from(raw(NodeKind::Display, "", children)).unwrap_err();
        assert!(matches!(err, NodeError::Arity { kind: NodeKind::Display, .. }), "got: {err}");
    }

    #[test]
    fn expression_tag_at_structural_level_is_rejected() {
        let err = Node::try_from(var("x")).unwrap_err();
        assert_eq!(
            err,
            NodeError::InvalidKind {
                layer: Layer::Structural,
                kind: NodeKind::Variable
            }
        );
        assert!(err.to_string().contains("expression layer"));
    }

    #[test]
    fn structural_tag_in_expression_is_rejected() {
        let err = Expr::try_from(raw(NodeKind::Source, "", vec![])).unwrap_err();
        assert!(err.to_string().starts_with("invalid expression node `source`"));
    }

    #[test]
    fn variable_with_two_children_is_a_selector() {
        let expr = Expr::try_from(raw(NodeKind::Variable, "", vec![var("user"), var("name")]))
            .expect("lower");
        assert_eq!(
            expr,
            Expr::selector(Expr::variable("user"), Expr::variable("name"))
        );
    }

    #[test]
    fn named_and_positional_arguments() {
        let call = raw(
            NodeKind::Function,
            "link",
            vec![
                raw(NodeKind::Argument, "home", vec![]),
                RawNode::leaf(NodeKind::Parameter, "title"),
                raw(NodeKind::Argument, "", vec![var("title")]),
            ],
        );
        let expr = Expr::try_from(call).expect("lower");
        assert_eq!(
            expr,
            Expr::function(
                "link",
                vec![
                    Argument::literal("home"),
                    Argument::named("title", Expr::variable("title")),
                ]
            )
        );
    }

    #[test]
    fn argument_with_literal_and_expression_is_ambiguous() {
        let call = raw(
            NodeKind::Function,
            "f",
            vec![raw(NodeKind::Argument, "lit", vec![var("x")])],
        );
        assert_eq!(Expr::try_from(call).unwrap_err(), NodeError::AmbiguousArgument);
    }

    #[test]
    fn trailing_parameter_is_dangling() {
        let call = raw(
            NodeKind::Function,
            "f",
            vec![RawNode::leaf(NodeKind::Parameter, "sep")],
        );
        assert_eq!(
            Expr::try_from(call).unwrap_err(),
            NodeError::DanglingParameter("sep".into())
        );
    }

    #[test]
    fn repeated_parameter_name_is_rejected() {
        let call = raw(
            NodeKind::Function,
            "f",
            vec![
                RawNode::leaf(NodeKind::Parameter, "a"),
                RawNode::leaf(NodeKind::Argument, "1"),
                RawNode::leaf(NodeKind::Parameter, "a"),
                RawNode::leaf(NodeKind::Argument, "2"),
            ],
        );
        assert_eq!(
            Expr::try_from(call).unwrap_err(),
            NodeError::DuplicateArgument("a".into())
        );
    }

    fn cond(test: &str, then: &str, alternative: Option<RawNode>) -> RawNode {
        let mut children = vec![
            raw(NodeKind::CondExpression, "", vec![var(test)]),
            raw(
                NodeKind::CondConsequence,
                "",
                vec![RawNode::leaf(NodeKind::Content, then)],
            ),
        ];
        children.extend(alternative);
        raw(NodeKind::Cond, "", children)
    }

    #[test]
    fn lowers_elif_chain() {
        let otherwise = raw(
            NodeKind::CondAlternative,
            "",
            vec![RawNode::leaf(NodeKind::Content, "c")],
        );
        let tree = raw(
            NodeKind::Statement,
            "",
            vec![cond("a", "A", Some(cond("b", "B", Some(otherwise))))],
        );
        let Node::Statement(Statement::Cond(first)) = Node::try_from(tree).expect("lower") else {
            panic!("expected a cond statement");
        };
        let Some(Alternative::ElseIf(second)) = first.alternative else {
            panic!("expected else-if");
        };
        assert_eq!(second.test, Expr::variable("b"));
        assert_eq!(
            second.alternative,
            Some(Alternative::Else(vec![Node::Content("c".into())]))
        );
    }

    #[test]
    fn cond_with_wrong_first_child_is_invalid() {
        let bad = raw(
            NodeKind::Cond,
            "",
            vec![
                var("a"),
                raw(NodeKind::CondConsequence, "", vec![]),
            ],
        );
        let err = Node::try_from(raw(NodeKind::Statement, "", vec![bad])).unwrap_err();
        assert!(matches!(err, NodeError::InvalidConditional(_)), "got: {err}");
    }

    #[test]
    fn loop_takes_iterable_then_body() {
        let tree = raw(
            NodeKind::Loop,
            "item",
            vec![var("items"), RawNode::leaf(NodeKind::Content, "-")],
        );
        let node = Node::try_from(raw(NodeKind::Statement, "", vec![tree])).expect("lower");
        assert_eq!(
            node,
            Node::Statement(Statement::Loop {
                variable: "item".into(),
                iterable: Expr::variable("items"),
                body: vec![Node::Content("-".into())],
            })
        );
    }

    #[test]
    fn include_requires_name() {
        let err = Node::try_from(RawNode::leaf(NodeKind::Include, "")).unwrap_err();
        assert_eq!(err, NodeError::MissingName { kind: NodeKind::Include });
    }
}
