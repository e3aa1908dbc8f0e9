//! Scanner tests for `hulma-parser`: markup in, typed tree or positioned
//! error out.

use hulma_core::{Argument, Expr, Node};
use hulma_parser::{parse, ParseError, Position};
use rstest::rstest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn text(s: &str) -> Node {
    Node::Content(s.to_string())
}

fn display(expr: Expr) -> Node {
    Node::Display(expr)
}

fn single_display(src: &str) -> Expr {
    match parse(src).expect("parse") {
        Node::Source(mut children) if children.len() == 1 => match children.remove(0) {
            Node::Display(expr) => expr,
            other => panic!("expected a display node, got {other:?}"),
        },
        other => panic!("expected one child, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Raw text, display tags, comments
// ---------------------------------------------------------------------------

#[test]
fn hello_name_scans_to_three_nodes() {
    let root = parse("Hello {{ name }}!").expect("parse");
    assert_eq!(
        root,
        Node::Source(vec![text("Hello "), display(Expr::variable("name")), text("!")])
    );
}

#[test]
fn comment_then_text() {
    let root = parse("{# a comment #}rest").expect("parse");
    assert_eq!(
        root,
        Node::Source(vec![Node::Comment(" a comment ".into()), text("rest")])
    );
}

#[rstest]
#[case("plain text")]
#[case("line one\nline two\n")]
#[case("braces { } and } {")]
#[case("unicode ✓ ünïcödé 数据")]
#[case("100% # not a tag")]
fn raw_text_is_preserved_verbatim(#[case] src: &str) {
    assert_eq!(parse(src).expect("parse"), Node::Source(vec![text(src)]));
}

#[rstest]
#[case("{{name}}")]
#[case("{{ name }}")]
#[case("{{\n  name\n}}")]
fn whitespace_inside_tags_is_skipped(#[case] src: &str) {
    assert_eq!(single_display(src), Expr::variable("name"));
}

#[rstest]
#[case("{{ \"double\" }}", "double")]
#[case("{{ 'single' }}", "single")]
#[case("{{ 'it\"s' }}", "it\"s")]
#[case("{{ '' }}", "")]
fn string_literals(#[case] src: &str, #[case] expected: &str) {
    assert_eq!(single_display(src), Expr::content(expected));
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[test]
fn filter_chain_is_left_associative() {
    assert_eq!(
        single_display("{{ x|a|b }}"),
        Expr::filter("b", Expr::filter("a", Expr::variable("x")))
    );
    assert_eq!(
        single_display("{{ x | a | b }}"),
        Expr::filter("b", Expr::filter("a", Expr::variable("x")))
    );
}

#[test]
fn selector_chain_nests_to_the_right() {
    assert_eq!(
        single_display("{{ user.address.city }}"),
        Expr::selector(
            Expr::variable("user"),
            Expr::selector(Expr::variable("address"), Expr::variable("city")),
        )
    );
}

#[test]
fn call_with_single_argument() {
    assert_eq!(
        single_display("{{ upper(name) }}"),
        Expr::function("upper", vec![Argument::positional(Expr::variable("name"))])
    );
}

#[test]
fn call_with_no_arguments() {
    assert_eq!(single_display("{{ now() }}"), Expr::function("now", vec![]));
}

#[test]
fn call_with_mixed_arguments_and_filters() {
    assert_eq!(
        single_display("{{ join(a, \"-\", sep = b|trim) | upper }}"),
        Expr::filter(
            "upper",
            Expr::function(
                "join",
                vec![
                    Argument::positional(Expr::variable("a")),
                    Argument::positional(Expr::content("-")),
                    Argument::named("sep", Expr::filter("trim", Expr::variable("b"))),
                ]
            )
        )
    );
}

#[test]
fn identifiers_allow_underscores_and_digits() {
    assert_eq!(single_display("{{ _user_2 }}"), Expr::variable("_user_2"));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[rstest]
#[case("{{ 1abc }}", '1')]
#[case("{{ , }}", ',')]
#[case("{{ @ }}", '@')]
#[case("{{ a. }}", ' ')]
fn unknown_tokens(#[case] src: &str, #[case] token: char) {
    match parse(src).unwrap_err() {
        ParseError::UnknownToken { token: found, .. } => assert_eq!(found, token),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_token_reports_position() {
    let err = parse("line\n  {{ ? }}").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnknownToken {
            token: '?',
            at: Position { line: 2, column: 6 }
        }
    );
    assert!(err.to_string().contains("`?`"));
}

#[test]
fn unterminated_string() {
    let err = parse("{{ 'abc").unwrap_err();
    assert!(matches!(err, ParseError::UnterminatedString { .. }), "got: {err}");
}

#[rstest]
#[case("{{ name")]
#[case("{{ name }")]
#[case("{{ name x }}")]
#[case("{{")]
fn unclosed_display_tag(#[case] src: &str) {
    let err = parse(src).unwrap_err();
    assert!(matches!(err, ParseError::UnclosedTag { .. }), "got: {err}");
}

#[test]
fn call_closer_must_be_a_close_paren() {
    let err = parse("{{ f(a( }}").unwrap_err();
    assert!(matches!(err, ParseError::UnclosedTag { .. } | ParseError::UnknownToken { .. }));
    let err = parse("{{ f(a] }}").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnknownToken {
            token: ']',
            at: Position { line: 1, column: 7 }
        }
    );
}

#[test]
fn statement_tags_are_unimplemented() {
    let err = parse("ok {% if x %}").unwrap_err();
    assert_eq!(
        err,
        ParseError::Unimplemented {
            feature: "statement tags",
            at: Position { line: 1, column: 4 }
        }
    );
}

#[test]
fn unterminated_comment() {
    let err = parse("a {# never closed").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnterminatedComment {
            opened: Position { line: 1, column: 3 }
        }
    );
}

#[test]
fn filter_target_must_be_an_identifier() {
    let err = parse("{{ x | f(y) }}").unwrap_err();
    assert!(matches!(err, ParseError::ExpectedFilterName { .. }), "got: {err}");
}

#[test]
fn first_error_aborts_the_parse() {
    let err = parse("{{ ok }} {{ # }} {% later %}").unwrap_err();
    assert!(matches!(err, ParseError::UnknownToken { token: '#', .. }));
}
