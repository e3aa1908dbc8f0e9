//! Tree-walking evaluation of template nodes.
//!
//! Structural nodes write to the renderer, expressions produce values,
//! statements steer control flow. Evaluation stops at the first error;
//! whatever was written before it stays written.

use serde_json::{json, Map, Value};

use hulma_core::{Alternative, ArgValue, Argument, Cond, Expr, Node, Statement};

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::registry::Arguments;
use crate::sink::Renderer;

/// Evaluate one structural node, writing its output.
pub fn evaluate(
    node: &Node,
    ctx: &mut RenderContext<'_>,
    out: &mut dyn Renderer,
) -> Result<(), RenderError> {
    match node {
        Node::Source(children) => evaluate_all(children, ctx, out),
        Node::Content(text) => Ok(out.write_str(text)?),
        Node::Comment(_) => Ok(()),
        Node::Display(expr) => {
            let value = evaluate_expression(expr, ctx)?;
            Ok(out.write(&value)?)
        }
        Node::Statement(statement) => evaluate_statement(statement, ctx, out),
        Node::Include(name) => {
            let store = ctx.store();
            store.render_include(name, ctx, out)
        }
        // Block content is only emitted through a yield.
        Node::Block(_) => Ok(()),
    }
}

pub(crate) fn evaluate_all(
    nodes: &[Node],
    ctx: &mut RenderContext<'_>,
    out: &mut dyn Renderer,
) -> Result<(), RenderError> {
    for node in nodes {
        evaluate(node, ctx, out)?;
    }
    Ok(())
}

/// Evaluate an expression to a value without writing anything.
pub fn evaluate_expression(expr: &Expr, ctx: &RenderContext<'_>) -> Result<Value, RenderError> {
    match expr {
        Expr::Content(text) => Ok(Value::String(text.clone())),
        Expr::Variable(name) => ctx
            .lookup(name)
            .cloned()
            .ok_or_else(|| RenderError::UnknownVariable(name.clone())),
        Expr::Selector { base, accessor } => {
            let value = evaluate_expression(base, ctx)?;
            select(value, accessor)
        }
        Expr::Filter { name, input } => {
            let filter = ctx
                .registry()
                .filter(name)
                .ok_or_else(|| RenderError::UnknownFilter(name.clone()))?;
            let value = evaluate_expression(input, ctx)?;
            filter.apply(value).map_err(|source| RenderError::Filter {
                name: name.clone(),
                source,
            })
        }
        Expr::Function { name, args } => {
            let function = ctx
                .registry()
                .resolve_function(name, args.len())
                .ok_or_else(|| RenderError::UnknownFunction(name.clone()))?;
            let arguments = collect_arguments(args, ctx)?;
            function.call(arguments).map_err(|source| RenderError::Function {
                name: name.clone(),
                source,
            })
        }
    }
}

/// Evaluate call-site arguments in order.
///
/// Any named argument turns the whole set into a map; positional entries in
/// that map are keyed by their index. Otherwise one argument is passed as a
/// scalar and any other count as a list.
pub fn collect_arguments(
    args: &[Argument],
    ctx: &RenderContext<'_>,
) -> Result<Arguments, RenderError> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(match &arg.value {
            ArgValue::Literal(text) => Value::String(text.clone()),
            ArgValue::Expr(expr) => evaluate_expression(expr, ctx)?,
        });
    }

    if args.iter().any(|arg| arg.name.is_some()) {
        let named = args
            .iter()
            .zip(values)
            .enumerate()
            .map(|(index, (arg, value))| {
                let key = arg.name.clone().unwrap_or_else(|| index.to_string());
                (key, value)
            })
            .collect();
        return Ok(Arguments::Named(named));
    }

    if values.len() == 1 {
        if let Some(value) = values.pop() {
            return Ok(Arguments::Scalar(value));
        }
    }
    Ok(Arguments::List(values))
}

/// Execute a statement, writing whatever its chosen branch produces.
pub fn evaluate_statement(
    statement: &Statement,
    ctx: &mut RenderContext<'_>,
    out: &mut dyn Renderer,
) -> Result<(), RenderError> {
    match statement {
        Statement::Cond(cond) => evaluate_cond(cond, ctx, out),
        Statement::Yield { name, default } => match ctx.block(name) {
            Some(children) => {
                ctx.enter_yield(name)?;
                let result = evaluate_all(children, ctx, out);
                ctx.leave_yield();
                result
            }
            None => evaluate_all(default, ctx, out),
        },
        Statement::Loop {
            variable,
            iterable,
            body,
        } => {
            let items = iteration_items(variable, evaluate_expression(iterable, ctx)?)?;
            let length = items.len();
            for (index, item) in items.into_iter().enumerate() {
                let mut frame = Map::new();
                frame.insert(variable.clone(), item);
                frame.insert(
                    "loop".into(),
                    json!({
                        "index": index,
                        "index1": index + 1,
                        "first": index == 0,
                        "last": index + 1 == length,
                        "length": length,
                    }),
                );
                ctx.push_frame(frame);
                let result = evaluate_all(body, ctx, out);
                ctx.pop_frame();
                result?;
            }
            Ok(())
        }
        Statement::Assign { name, value } => {
            let value = evaluate_expression(value, ctx)?;
            ctx.assign(name.as_str(), value);
            Ok(())
        }
    }
}

fn evaluate_cond(
    cond: &Cond,
    ctx: &mut RenderContext<'_>,
    out: &mut dyn Renderer,
) -> Result<(), RenderError> {
    let mut current = cond;
    loop {
        if is_truthy(&evaluate_expression(&current.test, ctx)?) {
            return evaluate_all(&current.consequence, ctx, out);
        }
        match &current.alternative {
            Some(Alternative::ElseIf(next)) => current = next.as_ref(),
            Some(Alternative::Else(body)) => return evaluate_all(body, ctx, out),
            None => return Ok(()),
        }
    }
}

/// Only `true` and non-empty strings are truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => false,
    }
}

fn iteration_items(variable: &str, value: Value) -> Result<Vec<Value>, RenderError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| json!({ "key": key, "value": value }))
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(RenderError::NotIterable {
            variable: variable.to_string(),
            found: type_name(&other),
        }),
    }
}

/// `base.a.b`: the accessor is a variable naming a field, or a nested
/// selector whose base names the next field.
fn select(value: Value, accessor: &Expr) -> Result<Value, RenderError> {
    match accessor {
        Expr::Variable(field) => field_of(value, field),
        Expr::Selector { base, accessor } => match base.as_ref() {
            Expr::Variable(field) => select(field_of(value, field)?, accessor),
            other => Err(RenderError::InvalidSelector(format!(
                "`{}` cannot name a field",
                other.kind()
            ))),
        },
        other => Err(RenderError::InvalidSelector(format!(
            "`{}` node used as an accessor",
            other.kind()
        ))),
    }
}

fn field_of(value: Value, field: &str) -> Result<Value, RenderError> {
    let found = match value {
        Value::Object(mut map) => map.remove(field),
        Value::Array(mut items) => field
            .parse::<usize>()
            .ok()
            .filter(|index| *index < items.len())
            .map(|index| items.swap_remove(index)),
        _ => None,
    };
    found.ok_or_else(|| RenderError::UnknownField(field.to_string()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
