//! Host callbacks: named filters and functions.
//!
//! A filter is a unary `Value -> Value` transform used in pipe position. A
//! function receives its call-site arguments as [`Arguments`]. A call that
//! names no registered function but passes exactly one argument falls back to
//! a filter of the same name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Error type host callbacks may return.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

pub type CallbackResult = Result<Value, CallbackError>;

type FilterFn = dyn Fn(Value) -> CallbackResult + Send + Sync;
type FunctionFn = dyn Fn(Arguments) -> CallbackResult + Send + Sync;

/// Call-site arguments handed to a [`Function`].
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    /// Exactly one positional argument.
    Scalar(Value),
    /// Zero or several positional arguments, in order. A call with no
    /// arguments receives an empty list, never null.
    List(Vec<Value>),
    /// At least one named argument. Positional arguments mixed in are keyed
    /// by their index in the call (`"0"`, `"1"`, ...). Names are unique:
    /// templates repeating one are rejected when loaded.
    Named(Map<String, Value>),
}

impl Arguments {
    pub fn len(&self) -> usize {
        match self {
            Arguments::Scalar(_) => 1,
            Arguments::List(items) => items.len(),
            Arguments::Named(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collapse to one value: the scalar itself, else the first entry (by key
    /// for named sets), else null.
    pub fn into_single(self) -> Value {
        match self {
            Arguments::Scalar(value) => value,
            Arguments::List(items) => items.into_iter().next().unwrap_or(Value::Null),
            Arguments::Named(map) => map.into_iter().next().map_or(Value::Null, |(_, v)| v),
        }
    }

    /// All argument values; positional sets keep call order, named sets
    /// follow key order.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Arguments::Scalar(value) => vec![value],
            Arguments::List(items) => items,
            Arguments::Named(map) => map.into_iter().map(|(_, v)| v).collect(),
        }
    }
}

#[derive(Clone)]
pub struct Filter(Arc<FilterFn>);

impl Filter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> CallbackResult + Send + Sync + 'static,
    {
        Filter(Arc::new(f))
    }

    pub fn apply(&self, value: Value) -> CallbackResult {
        (self.0)(value)
    }

    /// Adapt into a function that forwards its single argument to this filter.
    pub fn to_function(&self) -> Function {
        let filter = self.clone();
        Function::new(move |args: Arguments| filter.apply(args.into_single()))
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

#[derive(Clone)]
pub struct Function(Arc<FunctionFn>);

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Arguments) -> CallbackResult + Send + Sync + 'static,
    {
        Function(Arc::new(f))
    }

    pub fn call(&self, args: Arguments) -> CallbackResult {
        (self.0)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function(..)")
    }
}

/// Filters and functions, each keyed by name. Re-registering a name replaces it.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    filters: HashMap<String, Filter>,
    functions: HashMap<String, Function>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_filter<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Value) -> CallbackResult + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Filter::new(f));
    }

    pub fn register_function<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Arguments) -> CallbackResult + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Function::new(f));
    }

    pub fn filter(&self, name: &str) -> Option<&Filter> {
        self.filters.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Resolve a call site with `arg_count` arguments.
    ///
    /// Registered functions win; otherwise a filter of the same name is
    /// promoted when the call passes exactly one argument.
    pub fn resolve_function(&self, name: &str, arg_count: usize) -> Option<Function> {
        if let Some(function) = self.functions.get(name) {
            return Some(function.clone());
        }
        if arg_count == 1 {
            return self.filters.get(name).map(Filter::to_function);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_filter("double", |v| {
            Ok(json!(v.as_i64().ok_or("not an integer")? * 2))
        });
        registry.register_function("count", |args| Ok(json!(args.len())));
        registry
    }

    #[test]
    fn filter_applies_to_value() {
        let registry = registry();
        let out = registry.filter("double").expect("filter").apply(json!(21));
        assert_eq!(out.expect("apply"), json!(42));
    }

    #[test]
    fn filter_error_is_returned() {
        let registry = registry();
        let err = registry
            .filter("double")
            .expect("filter")
            .apply(json!("x"))
            .unwrap_err();
        assert_eq!(err.to_string(), "not an integer");
    }

    #[test]
    fn function_takes_precedence_over_filter() {
        let mut registry = registry();
        registry.register_filter("count", |_| Ok(json!("filter")));
        let f = registry.resolve_function("count", 1).expect("resolve");
        assert_eq!(f.call(Arguments::Scalar(json!(1))).expect("call"), json!(1));
    }

    #[test]
    fn filter_promotes_only_for_single_argument() {
        let registry = registry();
        let f = registry.resolve_function("double", 1).expect("promoted");
        assert_eq!(f.call(Arguments::Scalar(json!(4))).expect("call"), json!(8));
        assert!(registry.resolve_function("double", 0).is_none());
        assert!(registry.resolve_function("double", 2).is_none());
        assert!(registry.resolve_function("missing", 1).is_none());
    }

    #[test]
    fn promoted_filter_takes_named_argument_value() {
        let registry = registry();
        let f = registry.resolve_function("double", 1).expect("promoted");
        let mut named = Map::new();
        named.insert("n".into(), json!(5));
        assert_eq!(f.call(Arguments::Named(named)).expect("call"), json!(10));
    }

    #[test]
    fn into_single_defaults_to_null() {
        assert_eq!(Arguments::List(vec![]).into_single(), Value::Null);
        assert_eq!(Arguments::Named(Map::new()).into_single(), Value::Null);
        assert_eq!(
            Arguments::List(vec![json!(1), json!(2)]).into_single(),
            json!(1)
        );
    }
}
