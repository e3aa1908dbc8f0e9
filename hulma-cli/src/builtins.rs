//! Host callbacks every CLI render gets.

use serde_json::Value;

use hulma_renderer::{stringify, Arguments, CallbackResult, Engine};

pub fn register(engine: &mut Engine) {
    engine
        .register_filter("upper", |v| map_text(&v, str::to_uppercase))
        .register_filter("lower", |v| map_text(&v, str::to_lowercase))
        .register_filter("trim", |v| map_text(&v, |s| s.trim().to_string()))
        .register_function("concat", concat);
}

fn map_text(value: &Value, f: impl Fn(&str) -> String) -> CallbackResult {
    Ok(Value::String(f(&stringify(value))))
}

fn concat(args: Arguments) -> CallbackResult {
    let joined: String = args
        .into_values()
        .iter()
        .map(|v| stringify(v).into_owned())
        .collect();
    Ok(Value::String(joined))
}
