//! Output sinks for rendered values.

use std::borrow::Cow;
use std::io;

use serde_json::Value;

/// Receives every value a template emits, in document order.
pub trait Renderer {
    fn write(&mut self, value: &Value) -> io::Result<()>;

    /// Emit raw template text.
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.write(&Value::String(text.to_owned()))
    }
}

/// Textual form of a value: strings verbatim, null as nothing, anything else
/// as compact JSON.
pub fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Accumulates output in memory.
#[derive(Debug, Default)]
pub struct StringRenderer {
    buffer: String,
}

impl StringRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl Renderer for StringRenderer {
    fn write(&mut self, value: &Value) -> io::Result<()> {
        self.buffer.push_str(&stringify(value));
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }
}

/// Streams output to any [`io::Write`].
#[derive(Debug)]
pub struct WriterRenderer<W: io::Write> {
    writer: W,
}

impl<W: io::Write> WriterRenderer<W> {
    pub fn new(writer: W) -> Self {
        WriterRenderer { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Renderer for WriterRenderer<W> {
    fn write(&mut self, value: &Value) -> io::Result<()> {
        self.writer.write_all(stringify(value).as_bytes())
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("text"), "text")]
    #[case(json!(null), "")]
    #[case(json!(true), "true")]
    #[case(json!(42), "42")]
    #[case(json!(1.5), "1.5")]
    #[case(json!([1, "a"]), "[1,\"a\"]")]
    #[case(json!({"k": 1}), "{\"k\":1}")]
    fn stringify_values(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(stringify(&value), expected);
    }

    #[test]
    fn string_renderer_concatenates() {
        let mut out = StringRenderer::new();
        out.write_str("n = ").expect("write");
        out.write(&json!(3)).expect("write");
        assert_eq!(out.into_string(), "n = 3");
    }

    #[test]
    fn writer_renderer_streams_bytes() {
        let mut out = WriterRenderer::new(Vec::new());
        out.write(&json!("é")).expect("write");
        out.write_str("!").expect("write");
        assert_eq!(out.into_inner(), "é!".as_bytes());
    }
}
