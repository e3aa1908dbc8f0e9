//! [`Engine`]: templates plus host callbacks behind one handle.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use hulma_core::{Template, TemplateDocument};

use crate::error::RenderError;
use crate::registry::{Arguments, CallbackResult, Registry};
use crate::sink::{Renderer, StringRenderer};
use crate::store::{TemplateStore, DEFAULT_MAX_INCLUDE_DEPTH};

/// Version recorded for templates compiled from markup.
pub const SOURCE_VERSION: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest include chain a render may build, counting the entry template.
    pub max_include_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

#[derive(Debug, Default)]
pub struct Engine {
    config: EngineConfig,
    store: TemplateStore,
    registry: Registry,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Engine {
            config,
            store: TemplateStore::with_max_include_depth(config.max_include_depth),
            registry: Registry::new(),
        }
    }

    pub fn register_filter<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Value) -> CallbackResult + Send + Sync + 'static,
    {
        self.registry.register_filter(name, f);
        self
    }

    pub fn register_function<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Arguments) -> CallbackResult + Send + Sync + 'static,
    {
        self.registry.register_function(name, f);
        self
    }

    pub fn add_template(&mut self, template: Template) -> Result<(), RenderError> {
        self.store.add(template)?;
        Ok(())
    }

    /// Parse markup and register it as `name`.
    pub fn add_source(&mut self, name: impl Into<String>, source: &str) -> Result<(), RenderError> {
        let root = hulma_parser::parse(source)?;
        self.add_template(Template::new(name, SOURCE_VERSION, root))
    }

    /// Decode a persisted template document and register it.
    pub fn add_json(&mut self, json: &str) -> Result<(), RenderError> {
        let document: TemplateDocument = serde_json::from_str(json)?;
        self.add_template(Template::try_from(document)?)
    }

    pub fn render(&self, name: &str, data: &Map<String, Value>) -> Result<String, RenderError> {
        let mut out = StringRenderer::new();
        self.render_to(name, data, &mut out)?;
        Ok(out.into_string())
    }

    pub fn render_to(
        &self,
        name: &str,
        data: &Map<String, Value>,
        out: &mut dyn Renderer,
    ) -> Result<(), RenderError> {
        self.store.render(name, data, &self.registry, out)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_defaults_when_fields_missing() {
        let config: EngineConfig = serde_json::from_str("{}").expect("decode");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_include_depth, 64);
    }

    #[test]
    fn add_source_then_render() {
        let mut engine = Engine::new();
        engine.add_source("hello", "Hello {{ name }}!").expect("add");
        let mut data = Map::new();
        data.insert("name".into(), json!("World"));
        assert_eq!(engine.render("hello", &data).expect("render"), "Hello World!");
        assert_eq!(engine.store().get("hello").map(|t| t.version.as_str()), Some("1"));
    }

    #[test]
    fn add_json_keeps_node_errors_typed() {
        let mut engine = Engine::new();
        let err = engine
            .add_json(r#"{"name":"t","root_node":{"Type":"display"}}"#)
            .unwrap_err();
        assert!(matches!(err, RenderError::Node(_)), "got: {err}");

        let err = engine.add_json("{not json").unwrap_err();
        assert!(matches!(err, RenderError::Json(_)), "got: {err}");
    }

    #[test]
    fn parse_errors_surface_from_add_source() {
        let err = Engine::new().add_source("t", "{{ name").unwrap_err();
        assert!(matches!(err, RenderError::Parse(_)), "got: {err}");
    }
}
