//! Named template registry and the render entry point.

use std::collections::HashMap;

use serde_json::{Map, Value};

use hulma_core::{NodeError, Template};

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::interpreter::evaluate;
use crate::registry::Registry;
use crate::sink::Renderer;

/// Default bound on nested includes, counting the entry template.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 64;

/// Templates keyed by name.
///
/// Registration takes `&mut self` and rendering `&self`, so a fully
/// populated store can be shared across threads for concurrent renders.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates: HashMap<String, Template>,
    max_include_depth: usize,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::with_max_include_depth(DEFAULT_MAX_INCLUDE_DEPTH)
    }

    pub fn with_max_include_depth(limit: usize) -> Self {
        TemplateStore {
            templates: HashMap::new(),
            max_include_depth: limit.max(1),
        }
    }

    pub fn max_include_depth(&self) -> usize {
        self.max_include_depth
    }

    /// Derive the template's block map and store it under its name,
    /// replacing any template already registered with that name.
    pub fn add(&mut self, mut template: Template) -> Result<(), NodeError> {
        template.scan_blocks()?;
        tracing::debug!(
            template = %template.name,
            version = %template.version,
            blocks = template.blocks().len(),
            "registered template"
        );
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Render `name` against `data`.
    ///
    /// The entry template's block map stays in force for every template it
    /// includes, which is how a child's blocks fill a layout's yields.
    pub fn render(
        &self,
        name: &str,
        data: &Map<String, Value>,
        registry: &Registry,
        out: &mut dyn Renderer,
    ) -> Result<(), RenderError> {
        let template = self
            .get(name)
            .ok_or_else(|| RenderError::UnknownTemplate(name.to_string()))?;
        tracing::debug!(template = name, "rendering template");

        let mut ctx = RenderContext::new(name, data, template.blocks(), registry, self);
        evaluate(&template.root, &mut ctx, out)
    }

    pub(crate) fn render_include(
        &self,
        name: &str,
        ctx: &mut RenderContext<'_>,
        out: &mut dyn Renderer,
    ) -> Result<(), RenderError> {
        let template = self
            .get(name)
            .ok_or_else(|| RenderError::UnknownTemplate(name.to_string()))?;
        ctx.enter_include(name)?;
        tracing::trace!(
            template = name,
            depth = ctx.include_chain().len(),
            "including template"
        );

        let result = evaluate(&template.root, ctx, out);
        ctx.leave_include();
        result
    }
}
