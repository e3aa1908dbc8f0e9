//! Per-render state threaded through evaluation.

use serde_json::{Map, Value};

use hulma_core::{BlockMap, Node};

use crate::error::RenderError;
use crate::registry::Registry;
use crate::store::TemplateStore;

/// Everything a render needs besides the node being evaluated.
///
/// Variable lookup searches scope frames innermost-first, then the caller's
/// data. The outermost frame holds assignments and lives for the whole
/// render, so a value assigned inside a loop body stays visible after it.
pub struct RenderContext<'a> {
    data: &'a Map<String, Value>,
    frames: Vec<Map<String, Value>>,
    blocks: &'a BlockMap,
    registry: &'a Registry,
    store: &'a TemplateStore,
    includes: Vec<String>,
    yields: Vec<String>,
    max_include_depth: usize,
}

impl<'a> RenderContext<'a> {
    /// Fresh state for rendering the template `entry`, whose block map is
    /// `blocks`. [`TemplateStore::render`] builds one of these per call.
    pub fn new(
        entry: &str,
        data: &'a Map<String, Value>,
        blocks: &'a BlockMap,
        registry: &'a Registry,
        store: &'a TemplateStore,
    ) -> Self {
        RenderContext {
            data,
            frames: vec![Map::new()],
            blocks,
            registry,
            store,
            includes: vec![entry.to_string()],
            yields: Vec::new(),
            max_include_depth: store.max_include_depth(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .or_else(|| self.data.get(name))
    }

    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        if let Some(root) = self.frames.first_mut() {
            root.insert(name.into(), value);
        }
    }

    pub(crate) fn push_frame(&mut self, frame: Map<String, Value>) {
        self.frames.push(frame);
    }

    pub(crate) fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Override content for `name` from the entry template's block map.
    pub fn block(&self, name: &str) -> Option<&'a [Node]> {
        self.blocks.get(name).map(Vec::as_slice)
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn store(&self) -> &'a TemplateStore {
        self.store
    }

    /// Names of the templates currently being rendered, outermost first.
    pub fn include_chain(&self) -> &[String] {
        &self.includes
    }

    pub(crate) fn enter_include(&mut self, name: &str) -> Result<(), RenderError> {
        if self.includes.iter().any(|active| active == name) {
            let mut chain = self.includes.clone();
            chain.push(name.to_string());
            return Err(RenderError::CircularInclude { chain });
        }
        if self.includes.len() >= self.max_include_depth {
            return Err(RenderError::IncludeDepthExceeded {
                limit: self.max_include_depth,
            });
        }
        self.includes.push(name.to_string());
        Ok(())
    }

    pub(crate) fn leave_include(&mut self) {
        if self.includes.len() > 1 {
            self.includes.pop();
        }
    }

    /// Mark the block override for `name` as being expanded. An override
    /// may not yield itself, directly or through other overrides.
    pub(crate) fn enter_yield(&mut self, name: &str) -> Result<(), RenderError> {
        if self.yields.iter().any(|active| active == name) {
            let mut chain = self.yields.clone();
            chain.push(name.to_string());
            return Err(RenderError::RecursiveYield { chain });
        }
        self.yields.push(name.to_string());
        Ok(())
    }

    pub(crate) fn leave_yield(&mut self) {
        self.yields.pop();
    }
}
