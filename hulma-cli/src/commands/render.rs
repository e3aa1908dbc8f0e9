//! `hulma render` — register templates and render one of them.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Map;

use hulma_renderer::{Engine, EngineConfig, WriterRenderer, DEFAULT_MAX_INCLUDE_DEPTH};

use crate::{builtins, loader};

/// Output target meaning "write to standard output".
const STDOUT: &str = "stdout";

/// Arguments for `hulma render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template file to register (repeatable). `.json` files are persisted
    /// documents; anything else is markup named by its file stem.
    #[arg(long = "template", value_name = "PATH")]
    pub templates: Vec<PathBuf>,

    /// Persisted template document given inline (repeatable).
    #[arg(long, alias = "templateData", value_name = "JSON")]
    pub template_data: Vec<String>,

    /// JSON or YAML file holding the render context.
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Name of the template to render.
    #[arg(long, default_value = "default")]
    pub name: String,

    /// File to write, or `stdout`.
    #[arg(short, long, default_value = STDOUT)]
    pub output: String,

    /// Longest include chain allowed, counting the rendered template.
    #[arg(long, default_value_t = DEFAULT_MAX_INCLUDE_DEPTH)]
    pub max_include_depth: usize,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        if self.templates.is_empty() && self.template_data.is_empty() {
            bail!("no templates given; pass --template or --template-data");
        }

        let mut engine = Engine::with_config(EngineConfig {
            max_include_depth: self.max_include_depth,
        });
        builtins::register(&mut engine);

        for path in &self.templates {
            loader::add_template_file(&mut engine, path)?;
        }
        for (index, json) in self.template_data.iter().enumerate() {
            engine
                .add_json(json)
                .with_context(|| format!("invalid --template-data #{}", index + 1))?;
        }

        let data = match &self.data {
            Some(path) => loader::load_data(path)?,
            None => Map::new(),
        };
        tracing::debug!(
            templates = engine.store().len(),
            name = %self.name,
            "rendering"
        );

        if self.output == STDOUT {
            let mut sink = WriterRenderer::new(io::stdout().lock());
            engine
                .render_to(&self.name, &data, &mut sink)
                .with_context(|| format!("failed to render '{}'", self.name))?;
            sink.into_inner().flush().context("failed to flush stdout")?;
            return Ok(());
        }

        let rendered = engine
            .render(&self.name, &data)
            .with_context(|| format!("failed to render '{}'", self.name))?;
        let path = PathBuf::from(&self.output);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{} saved to {}", "✓".green(), path.display());
        Ok(())
    }
}
