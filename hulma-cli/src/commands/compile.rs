//! `hulma compile` — markup to persisted template document.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hulma_core::{Template, TemplateDocument};
use hulma_renderer::engine::SOURCE_VERSION;

use crate::loader;

/// Arguments for `hulma compile`.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Markup template to compile.
    pub path: PathBuf,

    /// Name stored in the document (defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,

    /// Write the document to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl CompileArgs {
    pub fn run(self) -> Result<()> {
        let source = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let root = hulma_parser::parse(&source)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;

        let name = match self.name {
            Some(name) => name,
            None => loader::template_name(&self.path)?,
        };
        let document = TemplateDocument::from(Template::new(name, SOURCE_VERSION, root));
        let json = serde_json::to_string_pretty(&document).context("failed to encode document")?;

        match self.output {
            Some(path) => {
                fs::write(&path, json + "\n")
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("{} saved to {}", "✓".green(), path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}
