//! Template and context files from disk.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use hulma_renderer::Engine;

/// Register one template file.
///
/// `.json` files are persisted documents and carry their own name; any other
/// file is markup registered under its file stem.
pub fn add_template_file(engine: &mut Engine, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read template {}", path.display()))?;

    if has_extension(path, &["json"]) {
        engine
            .add_json(&text)
            .with_context(|| format!("invalid template document {}", path.display()))?;
    } else {
        let name = template_name(path)?;
        engine
            .add_source(name, &text)
            .with_context(|| format!("invalid template {}", path.display()))?;
    }
    Ok(())
}

pub fn template_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a template name from {}", path.display()))
}

/// Load the render context from a JSON or YAML file (by extension).
pub fn load_data(path: &Path) -> Result<Map<String, Value>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read data {}", path.display()))?;

    let value: Value = if has_extension(path, &["yaml", "yml"]) {
        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in {}", path.display()))?
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => bail!("data in {} must be an object at the top level", path.display()),
    }
}

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| wanted.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}
