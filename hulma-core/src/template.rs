//! Named templates and their block maps.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::NodeError;
use crate::raw::RawNode;
use crate::types::{Block, Node};

/// Block name → override content, flattened across all nesting depths.
pub type BlockMap = HashMap<String, Vec<Node>>;

/// Persisted template document: `{"name", "version", "root_node"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub root_node: RawNode,
}

/// A parsed template plus the block map derived from it.
///
/// The block map is empty until [`Template::scan_blocks`] runs, which the
/// template store does on registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TemplateDocument", into = "TemplateDocument")]
pub struct Template {
    pub name: String,
    pub version: String,
    pub root: Node,
    blocks: BlockMap,
}

impl Template {
    pub fn new(name: impl Into<String>, version: impl Into<String>, root: Node) -> Self {
        Template {
            name: name.into(),
            version: version.into(),
            root,
            blocks: BlockMap::new(),
        }
    }

    pub fn blocks(&self) -> &BlockMap {
        &self.blocks
    }

    /// Rebuild the block map from the root's immediate children.
    ///
    /// Nested blocks are recorded before the block that contains them; a later
    /// block with an already-seen name replaces the earlier entry. A block
    /// whose direct parent carries the same name is rejected.
    pub fn scan_blocks(&mut self) -> Result<(), NodeError> {
        let mut blocks = BlockMap::new();
        for child in self.root.children() {
            if let Node::Block(block) = child {
                scan_block(block, None, &mut blocks)?;
            }
        }
        self.blocks = blocks;
        Ok(())
    }
}

fn scan_block(block: &Block, parent: Option<&str>, blocks: &mut BlockMap) -> Result<(), NodeError> {
    if parent == Some(block.name.as_str()) {
        return Err(NodeError::RecursiveBlock(block.name.clone()));
    }
    for child in &block.children {
        if let Node::Block(inner) = child {
            scan_block(inner, Some(&block.name), blocks)?;
        }
    }
    blocks.insert(block.name.clone(), block.children.clone());
    Ok(())
}

impl TryFrom<TemplateDocument> for Template {
    type Error = NodeError;

    fn try_from(doc: TemplateDocument) -> Result<Self, NodeError> {
        Ok(Template::new(doc.name, doc.version, Node::try_from(doc.root_node)?))
    }
}

impl From<&Template> for TemplateDocument {
    fn from(template: &Template) -> Self {
        TemplateDocument {
            name: template.name.clone(),
            version: template.version.clone(),
            root_node: RawNode::from(&template.root),
        }
    }
}

impl From<Template> for TemplateDocument {
    fn from(template: Template) -> Self {
        TemplateDocument::from(&template)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
