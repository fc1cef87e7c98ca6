//! # Document Tree
//!
//! The nested, typed form of a parsed document: the output of the token-tree
//! builder and the input of the renderer.
//!
//! ## Modules
//!
//! - **`builder`**: `TreeBuilder` nests a flat `Token` stream into `TreeNode`s
//! - **`json`**: reads and writes the JSON form of a tree
//!
//! ## Key Invariants
//!
//! - Children are owned, so every subtree is finite and acyclic
//! - Children keep document order
//! - `Code` content is stored untrimmed; trimming is the renderer's job

pub mod builder;
pub mod json;

use serde::Serialize;

use crate::token::Attrs;

pub use builder::{TreeBuilder, build_tree};

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    /// An element with ordered children.
    Tag(TagNode),
    /// Raw text from the source, never re-parsed as markup.
    Text { content: String },
    /// A line break inside a paragraph.
    SoftBreak,
    /// A fenced or indented code block.
    Code {
        content: String,
        language: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagNode {
    pub tag_name: String,
    pub attrs: Attrs,
    pub children: Vec<TreeNode>,
}

impl TagNode {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    /// `h1`..`h6`, matched exactly.
    pub fn is_heading(&self) -> bool {
        matches!(
            self.tag_name.as_str(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        )
    }
}

impl TreeNode {
    pub fn tag(tag_name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self::Tag(TagNode::new(tag_name).with_children(children))
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn code(content: impl Into<String>, language: Option<&str>) -> Self {
        Self::Code {
            content: content.into(),
            language: language.map(str::to_string),
        }
    }
}

impl From<TagNode> for TreeNode {
    fn from(tag: TagNode) -> Self {
        Self::Tag(tag)
    }
}
