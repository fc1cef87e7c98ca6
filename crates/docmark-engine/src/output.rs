use serde::Serialize;

use crate::token::Attrs;

/// UI-ready node produced by the renderer.
///
/// Output nodes are built fresh by every render call and handed to the
/// caller; nothing inside the engine keeps a reference to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputNode {
    Element(Element),
    Text { text: String },
    /// A code block for the highlighter collaborator. `content` is trimmed.
    CodeBlock {
        content: String,
        language: Option<String>,
    },
    /// Untagged grouping root used when a document has several top-level nodes.
    Container { children: Vec<OutputNode> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag_name: String,
    /// Position among siblings. Stable for a given input tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<usize>,
    pub attrs: Attrs,
    pub children: Vec<OutputNode>,
}

impl OutputNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Self::Text { text } => out.push_str(text),
            Self::CodeBlock { content, .. } => out.push_str(content),
            Self::Element(Element { children, .. }) | Self::Container { children } => {
                for child in children {
                    child.push_text(out);
                }
            }
        }
    }
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}
