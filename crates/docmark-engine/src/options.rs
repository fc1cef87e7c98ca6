use serde::{Deserialize, Serialize};

use crate::token::TokenizeOptions;

/// What to do with a node whose `type` is not one of the four known variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownNodePolicy {
    /// Fail the whole render with `RenderError::UnknownNodeType`.
    Reject,
    /// Drop the node and log a warning.
    Skip,
}

impl Default for UnknownNodePolicy {
    /// Loud in debug builds, lenient in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Reject
        } else {
            Self::Skip
        }
    }
}

/// Knobs for the markdown pipeline. Every field has a default so partial
/// config files deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Visible content of the anchor appended to every heading.
    pub anchor_glyph: String,
    /// `class` attribute of the heading anchor.
    pub anchor_class: String,
    /// Turn bare `http(s)://` URLs in text into links.
    pub linkify: bool,
    pub unknown_nodes: UnknownNodePolicy,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            anchor_glyph: "#".to_string(),
            anchor_class: "doc-header_link".to_string(),
            linkify: true,
            unknown_nodes: UnknownNodePolicy::default(),
        }
    }
}

impl RenderOptions {
    pub fn tokenize_options(&self) -> TokenizeOptions {
        TokenizeOptions {
            linkify: self.linkify,
        }
    }
}
