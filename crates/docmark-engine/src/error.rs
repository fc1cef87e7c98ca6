use thiserror::Error;

/// Failures while nesting a flat token stream into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Closing tag </{found}> does not match open tag <{expected}>")]
    MismatchedClose { expected: String, found: String },

    #[error("Closing tag </{found}> has no matching open tag")]
    UnexpectedClose { found: String },

    #[error("Tag <{tag_name}> was never closed")]
    Unclosed { tag_name: String },
}

/// Failures of a single render call. None of them leave a partial result.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Malformed tree: {0}")]
    Structural(String),

    #[error("Unknown node type: {type_name}")]
    UnknownNodeType { type_name: String },

    #[error("Failed to build tree: {0}")]
    Tree(#[from] TreeError),

    #[error("Invalid tree JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    pub(crate) fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }
}
