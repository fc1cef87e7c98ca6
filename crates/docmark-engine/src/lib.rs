pub mod error;
pub mod html;
pub mod options;
pub mod output;
pub mod render;
pub mod slug;
pub mod token;
pub mod tree;

// Re-export key types for easier usage
pub use error::{RenderError, TreeError};
pub use html::{CodeHighlighter, HtmlWriter, PlainHighlighter, raw_source_fallback};
pub use options::{RenderOptions, UnknownNodePolicy};
pub use output::{Element, OutputNode};
pub use render::{Renderer, merge_anchor_id, render};
pub use slug::slugify;
pub use token::{Attrs, Token, TokenizeOptions, tokenize};
pub use tree::{TagNode, TreeBuilder, TreeNode, build_tree};

/// Parse markdown into a document tree.
pub fn parse_markdown(source: &str, options: &RenderOptions) -> Result<Vec<TreeNode>, RenderError> {
    let tokens = tokenize(source, &options.tokenize_options());
    Ok(build_tree(tokens)?)
}

/// Full pipeline: markdown source to a single output root.
///
/// Nothing is cached between calls; each call parses and renders from scratch.
pub fn render_markdown(source: &str, options: &RenderOptions) -> Result<OutputNode, RenderError> {
    let tree = parse_markdown(source, options)?;
    log::debug!("built tree with {} top-level nodes", tree.len());
    Renderer::new(options.clone()).render(&tree)
}

/// Full pipeline straight to HTML.
pub fn render_markdown_to_html(
    source: &str,
    options: &RenderOptions,
    highlighter: &dyn CodeHighlighter,
) -> Result<String, RenderError> {
    let root = render_markdown(source, options)?;
    Ok(HtmlWriter::new(highlighter).write(&root))
}
