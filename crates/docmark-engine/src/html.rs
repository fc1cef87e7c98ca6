//! HTML serialization of rendered output.
//!
//! Code blocks are handed to a [`CodeHighlighter`], which owns their markup
//! entirely. Everything else is written here with text and attribute values
//! escaped by `html-escape`.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::output::{Element, OutputNode};

/// Presentation of code blocks, typically syntax highlighting.
pub trait CodeHighlighter: Send + Sync {
    /// Markup for one code block. `content` is already trimmed and
    /// `language` is the fence hint exactly as written.
    fn highlight(&self, content: &str, language: Option<&str>) -> String;
}

/// No highlighting: escaped content in `<pre><code>` with a
/// `language-*` class for client-side highlighters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl CodeHighlighter for PlainHighlighter {
    fn highlight(&self, content: &str, language: Option<&str>) -> String {
        let code_class = language
            .map(|l| format!("language-{l}"))
            .unwrap_or_else(|| "language-text".to_string());
        format!(
            "<pre><code class=\"{}\">{}</code></pre>",
            encode_double_quoted_attribute(&code_class),
            encode_text(content)
        )
    }
}

/// Elements written without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

pub struct HtmlWriter<'a> {
    highlighter: &'a dyn CodeHighlighter,
}

impl Default for HtmlWriter<'static> {
    fn default() -> Self {
        Self::new(&PlainHighlighter)
    }
}

impl<'a> HtmlWriter<'a> {
    pub fn new(highlighter: &'a dyn CodeHighlighter) -> Self {
        Self { highlighter }
    }

    pub fn write(&self, node: &OutputNode) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: &OutputNode, out: &mut String) {
        match node {
            OutputNode::Element(element) => self.write_element(element, out),
            OutputNode::Text { text } => out.push_str(&encode_text(text)),
            OutputNode::CodeBlock { content, language } => {
                out.push_str(&self.highlighter.highlight(content, language.as_deref()));
            }
            OutputNode::Container { children } => {
                out.push_str("<div>");
                for child in children {
                    self.write_node(child, out);
                }
                out.push_str("</div>");
            }
        }
    }

    fn write_element(&self, element: &Element, out: &mut String) {
        out.push('<');
        out.push_str(&element.tag_name);
        for (name, value) in &element.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&encode_double_quoted_attribute(value));
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
            return;
        }

        for child in &element.children {
            self.write_node(child, out);
        }
        out.push_str("</");
        out.push_str(&element.tag_name);
        out.push('>');
    }
}

/// Markup shown in place of a document that failed to render: the raw
/// source, escaped, in a `<pre>` block.
pub fn raw_source_fallback(source: &str) -> String {
    format!("<pre class=\"raw-source\">{}</pre>", encode_text(source))
}
