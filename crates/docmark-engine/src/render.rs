//! # Tree Renderer
//!
//! Walks a document tree and produces [`OutputNode`]s. Dispatch is a plain
//! `match` over the four [`TreeNode`] variants:
//!
//! - **Text** becomes a text node holding the raw content
//! - **SoftBreak** becomes a text node holding `"\n"`
//! - **Code** becomes a code block with trimmed content and the language hint
//! - **Tag** becomes an element after its children are rendered in order
//!
//! Headings (`h1`..`h6`) additionally get an anchor: the slug of their text
//! is merged into the `id` attribute and a link to `#<slug>` is appended as
//! the last child.
//!
//! Rendering is pure. The only positional data, the element `key`, is the
//! index among siblings, so rendering the same tree twice gives equal output.

use crate::error::RenderError;
use crate::options::RenderOptions;
use crate::output::{Element, OutputNode};
use crate::slug::heading_slug;
use crate::token::Attrs;
use crate::tree::{TagNode, TreeNode};

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render top-level nodes into a single root.
    ///
    /// One node is returned as is. Several nodes are wrapped in an
    /// [`OutputNode::Container`]. An empty tree gives an empty container.
    pub fn render(&self, tree: &[TreeNode]) -> Result<OutputNode, RenderError> {
        let mut rendered = self.render_nodes(tree)?;
        if rendered.len() == 1
            && let Some(root) = rendered.pop()
        {
            return Ok(root);
        }
        log::debug!("wrapping {} top-level nodes in a container", rendered.len());
        Ok(OutputNode::Container { children: rendered })
    }

    fn render_nodes(&self, nodes: &[TreeNode]) -> Result<Vec<OutputNode>, RenderError> {
        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| self.render_node(node, index))
            .collect()
    }

    fn render_node(&self, node: &TreeNode, index: usize) -> Result<OutputNode, RenderError> {
        match node {
            TreeNode::Text { content } => Ok(OutputNode::text(content.as_str())),
            TreeNode::SoftBreak => Ok(OutputNode::text("\n")),
            TreeNode::Code { content, language } => Ok(OutputNode::CodeBlock {
                content: content.trim().to_string(),
                language: language.clone(),
            }),
            TreeNode::Tag(tag) => self.render_tag(tag, index),
        }
    }

    fn render_tag(&self, tag: &TagNode, index: usize) -> Result<OutputNode, RenderError> {
        validate_tag_name(&tag.tag_name)?;
        for name in tag.attrs.keys() {
            validate_attr_name(name)?;
        }

        let mut attrs = tag.attrs.clone();
        let mut children = self.render_nodes(&tag.children)?;

        if tag.is_heading() {
            let slug = heading_slug(tag);
            merge_anchor_id(&mut attrs, &slug);
            children.push(self.heading_anchor(&slug));
        }

        Ok(OutputNode::Element(Element {
            tag_name: tag.tag_name.clone(),
            key: Some(index),
            attrs,
            children,
        }))
    }

    fn heading_anchor(&self, slug: &str) -> OutputNode {
        let mut attrs = Attrs::new();
        attrs.insert("href".to_string(), format!("#{slug}"));
        if !self.options.anchor_class.is_empty() {
            attrs.insert("class".to_string(), self.options.anchor_class.clone());
        }
        OutputNode::Element(Element {
            tag_name: "a".to_string(),
            key: None,
            attrs,
            children: vec![OutputNode::text(self.options.anchor_glyph.as_str())],
        })
    }
}

/// Render with default options.
pub fn render(tree: &[TreeNode]) -> Result<OutputNode, RenderError> {
    Renderer::default().render(tree)
}

/// Set a heading's `id` to its slug. The slug always wins over an `id` the
/// tree already carried; the replaced value is returned.
pub fn merge_anchor_id(attrs: &mut Attrs, slug: &str) -> Option<String> {
    let previous = attrs.insert("id".to_string(), slug.to_string());
    if let Some(previous) = &previous
        && previous != slug
    {
        log::debug!("heading id `{previous}` replaced by slug `{slug}`");
    }
    previous
}

/// Attribute names must start with an ASCII letter and continue with ASCII
/// letters, digits, `-`, `_` or `:`.
fn validate_attr_name(name: &str) -> Result<(), RenderError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'));
    if valid {
        Ok(())
    } else {
        Err(RenderError::structural(format!(
            "invalid attribute name `{name}`"
        )))
    }
}

/// Element names must start with an ASCII letter and continue with ASCII
/// letters, digits or `-`.
fn validate_tag_name(name: &str) -> Result<(), RenderError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RenderError::structural(format!(
            "invalid tag name `{name}`"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(node: &OutputNode) -> &Element {
        node.as_element().expect("expected an element")
    }

    #[test]
    fn test_text_is_raw() {
        let out = render(&[TreeNode::text("<b>not markup</b>")]).unwrap();
        assert_eq!(out, OutputNode::text("<b>not markup</b>"));
    }

    #[test]
    fn test_soft_break_is_newline() {
        let out = render(&[TreeNode::SoftBreak]).unwrap();
        assert_eq!(out, OutputNode::text("\n"));
    }

    #[test]
    fn test_code_is_trimmed() {
        let out = render(&[TreeNode::code("\n  print(1)\n  ", Some("python"))]).unwrap();
        assert_eq!(
            out,
            OutputNode::CodeBlock {
                content: "print(1)".to_string(),
                language: Some("python".to_string()),
            }
        );

        let out = render(&[TreeNode::code("  x  ", None)]).unwrap();
        assert_eq!(
            out,
            OutputNode::CodeBlock {
                content: "x".to_string(),
                language: None,
            }
        );
    }

    #[test]
    fn test_tag_keeps_attrs_and_child_keys() {
        let tree = [TreeNode::Tag(
            TagNode::new("ul").with_attr("class", "list").with_children(vec![
                TreeNode::tag("li", vec![TreeNode::text("a")]),
                TreeNode::tag("li", vec![TreeNode::text("b")]),
            ]),
        )];

        let out = render(&tree).unwrap();
        let list = element(&out);
        assert_eq!(list.tag_name, "ul");
        assert_eq!(list.key, Some(0));
        assert_eq!(list.attr("class"), Some("list"));

        let keys: Vec<_> = list.children.iter().map(|c| element(c).key).collect();
        assert_eq!(keys, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_heading_gets_id_and_trailing_anchor() {
        let tree = [TreeNode::tag(
            "h2",
            vec![TreeNode::text("Getting Started")],
        )];

        let out = render(&tree).unwrap();
        let heading = element(&out);
        assert_eq!(heading.attr("id"), Some("getting-started"));
        assert_eq!(heading.children.len(), 2);
        assert_eq!(heading.children[0], OutputNode::text("Getting Started"));

        let anchor = element(&heading.children[1]);
        assert_eq!(anchor.tag_name, "a");
        assert_eq!(anchor.attr("href"), Some("#getting-started"));
        assert_eq!(anchor.attr("class"), Some("doc-header_link"));
        assert_eq!(anchor.children, vec![OutputNode::text("#")]);
    }

    #[test]
    fn test_slug_overrides_existing_id() {
        let tree = [TreeNode::Tag(
            TagNode::new("h1")
                .with_attr("id", "custom")
                .with_children(vec![TreeNode::text("Intro")]),
        )];

        let out = render(&tree).unwrap();
        assert_eq!(element(&out).attr("id"), Some("intro"));
    }

    #[test]
    fn test_non_heading_has_no_anchor() {
        for name in ["h7", "H2", "header", "p"] {
            let out = render(&[TreeNode::tag(name, vec![TreeNode::text("x")])]).unwrap();
            let el = element(&out);
            assert_eq!(el.attr("id"), None, "{name} should not get an id");
            assert_eq!(el.children.len(), 1);
        }
    }

    #[test]
    fn test_custom_anchor_options() {
        let renderer = Renderer::new(RenderOptions {
            anchor_glyph: "¶".to_string(),
            anchor_class: String::new(),
            ..RenderOptions::default()
        });

        let out = renderer
            .render(&[TreeNode::tag("h3", vec![TreeNode::text("Notes")])])
            .unwrap();
        let anchor = element(&element(&out).children[1]);
        assert_eq!(anchor.attr("class"), None);
        assert_eq!(anchor.children, vec![OutputNode::text("¶")]);
    }

    #[test]
    fn test_single_root_unwrapped() {
        let out = render(&[TreeNode::tag("p", vec![])]).unwrap();
        assert!(matches!(out, OutputNode::Element(_)));
    }

    #[test]
    fn test_multiple_roots_wrapped() {
        let out = render(&[TreeNode::tag("p", vec![]), TreeNode::text("x")]).unwrap();

        let OutputNode::Container { children } = out else {
            panic!("expected container");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(element(&children[0]).key, Some(0));
        assert_eq!(children[1], OutputNode::text("x"));
    }

    #[test]
    fn test_empty_tree_is_empty_container() {
        let out = render(&[]).unwrap();
        assert_eq!(out, OutputNode::Container { children: vec![] });
    }

    #[test]
    fn test_invalid_tag_name_is_structural() {
        for name in ["", "1p", "a b", "<p>"] {
            let result = render(&[TreeNode::tag(
                "div",
                vec![TreeNode::tag(name, vec![])],
            )]);
            assert!(
                matches!(result, Err(RenderError::Structural(_))),
                "expected structural error for {name:?}"
            );
        }
    }

    #[test]
    fn test_invalid_attr_name_is_structural() {
        let names = [
            "",
            "x><script>alert(1)</script><i",
            "a b",
            "on\"click",
            "x=y",
            "data/x",
            "'q'",
        ];
        for name in names {
            let result = render(&[TreeNode::Tag(TagNode::new("p").with_attr(name, "v"))]);
            assert!(
                matches!(result, Err(RenderError::Structural(_))),
                "expected structural error for {name:?}"
            );
        }
    }

    #[test]
    fn test_valid_attr_names_pass() {
        let tree = [TreeNode::Tag(
            TagNode::new("svg")
                .with_attr("data-id", "1")
                .with_attr("xlink:href", "#a")
                .with_attr("aria_label", "x"),
        )];

        let out = render(&tree).unwrap();
        assert_eq!(element(&out).attrs.len(), 3);
    }

    #[test]
    fn test_merge_anchor_id_returns_replaced() {
        let mut attrs = Attrs::new();
        assert_eq!(merge_anchor_id(&mut attrs, "a"), None);
        assert_eq!(merge_anchor_id(&mut attrs, "b"), Some("a".to_string()));
        assert_eq!(attrs.get("id").map(String::as_str), Some("b"));
    }
}
