//! Anchor ids for headings.

use crate::tree::{TagNode, TreeNode};

/// Turn heading text into an anchor id.
///
/// Lowercases, replaces everything except ASCII letters, digits, `_` and `.`
/// with `-`, collapses runs of `-` and strips one from either end. Total over
/// all inputs; the result may be empty.
///
/// ```
/// use docmark_engine::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("v1.2 Release"), "v1.2-release");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            c
        } else {
            '-'
        };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let slug = slug.strip_prefix('-').unwrap_or(&slug);
    let slug = slug.strip_suffix('-').unwrap_or(slug);
    slug.to_string()
}

/// Text of every `Text` descendant in document order, joined with single
/// spaces. Code blocks, soft breaks and the tags themselves contribute
/// nothing.
pub fn heading_text(heading: &TagNode) -> String {
    let mut fragments = Vec::new();
    collect_text(&heading.children, &mut fragments);
    fragments.join(" ")
}

fn collect_text<'a>(nodes: &'a [TreeNode], fragments: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            TreeNode::Text { content } => fragments.push(content),
            TreeNode::Tag(tag) => collect_text(&tag.children, fragments),
            TreeNode::SoftBreak | TreeNode::Code { .. } => {}
        }
    }
}

/// Anchor id for a heading tag.
pub fn heading_slug(heading: &TagNode) -> String {
    slugify(&heading_text(heading))
}
