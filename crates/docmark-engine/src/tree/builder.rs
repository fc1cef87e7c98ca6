use crate::error::TreeError;
use crate::token::{Attrs, Token};

use super::{TagNode, TreeNode};

/// A tag that has been opened but not yet closed.
#[derive(Debug)]
struct Frame {
    tag_name: String,
    attrs: Attrs,
    children: Vec<TreeNode>,
}

/// Nests a flat token stream into a tree.
///
/// Open tags push a frame; the matching close pops it and appends the
/// finished `Tag` to whatever is now innermost. Adjacent text tokens are
/// merged into one `Text` node, since the grammar parser is free to split a
/// run of text wherever it likes.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<Frame>,
    out: Vec<TreeNode>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) -> Result<(), TreeError> {
        match token {
            Token::Open { tag_name, attrs } => self.stack.push(Frame {
                tag_name,
                attrs,
                children: Vec::new(),
            }),
            Token::Close { tag_name } => {
                let Some(frame) = self.stack.pop() else {
                    return Err(TreeError::UnexpectedClose { found: tag_name });
                };
                if frame.tag_name != tag_name {
                    return Err(TreeError::MismatchedClose {
                        expected: frame.tag_name,
                        found: tag_name,
                    });
                }
                self.append(TreeNode::Tag(TagNode {
                    tag_name: frame.tag_name,
                    attrs: frame.attrs,
                    children: frame.children,
                }));
            }
            Token::Text(content) => self.append_text(content),
            Token::SoftBreak => self.append(TreeNode::SoftBreak),
            Token::Code { content, language } => {
                self.append(TreeNode::Code { content, language })
            }
        }
        Ok(())
    }

    /// Top-level nodes in document order. Fails if any tag is still open.
    pub fn finish(self) -> Result<Vec<TreeNode>, TreeError> {
        if let Some(frame) = self.stack.last() {
            return Err(TreeError::Unclosed {
                tag_name: frame.tag_name.clone(),
            });
        }
        Ok(self.out)
    }

    fn siblings(&mut self) -> &mut Vec<TreeNode> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.out,
        }
    }

    fn append(&mut self, node: TreeNode) {
        self.siblings().push(node);
    }

    fn append_text(&mut self, content: String) {
        if content.is_empty() {
            return;
        }
        let siblings = self.siblings();
        if let Some(TreeNode::Text { content: previous }) = siblings.last_mut() {
            previous.push_str(&content);
        } else {
            siblings.push(TreeNode::Text { content });
        }
    }
}

/// Build a tree from a whole token stream.
pub fn build_tree(tokens: impl IntoIterator<Item = Token>) -> Result<Vec<TreeNode>, TreeError> {
    let mut builder = TreeBuilder::new();
    for token in tokens {
        builder.push(token)?;
    }
    builder.finish()
}
