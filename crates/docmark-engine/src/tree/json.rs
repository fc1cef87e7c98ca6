//! JSON form of a document tree.
//!
//! ```json
//! {"type": "tag", "tagName": "h2", "attrs": {}, "children": [
//!   {"type": "text", "content": "Getting Started"}
//! ]}
//! ```
//!
//! Nodes are read from `serde_json::Value` by hand. An unrecognised `type`
//! goes through the [`UnknownNodePolicy`]; any other shape mismatch is a
//! structural error.

use serde_json::{Map, Value};

use crate::error::RenderError;
use crate::options::UnknownNodePolicy;
use crate::token::Attrs;

use super::{TagNode, TreeNode};

/// Parse a tree from JSON. The top level may be one node or an array of nodes.
pub fn parse_tree(source: &str, policy: UnknownNodePolicy) -> Result<Vec<TreeNode>, RenderError> {
    let value: Value = serde_json::from_str(source)?;
    match &value {
        Value::Array(items) => parse_nodes(items, policy, "$"),
        single => Ok(parse_node(single, policy, "$")?.into_iter().collect()),
    }
}

/// Pretty-printed JSON for a list of top-level nodes.
pub fn to_json(nodes: &[TreeNode]) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(nodes)?)
}

fn parse_nodes(
    items: &[Value],
    policy: UnknownNodePolicy,
    path: &str,
) -> Result<Vec<TreeNode>, RenderError> {
    let mut nodes = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if let Some(node) = parse_node(item, policy, &format!("{path}[{index}]"))? {
            nodes.push(node);
        }
    }
    Ok(nodes)
}

/// `Ok(None)` means the node was skipped under `UnknownNodePolicy::Skip`.
fn parse_node(
    value: &Value,
    policy: UnknownNodePolicy,
    path: &str,
) -> Result<Option<TreeNode>, RenderError> {
    let Some(object) = value.as_object() else {
        return Err(RenderError::structural(format!(
            "{path}: expected a node object"
        )));
    };
    let Some(kind) = object.get("type").and_then(Value::as_str) else {
        return Err(RenderError::structural(format!(
            "{path}: node has no string `type`"
        )));
    };

    let node = match kind {
        "tag" => TreeNode::Tag(TagNode {
            tag_name: string_field(object, "tagName", path)?,
            attrs: parse_attrs(object.get("attrs"), path)?,
            children: match object.get("children") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => {
                    parse_nodes(items, policy, &format!("{path}.children"))?
                }
                Some(_) => {
                    return Err(RenderError::structural(format!(
                        "{path}: `children` must be an array"
                    )));
                }
            },
        }),
        "text" => TreeNode::Text {
            content: string_field(object, "content", path)?,
        },
        "softbreak" => TreeNode::SoftBreak,
        "code" => TreeNode::Code {
            content: string_field(object, "content", path)?,
            language: match object.get("language") {
                None | Some(Value::Null) => None,
                Some(Value::String(language)) => Some(language.clone()),
                Some(_) => {
                    return Err(RenderError::structural(format!(
                        "{path}: `language` must be a string or null"
                    )));
                }
            },
        },
        other => {
            return match policy {
                UnknownNodePolicy::Reject => Err(RenderError::UnknownNodeType {
                    type_name: other.to_string(),
                }),
                UnknownNodePolicy::Skip => {
                    log::warn!("Skipping node of unknown type `{other}` at {path}");
                    Ok(None)
                }
            };
        }
    };
    Ok(Some(node))
}

fn string_field(object: &Map<String, Value>, field: &str, path: &str) -> Result<String, RenderError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RenderError::structural(format!("{path}: `{field}` must be a string")))
}

fn parse_attrs(value: Option<&Value>, path: &str) -> Result<Attrs, RenderError> {
    let object = match value {
        None | Some(Value::Null) => return Ok(Attrs::new()),
        Some(Value::Object(object)) => object,
        Some(_) => {
            return Err(RenderError::structural(format!(
                "{path}: `attrs` must be an object"
            )));
        }
    };

    let mut attrs = Attrs::new();
    for (name, value) in object {
        let Some(value) = value.as_str() else {
            return Err(RenderError::structural(format!(
                "{path}: attribute `{name}` must be a string"
            )));
        };
        attrs.insert(name.clone(), value.to_string());
    }
    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_single_node() {
        let tree = parse_tree(
            r#"{"type": "tag", "tagName": "h2", "children": [{"type": "text", "content": "Getting Started"}]}"#,
            UnknownNodePolicy::Reject,
        )
        .unwrap();

        assert_eq!(
            tree,
            vec![TreeNode::tag("h2", vec![TreeNode::text("Getting Started")])]
        );
    }

    #[test]
    fn test_parse_array_of_nodes() {
        let tree = parse_tree(
            r#"[
                {"type": "code", "content": "x", "language": "rust"},
                {"type": "code", "content": "y", "language": null},
                {"type": "softbreak"},
                {"type": "tag", "tagName": "a", "attrs": {"href": "/x"}, "children": []}
            ]"#,
            UnknownNodePolicy::Reject,
        )
        .unwrap();

        assert_eq!(
            tree,
            vec![
                TreeNode::code("x", Some("rust")),
                TreeNode::code("y", None),
                TreeNode::SoftBreak,
                TreeNode::Tag(TagNode::new("a").with_attr("href", "/x")),
            ]
        );
    }

    #[test]
    fn test_round_trips_through_to_json() {
        let tree = vec![
            TreeNode::Tag(
                TagNode::new("p")
                    .with_attr("class", "note")
                    .with_children(vec![TreeNode::text("a"), TreeNode::SoftBreak]),
            ),
            TreeNode::code(" fn main() {} ", Some("rust")),
        ];

        let json = to_json(&tree).unwrap();
        assert_eq!(parse_tree(&json, UnknownNodePolicy::Reject).unwrap(), tree);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = parse_tree(
            r#"[{"type": "tag", "tagName": "p", "children": [{"type": "emoji", "name": "smile"}]}]"#,
            UnknownNodePolicy::Reject,
        )
        .unwrap_err();

        assert!(
            matches!(err, RenderError::UnknownNodeType { ref type_name } if type_name == "emoji"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_unknown_type_skipped() {
        let tree = parse_tree(
            r#"[{"type": "tag", "tagName": "p", "children": [
                {"type": "text", "content": "a"},
                {"type": "emoji"},
                {"type": "text", "content": "b"}
            ]}]"#,
            UnknownNodePolicy::Skip,
        )
        .unwrap();

        assert_eq!(
            tree,
            vec![TreeNode::tag(
                "p",
                vec![TreeNode::text("a"), TreeNode::text("b")]
            )]
        );
    }

    #[test]
    fn test_payload_mismatch_is_structural() {
        let cases = [
            r#"{"content": "no type"}"#,
            r#"{"type": 3}"#,
            r#"{"type": "text"}"#,
            r#"{"type": "tag", "children": []}"#,
            r#"{"type": "tag", "tagName": "p", "children": {}}"#,
            r#"{"type": "tag", "tagName": "p", "attrs": {"id": 1}}"#,
            r#"{"type": "code", "content": "x", "language": 5}"#,
            r#"["not a node"]"#,
        ];

        for case in cases {
            let result = parse_tree(case, UnknownNodePolicy::Skip);
            assert!(
                matches!(result, Err(RenderError::Structural(_))),
                "expected structural error for {case}, got {result:?}"
            );
        }
    }

    #[test]
    fn test_invalid_json() {
        let result = parse_tree("{", UnknownNodePolicy::Reject);
        assert!(matches!(result, Err(RenderError::Json(_))));
    }
}
