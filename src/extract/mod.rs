//! Request extraction.
//!
//! This module walks a syntax tree from an anchor offset and builds the
//! canonical [`RequestDescriptor`] for the request statement found there.
//! Extraction is a pure function of the tree and text: it performs no
//! substitution and no mutation, and any failure simply means "not a
//! request" to the caller.

pub mod error;
mod literal;

pub use error::ExtractError;
pub use literal::{literal_value, node_value};

pub(crate) use literal::{entry_key, unquote, value_child};

use crate::models::{BodyKind, Method, RequestBody, RequestDescriptor, SourceRange};
use crate::syntax::{line_at, NodeId, NodeKind, SyntaxTree};
use serde_json::Map;

/// Extracts the request containing the anchor offset.
///
/// The anchor may sit anywhere inside the statement, including just past
/// its closing brace. Fails if no request statement contains the anchor, if
/// the statement has syntax errors, if the verb is unrecognized, or if the
/// URL is missing or empty after quote-stripping.
///
/// # Arguments
///
/// * `tree` - Syntax tree of the block
/// * `text` - The block text the tree was parsed from
/// * `anchor` - Byte offset inside the block
///
/// # Examples
///
/// ```
/// use httpbook::extract::extract_at;
/// use httpbook::models::Method;
/// use httpbook::syntax::SyntaxTree;
///
/// let text = r#"GET "https://api.example.com/x" { accept: "application/json" }"#;
/// let tree = SyntaxTree::parse(text);
/// let descriptor = extract_at(&tree, text, 0).unwrap();
/// assert_eq!(descriptor.method, Method::GET);
/// ```
pub fn extract_at(
    tree: &SyntaxTree,
    text: &str,
    anchor: usize,
) -> Result<RequestDescriptor, ExtractError> {
    let request = tree
        .items()
        .iter()
        .copied()
        .filter(|&id| tree.node(id).kind == NodeKind::Request)
        .find(|&id| tree.node(id).contains(anchor))
        .ok_or(ExtractError::NoRequest { offset: anchor })?;

    build_descriptor(tree, text, request)
}

/// Extracts every well-formed request in the block, in document order.
///
/// Malformed requests are skipped rather than failing the whole pass. Used
/// by run-all surfaces; single-request execution goes through
/// [`extract_at`].
pub fn extract_all(tree: &SyntaxTree, text: &str) -> Vec<RequestDescriptor> {
    tree.items()
        .iter()
        .copied()
        .filter(|&id| tree.node(id).kind == NodeKind::Request)
        .filter_map(|id| build_descriptor(tree, text, id).ok())
        .collect()
}

fn build_descriptor(
    tree: &SyntaxTree,
    text: &str,
    request: NodeId,
) -> Result<RequestDescriptor, ExtractError> {
    let node = tree.node(request);
    let line = line_at(text, node.start);

    if tree.subtree_has_errors(request) {
        return Err(ExtractError::Malformed { line });
    }

    let method_id = tree
        .child_of_kind(request, NodeKind::Method)
        .ok_or(ExtractError::Malformed { line })?;
    let method_text = tree.text_of(method_id, text);
    let method = Method::parse(method_text).ok_or_else(|| ExtractError::InvalidMethod {
        method: method_text.to_string(),
        line,
    })?;

    let url_id = tree
        .child_of_kind(request, NodeKind::Url)
        .ok_or(ExtractError::MissingUrl { line })?;
    let url = unquote(tree.text_of(url_id, text));
    if url.is_empty() {
        return Err(ExtractError::EmptyUrl { line });
    }

    let block = tree
        .child_of_kind(request, NodeKind::Block)
        .ok_or(ExtractError::MissingBlock { line })?;

    // Headers in declaration order. A duplicate name overwrites the earlier
    // value in place (mapping-insertion semantics).
    let mut headers = Map::new();
    for entry in tree.children_of_kind(block, NodeKind::Entry) {
        if let (Some(key), Some(value_id)) =
            (entry_key(tree, text, entry), value_child(tree, entry))
        {
            headers.insert(key, node_value(tree, text, value_id));
        }
    }

    // Only the first directive with a recognized tag is effective.
    let mut body = RequestBody::None;
    for directive in tree.children_of_kind(block, NodeKind::BodyDirective) {
        let tag_id = match tree.child_of_kind(directive, NodeKind::Tag) {
            Some(id) => id,
            None => continue,
        };
        if let Some(kind) = BodyKind::from_tag(tree.text_of(tag_id, text)) {
            body = build_body(tree, text, directive, kind);
            break;
        }
    }

    Ok(RequestDescriptor {
        method,
        url,
        headers,
        body,
        source: SourceRange {
            start: node.start,
            end: node.end,
            line,
        },
    })
}

fn build_body(
    tree: &SyntaxTree,
    text: &str,
    directive: NodeId,
    kind: BodyKind,
) -> RequestBody {
    if kind.is_mapping() {
        let fields = tree
            .child_of_kind(directive, NodeKind::Object)
            .map(|id| match node_value(tree, text, id) {
                serde_json::Value::Object(map) => map,
                _ => Map::new(),
            })
            .unwrap_or_default();
        match kind {
            BodyKind::Json => RequestBody::Json(fields),
            BodyKind::FormMultipart => RequestBody::FormMultipart(fields),
            BodyKind::FormUrlencoded => RequestBody::FormUrlencoded(fields),
            _ => RequestBody::UrlParams(fields),
        }
    } else {
        // Raw kinds keep the verbatim inner text; the braces are syntax,
        // not content, so leading and trailing blank space goes.
        let raw = tree
            .child_of_kind(directive, NodeKind::RawText)
            .map(|id| tree.text_of(id, text).trim().to_string())
            .unwrap_or_default();
        match kind {
            BodyKind::Text => RequestBody::Text(raw),
            BodyKind::Xml => RequestBody::Xml(raw),
            BodyKind::Html => RequestBody::Html(raw),
            BodyKind::Script => RequestBody::Script(raw),
            _ => RequestBody::Binary(raw),
        }
    }
}
