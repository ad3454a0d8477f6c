//! Literal coercion: text tokens to tagged JSON values.
//!
//! The grammar leaves scalar values as raw token spans; this module turns
//! them into `serde_json::Value`s through an explicit ordered list of
//! matcher functions. The order is part of the grammar: quoted string,
//! integer, float, keyword, and finally bare text. The bare-text fallback
//! never wins over a form an earlier matcher recognizes.

use crate::syntax::{NodeId, NodeKind, SyntaxTree};
use serde_json::{Map, Number, Value};

/// A single literal matcher. Returns `None` when the token is not this
/// matcher's shape, letting the next matcher try.
type Matcher = fn(&str) -> Option<Value>;

/// The ordered matcher list. Tried first to last.
const MATCHERS: [Matcher; 4] = [match_quoted, match_integer, match_float, match_keyword];

/// Coerces a raw token into a tagged value.
///
/// The token is trimmed first. Anything no matcher recognizes becomes a
/// plain string holding the trimmed token, so bare identifiers and free
/// text survive verbatim.
pub fn literal_value(raw: &str) -> Value {
    let token = raw.trim();
    for matcher in MATCHERS {
        if let Some(value) = matcher(token) {
            return value;
        }
    }
    Value::String(token.to_string())
}

fn match_quoted(token: &str) -> Option<Value> {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        Some(Value::String(unescape(&token[1..token.len() - 1])))
    } else {
        None
    }
}

fn match_integer(token: &str) -> Option<Value> {
    token.parse::<i64>().ok().map(|n| Value::Number(n.into()))
}

fn match_float(token: &str) -> Option<Value> {
    let parsed = token.parse::<f64>().ok()?;
    Number::from_f64(parsed).map(Value::Number)
}

fn match_keyword(token: &str) -> Option<Value> {
    match token {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        "null" => Some(Value::Null),
        _ => None,
    }
}

/// Converts a value-position node into a tagged value.
///
/// Object nodes recurse into ordered mappings; scalar nodes go through the
/// matcher list.
pub fn node_value(tree: &SyntaxTree, text: &str, id: NodeId) -> Value {
    match tree.node(id).kind {
        NodeKind::Object => {
            let mut map = Map::new();
            for entry in tree.children_of_kind(id, NodeKind::Entry) {
                if let (Some(key), Some(value_id)) =
                    (entry_key(tree, text, entry), value_child(tree, entry))
                {
                    map.insert(key, node_value(tree, text, value_id));
                }
            }
            Value::Object(map)
        }
        _ => literal_value(tree.text_of(id, text)),
    }
}

/// Returns an entry's key text with surrounding quotes stripped.
pub fn entry_key(tree: &SyntaxTree, text: &str, entry: NodeId) -> Option<String> {
    let key = tree.child_of_kind(entry, NodeKind::Key)?;
    Some(unquote(tree.text_of(key, text)))
}

/// Returns an entry's value node, scalar or object.
pub fn value_child(tree: &SyntaxTree, entry: NodeId) -> Option<NodeId> {
    tree.node(entry)
        .children
        .iter()
        .copied()
        .find(|&c| matches!(tree.node(c).kind, NodeKind::Value | NodeKind::Object))
}

/// Strips surrounding double quotes from a token, unescaping the inside.
/// Unquoted tokens come back trimmed but otherwise untouched.
pub(crate) fn unquote(raw: &str) -> String {
    let token = raw.trim();
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        unescape(&token[1..token.len() - 1])
    } else {
        token.to_string()
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
