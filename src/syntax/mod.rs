//! Grammar and syntax tree builder.
//!
//! This module turns the raw text of one document block into a concrete
//! syntax tree describing request statements, variable declaration sections,
//! and previously recorded response blocks. The tree is an arena: nodes live
//! in a flat `Vec` and refer to their children by index, and every node
//! carries the byte span of the text it covers.
//!
//! Parsing never fails. Malformed input produces [`NodeKind::Error`] nodes
//! and the parser resynchronizes at the next plausible item start, so a
//! document with one broken request still yields usable trees for the rest.

mod parser;

use serde::{Deserialize, Serialize};

/// Index of a node in its tree's arena.
pub type NodeId = usize;

/// Discriminant for the node variants produced by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A request statement: method, URL, and a braced block.
    Request,
    /// The request verb token.
    Method,
    /// The request target, usually a quoted string.
    Url,
    /// The braced block holding headers and body directives.
    Block,
    /// A `key: value` pair inside a block or object.
    Entry,
    /// The key token of an entry.
    Key,
    /// A scalar value token (quoted string, number, keyword, or bare text).
    Value,
    /// A nested `{ ... }` object literal.
    Object,
    /// An `@tag { ... }` body directive inside a request block.
    BodyDirective,
    /// The tag token of a body directive, without the `@`.
    Tag,
    /// Verbatim inner text of a raw-kind body directive.
    RawText,
    /// A top-level `@var { ... }` declaration section.
    VarSection,
    /// A previously recorded response block.
    Response,
    /// Text the parser could not make sense of.
    Error,
}

/// One node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node variant.
    pub kind: NodeKind,

    /// Byte offset of the first character covered by this node.
    pub start: usize,

    /// Byte offset just past the last character covered by this node.
    pub end: usize,

    /// Child node indices, in source order. Empty for leaf nodes.
    pub children: Vec<NodeId>,
}

impl Node {
    /// Checks whether the node's span contains the given offset.
    ///
    /// The end offset is treated as inclusive so a cursor sitting just past
    /// the closing brace of a request still anchors to it.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// Concrete syntax tree over one block of text.
///
/// The tree does not own the text it was parsed from; node spans index into
/// the caller's string. Top-level items (requests, variable sections,
/// recorded responses, error runs) are available in document order through
/// [`SyntaxTree::items`], which is the flattened list the response locator
/// scans instead of re-walking the tree per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    items: Vec<NodeId>,
}

impl SyntaxTree {
    /// Parses block text into a syntax tree.
    ///
    /// This never fails: unparseable stretches become [`NodeKind::Error`]
    /// items and parsing resumes at the next plausible item start.
    pub fn parse(text: &str) -> SyntaxTree {
        parser::parse(text)
    }

    pub(crate) fn new(nodes: Vec<Node>, items: Vec<NodeId>) -> Self {
        Self { nodes, items }
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Top-level items in document order.
    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    /// Returns the text covered by a node.
    pub fn text_of<'t>(&self, id: NodeId, text: &'t str) -> &'t str {
        let node = &self.nodes[id];
        &text[node.start..node.end]
    }

    /// Returns the first direct child of the given kind, if any.
    pub fn child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].kind == kind)
    }

    /// Iterates the direct children of the given kind, in source order.
    pub fn children_of_kind(
        &self,
        id: NodeId,
        kind: NodeKind,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(move |&c| self.nodes[c].kind == kind)
    }

    /// Checks whether the subtree rooted at `id` contains any error node.
    pub fn subtree_has_errors(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        if node.kind == NodeKind::Error {
            return true;
        }
        node.children.iter().any(|&c| self.subtree_has_errors(c))
    }

    /// Returns the start offset of the first request item after `offset`.
    ///
    /// Used as the forward boundary when locating a recorded response, so
    /// the scan never runs past the next request.
    pub fn next_request_start(&self, offset: usize) -> Option<usize> {
        self.items
            .iter()
            .map(|&id| &self.nodes[id])
            .find(|n| n.kind == NodeKind::Request && n.start > offset)
            .map(|n| n.start)
    }
}

/// Returns the 1-based line number of a byte offset.
pub fn line_at(text: &str, offset: usize) -> usize {
    let clamped = offset.min(text.len());
    text[..clamped].bytes().filter(|&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_kinds(tree: &SyntaxTree) -> Vec<NodeKind> {
        tree.items().iter().map(|&id| tree.node(id).kind).collect()
    }

    #[test]
    fn test_parse_simple_request() {
        let text = r#"GET "https://api.example.com/x" { accept: "application/json" }"#;
        let tree = SyntaxTree::parse(text);

        assert_eq!(item_kinds(&tree), vec![NodeKind::Request]);

        let request = tree.items()[0];
        let method = tree.child_of_kind(request, NodeKind::Method).unwrap();
        let url = tree.child_of_kind(request, NodeKind::Url).unwrap();
        let block = tree.child_of_kind(request, NodeKind::Block).unwrap();

        assert_eq!(tree.text_of(method, text), "GET");
        assert_eq!(tree.text_of(url, text), "\"https://api.example.com/x\"");
        assert_eq!(tree.children_of_kind(block, NodeKind::Entry).count(), 1);
    }

    #[test]
    fn test_parse_request_spans() {
        let text = "GET \"https://a.example\" {}\n";
        let tree = SyntaxTree::parse(text);

        let node = tree.node(tree.items()[0]);
        assert_eq!(node.start, 0);
        assert_eq!(node.end, 26);
        assert!(node.contains(0));
        assert!(node.contains(26));
        assert!(!node.contains(27));
    }

    #[test]
    fn test_parse_header_entries() {
        let text = "POST \"https://a.example\" {\n  accept: \"text/plain\",\n  retries: 3\n  strict: true\n}";
        let tree = SyntaxTree::parse(text);

        let request = tree.items()[0];
        let block = tree.child_of_kind(request, NodeKind::Block).unwrap();
        let entries: Vec<NodeId> = tree.children_of_kind(block, NodeKind::Entry).collect();
        assert_eq!(entries.len(), 3);

        let key = tree.child_of_kind(entries[1], NodeKind::Key).unwrap();
        let value = tree.child_of_kind(entries[1], NodeKind::Value).unwrap();
        assert_eq!(tree.text_of(key, text), "retries");
        assert_eq!(tree.text_of(value, text), "3");
    }

    #[test]
    fn test_parse_body_directive_mapping() {
        let text = "POST \"https://a.example\" {\n  @json {\n    name: \"John\"\n    age: 30\n  }\n}";
        let tree = SyntaxTree::parse(text);

        let request = tree.items()[0];
        let block = tree.child_of_kind(request, NodeKind::Block).unwrap();
        let directive = tree.child_of_kind(block, NodeKind::BodyDirective).unwrap();
        let tag = tree.child_of_kind(directive, NodeKind::Tag).unwrap();
        assert_eq!(tree.text_of(tag, text), "json");

        let object = tree.child_of_kind(directive, NodeKind::Object).unwrap();
        assert_eq!(tree.children_of_kind(object, NodeKind::Entry).count(), 2);
    }

    #[test]
    fn test_parse_body_directive_raw() {
        let text = "POST \"https://a.example\" {\n  @text {\n    plain payload: not an entry\n  }\n}";
        let tree = SyntaxTree::parse(text);

        let request = tree.items()[0];
        let block = tree.child_of_kind(request, NodeKind::Block).unwrap();
        let directive = tree.child_of_kind(block, NodeKind::BodyDirective).unwrap();
        let raw = tree.child_of_kind(directive, NodeKind::RawText).unwrap();
        assert!(tree.text_of(raw, text).contains("plain payload: not an entry"));
    }

    #[test]
    fn test_parse_var_section() {
        let text = "@var {\n  base: \"https://api.example.com\"\n  a: { b: 1 }\n}\nGET \"{{base}}/x\" {}";
        let tree = SyntaxTree::parse(text);

        assert_eq!(item_kinds(&tree), vec![NodeKind::VarSection, NodeKind::Request]);

        let section = tree.items()[0];
        let object = tree.child_of_kind(section, NodeKind::Object).unwrap();
        let entries: Vec<NodeId> = tree.children_of_kind(object, NodeKind::Entry).collect();
        assert_eq!(entries.len(), 2);

        let nested = tree.child_of_kind(entries[1], NodeKind::Object).unwrap();
        assert_eq!(tree.children_of_kind(nested, NodeKind::Entry).count(), 1);
    }

    #[test]
    fn test_parse_nested_object_value() {
        let text = "GET \"https://a.example\" { meta: { depth: { level: 2 } } }";
        let tree = SyntaxTree::parse(text);

        let request = tree.items()[0];
        let block = tree.child_of_kind(request, NodeKind::Block).unwrap();
        let entry = tree.child_of_kind(block, NodeKind::Entry).unwrap();
        let object = tree.child_of_kind(entry, NodeKind::Object).unwrap();
        let inner_entry = tree.child_of_kind(object, NodeKind::Entry).unwrap();
        assert!(tree.child_of_kind(inner_entry, NodeKind::Object).is_some());
    }

    #[test]
    fn test_parse_multiple_requests() {
        let text = "GET \"https://a.example\" {}\n\nPOST \"https://b.example\" {}\n\nDELETE \"https://c.example\" {}";
        let tree = SyntaxTree::parse(text);

        assert_eq!(
            item_kinds(&tree),
            vec![NodeKind::Request, NodeKind::Request, NodeKind::Request]
        );
        assert_eq!(tree.next_request_start(0), Some(text.find("POST").unwrap()));
        assert_eq!(
            tree.next_request_start(text.find("POST").unwrap()),
            Some(text.find("DELETE").unwrap())
        );
        assert_eq!(tree.next_request_start(text.find("DELETE").unwrap()), None);
    }

    #[test]
    fn test_parse_recorded_response_item() {
        let text = "GET \"https://a.example\" {}\n#[response] 200 OK | 12 ms | 2026-08-06T10:30:00Z\n{\n  \"ok\": true\n}\n#[/response]\nPOST \"https://b.example\" {}";
        let tree = SyntaxTree::parse(text);

        assert_eq!(
            item_kinds(&tree),
            vec![NodeKind::Request, NodeKind::Response, NodeKind::Request]
        );

        // The response item must swallow its payload so the trailing request
        // still parses on its own.
        let response = tree.node(tree.items()[1]);
        assert!(text[response.start..response.end].ends_with("#[/response]"));
    }

    #[test]
    fn test_parse_error_recovery() {
        let text = "this is not a request\nGET \"https://a.example\" {}";
        let tree = SyntaxTree::parse(text);

        assert_eq!(item_kinds(&tree), vec![NodeKind::Error, NodeKind::Request]);
    }

    #[test]
    fn test_parse_request_missing_block() {
        let text = "GET \"https://a.example\"";
        let tree = SyntaxTree::parse(text);

        let request = tree.items()[0];
        assert_eq!(tree.node(request).kind, NodeKind::Request);
        assert!(tree.child_of_kind(request, NodeKind::Block).is_none());
    }

    #[test]
    fn test_parse_unterminated_block() {
        let text = "GET \"https://a.example\" {\n  accept: \"text/plain\"";
        let tree = SyntaxTree::parse(text);

        // The block absorbs what it can; no panic, no infinite loop.
        let request = tree.items()[0];
        assert!(tree.child_of_kind(request, NodeKind::Block).is_some());
    }

    #[test]
    fn test_parse_variable_token_in_bare_value() {
        let text = "GET \"https://a.example\" { trace: {{id:none}} }";
        let tree = SyntaxTree::parse(text);

        let request = tree.items()[0];
        let block = tree.child_of_kind(request, NodeKind::Block).unwrap();
        let entry = tree.child_of_kind(block, NodeKind::Entry).unwrap();
        let value = tree.child_of_kind(entry, NodeKind::Value).unwrap();
        assert_eq!(tree.text_of(value, text), "{{id:none}}");
    }

    #[test]
    fn test_line_at() {
        let text = "one\ntwo\nthree";
        assert_eq!(line_at(text, 0), 1);
        assert_eq!(line_at(text, 3), 1);
        assert_eq!(line_at(text, 4), 2);
        assert_eq!(line_at(text, 8), 3);
        assert_eq!(line_at(text, 100), 3);
    }
}
