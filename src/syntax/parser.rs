//! Hand-rolled recursive-descent parser over block text.
//!
//! The parser is cursor-based and byte-offset precise. It recognizes four
//! top-level item shapes: request statements, `@var` sections, recorded
//! response blocks, and error runs. Inside a request block it parses
//! `key: value` entries, nested object literals, and `@tag { ... }` body
//! directives. Raw-kind directives (`@text`, `@xml`, `@html`, `@javascript`,
//! `@binary`) keep their inner text verbatim instead of being parsed as
//! entries.

use super::{Node, NodeId, NodeKind, SyntaxTree};
use crate::respond::{RESPONSE_END_MARKER, RESPONSE_ERROR_MARKER, RESPONSE_MARKER};

/// Directive tags whose payload is verbatim text rather than entries.
const RAW_TAGS: [&str; 5] = ["text", "xml", "html", "javascript", "binary"];

/// Parses block text into a syntax tree. Never fails.
pub(super) fn parse(text: &str) -> SyntaxTree {
    let mut parser = Parser {
        text,
        pos: 0,
        nodes: Vec::new(),
        items: Vec::new(),
    };
    parser.run();
    SyntaxTree::new(parser.nodes, parser.items)
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    nodes: Vec<Node>,
    items: Vec<NodeId>,
}

impl<'a> Parser<'a> {
    fn run(&mut self) {
        loop {
            self.skip_trivia();
            if self.at_end() {
                break;
            }
            let item = if self.at_var_keyword() {
                self.parse_var_section()
            } else if self.starts_with(RESPONSE_MARKER) || self.starts_with(RESPONSE_ERROR_MARKER)
            {
                self.parse_response_item()
            } else if self.at_method_token() {
                self.parse_request()
            } else {
                self.parse_error_item()
            };
            self.items.push(item);
        }
    }

    // ---- item parsers ----

    fn parse_request(&mut self) -> NodeId {
        let start = self.pos;
        let method_start = self.pos;
        self.eat_while(|c| c.is_ascii_uppercase());
        let method = self.push_leaf(NodeKind::Method, method_start, self.pos);
        let mut children = vec![method];

        self.skip_inline_ws();
        if let Some(url) = self.parse_url_token() {
            children.push(url);
        }

        self.skip_trivia();
        if self.peek() == Some('{') && !self.starts_with("{{") {
            children.push(self.parse_block());
        }

        let end = children
            .last()
            .map(|&c| self.nodes[c].end)
            .unwrap_or(self.pos);
        self.push_node(NodeKind::Request, start, end, children)
    }

    /// Parses the URL token after a method. Returns `None` when the next
    /// token opens the block instead, so `GET { ... }` yields a request with
    /// no URL child rather than a derailed parse.
    fn parse_url_token(&mut self) -> Option<NodeId> {
        match self.peek()? {
            '{' => None,
            '\n' => None,
            '"' => {
                let start = self.pos;
                self.eat_quoted();
                Some(self.push_leaf(NodeKind::Url, start, self.pos))
            }
            _ => {
                let start = self.pos;
                self.eat_bare_token();
                if self.pos == start {
                    None
                } else {
                    Some(self.push_leaf(NodeKind::Url, start, self.pos))
                }
            }
        }
    }

    fn parse_block(&mut self) -> NodeId {
        let start = self.pos;
        self.bump(); // '{'
        let mut children = Vec::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None => break,
                Some('}') => {
                    self.bump();
                    break;
                }
                Some('@') => children.push(self.parse_directive()),
                Some(_) => children.push(self.parse_entry_or_error()),
            }
        }
        self.push_node(NodeKind::Block, start, self.pos, children)
    }

    fn parse_directive(&mut self) -> NodeId {
        let start = self.pos;
        self.bump(); // '@'
        let tag_start = self.pos;
        self.eat_while(is_ident_char);
        let raw = RAW_TAGS.contains(&&self.text[tag_start..self.pos]);
        let tag = self.push_leaf(NodeKind::Tag, tag_start, self.pos);
        let mut children = vec![tag];

        self.skip_trivia();
        if self.peek() == Some('{') {
            if raw {
                let (inner_start, inner_end) = self.eat_balanced_braces();
                children.push(self.push_leaf(NodeKind::RawText, inner_start, inner_end));
            } else {
                children.push(self.parse_object());
            }
        } else {
            children.push(self.error_to_line_end());
        }

        self.push_node(NodeKind::BodyDirective, start, self.pos, children)
    }

    fn parse_object(&mut self) -> NodeId {
        let start = self.pos;
        self.bump(); // '{'
        let mut children = Vec::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None => break,
                Some('}') => {
                    self.bump();
                    break;
                }
                Some(_) => children.push(self.parse_entry_or_error()),
            }
        }
        self.push_node(NodeKind::Object, start, self.pos, children)
    }

    fn parse_entry_or_error(&mut self) -> NodeId {
        let start = self.pos;

        let key_start = self.pos;
        if self.peek() == Some('"') {
            self.eat_quoted();
        } else {
            self.eat_while(|c| is_ident_char(c) || c == '-');
        }
        if self.pos == key_start {
            return self.error_to_sync(start);
        }
        let key = self.push_leaf(NodeKind::Key, key_start, self.pos);

        self.skip_inline_ws();
        if self.peek() != Some(':') {
            return self.error_to_sync(start);
        }
        self.bump(); // ':'
        self.skip_inline_ws();

        let value = self.parse_value();
        let end = self.nodes[value].end;
        self.push_node(NodeKind::Entry, start, end, vec![key, value])
    }

    fn parse_value(&mut self) -> NodeId {
        match self.peek() {
            Some('{') if !self.starts_with("{{") => self.parse_object(),
            Some('"') => {
                let start = self.pos;
                self.eat_quoted();
                self.push_leaf(NodeKind::Value, start, self.pos)
            }
            _ => {
                // Bare scalar: runs to the end of the line, a comma, or the
                // closing brace. `{{...}}` variable tokens are skipped
                // atomically so their braces don't end the value.
                let start = self.pos;
                loop {
                    if self.starts_with("{{") {
                        self.eat_variable_token();
                        continue;
                    }
                    match self.peek() {
                        None | Some(',') | Some('\n') | Some('}') => break,
                        Some(_) => self.bump(),
                    }
                }
                let trimmed = self.text[start..self.pos].trim_end();
                self.push_leaf(NodeKind::Value, start, start + trimmed.len())
            }
        }
    }

    fn parse_var_section(&mut self) -> NodeId {
        let start = self.pos;
        self.bump(); // '@'
        self.eat_while(is_ident_char); // "var"
        self.skip_trivia();
        let child = if self.peek() == Some('{') {
            self.parse_object()
        } else {
            self.error_to_line_end()
        };
        let end = self.pos;
        self.push_node(NodeKind::VarSection, start, end, vec![child])
    }

    /// Consumes a recorded response block: the marker line, any payload
    /// lines, and the terminator. An error-form marker is a single line. If
    /// the terminator is missing the item ends at the next item start, so a
    /// truncated response never swallows the request after it.
    fn parse_response_item(&mut self) -> NodeId {
        let start = self.pos;
        let error_form = self.starts_with(RESPONSE_ERROR_MARKER);
        let mut end = self.eat_line();
        if !error_form {
            loop {
                if self.at_end() {
                    break;
                }
                let line = self.peek_line();
                if line.trim() == RESPONSE_END_MARKER {
                    end = self.eat_line();
                    break;
                }
                if is_item_start_line(line) {
                    break;
                }
                let line_end = self.eat_line();
                if !line.trim().is_empty() {
                    end = line_end;
                }
            }
        }
        self.push_leaf(NodeKind::Response, start, end)
    }

    fn parse_error_item(&mut self) -> NodeId {
        let start = self.pos;
        self.eat_line();
        while !self.at_end() && !is_item_start_line(self.peek_line()) {
            self.eat_line();
        }
        let trimmed = self.text[start..self.pos].trim_end();
        self.push_leaf(NodeKind::Error, start, start + trimmed.len())
    }

    // ---- error recovery ----

    /// Emits an error node spanning from `start` to the next entry
    /// separator or block close.
    fn error_to_sync(&mut self, start: usize) -> NodeId {
        while let Some(c) = self.peek() {
            if c == ',' || c == '\n' || c == '}' {
                break;
            }
            self.bump();
        }
        self.push_leaf(NodeKind::Error, start, self.pos)
    }

    fn error_to_line_end(&mut self) -> NodeId {
        let start = self.pos;
        let end = self.eat_line();
        self.push_leaf(NodeKind::Error, start, end)
    }

    // ---- token predicates ----

    fn at_var_keyword(&self) -> bool {
        self.starts_with("@var")
            && !self.text[self.pos + 4..]
                .chars()
                .next()
                .map(is_ident_char)
                .unwrap_or(false)
    }

    fn at_method_token(&self) -> bool {
        let rest = &self.text[self.pos..];
        let run = rest.chars().take_while(|c| c.is_ascii_uppercase()).count();
        run > 0
            && rest[run..]
                .chars()
                .next()
                .map(|c| c.is_whitespace())
                .unwrap_or(false)
    }

    // ---- cursor primitives ----

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.text[self.pos..].starts_with(prefix)
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if predicate(c) {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Consumes a quoted string including both quotes. Backslash escapes the
    /// next character. An unterminated string stops at the end of the line.
    fn eat_quoted(&mut self) {
        self.bump(); // opening '"'
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '"' => {
                    self.bump();
                    return;
                }
                '\n' => return,
                _ => self.bump(),
            }
        }
    }

    /// Consumes a bare token up to whitespace or an opening brace, treating
    /// `{{...}}` variable references as atomic.
    fn eat_bare_token(&mut self) {
        loop {
            if self.starts_with("{{") {
                self.eat_variable_token();
                continue;
            }
            match self.peek() {
                None => break,
                Some(c) if c.is_whitespace() || c == '{' => break,
                Some(_) => self.bump(),
            }
        }
    }

    /// Consumes a `{{...}}` token through its closing braces, or to the end
    /// of the line when the braces never close.
    fn eat_variable_token(&mut self) {
        self.bump();
        self.bump(); // "{{"
        while !self.at_end() {
            if self.starts_with("}}") {
                self.bump();
                self.bump();
                return;
            }
            if self.peek() == Some('\n') {
                return;
            }
            self.bump();
        }
    }

    /// Consumes a `{ ... }` span with brace-depth counting, skipping quoted
    /// strings. Returns the inner span, braces excluded. An unterminated
    /// span runs to the end of the text.
    fn eat_balanced_braces(&mut self) -> (usize, usize) {
        self.bump(); // '{'
        let inner_start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.peek() {
            match c {
                '"' => {
                    self.eat_quoted();
                    continue;
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let inner_end = self.pos;
                        self.bump();
                        return (inner_start, inner_end);
                    }
                }
                _ => {}
            }
            self.bump();
        }
        (inner_start, self.pos)
    }

    /// Consumes the rest of the current line including its newline. Returns
    /// the offset of the line end, newline excluded.
    fn eat_line(&mut self) -> usize {
        while let Some(c) = self.peek() {
            if c == '\n' {
                let end = self.pos;
                self.bump();
                return end;
            }
            self.bump();
        }
        self.pos
    }

    /// Returns the current line without consuming it, newline excluded.
    fn peek_line(&self) -> &'a str {
        let rest = &self.text[self.pos..];
        match rest.find('\n') {
            Some(idx) => &rest[..idx],
            None => rest,
        }
    }

    fn skip_inline_ws(&mut self) {
        self.eat_while(|c| c == ' ' || c == '\t');
    }

    fn skip_trivia(&mut self) {
        loop {
            let before = self.pos;
            self.eat_while(|c| c.is_whitespace());
            if self.starts_with("//") {
                self.eat_line();
            }
            if self.pos == before {
                break;
            }
        }
    }

    fn skip_separators(&mut self) {
        loop {
            let before = self.pos;
            self.eat_while(|c| c.is_whitespace() || c == ',');
            if self.starts_with("//") {
                self.eat_line();
            }
            if self.pos == before {
                break;
            }
        }
    }

    // ---- arena ----

    fn push_leaf(&mut self, kind: NodeKind, start: usize, end: usize) -> NodeId {
        self.push_node(kind, start, end, Vec::new())
    }

    fn push_node(
        &mut self,
        kind: NodeKind,
        start: usize,
        end: usize,
        children: Vec<NodeId>,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            start,
            end,
            children,
        });
        id
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Checks whether a line, ignoring indentation, opens a new top-level item.
fn is_item_start_line(line: &str) -> bool {
    let t = line.trim_start();
    if t.starts_with(RESPONSE_MARKER) || t.starts_with(RESPONSE_ERROR_MARKER) {
        return true;
    }
    if t.starts_with("@var") {
        return !t[4..].chars().next().map(is_ident_char).unwrap_or(false);
    }
    let run = t.chars().take_while(|c| c.is_ascii_uppercase()).count();
    run > 0
        && t[run..]
            .chars()
            .next()
            .map(|c| c.is_whitespace() || c == '"')
            .unwrap_or(false)
}
