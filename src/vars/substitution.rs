//! Token substitution over request text.
//!
//! Substitution scans for `{{path}}` and `{{path:default}}` tokens and
//! replaces each one independently, left to right. Unresolved tokens stay
//! in the text verbatim, braces included, so partial substitution is
//! visible instead of silently vanishing.

use super::scope::VariableScope;
use crate::models::{RequestBody, RequestDescriptor};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Cached token pattern: a dotted identifier path with an optional
/// `:default` part running up to the closing braces. Compiled once and
/// reused to avoid repeated regex compilation overhead.
static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)\s*(?::(.*?))?\}\}")
        .expect("Failed to compile variable token regex")
});

/// Renders a resolved value into substitution text.
///
/// Strings render directly, numbers and booleans in canonical textual
/// form, and mappings or arrays as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

impl VariableScope {
    /// Replaces every variable token in the text.
    ///
    /// Each token resolves independently, left to right. A token whose path
    /// misses falls back to its declared default, or stays verbatim when it
    /// has none.
    ///
    /// # Examples
    ///
    /// ```
    /// use httpbook::syntax::SyntaxTree;
    /// use httpbook::vars::VariableScope;
    ///
    /// let text = "@var { host: \"api.example.com\" }";
    /// let scope = VariableScope::declare(&SyntaxTree::parse(text), text, None);
    /// assert_eq!(scope.substitute("https://{{host}}/x"), "https://api.example.com/x");
    /// assert_eq!(scope.substitute("{{port:8080}}"), "8080");
    /// assert_eq!(scope.substitute("{{missing}}"), "{{missing}}");
    /// ```
    pub fn substitute(&self, text: &str) -> String {
        // Fast path: no token markers at all.
        if !text.contains("{{") {
            return text.to_string();
        }

        let re = &*TOKEN_REGEX;
        let mut result = String::with_capacity(text.len() + text.len() / 4);
        let mut last_match_end = 0;

        for cap in re.captures_iter(text) {
            let full = match cap.get(0) {
                Some(m) => m,
                None => continue,
            };
            let path = cap.get(1).map_or("", |m| m.as_str());

            result.push_str(&text[last_match_end..full.start()]);

            match self.lookup(path) {
                Some(value) => result.push_str(&render_value(value)),
                None => match cap.get(2) {
                    Some(default) => result.push_str(default.as_str()),
                    None => result.push_str(full.as_str()),
                },
            }

            last_match_end = full.end();
        }

        result.push_str(&text[last_match_end..]);
        result
    }

    /// Substitutes across every string field of a descriptor: the URL, each
    /// header value, and every string leaf of the body payload, recursively.
    ///
    /// This is the pass a descriptor goes through before it reaches the
    /// transport. The original descriptor is left untouched.
    pub fn resolve_descriptor(&self, descriptor: &RequestDescriptor) -> RequestDescriptor {
        let mut resolved = descriptor.clone();
        resolved.url = self.substitute(&descriptor.url);

        for (_, value) in resolved.headers.iter_mut() {
            self.substitute_in_value(value);
        }

        resolved.body = match resolved.body {
            RequestBody::None => RequestBody::None,
            RequestBody::Json(mut fields) => {
                fields.iter_mut().for_each(|(_, v)| self.substitute_in_value(v));
                RequestBody::Json(fields)
            }
            RequestBody::FormMultipart(mut fields) => {
                fields.iter_mut().for_each(|(_, v)| self.substitute_in_value(v));
                RequestBody::FormMultipart(fields)
            }
            RequestBody::FormUrlencoded(mut fields) => {
                fields.iter_mut().for_each(|(_, v)| self.substitute_in_value(v));
                RequestBody::FormUrlencoded(fields)
            }
            RequestBody::UrlParams(mut fields) => {
                fields.iter_mut().for_each(|(_, v)| self.substitute_in_value(v));
                RequestBody::UrlParams(fields)
            }
            RequestBody::Text(raw) => RequestBody::Text(self.substitute(&raw)),
            RequestBody::Xml(raw) => RequestBody::Xml(self.substitute(&raw)),
            RequestBody::Html(raw) => RequestBody::Html(self.substitute(&raw)),
            RequestBody::Script(raw) => RequestBody::Script(self.substitute(&raw)),
            RequestBody::Binary(raw) => RequestBody::Binary(self.substitute(&raw)),
        };

        resolved
    }

    fn substitute_in_value(&self, value: &mut Value) {
        match value {
            Value::String(s) => *s = self.substitute(s),
            Value::Object(map) => {
                for (_, v) in map.iter_mut() {
                    self.substitute_in_value(v);
                }
            }
            Value::Array(items) => {
                for v in items.iter_mut() {
                    self.substitute_in_value(v);
                }
            }
            _ => {}
        }
    }
}
