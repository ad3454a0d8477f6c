//! Request data model.
//!
//! This module defines the canonical structured representation of one request
//! extracted from a document block: the method, URL, ordered headers, and the
//! tagged body payload, together with the source range the request was
//! extracted from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// HTTP request method.
///
/// The fixed verb set recognized by the grammar, as defined in RFC 7231 and
/// RFC 5789.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// HTTP GET method - retrieve a resource
    GET,
    /// HTTP POST method - submit data to create a resource
    POST,
    /// HTTP PUT method - replace a resource
    PUT,
    /// HTTP DELETE method - remove a resource
    DELETE,
    /// HTTP PATCH method - partially modify a resource
    PATCH,
    /// HTTP OPTIONS method - describe communication options
    OPTIONS,
    /// HTTP HEAD method - retrieve headers only
    HEAD,
    /// HTTP TRACE method - perform a message loop-back test
    TRACE,
    /// HTTP CONNECT method - establish a tunnel to the server
    CONNECT,
}

impl Method {
    /// Returns the string representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
            Method::HEAD => "HEAD",
            Method::TRACE => "TRACE",
            Method::CONNECT => "CONNECT",
        }
    }

    /// Parses a string into a `Method`.
    ///
    /// Matching is exact: the grammar only recognizes uppercase verbs.
    ///
    /// # Returns
    ///
    /// `Some(Method)` if the string is a recognized verb, `None` otherwise.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "PATCH" => Some(Method::PATCH),
            "OPTIONS" => Some(Method::OPTIONS),
            "HEAD" => Some(Method::HEAD),
            "TRACE" => Some(Method::TRACE),
            "CONNECT" => Some(Method::CONNECT),
            _ => None,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Body payload encoding selected by a `@kind { ... }` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    /// No body directive present.
    None,
    /// `@json` - JSON object payload.
    Json,
    /// `@formdata` - multipart form fields.
    FormMultipart,
    /// `@urlencoded` - URL-encoded form fields.
    FormUrlencoded,
    /// `@text` - raw text payload.
    Text,
    /// `@params` - URL query parameters.
    UrlParams,
    /// `@xml` - raw XML payload.
    Xml,
    /// `@html` - raw HTML payload.
    Html,
    /// `@javascript` - raw script payload.
    Script,
    /// `@binary` - base64 or file-reference payload, passed through verbatim.
    Binary,
}

impl BodyKind {
    /// Returns the directive tag as written in the grammar (without the `@`).
    pub fn as_tag(&self) -> &'static str {
        match self {
            BodyKind::None => "none",
            BodyKind::Json => "json",
            BodyKind::FormMultipart => "formdata",
            BodyKind::FormUrlencoded => "urlencoded",
            BodyKind::Text => "text",
            BodyKind::UrlParams => "params",
            BodyKind::Xml => "xml",
            BodyKind::Html => "html",
            BodyKind::Script => "javascript",
            BodyKind::Binary => "binary",
        }
    }

    /// Parses a directive tag into a `BodyKind`.
    ///
    /// `"none"` is not a valid tag: the absence of a directive is what
    /// produces [`BodyKind::None`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "json" => Some(BodyKind::Json),
            "formdata" => Some(BodyKind::FormMultipart),
            "urlencoded" => Some(BodyKind::FormUrlencoded),
            "text" => Some(BodyKind::Text),
            "params" => Some(BodyKind::UrlParams),
            "xml" => Some(BodyKind::Xml),
            "html" => Some(BodyKind::Html),
            "javascript" => Some(BodyKind::Script),
            "binary" => Some(BodyKind::Binary),
            _ => None,
        }
    }

    /// Whether this kind carries mapping-shaped fields rather than raw text.
    pub fn is_mapping(&self) -> bool {
        matches!(
            self,
            BodyKind::Json
                | BodyKind::FormMultipart
                | BodyKind::FormUrlencoded
                | BodyKind::UrlParams
        )
    }
}

impl std::fmt::Display for BodyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// Request body payload, tagged by encoding.
///
/// Mapping kinds carry ordered field maps; raw kinds carry the verbatim inner
/// text of their directive block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestBody {
    /// No body directive present.
    None,
    /// `@json { ... }` fields.
    Json(Map<String, Value>),
    /// `@formdata { ... }` fields.
    FormMultipart(Map<String, Value>),
    /// `@urlencoded { ... }` fields.
    FormUrlencoded(Map<String, Value>),
    /// `@params { ... }` fields.
    UrlParams(Map<String, Value>),
    /// `@text { ... }` raw payload.
    Text(String),
    /// `@xml { ... }` raw payload.
    Xml(String),
    /// `@html { ... }` raw payload.
    Html(String),
    /// `@javascript { ... }` raw payload.
    Script(String),
    /// `@binary { ... }` raw payload.
    Binary(String),
}

impl RequestBody {
    /// Returns the encoding tag of this payload.
    pub fn kind(&self) -> BodyKind {
        match self {
            RequestBody::None => BodyKind::None,
            RequestBody::Json(_) => BodyKind::Json,
            RequestBody::FormMultipart(_) => BodyKind::FormMultipart,
            RequestBody::FormUrlencoded(_) => BodyKind::FormUrlencoded,
            RequestBody::UrlParams(_) => BodyKind::UrlParams,
            RequestBody::Text(_) => BodyKind::Text,
            RequestBody::Xml(_) => BodyKind::Xml,
            RequestBody::Html(_) => BodyKind::Html,
            RequestBody::Script(_) => BodyKind::Script,
            RequestBody::Binary(_) => BodyKind::Binary,
        }
    }

    /// Returns the mapping fields if this is a mapping-shaped payload.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        match self {
            RequestBody::Json(m)
            | RequestBody::FormMultipart(m)
            | RequestBody::FormUrlencoded(m)
            | RequestBody::UrlParams(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the raw text if this is a raw-shaped payload.
    pub fn raw(&self) -> Option<&str> {
        match self {
            RequestBody::Text(s)
            | RequestBody::Xml(s)
            | RequestBody::Html(s)
            | RequestBody::Script(s)
            | RequestBody::Binary(s) => Some(s),
            _ => None,
        }
    }
}

/// Byte range of a request in its block, plus the 1-based line of its first
/// token. Offsets are local to the block text the request was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    /// Byte offset of the first token.
    pub start: usize,
    /// Byte offset just past the last token.
    pub end: usize,
    /// 1-based line number of the first token.
    pub line: usize,
}

/// Canonical structured representation of one extracted request.
///
/// The URL and all string-valued fields may still embed `{{variable}}`
/// references; resolution happens in a separate pass before the descriptor is
/// handed to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Request method.
    pub method: Method,

    /// Target URL with surrounding quotes stripped. Never empty.
    pub url: String,

    /// Request headers in declaration order, names case-preserved.
    ///
    /// A duplicate header name overwrites the earlier value in place
    /// (mapping-insertion semantics).
    pub headers: Map<String, Value>,

    /// Tagged body payload. Only the first body directive in the request
    /// block is effective; later directives are ignored.
    pub body: RequestBody,

    /// Where in the block this request was extracted from.
    pub source: SourceRange,
}

impl RequestDescriptor {
    /// Looks up a header value by exact name.
    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers.get(name)
    }

    /// Checks whether the request carries a body payload.
    pub fn has_body(&self) -> bool {
        self.body.kind() != BodyKind::None
    }
}
