//! HTTP request authoring and recording inside block-structured documents.
//!
//! `httpbook` is the core of a notebook-style HTTP client: requests are
//! written in a small grammar inside text blocks, executed through an
//! external transport, and their results are written back into the
//! document right after the request that produced them.
//!
//! # Architecture
//!
//! The crate is organized into leaf-first modules:
//!
//! - **syntax**: grammar and tree builder turning block text into a
//!   concrete syntax tree with byte spans
//! - **extract**: walks the tree from an anchor offset into a canonical
//!   [`models::RequestDescriptor`]
//! - **vars**: collects `@var` sections and substitutes `{{path}}` /
//!   `{{path:default}}` tokens across a descriptor
//! - **respond**: locates a previously recorded response and renders a new
//!   one into canonical marker text
//! - **surgery**: applies the single document edit and restores the
//!   cursor
//! - **transport**: the contract the external HTTP collaborator implements
//! - **cycle**: drives one request through Parsing, Resolving,
//!   Awaiting-Transport, Formatting, and Editing
//! - **models** / **config**: shared data types and cycle configuration
//!
//! # Request syntax
//!
//! ```text
//! @var { base: "https://api.example.com" }
//!
//! POST "{{base}}/users" {
//!     authorization: "Bearer {{token:dev-token}}"
//!     @json {
//!         name: "John"
//!         age: 30
//!     }
//! }
//! ```
//!
//! # Executing a request
//!
//! ```
//! use httpbook::config::CycleConfig;
//! use httpbook::cycle::execute_request;
//! use httpbook::surgery::ScratchBuffer;
//! use httpbook::transport::{Transport, TransportError, TransportReply};
//!
//! struct NullTransport;
//!
//! impl Transport for NullTransport {
//!     fn send(
//!         &self,
//!         _request: &httpbook::models::RequestDescriptor,
//!     ) -> Result<TransportReply, TransportError> {
//!         Ok(TransportReply {
//!             status_display: "200 OK".to_string(),
//!             elapsed_ms: 3,
//!             body: serde_json::json!({"ok": true}),
//!         })
//!     }
//! }
//!
//! let mut buffer = ScratchBuffer::new("GET \"https://api.example.com/x\" {}");
//! execute_request(&mut buffer, &NullTransport, 0, &CycleConfig::default()).unwrap();
//! assert!(buffer.text().contains("#[response] 200 OK"));
//! ```
//!
//! Re-running a request replaces its previously recorded response in
//! place; everything after it in the document stays byte-identical.

pub mod config;
pub mod cycle;
pub mod extract;
pub mod models;
pub mod respond;
pub mod surgery;
pub mod syntax;
pub mod transport;
pub mod vars;

pub use config::CycleConfig;
pub use cycle::{execute_request, execute_request_at, CycleError, CycleOutcome, CyclePhase};
pub use extract::{extract_all, extract_at, ExtractError};
pub use models::{
    BodyKind, Method, RequestBody, RequestDescriptor, ResponseRecord, SourceRange,
};
pub use respond::EditRange;
pub use surgery::{BlockView, EditorSurface, ScratchBuffer};
pub use transport::{Transport, TransportError, TransportReply};
pub use vars::{VarError, VariableScope};
