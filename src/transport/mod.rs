//! Transport collaborator contract.
//!
//! The core never talks to the network itself. It hands a fully-resolved
//! [`RequestDescriptor`] to a [`Transport`] implementation and receives
//! back either a reply or an opaque error. Redirects, TLS, timeouts, and
//! connection pooling are all the transport's concern.

use crate::models::RequestDescriptor;
use serde_json::Value;
use std::fmt;

/// What a transport returns for a completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportReply {
    /// Status display string, e.g. "200 OK".
    pub status_display: String,

    /// Wall-clock duration of the round trip, in milliseconds.
    pub elapsed_ms: u64,

    /// Response body as a JSON value. `Value::Null` when the body was
    /// empty or not interpretable as JSON.
    pub body: Value,
}

/// Opaque transport failure.
///
/// The core does not inspect transport errors; it converts them into
/// error-shaped response records and writes them into the document like
/// any other result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Wraps a failure message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransportError {}

/// The collaborator that actually executes requests.
///
/// Receives a descriptor with every variable already substituted. The
/// implementation decides what the descriptor's body kind means on the
/// wire.
pub trait Transport {
    /// Executes one request and returns its result.
    fn send(&self, request: &RequestDescriptor) -> Result<TransportReply, TransportError>;
}
