//! Response data model.
//!
//! This module defines the structured result of executing a request. A
//! [`ResponseRecord`] is transient: only its serialized text form persists,
//! written into the document immediately after the request that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured result of executing a request.
///
/// Success records carry a JSON body; failure records carry an error message
/// instead. Either way the record is written back into the document - errors
/// are recorded as data, not dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Status display string, e.g. "200 OK" or "404 Not Found".
    pub status_display: String,

    /// Wall-clock duration of the transport round trip, in milliseconds.
    pub elapsed_ms: u64,

    /// When the response was received.
    pub timestamp: DateTime<Utc>,

    /// Response body as a JSON value.
    ///
    /// `Value::Null` for error records and for bodies the transport could not
    /// interpret as JSON.
    pub body: Value,

    /// Transport error message, if the request failed before producing a
    /// response.
    pub error: Option<String>,
}

impl ResponseRecord {
    /// Creates a success record.
    pub fn success(
        status_display: impl Into<String>,
        elapsed_ms: u64,
        timestamp: DateTime<Utc>,
        body: Value,
    ) -> Self {
        Self {
            status_display: status_display.into(),
            elapsed_ms,
            timestamp,
            body,
            error: None,
        }
    }

    /// Creates an error-shaped record from a transport failure message.
    pub fn failure(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            status_display: "error".to_string(),
            elapsed_ms: 0,
            timestamp,
            body: Value::Null,
            error: Some(message.into()),
        }
    }

    /// Checks whether this record represents a transport failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Formats the elapsed time in a human-readable form.
    ///
    /// # Returns
    ///
    /// String representation like "567 ms" or "1.234 s".
    pub fn elapsed_display(&self) -> String {
        if self.elapsed_ms < 1000 {
            format!("{} ms", self.elapsed_ms)
        } else {
            format!("{:.3} s", self.elapsed_ms as f64 / 1000.0)
        }
    }
}
