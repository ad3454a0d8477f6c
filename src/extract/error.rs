//! Error types for request extraction.
//!
//! Extraction errors are local: the caller treats any of them as "not a
//! request" and performs no document mutation.

use std::fmt;

/// Errors that can occur while extracting a request from the syntax tree.
///
/// Each variant carries enough context to point the user at the offending
/// spot in the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No request statement contains the anchor offset.
    NoRequest {
        /// The anchor offset that was probed (block-local, in bytes)
        offset: usize,
    },

    /// The statement at the anchor contains syntax error nodes.
    Malformed {
        /// Line number of the statement start (1-based)
        line: usize,
    },

    /// The statement's verb is not a recognized method.
    InvalidMethod {
        /// The unrecognized verb token
        method: String,
        /// Line number of the statement start (1-based)
        line: usize,
    },

    /// The statement has no URL token.
    MissingUrl {
        /// Line number of the statement start (1-based)
        line: usize,
    },

    /// The URL is empty after quote-stripping.
    EmptyUrl {
        /// Line number of the statement start (1-based)
        line: usize,
    },

    /// The statement has no braced block.
    MissingBlock {
        /// Line number of the statement start (1-based)
        line: usize,
    },
}

impl ExtractError {
    /// Returns the line number associated with this error, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ExtractError::NoRequest { .. } => None,
            ExtractError::Malformed { line }
            | ExtractError::InvalidMethod { line, .. }
            | ExtractError::MissingUrl { line }
            | ExtractError::EmptyUrl { line }
            | ExtractError::MissingBlock { line } => Some(*line),
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::NoRequest { offset } => {
                write!(f, "No request found at offset {}", offset)
            }
            ExtractError::Malformed { line } => {
                write!(f, "Request at line {} contains syntax errors", line)
            }
            ExtractError::InvalidMethod { method, line } => {
                write!(
                    f,
                    "Unrecognized method '{}' at line {}. Expected one of: GET, POST, PUT, DELETE, PATCH, OPTIONS, HEAD, TRACE, CONNECT",
                    method, line
                )
            }
            ExtractError::MissingUrl { line } => {
                write!(
                    f,
                    "Missing URL at line {}. Expected format: METHOD \"url\" {{ ... }}",
                    line
                )
            }
            ExtractError::EmptyUrl { line } => {
                write!(f, "Empty URL at line {}", line)
            }
            ExtractError::MissingBlock { line } => {
                write!(
                    f,
                    "Missing request block at line {}. Expected format: METHOD \"url\" {{ ... }}",
                    line
                )
            }
        }
    }
}

impl std::error::Error for ExtractError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_line() {
        let err = ExtractError::InvalidMethod {
            method: "FETCH".to_string(),
            line: 5,
        };
        assert_eq!(err.line(), Some(5));

        let err = ExtractError::NoRequest { offset: 120 };
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_extract_error_display() {
        let err = ExtractError::InvalidMethod {
            method: "FETCH".to_string(),
            line: 5,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Unrecognized method"));
        assert!(msg.contains("FETCH"));
        assert!(msg.contains("line 5"));

        let err = ExtractError::EmptyUrl { line: 2 };
        let msg = format!("{}", err);
        assert!(msg.contains("Empty URL"));
        assert!(msg.contains("line 2"));
    }

    #[test]
    fn test_extract_error_equality() {
        let err1 = ExtractError::MissingBlock { line: 3 };
        let err2 = ExtractError::MissingBlock { line: 3 };
        assert_eq!(err1, err2);
        assert_ne!(err1, ExtractError::MissingBlock { line: 4 });
    }
}
