//! Response locating and formatting.
//!
//! This module owns the textual form a [`ResponseRecord`] takes inside the
//! document and the scan that finds a previously recorded response after a
//! request. The two halves are a round trip: [`locate`] over text produced
//! by [`format`] finds exactly the span that was written, so re-running a
//! request replaces its old output in place.
//!
//! Marker syntax:
//!
//! ```text
//! #[response] 200 OK | 142 ms | 2026-08-06T10:30:00Z
//! {
//!   "ok": true
//! }
//! #[/response]
//! ```
//!
//! Error records collapse to a single line:
//!
//! ```text
//! #[response:error] connection refused
//! ```

use crate::models::ResponseRecord;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

/// Line-start token opening a recorded response.
pub const RESPONSE_MARKER: &str = "#[response]";

/// Line-start token for the single-line error form.
pub const RESPONSE_ERROR_MARKER: &str = "#[response:error]";

/// Terminating marker line closing a recorded response.
pub const RESPONSE_END_MARKER: &str = "#[/response]";

/// Offset span identifying what text, if any, must be replaced to record a
/// new response.
///
/// An empty span (`from == to`) is an insertion point; a non-empty span is
/// the full extent of a prior response's canonical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRange {
    /// Start offset of the span, in bytes.
    pub from: usize,
    /// End offset of the span, in bytes.
    pub to: usize,
}

impl EditRange {
    /// An empty range naming an insertion point.
    pub fn insertion_at(offset: usize) -> Self {
        Self {
            from: offset,
            to: offset,
        }
    }

    /// Checks whether this range is an insertion point.
    pub fn is_insertion(&self) -> bool {
        self.from == self.to
    }

    /// Length of the span in bytes. Zero for insertion points.
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    /// Same as [`EditRange::is_insertion`]; named for collection parity.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// Finds the span of a previously recorded response after a request.
///
/// Scans whole lines strictly between `request_end` and `boundary`, where
/// the boundary is the next request's start offset or the block end,
/// whichever comes first - the scan never runs past it. A found success
/// marker spans through its payload to the terminator line; when the
/// terminator is missing (a truncated prior response) the span ends at the
/// last non-blank line before the boundary, so unrelated content below is
/// never swallowed. An error marker spans exactly its own line.
///
/// When no marker exists, the returned range collapses to the empty point
/// at the end of the line holding `request_end`.
///
/// # Arguments
///
/// * `text` - The block text
/// * `request_end` - End offset of the request statement
/// * `boundary` - Scan limit: next request start or block end
pub fn locate(text: &str, request_end: usize, boundary: usize) -> EditRange {
    let boundary = boundary.min(text.len());
    let insert_at = line_end(text, request_end.min(boundary));

    let mut pos = insert_at + 1;
    while pos < boundary {
        let end = line_end(text, pos);
        let line = &text[pos..end];
        if line.starts_with(RESPONSE_ERROR_MARKER) {
            return EditRange { from: pos, to: end };
        }
        if line.starts_with(RESPONSE_MARKER) {
            return success_span(text, pos, end, boundary);
        }
        if end >= text.len() {
            break;
        }
        pos = end + 1;
    }

    EditRange::insertion_at(insert_at)
}

fn success_span(
    text: &str,
    marker_start: usize,
    marker_line_end: usize,
    boundary: usize,
) -> EditRange {
    let mut last_nonblank_end = marker_line_end;
    let mut pos = marker_line_end + 1;

    while pos < boundary {
        let end = line_end(text, pos);
        let line = &text[pos..end];
        if line.trim() == RESPONSE_END_MARKER {
            return EditRange {
                from: marker_start,
                to: end,
            };
        }
        if !line.trim().is_empty() {
            last_nonblank_end = end;
        }
        if end >= text.len() {
            break;
        }
        pos = end + 1;
    }

    // Truncated prior response: stop at the last non-blank line so the
    // blank separator and anything after the boundary stay untouched.
    EditRange {
        from: marker_start,
        to: last_nonblank_end,
    }
}

/// Renders a record into its canonical text, terminator included.
///
/// The output carries no leading or trailing newline; surgery decides
/// whether a separator is needed. Success records render the header line,
/// the pretty-printed JSON body with stable key order, and the terminator.
/// Error records render the single-line error form. Either way the output
/// re-parses through [`locate`] on a later pass.
pub fn format(record: &ResponseRecord) -> String {
    if let Some(message) = &record.error {
        return format!("{} {}", RESPONSE_ERROR_MARKER, message);
    }

    let header = format!(
        "{} {} | {} | {}",
        RESPONSE_MARKER,
        record.status_display,
        record.elapsed_display(),
        record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    format!(
        "{}\n{}\n{}",
        header,
        pretty_json(&record.body),
        RESPONSE_END_MARKER
    )
}

/// Pretty-prints a JSON value with 2-space indentation.
///
/// Key order is whatever the value carries; with ordered maps throughout
/// the crate that makes re-formatting deterministic.
fn pretty_json(value: &serde_json::Value) -> String {
    use serde::Serialize;

    let mut buf = Vec::with_capacity(128);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

/// Returns the offset of the end of the line containing `pos`, newline
/// excluded.
fn line_end(text: &str, pos: usize) -> usize {
    let pos = pos.min(text.len());
    match text[pos..].find('\n') {
        Some(idx) => pos + idx,
        None => text.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn fixed_record() -> ResponseRecord {
        ResponseRecord::success(
            "200 OK",
            142,
            Utc.with_ymd_and_hms(2026, 8, 6, 10, 30, 0).unwrap(),
            json!({"ok": true, "count": 2}),
        )
    }

    #[test]
    fn test_format_success_record() {
        let rendered = format(&fixed_record());

        assert!(rendered.starts_with("#[response] 200 OK | 142 ms | 2026-08-06T10:30:00Z"));
        assert!(rendered.contains("  \"ok\": true"));
        assert!(rendered.ends_with(RESPONSE_END_MARKER));
        assert!(!rendered.ends_with('\n'));
    }

    #[test]
    fn test_format_keeps_key_order() {
        let rendered = format(&fixed_record());
        let ok_at = rendered.find("\"ok\"").unwrap();
        let count_at = rendered.find("\"count\"").unwrap();
        assert!(ok_at < count_at);
    }

    #[test]
    fn test_format_error_record() {
        let record = ResponseRecord::failure(
            "connection refused",
            Utc.with_ymd_and_hms(2026, 8, 6, 10, 30, 0).unwrap(),
        );
        let rendered = format(&record);

        assert_eq!(rendered, "#[response:error] connection refused");
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn test_locate_no_marker_is_insertion_point() {
        let text = "GET \"https://a.example\" {}\n\nPOST \"https://b.example\" {}";
        let range = locate(text, 26, text.find("POST").unwrap());

        assert!(range.is_insertion());
        assert_eq!(range.from, 26);
    }

    #[test]
    fn test_locate_round_trips_format() {
        let request = "GET \"https://a.example\" {}";
        let rendered = format(&fixed_record());
        let text = format!("{}\n{}", request, rendered);
        let range = locate(&text, request.len(), text.len());

        assert_eq!(range.from, request.len() + 1);
        assert_eq!(range.to, text.len());
        assert_eq!(&text[range.from..range.to], rendered);
    }

    #[test]
    fn test_locate_error_form_spans_one_line() {
        let text = "GET \"https://a.example\" {}\n#[response:error] timed out\n\nPOST \"https://b.example\" {}";
        let range = locate(&text, 26, text.find("POST").unwrap());

        assert_eq!(&text[range.from..range.to], "#[response:error] timed out");
    }

    #[test]
    fn test_locate_stops_at_boundary() {
        // The marker after the boundary belongs to the next request and
        // must not be found.
        let text = "GET \"https://a.example\" {}\n\nPOST \"https://b.example\" {}\n#[response] 200 OK | 1 ms | 2026-08-06T10:30:00Z\n{}\n#[/response]";
        let boundary = text.find("POST").unwrap();
        let range = locate(&text, 26, boundary);

        assert!(range.is_insertion());
        assert_eq!(range.from, 26);
    }

    #[test]
    fn test_locate_truncated_response_keeps_separator() {
        let text = "GET \"https://a.example\" {}\n#[response] 200 OK | 1 ms | 2026-08-06T10:30:00Z\n{\n  \"x\": 1\n\nPOST \"https://b.example\" {}";
        let boundary = text.find("POST").unwrap();
        let range = locate(&text, 26, boundary);

        assert_eq!(range.from, 27);
        // The span ends at the last non-blank payload line; the blank
        // separator before the next request survives the replacement.
        assert!(text[range.from..range.to].ends_with("\"x\": 1"));
        assert!(range.to < boundary);
    }

    #[test]
    fn test_locate_insertion_with_no_trailing_newline() {
        let text = "GET \"https://a.example\" {}";
        let range = locate(text, text.len(), text.len());

        assert!(range.is_insertion());
        assert_eq!(range.from, text.len());
    }

    #[test]
    fn test_edit_range_basics() {
        let insertion = EditRange::insertion_at(10);
        assert!(insertion.is_insertion());
        assert!(insertion.is_empty());
        assert_eq!(insertion.len(), 0);

        let span = EditRange { from: 4, to: 9 };
        assert!(!span.is_insertion());
        assert_eq!(span.len(), 5);
    }

    #[test]
    fn test_replace_then_relocate_is_stable() {
        // Idempotence at the locate/format level: replacing a located span
        // with a re-formatted equivalent record leaves the same span
        // locatable again.
        let request = "GET \"https://a.example\" {}";
        let rendered = format(&fixed_record());
        let mut text = format!("{}\n{}", request, rendered);

        let first = locate(&text, request.len(), text.len());
        text.replace_range(first.from..first.to, &rendered);
        let second = locate(&text, request.len(), text.len());

        assert_eq!(first, second);
        assert_eq!(&text[second.from..second.to], rendered);
    }
}
