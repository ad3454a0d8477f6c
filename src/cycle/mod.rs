//! Per-request execution cycle.
//!
//! One cycle drives a single request through the state machine
//! Idle - Parsing - Resolving - Awaiting-Transport - Formatting - Editing -
//! Idle, issuing exactly one synchronous document edit at the end. A
//! parsing failure aborts with no mutation. A transport failure still runs
//! Formatting and Editing with an error-shaped record: errors are recorded
//! as data, not dropped.
//!
//! Concurrent cycles are allowed; each one recomputes positions against
//! whatever document state exists when it reaches Editing, so two
//! overlapping runs settle into a last-edit-wins race by design.

use crate::config::CycleConfig;
use crate::extract::{extract_at, ExtractError};
use crate::models::ResponseRecord;
use crate::respond::{self, EditRange};
use crate::surgery::{self, BlockView, EditorSurface};
use crate::syntax::SyntaxTree;
use crate::transport::Transport;
use crate::vars::VariableScope;
use chrono::{DateTime, Utc};
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Phases of one execution cycle, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Nothing running.
    Idle,
    /// Reading the block and extracting the request descriptor.
    Parsing,
    /// Substituting variables into the descriptor.
    Resolving,
    /// Waiting on the transport collaborator.
    AwaitingTransport,
    /// Locating the prior response and rendering the new one.
    Formatting,
    /// Applying the single document edit.
    Editing,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Parsing => "parsing",
            CyclePhase::Resolving => "resolving",
            CyclePhase::AwaitingTransport => "awaiting-transport",
            CyclePhase::Formatting => "formatting",
            CyclePhase::Editing => "editing",
        };
        write!(f, "{}", name)
    }
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The response was written into the document.
    Recorded {
        /// The document span the edit replaced, or the insertion point it
        /// expanded.
        edit: EditRange,
    },

    /// The cycle gave up without touching the document, either because
    /// structure never became available or because the request vanished
    /// before Editing.
    Abandoned,
}

/// Errors that abort a cycle before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// The anchor does not sit on an executable request.
    NotARequest(ExtractError),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::NotARequest(err) => write!(f, "Not a request: {}", err),
        }
    }
}

impl std::error::Error for CycleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CycleError::NotARequest(err) => Some(err),
        }
    }
}

impl From<ExtractError> for CycleError {
    fn from(err: ExtractError) -> Self {
        CycleError::NotARequest(err)
    }
}

/// Runs one full execution cycle for the request at `anchor`.
///
/// The receipt timestamp is stamped when the transport returns. See
/// [`execute_request_at`] for a deterministic variant.
///
/// # Arguments
///
/// * `surface` - The editor surface to read from and write back into
/// * `transport` - The collaborator that executes the resolved request
/// * `anchor` - Document offset anywhere inside the request statement
/// * `config` - Retry and hygiene knobs
pub fn execute_request(
    surface: &mut dyn EditorSurface,
    transport: &dyn Transport,
    anchor: usize,
    config: &CycleConfig,
) -> Result<CycleOutcome, CycleError> {
    execute_request_at(surface, transport, anchor, config, Utc::now())
}

/// Same as [`execute_request`] with an explicit receipt timestamp, making
/// the recorded text fully deterministic. Used by tests and replay
/// tooling.
pub fn execute_request_at(
    surface: &mut dyn EditorSurface,
    transport: &dyn Transport,
    anchor: usize,
    config: &CycleConfig,
    received_at: DateTime<Utc>,
) -> Result<CycleOutcome, CycleError> {
    let cycle_id = Uuid::new_v4();
    let span = tracing::debug_span!("request_cycle", id = %cycle_id);
    let _guard = span.enter();

    tracing::debug!(phase = %CyclePhase::Parsing, anchor, "reading block");
    let block = match fetch_block(surface, config) {
        Some(block) => block,
        None => {
            tracing::warn!("structural analysis unavailable; cycle abandoned");
            return Ok(CycleOutcome::Abandoned);
        }
    };
    let tree = SyntaxTree::parse(&block.text);
    let descriptor = extract_at(&tree, &block.text, anchor.saturating_sub(block.offset))?;

    tracing::debug!(
        phase = %CyclePhase::Resolving,
        method = %descriptor.method,
        "substituting variables"
    );
    let scope = VariableScope::declare(&tree, &block.text, None);
    let resolved = scope.resolve_descriptor(&descriptor);
    if config.check_urls {
        if let Err(err) = Url::parse(&resolved.url) {
            tracing::warn!(url = %resolved.url, "resolved URL did not parse: {}", err);
        }
    }

    tracing::debug!(phase = %CyclePhase::AwaitingTransport, url = %resolved.url, "handing off");
    let record = match transport.send(&resolved) {
        Ok(reply) => ResponseRecord::success(
            reply.status_display,
            reply.elapsed_ms,
            received_at,
            reply.body,
        ),
        Err(err) => ResponseRecord::failure(err.to_string(), received_at),
    };

    // Positions are recomputed here against whatever state the document is
    // in by now, not against the tree the request was parsed from.
    tracing::debug!(phase = %CyclePhase::Formatting, "locating prior response");
    let block = match fetch_block(surface, config) {
        Some(block) => block,
        None => {
            tracing::warn!("structural analysis unavailable at edit time; cycle abandoned");
            return Ok(CycleOutcome::Abandoned);
        }
    };
    let tree = SyntaxTree::parse(&block.text);
    let current = match extract_at(&tree, &block.text, anchor.saturating_sub(block.offset)) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            tracing::warn!("request no longer extractable at edit time: {}", err);
            return Ok(CycleOutcome::Abandoned);
        }
    };
    let boundary = tree
        .next_request_start(current.source.end)
        .unwrap_or(block.text.len());
    let local_range = respond::locate(&block.text, current.source.end, boundary);
    let formatted = respond::format(&record);

    tracing::debug!(
        phase = %CyclePhase::Editing,
        from = local_range.from,
        to = local_range.to,
        "applying edit"
    );
    let edit = EditRange {
        from: block.offset + local_range.from,
        to: block.offset + local_range.to,
    };
    surgery::record_response(surface, edit, &formatted, anchor);

    tracing::debug!(phase = %CyclePhase::Idle, "cycle complete");
    Ok(CycleOutcome::Recorded { edit })
}

/// Reads the current block, retrying a bounded number of times while the
/// surface reports structure as unavailable. The retry is short and
/// finite; it is the cycle's only suspension point.
fn fetch_block(surface: &mut dyn EditorSurface, config: &CycleConfig) -> Option<BlockView> {
    let mut attempt = 0;
    loop {
        if let Some(block) = surface.block() {
            return Some(block);
        }
        if attempt >= config.structure_retry_limit {
            return None;
        }
        attempt += 1;
        std::thread::sleep(config.retry_delay());
    }
}
