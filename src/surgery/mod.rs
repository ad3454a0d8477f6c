//! Editor surgery: the one text mutation per execution cycle.
//!
//! The cycle computes an [`EditRange`] and the canonical response text;
//! this module applies them to an editor surface as a single synchronous
//! edit. An insertion point gets a line break prepended so the response
//! lands on its own line; a replacement span is replaced verbatim, since
//! the old span already carried its separators.

use crate::respond::EditRange;

/// One block of the document as the editor currently sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockView {
    /// The block text.
    pub text: String,

    /// Byte offset of the block start within the whole document.
    pub offset: usize,
}

/// The editor-side contract the execution cycle drives.
///
/// [`EditorSurface::block`] returns `None` while the editor's structural
/// analysis is unavailable (mid-large-paste, for instance); the cycle
/// retries a bounded number of times rather than acting on stale
/// structure. All offsets passed back in are document offsets.
pub trait EditorSurface {
    /// Current block at the user's position, or `None` while structure is
    /// unavailable.
    fn block(&mut self) -> Option<BlockView>;

    /// Replaces the given span with the replacement text. An empty span is
    /// an insertion.
    fn apply_edit(&mut self, range: EditRange, replacement: &str);

    /// Moves the cursor back to the given offset.
    fn restore_cursor(&mut self, offset: usize);

    /// Scrolls the given offset into view.
    fn scroll_to(&mut self, offset: usize);
}

/// Applies a formatted response to the surface as one edit.
///
/// Post-conditions: the cursor is back at the request anchor, not the
/// edited region, and the edited region is scrolled into view.
pub fn record_response(
    surface: &mut dyn EditorSurface,
    range: EditRange,
    formatted: &str,
    anchor: usize,
) {
    if range.is_insertion() {
        let mut patch = String::with_capacity(formatted.len() + 1);
        patch.push('\n');
        patch.push_str(formatted);
        surface.apply_edit(range, &patch);
    } else {
        surface.apply_edit(range, formatted);
    }
    surface.restore_cursor(anchor);
    surface.scroll_to(range.from);
}

/// In-memory editor surface holding a single block.
///
/// Used by tests and benches in place of a real editor. The buffer can be
/// told to report structure as unavailable for its next N reads, which is
/// how the bounded-retry path gets exercised.
#[derive(Debug, Clone, Default)]
pub struct ScratchBuffer {
    text: String,
    cursor: usize,
    scroll: usize,
    unavailable_reads: usize,
}

impl ScratchBuffer {
    /// Creates a buffer over the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            scroll: 0,
            unavailable_reads: 0,
        }
    }

    /// Creates a buffer whose first `reads` structure reads fail.
    pub fn with_unavailable_reads(text: impl Into<String>, reads: usize) -> Self {
        Self {
            unavailable_reads: reads,
            ..Self::new(text)
        }
    }

    /// Current buffer text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current cursor offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Offset most recently scrolled into view.
    pub fn scroll(&self) -> usize {
        self.scroll
    }
}

impl EditorSurface for ScratchBuffer {
    fn block(&mut self) -> Option<BlockView> {
        if self.unavailable_reads > 0 {
            self.unavailable_reads -= 1;
            return None;
        }
        Some(BlockView {
            text: self.text.clone(),
            offset: 0,
        })
    }

    fn apply_edit(&mut self, range: EditRange, replacement: &str) {
        self.text.replace_range(range.from..range.to, replacement);
    }

    fn restore_cursor(&mut self, offset: usize) {
        self.cursor = offset;
    }

    fn scroll_to(&mut self, offset: usize) {
        self.scroll = offset;
    }
}
