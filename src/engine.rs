//! External editor-engine interface
//!
//! The highlight core drives an engine (the process that owns buffer
//! content and renders highlight marks) through these traits, and the
//! engine pushes change/viewport events back in through the coordinator.
//! Nothing here does I/O itself; hosts implement `HighlightEngine` over
//! whatever transport they have.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::highlight::{BufferId, Range};
use crate::theme::TokenColor;

// ============================================================================
// Errors
// ============================================================================

/// Failure surfaced by an engine call.
///
/// Never produced by the store or reducers; propagates unchanged to
/// whatever invoked the coordinator. Nothing in this crate retries.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected or failed a call
    #[error("engine call failed: {0}")]
    Call(String),
    /// The engine no longer knows the buffer
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferId),
}

pub type EngineResult<T> = Result<T, EngineError>;

// ============================================================================
// Highlight application
// ============================================================================

/// One resolved highlight descriptor: a range plus the color rule to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub range: Range,
    pub color: TokenColor,
}

/// Per-line application surface handed out for the duration of one batched
/// highlight update
pub trait BufferHighlightUpdater {
    /// Replace the highlight marks for one line with the given ordered
    /// spans. An empty slice clears the line.
    fn set_highlights_for_line(&mut self, line_number: usize, highlights: &[HighlightSpan]);
}

/// The engine surface this core depends on
pub trait HighlightEngine {
    /// Make the given color rules available as active color definitions
    fn sync_token_colors(&mut self, colors: &[TokenColor]) -> EngineResult<()>;

    /// Apply one batched highlight update to a buffer.
    ///
    /// Implementations acquire whatever underlying update handle they
    /// need, invoke `apply` exactly once with it, and release the handle
    /// whether or not the update succeeds, so the visual update lands
    /// atomically.
    fn update_highlights(
        &mut self,
        buffer_id: BufferId,
        apply: &mut dyn FnMut(&mut dyn BufferHighlightUpdater),
    ) -> EngineResult<()>;

    /// Apply one buffer edit. Called by the buffer manager's serialized
    /// edit queue, one edit at a time.
    fn apply_edit(&mut self, buffer_id: BufferId, edit: &BufferEdit) -> EngineResult<()>;
}

/// A textual edit to hand to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferEdit {
    /// Replace the full buffer content
    SetLines(Vec<String>),
    /// Replace a single line
    SetLine { line_number: usize, text: String },
}

// ============================================================================
// Engine events
// ============================================================================

/// Metadata snapshot accompanying engine events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferContext {
    pub id: BufferId,
    pub file_path: Option<PathBuf>,
    pub language: String,
    pub version: u64,
}

impl BufferContext {
    /// File extension with leading dot (`".rs"`), or empty for pathless
    /// buffers
    pub fn extension(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(|p| p.extension())
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }
}

/// One content change within a buffer-change event.
///
/// A change carrying neither `range` nor `range_length` is a full-content
/// replace; anything else is a localized edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    pub range: Option<Range>,
    pub range_length: Option<u64>,
    pub text: String,
}

impl ContentChange {
    /// Full-content replace
    pub fn full(text: impl Into<String>) -> Self {
        Self {
            range: None,
            range_length: None,
            text: text.into(),
        }
    }

    /// Localized edit replacing `range`
    pub fn incremental(range: Range, text: impl Into<String>) -> Self {
        Self {
            range: Some(range),
            range_length: None,
            text: text.into(),
        }
    }

    pub fn is_full_replace(&self) -> bool {
        self.range.is_none() && self.range_length.is_none()
    }
}

/// Buffer-change notification from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferChangedEvent {
    pub buffer: BufferContext,
    pub content_changes: Vec<ContentChange>,
}
