//! Actions for the highlight store
//!
//! All highlight state changes flow through these messages. Each variant
//! is a total transition: the reducer never fails, and stale or
//! unknown-buffer input falls through leaving state unchanged.

use crate::model::highlight::{BufferId, RuleStack, Token};

/// Highlight store actions
#[derive(Debug, Clone)]
pub enum HighlightMsg {
    /// Mark every known line dirty, optionally replacing line content.
    /// Used on full buffer reload and on colorscheme change.
    ResetBuffer {
        buffer_id: BufferId,
        lines: Option<Vec<String>>,
    },

    /// Full-content replace: line contents for the whole buffer, gated per
    /// line on `version` (a line already at or past this version is left
    /// alone)
    UpdateBuffer {
        buffer_id: BufferId,
        language: String,
        extension: String,
        lines: Vec<String>,
        version: u64,
    },

    /// Localized single-line edit. `force` bypasses the per-line version
    /// gate (fast path for per-keystroke re-highlighting).
    UpdateBufferLine {
        buffer_id: BufferId,
        line_number: usize,
        line: String,
        version: u64,
        force: bool,
    },

    /// Replace the stored visible-range bounds only
    UpdateViewport {
        buffer_id: BufferId,
        top: usize,
        bottom: usize,
    },

    /// Store freshly computed tokens for a line, clearing its dirty flag.
    /// `force` bypasses the stale-version gate. A rule-stack change
    /// relative to what was stored marks the following line dirty.
    UpdateTokensForLine {
        buffer_id: BufferId,
        line_number: usize,
        tokens: Vec<Token>,
        rule_stack: RuleStack,
        version: u64,
        force: bool,
    },

    /// Drop all highlight state for a closed buffer
    BufferClosed { buffer_id: BufferId },
}

impl HighlightMsg {
    /// Buffer this action targets
    pub fn buffer_id(&self) -> BufferId {
        match self {
            HighlightMsg::ResetBuffer { buffer_id, .. }
            | HighlightMsg::UpdateBuffer { buffer_id, .. }
            | HighlightMsg::UpdateBufferLine { buffer_id, .. }
            | HighlightMsg::UpdateViewport { buffer_id, .. }
            | HighlightMsg::UpdateTokensForLine { buffer_id, .. }
            | HighlightMsg::BufferClosed { buffer_id } => *buffer_id,
        }
    }
}
