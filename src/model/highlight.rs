//! Highlight store state
//!
//! Per-buffer, per-line tokenization state consumed by the reconciler.
//! Lines live behind `Arc` so the reconciler can detect "this line is the
//! same object I already emitted" with a pointer comparison; the reducer
//! allocates a fresh `Arc` only for lines it actually changes.

use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Identifiers and positions
// ============================================================================

/// Unique identifier for a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferId(pub u64);

/// A line/character position within a buffer (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// A `[start, end)` span within a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span within a single line, from `start_character` (inclusive) to
    /// `end_character` (exclusive)
    pub fn single_line(line: usize, start_character: usize, end_character: usize) -> Self {
        Self {
            start: Position::new(line, start_character),
            end: Position::new(line, end_character),
        }
    }

    /// Whether the given position falls inside this range
    pub fn contains(&self, line: usize, character: usize) -> bool {
        if line < self.start.line || line > self.end.line {
            return false;
        }
        if line == self.start.line && character < self.start.character {
            return false;
        }
        if line == self.end.line && character >= self.end.character {
            return false;
        }
        true
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// Opaque continuation state a line-oriented tokenizer carries across line
/// boundaries (e.g. "currently inside a block comment").
///
/// The frames mean nothing to this crate; they are only compared for
/// equality to decide whether the following line must be re-tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleStack {
    frames: Vec<String>,
}

impl RuleStack {
    pub fn new(frames: Vec<String>) -> Self {
        Self { frames }
    }

    /// The stack a tokenizer starts from at the top of a buffer
    pub fn root() -> Self {
        Self::default()
    }
}

/// A scope-tagged sub-range of a single line.
///
/// Scopes are dotted classification strings in tokenizer order (root
/// first, most specific last).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub scopes: Vec<String>,
    pub range: Range,
}

impl Token {
    pub fn new(scopes: Vec<String>, range: Range) -> Self {
        Self { scopes, range }
    }
}

// ============================================================================
// Per-line and per-buffer state
// ============================================================================

/// Tokenization state for one line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineHighlightState {
    /// Raw line text
    pub content: String,
    /// Tokens sorted by start column
    pub tokens: Vec<Token>,
    /// Continuation state left behind by tokenizing this line
    pub rule_stack: Option<RuleStack>,
    /// True when the tokens are stale and must be recomputed before use
    pub dirty: bool,
    /// Buffer version the tokens correspond to; `None` until tokenization
    /// completes
    pub version: Option<u64>,
}

/// Inclusive visible line bounds of a buffer's window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub top: usize,
    pub bottom: usize,
}

/// Highlight state for one open buffer
#[derive(Debug, Clone, Default)]
pub struct BufferHighlightState {
    pub buffer_id: BufferId,
    pub language: String,
    pub extension: String,
    /// Last buffer version applied via a full-content update
    pub version: u64,
    /// `None` until the first viewport notification arrives
    pub viewport: Option<Viewport>,
    pub lines: HashMap<usize, Arc<LineHighlightState>>,
}

impl BufferHighlightState {
    pub fn new(buffer_id: BufferId) -> Self {
        Self {
            buffer_id,
            ..Self::default()
        }
    }

    /// Line state for `line_number`, if any
    pub fn line(&self, line_number: usize) -> Option<&Arc<LineHighlightState>> {
        self.lines.get(&line_number)
    }

    /// Token containing the given position, if any
    pub fn token_at(&self, position: Position) -> Option<&Token> {
        let line = self.line(position.line)?;
        line.tokens
            .iter()
            .find(|t| t.range.contains(position.line, position.character))
    }
}

/// Root store state: highlight state per open buffer
#[derive(Debug, Clone, Default)]
pub struct HighlightState {
    pub buffers: HashMap<BufferId, BufferHighlightState>,
}

impl HighlightState {
    pub fn buffer(&self, buffer_id: BufferId) -> Option<&BufferHighlightState> {
        self.buffers.get(&buffer_id)
    }
}
