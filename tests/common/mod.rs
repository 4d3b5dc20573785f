//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Instant;

use prism::engine::{
    BufferEdit, BufferHighlightUpdater, EngineError, EngineResult, HighlightEngine, HighlightSpan,
};
use prism::model::buffer::Buffer;
use prism::theme::{Theme, TokenColor};
use prism::tokenizer::LineTokenizer;
use prism::{
    BufferChangedEvent, BufferContext, BufferId, ContentChange, EditorContext, Position, Range,
    RuleStack, SyntaxHighlighter, Token,
};

// ============================================================================
// Recording fake engine
// ============================================================================

/// One recorded batched highlight update: buffer plus per-line spans in
/// application order
#[derive(Debug, Clone)]
pub struct RecordedUpdate {
    pub buffer_id: BufferId,
    pub lines: Vec<(usize, Vec<HighlightSpan>)>,
}

/// Everything the fake engine saw
#[derive(Debug, Default)]
pub struct EngineLog {
    pub synced_colors: Vec<Vec<TokenColor>>,
    pub updates: Vec<RecordedUpdate>,
    pub edits: Vec<(BufferId, BufferEdit)>,
}

impl EngineLog {
    /// Line numbers emitted across all recorded updates
    pub fn emitted_lines(&self) -> Vec<usize> {
        self.updates
            .iter()
            .flat_map(|u| u.lines.iter().map(|(line, _)| *line))
            .collect()
    }
}

/// Engine double that records calls; can be told to fail highlight
/// updates or edits
pub struct FakeEngine {
    log: Arc<Mutex<EngineLog>>,
    pub fail_updates: bool,
    pub fail_edits_from: Option<usize>,
}

impl FakeEngine {
    pub fn new() -> (Self, Arc<Mutex<EngineLog>>) {
        let log = Arc::new(Mutex::new(EngineLog::default()));
        (
            Self {
                log: Arc::clone(&log),
                fail_updates: false,
                fail_edits_from: None,
            },
            log,
        )
    }
}

impl HighlightEngine for FakeEngine {
    fn sync_token_colors(&mut self, colors: &[TokenColor]) -> EngineResult<()> {
        self.log.lock().unwrap().synced_colors.push(colors.to_vec());
        Ok(())
    }

    fn update_highlights(
        &mut self,
        buffer_id: BufferId,
        apply: &mut dyn FnMut(&mut dyn BufferHighlightUpdater),
    ) -> EngineResult<()> {
        if self.fail_updates {
            return Err(EngineError::Call("highlight update rejected".into()));
        }

        struct Recorder {
            lines: Vec<(usize, Vec<HighlightSpan>)>,
        }
        impl BufferHighlightUpdater for Recorder {
            fn set_highlights_for_line(&mut self, line_number: usize, highlights: &[HighlightSpan]) {
                self.lines.push((line_number, highlights.to_vec()));
            }
        }

        let mut recorder = Recorder { lines: Vec::new() };
        apply(&mut recorder);
        self.log.lock().unwrap().updates.push(RecordedUpdate {
            buffer_id,
            lines: recorder.lines,
        });
        Ok(())
    }

    fn apply_edit(&mut self, buffer_id: BufferId, edit: &BufferEdit) -> EngineResult<()> {
        let mut log = self.log.lock().unwrap();
        if self.fail_edits_from.is_some_and(|from| log.edits.len() >= from) {
            return Err(EngineError::UnknownBuffer(buffer_id));
        }
        log.edits.push((buffer_id, edit.clone()));
        Ok(())
    }
}

// ============================================================================
// Fake tokenizer
// ============================================================================

/// Keyword tokenizer with just enough continuation state to exercise
/// rule-stack propagation: `/*` opens a block comment that `*/` closes
pub struct FakeTokenizer {
    pub keywords: Vec<String>,
}

impl FakeTokenizer {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn comment_stack() -> RuleStack {
    RuleStack::new(vec!["comment.block".into()])
}

impl LineTokenizer for FakeTokenizer {
    fn tokenize_line(
        &mut self,
        line: &str,
        line_number: usize,
        previous_stack: Option<&RuleStack>,
    ) -> (Vec<Token>, RuleStack) {
        let started_in_comment = previous_stack.is_some_and(|s| *s == comment_stack());

        if started_in_comment {
            let tokens = vec![Token::new(
                vec!["comment.block".into()],
                Range::single_line(line_number, 0, line.chars().count().max(1)),
            )];
            let stack = if line.contains("*/") {
                RuleStack::root()
            } else {
                comment_stack()
            };
            return (tokens, stack);
        }

        let mut tokens = Vec::new();
        for keyword in &self.keywords {
            let mut search_from = 0;
            while let Some(found) = line[search_from..].find(keyword.as_str()) {
                let start = search_from + found;
                let end = start + keyword.len();
                tokens.push(Token::new(
                    vec!["source".into(), "keyword.control".into()],
                    Range::single_line(line_number, start, end),
                ));
                search_from = end;
            }
        }
        tokens.sort_by_key(|t| t.range.start.character);

        let stack = if line.contains("/*") && !line.contains("*/") {
            comment_stack()
        } else {
            RuleStack::root()
        };
        (tokens, stack)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Minimal theme: a broad `keyword` rule plus a deeper `keyword.control`
/// rule and a `comment` rule
pub fn test_theme() -> Theme {
    Theme::from_yaml(
        r##"
name: Test
token_colors:
  - scope: keyword
    settings:
      foreground: "#569cd6"
  - scope: keyword.control
    settings:
      foreground: "#c586c0"
  - scope: comment
    settings:
      foreground: "#6a9955"
      italic: true
"##,
    )
    .expect("test theme parses")
}

/// Highlighter over the test theme plus a context wired to a recording
/// fake engine
pub fn test_setup() -> (SyntaxHighlighter, EditorContext, Arc<Mutex<EngineLog>>) {
    let (engine, log) = FakeEngine::new();
    let highlighter = SyntaxHighlighter::new(test_theme().token_colors);
    let ctx = EditorContext::new(Box::new(engine));
    (highlighter, ctx, log)
}

/// Active buffer metadata for tests
pub fn test_buffer(id: u64, version: u64) -> Buffer {
    Buffer {
        id: BufferId(id),
        file_path: Some(std::path::PathBuf::from("/src/main.ts")),
        language: "typescript".into(),
        version,
        line_count: 2,
        cursor: Position::new(0, 0),
        modified: false,
    }
}

/// Register `buffer` as the active buffer in the context
pub fn activate(ctx: &mut EditorContext, buffer: &Buffer) {
    ctx.buffers.update_from_event(buffer.clone(), vec![]);
}

/// Full-content change event for a buffer
pub fn full_change(buffer: &Buffer, text: &str) -> BufferChangedEvent {
    BufferChangedEvent {
        buffer: buffer_context(buffer),
        content_changes: vec![ContentChange::full(text)],
    }
}

/// Single-line incremental change event
pub fn line_change(buffer: &Buffer, line_number: usize, text: &str) -> BufferChangedEvent {
    BufferChangedEvent {
        buffer: buffer_context(buffer),
        content_changes: vec![ContentChange::incremental(
            Range::single_line(line_number, 0, text.chars().count()),
            text,
        )],
    }
}

pub fn buffer_context(buffer: &Buffer) -> BufferContext {
    BufferContext {
        id: buffer.id,
        file_path: buffer.file_path.clone(),
        language: buffer.language.clone(),
        version: buffer.version,
    }
}

/// A fixed instant to build deterministic timelines from
pub fn t0() -> Instant {
    Instant::now()
}
