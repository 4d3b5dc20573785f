//! Syntax highlighting coordinator
//!
//! Receives buffer-change and viewport notifications from the engine,
//! classifies full-content vs localized changes, coalesces the latter,
//! dispatches into the highlight store, and drives the reconciler after
//! every state change. Single-threaded and cooperative: the host loop
//! calls in, each dispatch runs to completion (reducer, then one
//! reconciliation pass) before returning.

use std::time::{Duration, Instant};

use crate::config::HighlightConfig;
use crate::context::EditorContext;
use crate::engine::{BufferChangedEvent, EngineResult};
use crate::messages::HighlightMsg;
use crate::model::buffer::Buffer;
use crate::model::highlight::{BufferId, HighlightState, Position, RuleStack, Token};
use crate::reconciler::Reconciler;
use crate::theme::TokenColor;
use crate::throttle::{BatchQueue, DEFAULT_UPDATE_INTERVAL};
use crate::tokenizer::LineTokenizer;
use crate::update::update_highlight;

pub struct SyntaxHighlighter {
    state: HighlightState,
    reconciler: Reconciler,
    token_colors: Vec<TokenColor>,
    queued: BatchQueue<HighlightMsg>,
    disposed: bool,
}

impl SyntaxHighlighter {
    pub fn new(token_colors: Vec<TokenColor>) -> Self {
        Self::with_update_interval(token_colors, DEFAULT_UPDATE_INTERVAL)
    }

    pub fn with_update_interval(token_colors: Vec<TokenColor>, interval: Duration) -> Self {
        Self {
            state: HighlightState::default(),
            reconciler: Reconciler::new(),
            token_colors,
            queued: BatchQueue::new(interval),
            disposed: false,
        }
    }

    /// Build a highlighter from persisted configuration: the configured
    /// theme's color rules and flush interval
    pub fn from_config(config: &HighlightConfig) -> Result<Self, String> {
        let theme = crate::theme::load_theme(&config.theme)?;
        Ok(Self::with_update_interval(
            theme.token_colors,
            Duration::from_millis(config.update_interval_ms),
        ))
    }

    /// Current store state (read-only)
    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    /// Swap the active color rules. Pair with `notify_colorscheme_redraw`
    /// so existing lines are re-tokenized and re-emitted.
    pub fn set_token_colors(&mut self, colors: Vec<TokenColor>) {
        self.token_colors = colors;
    }

    /// Viewport bounds changed for a buffer. No-op when equal to the
    /// stored bounds; otherwise dispatched synchronously.
    pub fn notify_viewport_changed(
        &mut self,
        buffer_id: BufferId,
        top: usize,
        bottom: usize,
        ctx: &mut EditorContext,
    ) -> EngineResult<()> {
        if self.disposed {
            return Ok(());
        }

        let unchanged = self
            .state
            .buffer(buffer_id)
            .and_then(|b| b.viewport)
            .is_some_and(|v| v.top == top && v.bottom == bottom);
        if unchanged {
            return Ok(());
        }

        tracing::trace!(id = buffer_id.0, top, bottom, "viewport changed");
        self.dispatch(HighlightMsg::UpdateViewport { buffer_id, top, bottom }, ctx)
    }

    /// Buffer content changed. A change with no range information is a
    /// full-content replace and dispatches synchronously; localized edits
    /// are coalesced into the batched queue and land on the next due
    /// `pump`.
    pub fn notify_buffer_update(
        &mut self,
        evt: &BufferChangedEvent,
        now: Instant,
        ctx: &mut EditorContext,
    ) -> EngineResult<()> {
        if self.disposed {
            return Ok(());
        }
        let Some(first) = evt.content_changes.first() else {
            return Ok(());
        };

        if first.is_full_replace() {
            let lines: Vec<String> = first.text.lines().map(str::to_owned).collect();
            tracing::debug!(
                id = evt.buffer.id.0,
                version = evt.buffer.version,
                lines = lines.len(),
                "full buffer update"
            );
            return self.dispatch(
                HighlightMsg::UpdateBuffer {
                    buffer_id: evt.buffer.id,
                    language: evt.buffer.language.clone(),
                    extension: evt.buffer.extension(),
                    lines,
                    version: evt.buffer.version,
                },
                ctx,
            );
        }

        for change in &evt.content_changes {
            let Some(range) = change.range else {
                continue;
            };
            self.queued.push(
                HighlightMsg::UpdateBufferLine {
                    buffer_id: evt.buffer.id,
                    line_number: range.start.line,
                    line: change.text.clone(),
                    version: evt.buffer.version,
                    force: false,
                },
                now,
            );
        }
        Ok(())
    }

    /// Colorscheme changed: force full re-tokenization of the buffer on
    /// the next pass
    pub fn notify_colorscheme_redraw(
        &mut self,
        buffer_id: BufferId,
        ctx: &mut EditorContext,
    ) -> EngineResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.dispatch(HighlightMsg::ResetBuffer { buffer_id, lines: None }, ctx)
    }

    /// Force reprocessing of the given lines even when the buffer version
    /// would otherwise gate the update out: the reset clears the per-line
    /// versions, so the same-version update that follows is applied.
    pub fn update_buffer(
        &mut self,
        lines: Vec<String>,
        buffer: &Buffer,
        ctx: &mut EditorContext,
    ) -> EngineResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.dispatch(
            HighlightMsg::ResetBuffer {
                buffer_id: buffer.id,
                lines: Some(lines.clone()),
            },
            ctx,
        )?;
        self.dispatch(
            HighlightMsg::UpdateBuffer {
                buffer_id: buffer.id,
                language: buffer.language.clone(),
                extension: buffer.extension(),
                lines,
                version: buffer.version,
            },
            ctx,
        )
    }

    /// Fast single-line re-highlight while typing: queued like any other
    /// localized edit but bypassing the version gate
    pub fn update_line(&mut self, line: String, line_number: usize, buffer: &Buffer, now: Instant) {
        if self.disposed {
            return;
        }
        self.queued.push(
            HighlightMsg::UpdateBufferLine {
                buffer_id: buffer.id,
                line_number,
                line,
                version: buffer.version,
                force: true,
            },
            now,
        );
    }

    /// Entry point for tokenizer results: store freshly computed tokens
    /// for one line
    pub fn apply_line_tokens(
        &mut self,
        buffer_id: BufferId,
        line_number: usize,
        tokens: Vec<Token>,
        rule_stack: RuleStack,
        version: u64,
        force: bool,
        ctx: &mut EditorContext,
    ) -> EngineResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.dispatch(
            HighlightMsg::UpdateTokensForLine {
                buffer_id,
                line_number,
                tokens,
                rule_stack,
                version,
                force,
            },
            ctx,
        )
    }

    /// A buffer closed: drop its highlight state
    pub fn notify_buffer_closed(
        &mut self,
        buffer_id: BufferId,
        ctx: &mut EditorContext,
    ) -> EngineResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.dispatch(HighlightMsg::BufferClosed { buffer_id }, ctx)
    }

    /// Token containing the given position, if any. Pure lookup; unknown
    /// buffers, lines, and positions are `None`, never an error.
    pub fn get_highlight_token_at(&self, buffer_id: BufferId, position: Position) -> Option<&Token> {
        self.state.buffer(buffer_id)?.token_at(position)
    }

    /// Flush the batched queue if its window is due: apply every queued
    /// action in arrival order through the reducer, then run one
    /// reconciliation pass for the whole batch. Called from the host loop.
    pub fn pump(&mut self, now: Instant, ctx: &mut EditorContext) -> EngineResult<()> {
        if self.disposed {
            return Ok(());
        }
        let batch = self.queued.drain_due(now);
        if batch.is_empty() {
            return Ok(());
        }
        tracing::debug!(actions = batch.len(), "flushing batched highlight actions");
        for msg in &batch {
            update_highlight(&mut self.state, msg);
        }
        self.reconcile(ctx)
    }

    /// Actions waiting for the next due `pump`
    pub fn pending_actions(&self) -> usize {
        self.queued.len()
    }

    /// Tokenize up to `budget` dirty lines inside the active buffer's
    /// visible band, top to bottom, carrying each line's predecessor rule
    /// stack, and store the results. Rule-stack changes cascade dirtiness
    /// down the band; repeated calls converge. Returns the number of
    /// lines processed.
    pub fn tokenize_pending(
        &mut self,
        tokenizer: &mut dyn LineTokenizer,
        ctx: &mut EditorContext,
        budget: usize,
    ) -> EngineResult<usize> {
        if self.disposed {
            return Ok(0);
        }
        let Some(buffer_id) = ctx.buffers.active_id() else {
            return Ok(0);
        };
        let Some(band) = self.state.buffer(buffer_id).and_then(|b| b.viewport) else {
            return Ok(0);
        };

        let mut processed = 0;
        let mut cursor = band.top;
        while processed < budget && cursor <= band.bottom {
            let work = {
                let Some(buffer) = self.state.buffer(buffer_id) else {
                    break;
                };
                match buffer.line(cursor) {
                    Some(line) if line.dirty => {
                        let previous_stack = cursor
                            .checked_sub(1)
                            .and_then(|p| buffer.line(p))
                            .and_then(|l| l.rule_stack.clone());
                        Some((line.content.clone(), previous_stack, buffer.version))
                    }
                    _ => None,
                }
            };

            if let Some((content, previous_stack, version)) = work {
                let (tokens, rule_stack) =
                    tokenizer.tokenize_line(&content, cursor, previous_stack.as_ref());
                self.apply_line_tokens(buffer_id, cursor, tokens, rule_stack, version, false, ctx)?;
                processed += 1;
            }
            cursor += 1;
        }
        Ok(processed)
    }

    /// Drop queued work and memoized emission state. Idempotent; all
    /// further notifications become no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.queued.clear();
        self.reconciler.reset();
        tracing::debug!("syntax highlighter disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Apply one action and run one reconciliation pass before returning
    fn dispatch(&mut self, msg: HighlightMsg, ctx: &mut EditorContext) -> EngineResult<()> {
        update_highlight(&mut self.state, &msg);
        self.reconcile(ctx)
    }

    fn reconcile(&mut self, ctx: &mut EditorContext) -> EngineResult<()> {
        self.reconciler.reconcile(
            &self.state,
            ctx.buffers.active_id(),
            &self.token_colors,
            ctx.engine.as_mut(),
        )
    }
}
