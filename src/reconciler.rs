//! Syntax highlight reconciler
//!
//! Translates highlight store state into minimal imperative highlight
//! calls against the active buffer: diffs the visible line band against a
//! per-line memo of what was last emitted and pushes one batched update
//! for the lines that actually changed.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::{EngineResult, HighlightEngine, HighlightSpan};
use crate::model::highlight::{BufferId, HighlightState, LineHighlightState};
use crate::scorer::TokenScorer;
use crate::theme::TokenColor;

/// One reconciliation pass runs after every store update; the memo keeps
/// unchanged lines from being re-emitted on unrelated updates (a
/// viewport-only change must not retrigger highlighting work for lines
/// that were already published).
#[derive(Debug, Default)]
pub struct Reconciler {
    /// Line state as of the last emission, keyed by line number
    previous: HashMap<usize, Arc<LineHighlightState>>,
    /// Buffer the memo belongs to
    previous_buffer: Option<BufferId>,
    scorer: TokenScorer,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all memoized emission state
    pub fn reset(&mut self) {
        self.previous.clear();
        self.previous_buffer = None;
    }

    /// Run one pass: diff the active buffer's visible band and emit one
    /// batched update for the lines that changed. Engine failures
    /// propagate; lines that were part of a failed batch are not
    /// memoized and will be re-emitted on the next pass.
    pub fn reconcile(
        &mut self,
        state: &HighlightState,
        active_buffer: Option<BufferId>,
        rules: &[TokenColor],
        engine: &mut dyn HighlightEngine,
    ) -> EngineResult<()> {
        let Some(buffer_id) = active_buffer else {
            return Ok(());
        };

        if self.previous_buffer != Some(buffer_id) {
            self.previous.clear();
            self.previous_buffer = Some(buffer_id);
        }

        let Some(buffer) = state.buffer(buffer_id) else {
            return Ok(());
        };
        let Some(band) = buffer.viewport else {
            return Ok(());
        };

        let mut visible: Vec<(usize, &Arc<LineHighlightState>)> = buffer
            .lines
            .iter()
            .filter(|(line_number, _)| **line_number >= band.top && **line_number <= band.bottom)
            .map(|(line_number, line)| (*line_number, line))
            .collect();
        visible.sort_unstable_by_key(|(line_number, _)| *line_number);

        let mut emissions: Vec<(usize, &Arc<LineHighlightState>, Vec<HighlightSpan>)> = Vec::new();
        for (line_number, line) in visible {
            // Not yet tokenized - nothing trustworthy to render
            if line.dirty {
                continue;
            }
            // Already published this exact line state
            if self
                .previous
                .get(&line_number)
                .is_some_and(|prev| Arc::ptr_eq(prev, line))
            {
                continue;
            }
            // A changed line with zero matched tokens still emits, to
            // clear stale marks
            let highlights = self.map_tokens_to_highlights(line, rules);
            emissions.push((line_number, line, highlights));
        }

        if emissions.is_empty() {
            return Ok(());
        }

        let mut colors: Vec<TokenColor> = Vec::new();
        for (_, _, spans) in &emissions {
            for span in spans {
                if !colors.contains(&span.color) {
                    colors.push(span.color.clone());
                }
            }
        }

        tracing::debug!(
            lines = emissions.len(),
            colors = colors.len(),
            "applying highlight changes"
        );

        engine.sync_token_colors(&colors)?;
        engine.update_highlights(buffer_id, &mut |updater| {
            for (line_number, _, spans) in &emissions {
                tracing::trace!(line = line_number, spans = spans.len(), "updating line highlights");
                updater.set_highlights_for_line(*line_number, spans);
            }
        })?;

        for (line_number, line, _) in emissions {
            self.previous.insert(line_number, Arc::clone(line));
        }
        Ok(())
    }

    /// Resolve each token to its best-matching color rule; tokens with no
    /// match are dropped
    fn map_tokens_to_highlights(
        &self,
        line: &LineHighlightState,
        rules: &[TokenColor],
    ) -> Vec<HighlightSpan> {
        line.tokens
            .iter()
            .filter_map(|token| {
                self.scorer
                    .rank_token_scopes(&token.scopes, rules)
                    .map(|color| HighlightSpan {
                        range: token.range,
                        color: color.clone(),
                    })
            })
            .collect()
    }
}
