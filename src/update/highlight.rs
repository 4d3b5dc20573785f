//! Reducer for the highlight store
//!
//! Pure state transitions, no I/O. Stale updates are a normal
//! concurrency-control outcome here, not an error: they are dropped with a
//! trace log and the state is left untouched.

use std::sync::Arc;

use crate::messages::HighlightMsg;
use crate::model::highlight::{
    BufferHighlightState, HighlightState, LineHighlightState, RuleStack, Token, Viewport,
};

/// Apply one action to the store state.
pub fn update_highlight(state: &mut HighlightState, msg: &HighlightMsg) {
    if let HighlightMsg::BufferClosed { buffer_id } = msg {
        if state.buffers.remove(buffer_id).is_some() {
            tracing::debug!(id = buffer_id.0, "dropped highlight state for closed buffer");
        }
        return;
    }

    let buffer = state
        .buffers
        .entry(msg.buffer_id())
        .or_insert_with(|| BufferHighlightState::new(msg.buffer_id()));

    match msg {
        HighlightMsg::ResetBuffer { lines, .. } => {
            reset_lines(buffer, lines.as_deref());
        }
        HighlightMsg::UpdateBuffer {
            language,
            extension,
            lines,
            version,
            ..
        } => {
            buffer.language = language.clone();
            buffer.extension = extension.clone();
            buffer.version = *version;
            for (line_number, text) in lines.iter().enumerate() {
                update_line_content(buffer, line_number, text, *version, false);
            }
        }
        HighlightMsg::UpdateBufferLine {
            line_number,
            line,
            version,
            force,
            ..
        } => {
            update_line_content(buffer, *line_number, line, *version, *force);
        }
        HighlightMsg::UpdateViewport { top, bottom, .. } => {
            buffer.viewport = Some(Viewport {
                top: *top,
                bottom: *bottom,
            });
        }
        HighlightMsg::UpdateTokensForLine {
            line_number,
            tokens,
            rule_stack,
            version,
            force,
            ..
        } => {
            apply_tokens(buffer, *line_number, tokens, rule_stack, *version, *force);
        }
        // Handled above
        HighlightMsg::BufferClosed { .. } => {}
    }
}

/// Every existing line entry: merge replacement content when supplied,
/// clear tokens and continuation state, force dirty.
fn reset_lines(buffer: &mut BufferHighlightState, replacement: Option<&[String]>) {
    for (line_number, line) in buffer.lines.iter_mut() {
        let content = replacement
            .and_then(|lines| lines.get(*line_number))
            .cloned()
            .unwrap_or_else(|| line.content.clone());
        *line = Arc::new(LineHighlightState {
            content,
            tokens: Vec::new(),
            rule_stack: None,
            dirty: true,
            version: None,
        });
    }
}

/// Replace one line's raw content and mark it dirty, unless the stored
/// line already carries tokens at or past `version`. Newest version wins;
/// stale updates are no-ops.
///
/// The last tokenization's rule stack survives the content update: the
/// re-tokenization that follows compares its fresh stack against it, and
/// that comparison is what cascades dirtiness into the next line.
fn update_line_content(
    buffer: &mut BufferHighlightState,
    line_number: usize,
    text: &str,
    version: u64,
    force: bool,
) {
    let existing = buffer.lines.get(&line_number);
    if !force {
        if let Some(existing) = existing {
            if existing.version.is_some_and(|v| v >= version) {
                tracing::trace!(
                    line = line_number,
                    stored = ?existing.version,
                    incoming = version,
                    "skipping stale line update"
                );
                return;
            }
        }
    }

    let rule_stack = existing.and_then(|l| l.rule_stack.clone());
    buffer.lines.insert(
        line_number,
        Arc::new(LineHighlightState {
            content: text.to_owned(),
            tokens: Vec::new(),
            rule_stack,
            dirty: true,
            version: None,
        }),
    );
}

/// Store freshly computed tokens for a line. A rule-stack change relative
/// to the previously stored stack dirties the following line, since
/// continuation-sensitive tokenizers must re-run it.
fn apply_tokens(
    buffer: &mut BufferHighlightState,
    line_number: usize,
    tokens: &[Token],
    rule_stack: &RuleStack,
    version: u64,
    force: bool,
) {
    let previous = buffer.lines.get(&line_number).cloned();

    if !force {
        if let Some(prev) = &previous {
            if prev.version.is_some_and(|v| v > version) {
                tracing::trace!(
                    line = line_number,
                    stored = ?prev.version,
                    incoming = version,
                    "dropping stale token update"
                );
                return;
            }
        }
    }

    let stack_changed = previous
        .as_ref()
        .and_then(|p| p.rule_stack.as_ref())
        .is_some_and(|prev_stack| prev_stack != rule_stack);

    buffer.lines.insert(
        line_number,
        Arc::new(LineHighlightState {
            content: previous.as_ref().map(|p| p.content.clone()).unwrap_or_default(),
            tokens: tokens.to_vec(),
            rule_stack: Some(rule_stack.clone()),
            dirty: false,
            version: Some(version),
        }),
    );

    if stack_changed {
        if let Some(next) = buffer.lines.get(&(line_number + 1)) {
            if !next.dirty {
                tracing::trace!(line = line_number + 1, "rule stack changed, dirtying next line");
                let mut dirtied = LineHighlightState::clone(next);
                dirtied.dirty = true;
                buffer.lines.insert(line_number + 1, Arc::new(dirtied));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::highlight::BufferId;

    fn update_buffer_msg(lines: &[&str], version: u64) -> HighlightMsg {
        HighlightMsg::UpdateBuffer {
            buffer_id: BufferId(1),
            language: "rust".into(),
            extension: ".rs".into(),
            lines: lines.iter().map(|s| s.to_string()).collect(),
            version,
        }
    }

    fn tokens_msg(line_number: usize, frames: &[&str], version: u64) -> HighlightMsg {
        HighlightMsg::UpdateTokensForLine {
            buffer_id: BufferId(1),
            line_number,
            tokens: Vec::new(),
            rule_stack: RuleStack::new(frames.iter().map(|s| s.to_string()).collect()),
            version,
            force: false,
        }
    }

    #[test]
    fn test_update_buffer_creates_dirty_lines() {
        let mut state = HighlightState::default();
        update_highlight(&mut state, &update_buffer_msg(&["fn main() {}", "// done"], 1));

        let buffer = state.buffer(BufferId(1)).unwrap();
        assert_eq!(buffer.lines.len(), 2);
        assert_eq!(buffer.version, 1);
        let line = buffer.line(0).unwrap();
        assert!(line.dirty);
        assert_eq!(line.content, "fn main() {}");
        assert_eq!(line.version, None);
    }

    #[test]
    fn test_tokens_clear_dirty_and_record_version() {
        let mut state = HighlightState::default();
        update_highlight(&mut state, &update_buffer_msg(&["let x = 1;"], 1));
        update_highlight(&mut state, &tokens_msg(0, &["source"], 1));

        let line = state.buffer(BufferId(1)).unwrap().line(0).unwrap();
        assert!(!line.dirty);
        assert_eq!(line.version, Some(1));
        assert_eq!(line.rule_stack, Some(RuleStack::new(vec!["source".into()])));
    }

    #[test]
    fn test_rule_stack_change_dirties_next_line() {
        let mut state = HighlightState::default();
        update_highlight(&mut state, &update_buffer_msg(&["/*", "still comment"], 1));
        update_highlight(&mut state, &tokens_msg(0, &["source"], 1));
        update_highlight(&mut state, &tokens_msg(1, &["source"], 1));
        assert!(!state.buffer(BufferId(1)).unwrap().line(1).unwrap().dirty);

        // Re-tokenize line 0 with a different continuation stack
        update_highlight(&mut state, &tokens_msg(0, &["source", "comment.block"], 1));
        assert!(state.buffer(BufferId(1)).unwrap().line(1).unwrap().dirty);
    }

    #[test]
    fn test_unchanged_rule_stack_leaves_next_line_untouched() {
        let mut state = HighlightState::default();
        update_highlight(&mut state, &update_buffer_msg(&["a", "b"], 1));
        update_highlight(&mut state, &tokens_msg(0, &["source"], 1));
        update_highlight(&mut state, &tokens_msg(1, &["source"], 1));

        let before = Arc::clone(state.buffer(BufferId(1)).unwrap().line(1).unwrap());
        update_highlight(&mut state, &tokens_msg(0, &["source"], 2));
        let after = state.buffer(BufferId(1)).unwrap().line(1).unwrap();

        assert!(!after.dirty);
        assert!(Arc::ptr_eq(&before, after));
    }

    #[test]
    fn test_stale_token_update_dropped() {
        let mut state = HighlightState::default();
        update_highlight(&mut state, &update_buffer_msg(&["x"], 1));
        update_highlight(&mut state, &tokens_msg(0, &["source", "deep"], 5));
        update_highlight(&mut state, &tokens_msg(0, &["source"], 3));

        let line = state.buffer(BufferId(1)).unwrap().line(0).unwrap();
        assert_eq!(line.version, Some(5));
        assert_eq!(
            line.rule_stack,
            Some(RuleStack::new(vec!["source".into(), "deep".into()]))
        );
    }

    #[test]
    fn test_forced_token_update_bypasses_gate() {
        let mut state = HighlightState::default();
        update_highlight(&mut state, &update_buffer_msg(&["x"], 1));
        update_highlight(&mut state, &tokens_msg(0, &["source"], 5));

        update_highlight(
            &mut state,
            &HighlightMsg::UpdateTokensForLine {
                buffer_id: BufferId(1),
                line_number: 0,
                tokens: Vec::new(),
                rule_stack: RuleStack::new(vec!["forced".into()]),
                version: 3,
                force: true,
            },
        );

        let line = state.buffer(BufferId(1)).unwrap().line(0).unwrap();
        assert_eq!(line.version, Some(3));
        assert_eq!(line.rule_stack, Some(RuleStack::new(vec!["forced".into()])));
    }

    #[test]
    fn test_reset_clears_tokens_and_versions() {
        let mut state = HighlightState::default();
        update_highlight(&mut state, &update_buffer_msg(&["a", "b"], 4));
        update_highlight(&mut state, &tokens_msg(0, &["source"], 4));

        update_highlight(
            &mut state,
            &HighlightMsg::ResetBuffer {
                buffer_id: BufferId(1),
                lines: None,
            },
        );

        let buffer = state.buffer(BufferId(1)).unwrap();
        for line in buffer.lines.values() {
            assert!(line.dirty);
            assert!(line.tokens.is_empty());
            assert_eq!(line.rule_stack, None);
            assert_eq!(line.version, None);
        }
        // Content survives a reset without replacement lines
        assert_eq!(buffer.line(0).unwrap().content, "a");
    }

    #[test]
    fn test_reset_merges_replacement_lines() {
        let mut state = HighlightState::default();
        update_highlight(&mut state, &update_buffer_msg(&["old a", "old b"], 1));
        update_highlight(
            &mut state,
            &HighlightMsg::ResetBuffer {
                buffer_id: BufferId(1),
                lines: Some(vec!["new a".into(), "new b".into()]),
            },
        );

        let buffer = state.buffer(BufferId(1)).unwrap();
        assert_eq!(buffer.line(0).unwrap().content, "new a");
        assert_eq!(buffer.line(1).unwrap().content, "new b");
    }

    #[test]
    fn test_buffer_closed_drops_entry() {
        let mut state = HighlightState::default();
        update_highlight(&mut state, &update_buffer_msg(&["a"], 1));
        assert!(state.buffer(BufferId(1)).is_some());

        update_highlight(&mut state, &HighlightMsg::BufferClosed { buffer_id: BufferId(1) });
        assert!(state.buffer(BufferId(1)).is_none());

        // Closing an unknown buffer is a no-op, not an error
        update_highlight(&mut state, &HighlightMsg::BufferClosed { buffer_id: BufferId(9) });
    }

    #[test]
    fn test_viewport_update_touches_only_bounds() {
        let mut state = HighlightState::default();
        update_highlight(&mut state, &update_buffer_msg(&["a"], 1));
        let before = Arc::clone(state.buffer(BufferId(1)).unwrap().line(0).unwrap());

        update_highlight(
            &mut state,
            &HighlightMsg::UpdateViewport {
                buffer_id: BufferId(1),
                top: 0,
                bottom: 40,
            },
        );

        let buffer = state.buffer(BufferId(1)).unwrap();
        assert_eq!(buffer.viewport, Some(Viewport { top: 0, bottom: 40 }));
        assert!(Arc::ptr_eq(&before, buffer.line(0).unwrap()));
    }
}
