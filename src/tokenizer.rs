//! Line tokenization boundary
//!
//! The grammar itself lives outside this crate: hosts implement
//! `LineTokenizer` over whatever tokenizer they embed, and
//! `SyntaxHighlighter::tokenize_pending` drives it across the dirty lines
//! of the visible band.

use crate::model::highlight::{RuleStack, Token};

/// A line-oriented tokenizer keyed by whatever language the host selected
pub trait LineTokenizer {
    /// Tokenize one line given the previous line's continuation state
    /// (`None` at the top of a buffer). Token ranges are expected on
    /// `line_number`. Returns the line's tokens plus the continuation
    /// state to carry into the next line.
    fn tokenize_line(
        &mut self,
        line: &str,
        line_number: usize,
        previous_stack: Option<&RuleStack>,
    ) -> (Vec<Token>, RuleStack);
}
