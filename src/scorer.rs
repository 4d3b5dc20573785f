//! Token scoring against theme color rules
//!
//! Selects the single best-matching color rule for a token's scope path.
//! A rule's selector matches a scope when it equals the scope or is a
//! dotted prefix of it: `keyword` matches `keyword.control.import` but not
//! `keywords`. Deeper selectors beat broad ones; declaration order breaks
//! ties (first wins, mirroring theme precedence).

use crate::theme::TokenColor;

#[derive(Debug, Default)]
pub struct TokenScorer;

impl TokenScorer {
    pub fn new() -> Self {
        Self
    }

    /// The highest-ranked rule for the given scope list, or `None` when no
    /// rule's selector matches any scope. An unmatchable configuration is
    /// "no color", never an error.
    pub fn rank_token_scopes<'a>(
        &self,
        scopes: &[String],
        rules: &'a [TokenColor],
    ) -> Option<&'a TokenColor> {
        let mut best: Option<(&'a TokenColor, u32)> = None;

        for rule in rules {
            let score = scopes
                .iter()
                .filter_map(|scope| selector_score(&rule.scope, scope))
                .max();
            let Some(score) = score else {
                continue;
            };
            // Strict > keeps the first-declared rule on ties
            if best.is_none_or(|(_, current)| score > current) {
                best = Some((rule, score));
            }
        }

        best.map(|(rule, _)| rule)
    }
}

/// Specificity of `selector` against `scope`: the selector's dotted
/// segment count when it is a prefix of the scope at a segment boundary,
/// `None` otherwise.
fn selector_score(selector: &str, scope: &str) -> Option<u32> {
    if selector.is_empty() {
        return None;
    }
    let rest = scope.strip_prefix(selector)?;
    if !rest.is_empty() && !rest.starts_with('.') {
        return None;
    }
    Some(selector.split('.').count() as u32)
}
