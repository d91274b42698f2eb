//! Display formatting for bot answers.
//!
//! Formatting is derived on every render and never stored back into the
//! transcript. Each rule consumes the whitespace around its match, so
//! formatting an already formatted answer returns it unchanged.

use std::sync::OnceLock;

use regex::Regex;

/// Phrase that introduces the source list at the end of an answer.
pub const REFERENCE_MARKER: &str = "For More Reference:";

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"\s*For More Reference:\s*", "\n\nFor More Reference:\n"),
            (r"\s*\u{2022}", "\n\u{2022}"),
            (r"\. +", ".\n"),
            (r"(?:^|\s+)- ", "\n- "),
        ]
        .into_iter()
        .map(|(pattern, replacement)| Rule {
            pattern: Regex::new(pattern).expect("format regex must compile"),
            replacement,
        })
        .collect()
    })
}

/// Breaks a bot answer into readable lines.
///
/// The reference marker gets a blank line before it and a line break after,
/// `•` bullets and ` - ` list markers start new lines, and a sentence-ending
/// `". "` becomes `".\n"`. The result is trimmed.
#[must_use]
pub fn format_response(text: &str) -> String {
    let mut formatted = text.to_string();
    for rule in rules() {
        formatted = rule
            .pattern
            .replace_all(&formatted, rule.replacement)
            .into_owned();
    }
    formatted.trim().to_string()
}
