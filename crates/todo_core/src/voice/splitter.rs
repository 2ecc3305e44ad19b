//! Transcript-to-task splitting heuristic.
//!
//! Splits on the literal separators `and`, `,` and `.` matched
//! case-insensitively anywhere in the text, including inside words
//! ("candle" splits into "c" and "le"). There is no sentence, escape or
//! language awareness. Changing the separator set is a product decision.

use once_cell::sync::Lazy;
use regex::Regex;

static TASK_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)and|,|\.").expect("valid task separator regex"));

/// Splits dictated text into trimmed, non-empty task titles in spoken order.
pub fn split_into_tasks(raw_text: &str) -> Vec<String> {
    TASK_SEPARATOR_RE
        .split(raw_text)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}
