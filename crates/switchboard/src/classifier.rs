//! Keyword heuristic deciding whether a request needs tool augmentation.
//!
//! This is a crude proxy for "does the user need live external data".
//! False positives and negatives are expected and accepted; the word
//! list is deliberately small and must not be made smarter here.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::Message;

lazy_static! {
    // Whole words only: "prefetching" must not trigger.
    static ref TOOL_KEYWORDS: Regex =
        Regex::new(r"(?i)\b(fetch|list|retrieve|weather)\b").expect("keyword regex is valid");
}

/// Returns true when the latest message in the conversation mentions one
/// of the tool keywords as a whole, case-insensitive word. The role of
/// the latest message is not consulted; an empty conversation never
/// needs tools.
pub fn needs_tools(messages: &[Message]) -> bool {
    let latest = messages.last().map(|m| m.content.as_str()).unwrap_or("");
    TOOL_KEYWORDS.is_match(latest)
}
