//! Splitting a raw model reply into the answer and its `<think>` block.
//!
//! Only the first `<think>…</think>` pair is recognized. Replies with several
//! blocks, nested blocks or an unclosed opening marker are not interpreted:
//! anything beyond the first complete pair stays in the answer verbatim.

use regex::Regex;
use std::sync::LazyLock;

static THINK_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*think\s*>(.*?)<\s*/\s*think\s*>").expect("valid think-block pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedReply {
    pub answer: String,
    pub thoughts: Option<String>,
}

pub fn decompose(raw: &str) -> ParsedReply {
    if raw.is_empty() {
        return ParsedReply::default();
    }

    let Some(caps) = THINK_BLOCK.captures(raw) else {
        return ParsedReply {
            answer: raw.trim().to_string(),
            thoughts: None,
        };
    };

    // Group 0 always exists for a match.
    let block = caps.get(0).map(|m| m.range()).unwrap_or_default();
    let thoughts = caps
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let answer = format!("{}{}", &raw[..block.start], &raw[block.end..]);

    ParsedReply {
        answer: answer.trim().to_string(),
        thoughts: Some(thoughts),
    }
}
