//! Recovers a JSON payload from a free-form model reply.
//!
//! Candidate selection is a three-tier fallback, in order:
//! 1. the interior of a ```json fenced block,
//! 2. the greedy span from the first `{` to the last `}`,
//! 3. the whole reply text.
//!
//! Known limitation: the greedy span can swallow prose between multiple
//! brace-containing spans, so commentary with braces ahead of the real
//! JSON makes the parse fail; the mis-captured span is returned as
//! `raw_response` rather than corrected.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::errors::ErrorResult;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").unwrap());

static BRACE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// Extracts and parses the JSON object embedded in `reply`.
///
/// On success the parsed structure is returned as-is, with no validation
/// against the prompted shape. On failure the candidate text is attached
/// to the returned `ErrorResult` for debugging.
pub fn sanitize(reply: &str) -> Result<Value, ErrorResult> {
    let candidate = if let Some(caps) = FENCED_JSON.captures(reply) {
        caps.get(1).map_or(reply, |m| m.as_str())
    } else if let Some(m) = BRACE_SPAN.find(reply) {
        m.as_str()
    } else {
        reply
    };

    serde_json::from_str(candidate)
        .map_err(|_| ErrorResult::new("Failed to parse JSON").with_raw_response(candidate))
}
