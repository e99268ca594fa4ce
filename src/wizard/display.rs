//! What the result display receives once a reflection is ready.

use serde::{Deserialize, Serialize};

/// Marker appended to truncated reflections.
pub const ELLIPSIS: char = '…';

/// Cut `text` to at most `max_chars` characters, trimming the kept part and
/// appending an ellipsis. Counts `char`s, so a cut never splits a code point.
pub fn truncate_response(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    format!("{}{ELLIPSIS}", text[..cut].trim())
}

/// Actions offered next to a displayed reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayAction {
    /// Discard the session and start again from the first step.
    Restart,
    /// Open the human follow-up contact target.
    RequestFollowUp,
}

/// A reflection ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultView {
    pub message: String,
    pub follow_up_url: String,
    pub actions: Vec<DisplayAction>,
}

impl ResultView {
    /// Build the view, truncating `message` to `max_chars`.
    pub fn new(message: &str, max_chars: usize, follow_up_url: &str) -> Self {
        Self {
            message: truncate_response(message, max_chars),
            follow_up_url: follow_up_url.to_string(),
            actions: vec![DisplayAction::Restart, DisplayAction::RequestFollowUp],
        }
    }
}
