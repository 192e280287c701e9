//! Message splitting for replies longer than Telegram's per-message limit.
//!
//! Break-point priority within each window: paragraph break (`\n\n`), then
//! line break, then a plain space — but only past the halfway mark, so a
//! break early in the window can't produce a pathologically small chunk.
//! With no qualifying break point the cut lands exactly at the limit
//! (mid-word if it must), aligned down to a `char` boundary.

/// Telegram message length limit.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Split `text` into chunks of at most `max_len` bytes.
///
/// Concatenating the chunks reproduces the input exactly; separators stay
/// attached to the end of the chunk they terminate.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        let break_point = find_break_point(remaining, max_len);
        let (chunk, rest) = remaining.split_at(break_point);
        chunks.push(chunk.to_string());
        remaining = rest;
    }

    chunks
}

/// Byte offset to cut at. Always > 0 and ≤ `max_len` (unless even the first
/// `char` is wider than `max_len`, in which case that single char is cut).
fn find_break_point(text: &str, max_len: usize) -> usize {
    let hard_cut = floor_char_boundary(text, max_len);
    if hard_cut == 0 {
        return text.chars().next().map_or(text.len(), char::len_utf8);
    }

    let window = &text[..hard_cut];
    let half = max_len / 2;

    for sep in ["\n\n", "\n", " "] {
        if let Some(idx) = window.rfind(sep) {
            if idx > half {
                return idx + sep.len();
            }
        }
    }

    hard_cut
}

/// Largest index ≤ `index` that lies on a `char` boundary.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
