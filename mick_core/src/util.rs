//! Text helpers shared by the conversation handler and the Telegram layer.

/// Instruction that opens every fresh conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You're a helpful assistant";

/// Upper bound on the length of one outbound message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Split `text` into consecutive pieces of at most `limit` characters.
///
/// Splits on `char` boundaries, so multi-byte text is never cut inside a
/// code point. Concatenating the result gives back `text`. An empty input
/// yields no chunks; a `limit` of zero yields the whole text as one chunk.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<&str> {
    if limit == 0 {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(limit)
            .map_or(rest.len(), |(idx, _)| idx);
        let (head, tail) = rest.split_at(end);
        chunks.push(head);
        rest = tail;
    }
    chunks
}

/// Keep at most the first `limit` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    text.char_indices()
        .nth(limit)
        .map_or(text, |(idx, _)| &text[..idx])
}
