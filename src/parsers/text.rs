/// Collapses every run of whitespace (including newlines) into a single space and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps at most `max_chars` characters, never splitting a UTF-8 sequence
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Normalizes, truncates to the character budget and counts the words that survived.
///
/// The count is taken after truncation, so long pages are undercounted.
pub fn body_text_and_word_count(raw: &str, max_chars: usize) -> (String, usize) {
    let normalized = normalize_whitespace(raw);
    let truncated = truncate_chars(&normalized, max_chars).trim_end().to_string();
    let words = word_count(&truncated);
    (truncated, words)
}
