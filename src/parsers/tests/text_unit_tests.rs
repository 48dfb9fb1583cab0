use crate::parsers::text;

#[test]
fn test_normalize_whitespace() {
    assert_eq!(text::normalize_whitespace(""), "");
    assert_eq!(text::normalize_whitespace("   \n \t "), "");
    assert_eq!(
        text::normalize_whitespace("  Line 1  \n\n  Line 2 \t\r\n Line 3 "),
        "Line 1 Line 2 Line 3"
    );
}

#[test]
fn test_truncate_chars_respects_char_boundaries() {
    assert_eq!(text::truncate_chars("hello", 10), "hello");
    assert_eq!(text::truncate_chars("hello", 3), "hel");
    assert_eq!(text::truncate_chars("héllo", 2), "hé");
    assert_eq!(text::truncate_chars("日本語テキスト", 3), "日本語");
    assert_eq!(text::truncate_chars("abc", 0), "");
}

#[test]
fn test_word_count() {
    assert_eq!(text::word_count(""), 0);
    assert_eq!(text::word_count("one"), 1);
    assert_eq!(text::word_count(" one  two\tthree\n"), 3);
}

#[test]
fn test_word_count_taken_after_truncation() {
    let raw = "alpha beta gamma delta";
    // "alpha beta g" survives a 12 character budget
    let (body, words) = text::body_text_and_word_count(raw, 12);
    assert_eq!(body, "alpha beta g");
    assert_eq!(words, 3);

    let (body, words) = text::body_text_and_word_count(raw, 11);
    assert_eq!(body, "alpha beta");
    assert_eq!(words, 2);
}
