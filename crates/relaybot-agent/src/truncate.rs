//! Outbound reply truncation.
//!
//! Discord rejects messages over 2000 characters. Replies are cut at
//! `max_chars` characters (not bytes, so multi-byte sequences are never split)
//! and tagged with [`TRUNCATION_MARKER`].

use std::borrow::Cow;

pub const TRUNCATION_MARKER: &str = "\n\n[truncated]";

/// Return `text` unchanged when it fits, otherwise its first `max_chars`
/// characters followed by the marker.
pub fn truncate_reply(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + TRUNCATION_MARKER.len());
            out.push_str(&text[..cut]);
            out.push_str(TRUNCATION_MARKER);
            Cow::Owned(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_reply_is_untouched() {
        let text = "a".repeat(1950);
        assert!(matches!(truncate_reply(&text, 1950), Cow::Borrowed(_)));
        assert_eq!(truncate_reply("hello", 1950), "hello");
    }

    #[test]
    fn long_reply_is_cut_with_marker() {
        let text = "a".repeat(2000);
        let out = truncate_reply(&text, 1950);
        assert_eq!(out, format!("{}{}", "a".repeat(1950), TRUNCATION_MARKER));
        assert_eq!(out.chars().count(), 1950 + TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn one_over_the_limit_is_cut() {
        let text = "b".repeat(1951);
        assert!(matches!(truncate_reply(&text, 1950), Cow::Owned(_)));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "é".repeat(1950);
        assert!(matches!(truncate_reply(&text, 1950), Cow::Borrowed(_)));

        let text = "é".repeat(1960);
        let out = truncate_reply(&text, 1950);
        assert!(out.starts_with(&"é".repeat(1950)));
        assert!(out.ends_with(TRUNCATION_MARKER));
    }
}
