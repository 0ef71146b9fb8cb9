//! String utilities
//!
//! Contains helper functions for safe string manipulation.

/// Safely truncate a string at a character boundary
///
/// Truncates `s` to at most `max_chars` characters, never splitting a
/// multi-byte UTF-8 sequence.
///
/// # Example
/// ```
/// use multi_key_proxy::utils::truncate_str;
///
/// assert_eq!(truncate_str("sk-live-abcdef", 8), "sk-live-");
/// assert_eq!(truncate_str("short", 8), "short");
/// ```
pub fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_ascii() {
        assert_eq!(truncate_str("sk-proj-1234567890", 8), "sk-proj-");
        assert_eq!(truncate_str("abc", 8), "abc");
    }

    #[test]
    fn test_truncate_str_unicode() {
        // Each of these is a multi-byte character
        let key = "ключ-секрет";
        assert_eq!(truncate_str(key, 4), "ключ");
        assert_eq!(truncate_str(key, 5), "ключ-");
    }

    #[test]
    fn test_truncate_empty() {
        assert_eq!(truncate_str("", 8), "");
    }
}
