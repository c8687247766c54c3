//! Shared utility functions used across multiple modules.

/// Normalize text by trimming whitespace and removing empties.
///
/// Returns `None` when the trimmed value is empty.
pub fn normalize_text(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Keep at most `max_chars` characters of `value`.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Current Unix timestamp in milliseconds.
pub fn unix_timestamp_ms_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_rejects_empty() {
        assert_eq!(normalize_text(""), None);
        assert_eq!(normalize_text(" \n\t "), None);
    }

    #[test]
    fn normalize_text_trims_value() {
        assert_eq!(normalize_text("  Hello  "), Some("Hello".to_string()));
    }

    #[test]
    fn truncate_chars_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn timestamp_is_positive() {
        assert!(unix_timestamp_ms_now() > 0);
    }
}
