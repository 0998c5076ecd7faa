//! Shared helper functions for CLI commands

use chrono::{DateTime, Local, Utc};

use crate::core::identity::RfpId;

/// Format an RfpId for display, truncating if too long
///
/// Generated ids are 30 characters; they are cut to 13 with a "..." suffix.
/// Seed ids are short enough to show whole.
pub fn format_short_id(id: &RfpId) -> String {
    format_short_id_str(id.as_str())
}

/// Same as [`format_short_id`] for a plain string
pub fn format_short_id_str(id: &str) -> String {
    if id.chars().count() > 20 {
        let head: String = id.chars().take(13).collect();
        format!("{}...", head)
    } else {
        id.to_string()
    }
}

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Human-readable byte size
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// Upload timestamp in local time, "-" when unknown
pub fn format_uploaded(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_short_id() {
        let id = RfpId::new("RFP-01J123456789ABCDEF12345678");
        assert_eq!(format_short_id(&id), "RFP-01J123456...");
        assert_eq!(format_short_id_str("default-dmrc-phase4"), "default-dmrc-phase4");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Überlandleitung", 6), "Übe...");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_format_uploaded_missing() {
        assert_eq!(format_uploaded(None), "-");
    }
}
