//! Path resolution and small string helpers.

use std::path::PathBuf;

/// Get the Skyrelay data directory (e.g. `~/.skyrelay/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".skyrelay")
}

/// Get the key-value store directory (e.g. `~/.skyrelay/store/`).
pub fn get_store_path() -> PathBuf {
    get_data_path().join("store")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Sanitize a string for use as a filename.
pub fn safe_filename(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate_string("hello world, this is a long string", 15);
        assert_eq!(result, "hello world,...");
        assert!(result.len() <= 15);
    }

    #[test]
    fn test_truncate_unicode() {
        let result = truncate_string("こんにちは世界です", 5);
        assert_eq!(result, "こん...");
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("config:12345"), "config_12345");
        assert_eq!(safe_filename("file.json"), "file.json");
        assert_eq!(safe_filename("a/b/c"), "a_b_c");
    }

    #[test]
    fn test_data_path_ends_with_skyrelay() {
        assert!(get_data_path().ends_with(".skyrelay"));
    }

    #[test]
    fn test_store_path() {
        let path = get_store_path();
        assert!(path.ends_with("store"));
        assert!(path.parent().unwrap().ends_with(".skyrelay"));
    }
}
