//! Formatting helpers shared by the renderer
//!
//! Filenames and tags must stay valid on every platform Obsidian runs on, and
//! frontmatter values must survive a YAML parser untouched.

use regex::Regex;
use std::sync::OnceLock;

const MAX_FILENAME_LEN: usize = 200;

static INVALID_CHARS_RE: OnceLock<Regex> = OnceLock::new();
static UNDERSCORE_RUN_RE: OnceLock<Regex> = OnceLock::new();

/// Make `name` safe to use as a file or folder name
///
/// Characters reserved on Windows/macOS are replaced by `_`, runs of `_` are
/// collapsed, surrounding `_`/spaces are trimmed and the result is capped at
/// 200 bytes. Returns `"untitled"` when nothing is left.
pub fn sanitize_filename(name: &str) -> String {
    let invalid = INVALID_CHARS_RE
        .get_or_init(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("valid regex"));
    let runs = UNDERSCORE_RUN_RE.get_or_init(|| Regex::new(r"_+").expect("valid regex"));

    let replaced = invalid.replace_all(name, "_");
    let collapsed = runs.replace_all(&replaced, "_");
    let mut sanitized = collapsed.trim_matches(|c| c == '_' || c == ' ').to_string();

    if sanitized.len() > MAX_FILENAME_LEN {
        let mut end = MAX_FILENAME_LEN;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized.truncate(end);
        sanitized = sanitized.trim_end_matches('_').to_string();
    }

    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        "untitled".to_string()
    } else {
        sanitized
    }
}

/// Lowercase, hyphenate and sanitize a value for use inside a tag path
pub fn tag_segment(value: &str) -> String {
    sanitize_filename(&value.to_lowercase().replace(' ', "-"))
}

/// Quote a string for a YAML frontmatter value
///
/// Plain values get double quotes. A value containing `"` but no `'` and no
/// control characters is single-quoted so it stays readable. Anything else is
/// double-quoted with backslash escapes.
pub fn format_yaml_string(value: &str) -> String {
    let has_double = value.contains('"');
    let has_single = value.contains('\'');
    let has_escapes = value.contains(['\\', '\n', '\r', '\t']);

    if !has_double && !has_escapes {
        return format!("\"{value}\"");
    }

    if has_double && !has_single && !value.contains(['\n', '\r', '\t']) {
        return format!("'{value}'");
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_filename("a/b\\c:d*e?f"), "a_b_c_d_e_f");
        assert_eq!(sanitize_filename("<<Work>>"), "Work");
        assert_eq!(sanitize_filename("  __Home__  "), "Home");
        assert_eq!(sanitize_filename("Café Notes"), "Café Notes");
    }

    #[test]
    fn test_sanitize_never_returns_empty_or_dots() {
        assert_eq!(sanitize_filename(""), "untitled");
        assert_eq!(sanitize_filename("???"), "untitled");
        assert_eq!(sanitize_filename(".."), "untitled");
    }

    #[test]
    fn test_sanitize_caps_length_on_char_boundary() {
        let long = "ü".repeat(150);
        let sanitized = sanitize_filename(&long);
        assert!(sanitized.len() <= MAX_FILENAME_LEN);
        assert!(sanitized.chars().all(|c| c == 'ü'));
    }

    #[test]
    fn test_tag_segment() {
        assert_eq!(tag_segment("Home Projects"), "home-projects");
        assert_eq!(tag_segment("Q1/Q2 Goals"), "q1_q2-goals");
    }

    #[test]
    fn test_yaml_plain_and_single_quote() {
        assert_eq!(format_yaml_string("Buy milk"), "\"Buy milk\"");
        assert_eq!(format_yaml_string("Don't forget"), "\"Don't forget\"");
        assert_eq!(format_yaml_string("Say \"hi\""), "'Say \"hi\"'");
    }

    #[test]
    fn test_yaml_escapes_mixed_quotes_and_control_chars() {
        assert_eq!(
            format_yaml_string("It's \"quoted\""),
            "\"It's \\\"quoted\\\"\""
        );
        assert_eq!(format_yaml_string("line1\nline2"), "\"line1\\nline2\"");
        assert_eq!(format_yaml_string("C:\\path"), "\"C:\\\\path\"");
        assert_eq!(format_yaml_string("a\tb"), "\"a\\tb\"");
    }
}
