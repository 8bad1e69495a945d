//! Question sanitizer
//!
//! Every question is passed through [`sanitize`] before it is embedded or
//! interpolated into a generation prompt. The output only ever contains
//! letters, digits, underscores, CJK ideographs and single spaces, so markup
//! and prompt punctuation from user input never reach the model.
//!
//! Steps, in order:
//!
//! 1. drop control code points (whitespace controls are kept for step 5)
//! 2. remove anything shaped like an HTML/XML tag
//! 3. HTML-escape what remains
//! 4. keep only word characters, whitespace and CJK ideographs
//! 5. collapse whitespace runs and trim
//!
//! Invalid UTF-8 is handled up front by [`sanitize_bytes`], which substitutes
//! U+FFFD for undecodable bytes; the replacement character is itself removed
//! in step 4.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"));

/// Sanitize a question.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();

    let untagged = TAG_RE.replace_all(&stripped, "");
    let escaped = html_escape::encode_safe(&untagged);

    let kept: String = escaped.chars().filter(|&c| is_kept(c)).collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanitize raw bytes, replacing invalid UTF-8 sequences before cleaning.
#[must_use]
pub fn sanitize_bytes(bytes: &[u8]) -> String {
    sanitize(&String::from_utf8_lossy(bytes))
}

/// Sanitize optional input; absent input yields an empty string.
#[must_use]
pub fn sanitize_opt(text: Option<&str>) -> String {
    text.map(sanitize).unwrap_or_default()
}

fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace() || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(sanitize("list all APIs"), "list all APIs");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(sanitize("  Login \t\n  API  "), "Login API");
    }

    #[test]
    fn test_removes_tags() {
        assert_eq!(sanitize("<script>alert(1)</script>hello"), "alert1hello");
        assert_eq!(sanitize("a <b>bold</b> word"), "a bold word");
    }

    #[test]
    fn test_escaped_entities_lose_punctuation() {
        // '&' becomes "&amp;" and then loses its punctuation
        assert_eq!(sanitize("tom & jerry"), "tom amp jerry");
        assert_eq!(sanitize("1 < 2"), "1 lt 2");
    }

    #[test]
    fn test_keeps_cjk_and_underscore() {
        assert_eq!(sanitize("列出所有 API!"), "列出所有 API");
        assert_eq!(sanitize("get_user_info()"), "get_user_info");
    }

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(sanitize("ab\u{0}c\u{7}d"), "abcd");
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = b"Export \xff\xfe API";
        assert_eq!(sanitize_bytes(bytes), "Export API");
    }

    #[test]
    fn test_missing_input() {
        assert_eq!(sanitize_opt(None), "");
        assert_eq!(sanitize_opt(Some(" hi ")), "hi");
    }

    #[test]
    fn test_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("!!! ??? ..."), "");
    }

    proptest! {
        #[test]
        fn test_idempotent(s in any::<String>()) {
            let once = sanitize(&s);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn test_idempotent_markup(s in "[<>&a-z \"'/=列出]{0,40}") {
            let once = sanitize(&s);
            prop_assert_eq!(sanitize(&once), once);
        }
    }
}
