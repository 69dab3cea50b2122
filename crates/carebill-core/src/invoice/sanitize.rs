//! Sanitizing of untrusted document text before pattern matching.

use super::rules::patterns::{MARKUP_BLOCK, MARKUP_TAG};

/// Hard cap on sanitized text length, in characters.
pub const MAX_TEXT_LENGTH: usize = 50_000;

/// Appended when text had to be cut to the length cap.
pub const TRUNCATION_MARKER: &str = "\n[truncated]";

/// Output of [`sanitize_with_limit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub text: String,
    /// Whether the input exceeded the cap.
    pub truncated: bool,
}

/// Strip markup and control characters and bound the text to
/// [`MAX_TEXT_LENGTH`] characters.
pub fn sanitize(raw: &str) -> String {
    sanitize_with_limit(raw, MAX_TEXT_LENGTH).text
}

/// Like [`sanitize`] with a caller-chosen cap.
///
/// A truncated result is exactly `limit` characters long including the
/// marker, so sanitizing it again is a no-op.
pub fn sanitize_with_limit(raw: &str, limit: usize) -> Sanitized {
    if raw.is_empty() {
        return Sanitized {
            text: String::new(),
            truncated: false,
        };
    }

    let without_blocks = MARKUP_BLOCK.replace_all(raw, "");
    let without_tags = MARKUP_TAG.replace_all(&without_blocks, "");

    let cleaned: String = without_tags
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let length = cleaned.chars().count();
    if length <= limit {
        return Sanitized {
            text: cleaned,
            truncated: false,
        };
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    let text = if limit > marker_len {
        let mut text: String = cleaned.chars().take(limit - marker_len).collect();
        text.push_str(TRUNCATION_MARKER);
        text
    } else {
        cleaned.chars().take(limit).collect()
    };

    Sanitized {
        text,
        truncated: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_blocks() {
        let clean = sanitize("<script>alert('xss')</script>Invoice Amount: $100");
        assert_eq!(clean, "Invoice Amount: $100");
    }

    #[test]
    fn test_strips_tags_keeps_text() {
        let clean = sanitize("<b>Previous Balance</b> <span class=\"x\">$86.52</span>");
        assert_eq!(clean, "Previous Balance $86.52");
    }

    #[test]
    fn test_strips_control_characters() {
        let clean = sanitize("Amount\x00 due\x07\r\n\tTotal\x1b[0m");
        assert_eq!(clean, "Amount due\n\tTotal[0m");
    }

    #[test]
    fn test_unclosed_angle_bracket_survives() {
        assert_eq!(sanitize("fee < 5"), "fee < 5");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("\x00\x01"), "");
    }

    #[test]
    fn test_truncates_to_cap() {
        let long = "A".repeat(60_000);
        let result = sanitize_with_limit(&long, MAX_TEXT_LENGTH);

        assert!(result.truncated);
        assert_eq!(result.text.chars().count(), MAX_TEXT_LENGTH);
        assert!(result.text.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_tiny_limit() {
        let result = sanitize_with_limit("abcdef", 3);
        assert_eq!(result.text, "abc");
        assert!(result.truncated);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            String::from("<<b>b> plain"),
            String::from("<scr<b>ipt>x</script> tail"),
            String::from("Line\r\nNext\x00<i>it</i>"),
            format!("{}<b>", "x".repeat(MAX_TEXT_LENGTH)),
            "é".repeat(MAX_TEXT_LENGTH + 10),
        ];

        for input in &inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {:?}", &input[..input.len().min(40)]);
        }
    }
}
