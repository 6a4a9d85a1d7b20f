//! Brace-balanced JSON object extraction.
//!
//! Completions wrap JSON in prose and may put braces inside string values.
//! Only structural braces, outside string literals, count toward depth.

/// Returns the first top-level JSON object in `raw`, if one is balanced.
///
/// The returned slice borrows from `raw` and spans the first `{` through the
/// `}` that brings the nesting depth back to zero, inclusive. Braces inside
/// string literals are ignored; a backslash inside a string suppresses the
/// special meaning of the next character.
///
/// Returns `None` if `raw` has no `{` or the object is never closed.
///
/// # Examples
///
/// ```rust
/// use phishwise::extract;
///
/// let raw = r#"Here is it: {"reason": "found a \"{\" symbol", "mode":"qa"} done"#;
/// assert_eq!(
///     extract(raw),
///     Some(r#"{"reason": "found a \"{\" symbol", "mode":"qa"}"#)
/// );
/// assert_eq!(extract("no json here"), None);
/// ```
#[must_use]
#[tracing::instrument(level = "trace", skip_all, fields(input_length = raw.len()))]
pub fn extract(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let tail = &raw[start..];

    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escape = false;

    for (offset, c) in tail.char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let span = &tail[..=offset];
                    tracing::trace!(span_length = span.len(), "Found balanced JSON object");
                    return Some(span);
                }
            },
            _ => {},
        }
    }

    tracing::trace!(depth, in_string, "JSON object never closed");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_raw_object() {
        let raw = r#"{"key": "value"}"#;
        assert_eq!(extract(raw), Some(raw));
    }

    #[test]
    fn test_extract_with_prefix_and_suffix() {
        let raw = r#"Here is the result: {"key": "value"} hope this helps {not json"#;
        assert_eq!(extract(raw), Some(r#"{"key": "value"}"#));
    }

    #[test]
    fn test_extract_nested_object() {
        let raw = r#"Result: {"outer": {"inner": {"deep": 1}}, "after": 2} trailing }"#;
        assert_eq!(
            extract(raw),
            Some(r#"{"outer": {"inner": {"deep": 1}}, "after": 2}"#)
        );
    }

    #[test]
    fn test_extract_braces_in_string() {
        let raw = r#"{"reason": "uses { and } in text", "mode": "qa"}"#;
        assert_eq!(extract(raw), Some(raw));
    }

    #[test]
    fn test_extract_escaped_quote_before_brace() {
        let raw = r#"Here is it: {"reason": "found a \"{\" symbol", "mode":"qa"}"#;
        assert_eq!(
            extract(raw),
            Some(r#"{"reason": "found a \"{\" symbol", "mode":"qa"}"#)
        );
    }

    #[test]
    fn test_extract_escaped_backslash_closes_string() {
        // The string value is a single backslash; the quote after it closes the string.
        let raw = r#"{"path": "C:\\", "next": "}"} extra"#;
        assert_eq!(extract(raw), Some(r#"{"path": "C:\\", "next": "}"}"#));
    }

    #[test]
    fn test_extract_first_of_two_objects() {
        let raw = r#"{"a": 1} and {"b": 2}"#;
        assert_eq!(extract(raw), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn test_extract_markdown_fence() {
        let raw = "```json\n{\"mode\": \"qa\"}\n```";
        assert_eq!(extract(raw), Some(r#"{"mode": "qa"}"#));
    }

    #[test]
    fn test_extract_multibyte_text() {
        let raw = "Résultat → {\"reason\": \"café ☕ {\", \"mode\": \"qa\"} ✓";
        assert_eq!(
            extract(raw),
            Some("{\"reason\": \"café ☕ {\", \"mode\": \"qa\"}")
        );
    }

    #[test]
    fn test_extract_no_brace() {
        assert_eq!(extract("I cannot comply"), None);
        assert_eq!(extract(""), None);
        assert_eq!(extract("true"), None);
    }

    #[test]
    fn test_extract_unbalanced() {
        assert_eq!(extract(r#"{"reason": "cut off"#), None);
        assert_eq!(extract(r#"{"outer": {"inner": 1}"#), None);
        // Closing brace hidden inside an unterminated string.
        assert_eq!(extract(r#"{"reason": "}"#), None);
    }

    #[test]
    fn test_extract_leading_close_brace_ignored() {
        let raw = r#"} oops {"a": 1}"#;
        assert_eq!(extract(raw), Some(r#"{"a": 1}"#));
    }
}
