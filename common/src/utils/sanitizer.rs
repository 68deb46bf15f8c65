//! Form input sanitization helpers.
//!
//! Every submitted field passes through here before validation: trim,
//! escape HTML-significant characters for safe redisplay, and map empty
//! optional fields to absent.

/// Escapes HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Trims and escapes a raw form value for safe redisplay.
pub fn sanitize(input: &str) -> String {
    escape_html(input.trim())
}

/// Maps an empty (already trimmed) optional field to absent.
pub fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Lowercase canonical form of a name, used for uniqueness checks.
pub fn canonical(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;&#x2F;script&gt;"
        );
        assert_eq!(escape_html("Ducky & co"), "Ducky &amp; co");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(sanitize("Cherry MX Red"), "Cherry MX Red");
    }

    #[test]
    fn test_sanitize_trims() {
        assert_eq!(sanitize("  ducky\t"), "ducky");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(String::new()), None);
        assert_eq!(non_empty("Korea".into()), Some("Korea".into()));
    }

    #[test]
    fn test_canonical_lowercases() {
        assert_eq!(canonical("  Cherry MX Blue "), "cherry mx blue");
        assert_eq!(canonical("ducky"), "ducky");
    }
}
