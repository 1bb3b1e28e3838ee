//! Recovery prompt construction

use std::borrow::Cow;

/// Appended to page markup that was cut to fit the prompt
pub const TRUNCATION_MARKER: &str = "\n...[truncated]";

const PREAMBLE: &str = "You are an expert in web UI test automation. \
A locator in a browser test no longer finds its element. \
Using the page HTML below, reply with ONLY a CSS selector or an XPath expression \
that uniquely identifies the described element. \
Do not add explanations, quotes, code fences or any other text.";

/// Keep at most `max_chars` characters from the start of `markup`
///
/// The prefix is kept, never the suffix: forms and headers near the top of
/// the document matter more than footers.
pub fn truncate_markup(markup: &str, max_chars: usize) -> Cow<'_, str> {
    match markup.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
            truncated.push_str(&markup[..cut]);
            truncated.push_str(TRUNCATION_MARKER);
            Cow::Owned(truncated)
        }
        None => Cow::Borrowed(markup),
    }
}

/// Build the single prompt sent to the backend
pub fn build_prompt(
    page_markup: &str,
    failed_locator: &str,
    element_description: &str,
    max_markup_chars: usize,
) -> String {
    format!(
        "{}\n\nFailed locator: {}\nElement description: {}\n\nPage HTML:\n{}\n\nSelector:",
        PREAMBLE,
        failed_locator,
        element_description,
        truncate_markup(page_markup, max_markup_chars)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_markup_unchanged() {
        let markup = "<form><input id='q'></form>";
        let result = truncate_markup(markup, 3000);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, markup);
    }

    #[test]
    fn test_exact_length_unchanged() {
        let markup = "a".repeat(3000);
        assert_eq!(truncate_markup(&markup, 3000), markup.as_str());
    }

    #[test]
    fn test_long_markup_keeps_prefix() {
        let markup = format!("{}{}", "h".repeat(3000), "f".repeat(500));
        let result = truncate_markup(&markup, 3000);
        assert_eq!(result.len(), 3000 + TRUNCATION_MARKER.len());
        assert!(result.starts_with(&"h".repeat(3000)));
        assert!(result.ends_with(TRUNCATION_MARKER));
        assert!(!result.contains('f'));
    }

    #[test]
    fn test_truncation_counts_characters() {
        // Multi-byte characters must not be split
        let markup = "é".repeat(10);
        let result = truncate_markup(&markup, 4);
        assert_eq!(result, format!("éééé{}", TRUNCATION_MARKER));
    }

    #[test]
    fn test_prompt_contains_parts() {
        let prompt = build_prompt("<input id='q'>", "id=search", "Wikipedia search box", 3000);
        assert!(prompt.contains("ONLY a CSS selector or an XPath expression"));
        assert!(prompt.contains("Failed locator: id=search"));
        assert!(prompt.contains("Element description: Wikipedia search box"));
        assert!(prompt.contains("<input id='q'>"));
        assert!(!prompt.contains(TRUNCATION_MARKER));
    }
}
