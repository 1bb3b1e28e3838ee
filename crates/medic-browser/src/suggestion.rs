//! Interpreting free-text model output as locators
//!
//! Models do not reliably say which selector language they answered in, so
//! the text is classified by shape, in this order:
//!
//! 1. starts with `//` or `(//` -> XPath
//! 2. contains `#`, `.` or `[` -> CSS
//! 3. anything else -> ambiguous: CSS first, then the same text as XPath

use medic_core::{is_xpath_expression, Locator};

/// Shape of a cleaned suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    XPath,
    Css,
    Ambiguous,
}

/// Classify a cleaned suggestion
pub fn classify_suggestion(text: &str) -> SuggestionKind {
    if is_xpath_expression(text) {
        SuggestionKind::XPath
    } else if text.contains(['#', '.', '[']) {
        SuggestionKind::Css
    } else {
        SuggestionKind::Ambiguous
    }
}

/// Locators to try for a suggestion, in order
pub fn candidate_locators(text: &str) -> Vec<Locator> {
    match classify_suggestion(text) {
        SuggestionKind::XPath => vec![Locator::xpath(text)],
        SuggestionKind::Css => vec![Locator::css(text)],
        SuggestionKind::Ambiguous => vec![Locator::css(text), Locator::xpath(text)],
    }
}

/// Strip the packaging models put around a selector
///
/// Removes surrounding whitespace, Markdown code fences (with an optional
/// language tag) and one layer of matching quotes or backticks, then keeps
/// the first non-empty line. Returns `None` if nothing is left.
pub fn clean_suggestion(raw: &str) -> Option<String> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !is_fence_line(line))?;

    let unquoted = strip_inline_fence(line)
        .or_else(|| strip_matching(line, '`'))
        .or_else(|| strip_matching(line, '"'))
        .or_else(|| strip_matching(line, '\''))
        .unwrap_or(line)
        .trim();

    if unquoted.is_empty() {
        None
    } else {
        Some(unquoted.to_string())
    }
}

/// A line holding only a fence, e.g. "```" or "```css"
fn is_fence_line(line: &str) -> bool {
    line.strip_prefix("```").is_some_and(|tag| {
        tag.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
    })
}

/// "```#q```" on a single line
fn strip_inline_fence(text: &str) -> Option<&str> {
    text.strip_prefix("```")?.strip_suffix("```")
}

fn strip_matching(text: &str, quote: char) -> Option<&str> {
    text.strip_prefix(quote)?.strip_suffix(quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_table() {
        let cases = [
            ("//input[@id='q']", SuggestionKind::XPath),
            ("(//button)[2]", SuggestionKind::XPath),
            ("#searchInput", SuggestionKind::Css),
            ("input.search", SuggestionKind::Css),
            ("input[name='search']", SuggestionKind::Css),
            ("div > span#x", SuggestionKind::Css),
            ("input", SuggestionKind::Ambiguous),
            ("button", SuggestionKind::Ambiguous),
            ("form input", SuggestionKind::Ambiguous),
            // XPath prefix wins over CSS-looking characters
            ("//a[@class='x.y']", SuggestionKind::XPath),
            // A single leading slash is not an XPath marker
            ("/html/body", SuggestionKind::Ambiguous),
        ];

        for (text, expected) in cases {
            assert_eq!(classify_suggestion(text), expected, "classifying {:?}", text);
        }
    }

    #[test]
    fn test_candidates_order() {
        assert_eq!(candidate_locators("//a"), vec![Locator::xpath("//a")]);
        assert_eq!(candidate_locators("#q"), vec![Locator::css("#q")]);
        assert_eq!(
            candidate_locators("input"),
            vec![Locator::css("input"), Locator::xpath("input")]
        );
    }

    #[test]
    fn test_clean_table() {
        let cases = [
            ("  #searchInput \n", Some("#searchInput")),
            ("```css\n#searchInput\n```", Some("#searchInput")),
            ("```\n//input[@name='q']\n```", Some("//input[@name='q']")),
            ("`input.search`", Some("input.search")),
            ("\"#q\"", Some("#q")),
            ("'button'", Some("button")),
            ("\n\n#first\n#second", Some("#first")),
            ("", None),
            ("   \n  ", None),
            ("``", None),
            ("```\n```", None),
            ("```#searchInput```", Some("#searchInput")),
            ("```html\n```input[name='q']```\n```", Some("input[name='q']")),
        ];

        for (raw, expected) in cases {
            assert_eq!(clean_suggestion(raw).as_deref(), expected, "cleaning {:?}", raw);
        }
    }

    #[test]
    fn test_clean_keeps_inner_quotes() {
        assert_eq!(
            clean_suggestion("input[name='q']").as_deref(),
            Some("input[name='q']")
        );
    }
}
