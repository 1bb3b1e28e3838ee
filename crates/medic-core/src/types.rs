//! Locators and element descriptions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::MedicError;

/// How to find an element on a page
///
/// Locators are immutable values built by callers. Each variant carries the
/// raw selector string for its strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Locator {
    Id(String),
    Css(String),
    #[serde(rename = "xpath")]
    XPath(String),
    Name(String),
    ClassName(String),
    TagName(String),
    LinkText(String),
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Locator::Id(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Locator::Css(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Locator::XPath(value.into())
    }

    /// Strategy prefix used by `describe()` and `FromStr`
    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::Id(_) => "id",
            Locator::Css(_) => "css",
            Locator::XPath(_) => "xpath",
            Locator::Name(_) => "name",
            Locator::ClassName(_) => "class",
            Locator::TagName(_) => "tag",
            Locator::LinkText(_) => "link",
        }
    }

    /// The raw selector string
    pub fn value(&self) -> &str {
        match self {
            Locator::Id(v)
            | Locator::Css(v)
            | Locator::XPath(v)
            | Locator::Name(v)
            | Locator::ClassName(v)
            | Locator::TagName(v)
            | Locator::LinkText(v) => v,
        }
    }

    /// Human-readable form used in prompts and diagnostics, e.g. `id=searchInput`
    pub fn describe(&self) -> String {
        format!("{}={}", self.strategy(), self.value())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Whether the text reads as an XPath expression (`//...` or `(//...)`)
pub fn is_xpath_expression(text: &str) -> bool {
    text.starts_with("//") || text.starts_with("(//")
}

impl FromStr for Locator {
    type Err = MedicError;

    /// Parse `strategy=value`; text without a known prefix is an XPath when
    /// it looks like one and a CSS selector otherwise.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MedicError::InvalidLocator("empty locator".to_string()));
        }

        if let Some((prefix, value)) = s.split_once('=') {
            let value = value.trim();
            let parsed = match prefix.trim().to_lowercase().as_str() {
                "id" => Some(Locator::Id(value.to_string())),
                "css" => Some(Locator::Css(value.to_string())),
                "xpath" => Some(Locator::XPath(value.to_string())),
                "name" => Some(Locator::Name(value.to_string())),
                "class" => Some(Locator::ClassName(value.to_string())),
                "tag" => Some(Locator::TagName(value.to_string())),
                "link" => Some(Locator::LinkText(value.to_string())),
                _ => None,
            };
            if let Some(locator) = parsed {
                if value.is_empty() {
                    return Err(MedicError::InvalidLocator(format!(
                        "missing value in '{}'",
                        s
                    )));
                }
                return Ok(locator);
            }
        }

        if is_xpath_expression(s) {
            Ok(Locator::XPath(s.to_string()))
        } else {
            Ok(Locator::Css(s.to_string()))
        }
    }
}

/// Plain-language description of the element a locator is meant to find
///
/// Only used to prompt the model and in log messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementDescription(String);

impl ElementDescription {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementDescription {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ElementDescription {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(Locator::id("searchInput").describe(), "id=searchInput");
        assert_eq!(Locator::css("#q").describe(), "css=#q");
        assert_eq!(Locator::xpath("//input").to_string(), "xpath=//input");
    }

    #[test]
    fn test_parse_prefixed() {
        assert_eq!("id=q".parse::<Locator>().unwrap(), Locator::id("q"));
        assert_eq!(
            "CSS=input[name='q']".parse::<Locator>().unwrap(),
            Locator::css("input[name='q']")
        );
        assert_eq!(
            "link=Log in".parse::<Locator>().unwrap(),
            Locator::LinkText("Log in".to_string())
        );
    }

    #[test]
    fn test_parse_bare() {
        assert_eq!(
            "//a[@href='/']".parse::<Locator>().unwrap(),
            Locator::xpath("//a[@href='/']")
        );
        assert_eq!(
            "(//button)[2]".parse::<Locator>().unwrap(),
            Locator::xpath("(//button)[2]")
        );
        assert_eq!("#main".parse::<Locator>().unwrap(), Locator::css("#main"));
        // Unknown prefix keeps the whole text as a selector
        assert_eq!(
            "input[type=text]".parse::<Locator>().unwrap(),
            Locator::css("input[type=text]")
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<Locator>().is_err());
        assert!("id=".parse::<Locator>().is_err());
    }

    #[test]
    fn test_locator_serde_shape() {
        let json = serde_json::to_value(Locator::xpath("//div")).unwrap();
        assert_eq!(json["by"], "xpath");
        assert_eq!(json["value"], "//div");
    }
}
