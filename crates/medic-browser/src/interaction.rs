//! Interaction helpers built on healing resolution
//!
//! Each helper resolves the element first (healing if needed) and then
//! performs one action. A resolution failure aborts the step with
//! `ElementNotFound`, except in [`is_visible`], where a missing element simply
//! is not visible.

use medic_core::{ElementDescription, Locator, MedicError, Result};
use tracing::debug;

use crate::lookup::ElementActions;
use crate::resolver::LocatorResolver;

/// Click the element
pub async fn click<L: ElementActions>(
    resolver: &LocatorResolver<L>,
    locator: &Locator,
    description: &ElementDescription,
) -> Result<()> {
    let element = resolver.resolve_element(locator, description).await?;
    resolver.lookup().click(&element).await?;
    debug!("Clicked '{}'", description);
    Ok(())
}

/// Replace the element's text with `text`
pub async fn set_text<L: ElementActions>(
    resolver: &LocatorResolver<L>,
    locator: &Locator,
    description: &ElementDescription,
    text: &str,
) -> Result<()> {
    let element = resolver.resolve_element(locator, description).await?;
    resolver.lookup().clear_and_type(&element, text).await?;
    debug!("Typed {} chars into '{}'", text.chars().count(), description);
    Ok(())
}

/// Visible text of the element
pub async fn read_text<L: ElementActions>(
    resolver: &LocatorResolver<L>,
    locator: &Locator,
    description: &ElementDescription,
) -> Result<String> {
    let element = resolver.resolve_element(locator, description).await?;
    resolver.lookup().inner_text(&element).await
}

/// Whether the element exists and is visible
///
/// Collaborator errors other than not-found still propagate.
pub async fn is_visible<L: ElementActions>(
    resolver: &LocatorResolver<L>,
    locator: &Locator,
    description: &ElementDescription,
) -> Result<bool> {
    match resolver.resolve_element(locator, description).await {
        Ok(element) => resolver.lookup().is_visible(&element).await,
        Err(MedicError::ElementNotFound(_)) => {
            debug!("'{}' not found, reporting not visible", description);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{ElementLookup, Lookup};
    use crate::resolver::tests::{MockLookup, ScriptedSuggester};
    use async_trait::async_trait;
    use medic_agent::{LocatorSuggester, SharedClientRegistry};
    use std::sync::{Arc, Mutex};

    /// Actions are recorded as strings against the shared mock page
    struct MockPage {
        lookup: MockLookup,
        hidden: Vec<String>,
        actions: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ElementLookup for MockPage {
        type Element = String;

        async fn find_element(&self, locator: &Locator) -> Result<Lookup<String>> {
            self.lookup.find_element(locator).await
        }

        async fn current_markup(&self) -> Result<String> {
            self.lookup.current_markup().await
        }
    }

    #[async_trait]
    impl ElementActions for MockPage {
        async fn click(&self, element: &String) -> Result<()> {
            self.actions.lock().unwrap().push(format!("click {}", element));
            Ok(())
        }

        async fn clear_and_type(&self, element: &String, text: &str) -> Result<()> {
            self.actions
                .lock()
                .unwrap()
                .push(format!("type {} {}", element, text));
            Ok(())
        }

        async fn inner_text(&self, element: &String) -> Result<String> {
            Ok(format!("text of {}", element))
        }

        async fn is_visible(&self, element: &String) -> Result<bool> {
            Ok(!self.hidden.contains(element))
        }
    }

    fn resolver(lookup: MockLookup, answers: &[&str]) -> LocatorResolver<MockPage> {
        let suggester: Arc<dyn LocatorSuggester> = Arc::new(ScriptedSuggester::new(answers));
        let registry = Arc::new(SharedClientRegistry::with_client(suggester));
        let page = MockPage {
            lookup,
            hidden: vec!["banner".to_string()],
            actions: Mutex::new(Vec::new()),
        };
        LocatorResolver::new(page, registry).with_max_attempts(2)
    }

    #[tokio::test]
    async fn test_click_after_healing() {
        let lookup = MockLookup::new("<button id='go'>").with_element(Locator::css("#go"), "go");
        let resolver = resolver(lookup, &["#go"]);

        click(&resolver, &Locator::id("submit"), &"Submit button".into())
            .await
            .unwrap();

        assert_eq!(*resolver.lookup().actions.lock().unwrap(), vec!["click go"]);
    }

    #[tokio::test]
    async fn test_set_and_read_text() {
        let lookup = MockLookup::new("<input id='q'>").with_element(Locator::id("q"), "q");
        let resolver = resolver(lookup, &[]);
        let description = ElementDescription::new("Search box");

        set_text(&resolver, &Locator::id("q"), &description, "rust")
            .await
            .unwrap();
        let text = read_text(&resolver, &Locator::id("q"), &description)
            .await
            .unwrap();

        assert_eq!(*resolver.lookup().actions.lock().unwrap(), vec!["type q rust"]);
        assert_eq!(text, "text of q");
    }

    #[tokio::test]
    async fn test_click_missing_element_fails() {
        let resolver = resolver(MockLookup::new("<p/>"), &[]);

        let err = click(&resolver, &Locator::id("gone"), &"Gone button".into())
            .await
            .unwrap_err();

        assert!(matches!(&err, MedicError::ElementNotFound(d) if d == "Gone button"));
        assert!(resolver.lookup().actions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_visibility() {
        let lookup = MockLookup::new("<div/>")
            .with_element(Locator::id("main"), "main")
            .with_element(Locator::id("banner"), "banner");
        let resolver = resolver(lookup, &[]);

        assert!(is_visible(&resolver, &Locator::id("main"), &"Main".into()).await.unwrap());
        assert!(!is_visible(&resolver, &Locator::id("banner"), &"Banner".into()).await.unwrap());
        assert!(!is_visible(&resolver, &Locator::id("nope"), &"Nope".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_visibility_propagates_collaborator_errors() {
        let lookup = MockLookup::new("<div/>").with_failing(Locator::css("div[["));
        let resolver = resolver(lookup, &[]);

        let result = is_visible(&resolver, &Locator::css("div[["), &"Broken".into()).await;
        assert!(matches!(result, Err(MedicError::Browser(_))));
    }
}
