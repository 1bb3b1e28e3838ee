//! Element-lookup collaborator seam
//!
//! The resolver never talks to a browser protocol directly. Anything that can
//! find an element by [`Locator`] and hand back the page markup can drive it:
//! the headless Chrome session in [`crate::browser`], or a test double.

use async_trait::async_trait;
use medic_core::{Locator, Result};

/// Outcome of a single lookup
///
/// `NotFound` is an ordinary outcome, not an error. It is what moves a
/// resolution from the direct stage into healing. Any `Err` from a lookup is
/// a collaborator failure and is treated differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<E> {
    Found(E),
    NotFound,
}

/// Page inspection primitives
#[async_trait]
pub trait ElementLookup: Send + Sync {
    /// Handle to a located element
    type Element: Send + Sync;

    /// Find the first element matching `locator`
    async fn find_element(&self, locator: &Locator) -> Result<Lookup<Self::Element>>;

    /// Current page markup
    async fn current_markup(&self) -> Result<String>;
}

/// Element interaction primitives
#[async_trait]
pub trait ElementActions: ElementLookup {
    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Replace the element's current value with `text`
    async fn clear_and_type(&self, element: &Self::Element, text: &str) -> Result<()>;

    async fn inner_text(&self, element: &Self::Element) -> Result<String>;

    async fn is_visible(&self, element: &Self::Element) -> Result<bool>;
}
