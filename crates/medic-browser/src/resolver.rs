//! Self-healing element resolution
//!
//! ```text
//! Direct --(NotFound)--> Healing --> Resolved
//!                                \-> Exhausted (ElementNotFound)
//! ```
//!
//! The direct stage is the hot path: one lookup, no model call, no logging.
//! Healing captures the page markup once, then asks the shared model client
//! for a replacement locator up to `max_attempts` times, strictly one attempt
//! after another. The page is not re-read between attempts.

use medic_agent::SharedClientRegistry;
use medic_core::{ElementDescription, Locator, MedicError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::lookup::{ElementLookup, Lookup};
use crate::observer::{AttemptFailure, HealingEvent, HealingObserver, TracingObserver};
use crate::suggestion::{candidate_locators, clean_suggestion};

/// Healing attempts per resolution unless configured otherwise
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Resolves locators against a page, healing them through the model on a miss
pub struct LocatorResolver<L: ElementLookup> {
    lookup: L,
    registry: Arc<SharedClientRegistry>,
    observer: Arc<dyn HealingObserver>,
    max_attempts: u32,
}

impl<L: ElementLookup> LocatorResolver<L> {
    /// Create a resolver over `lookup`, sharing `registry`'s model client
    pub fn new(lookup: L, registry: Arc<SharedClientRegistry>) -> Self {
        Self {
            lookup,
            registry,
            observer: Arc::new(TracingObserver),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Replace the default `tracing` observer
    pub fn with_observer(mut self, observer: Arc<dyn HealingObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Set the attempt budget used by [`resolve_element`](Self::resolve_element)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Resolve with the configured attempt budget
    pub async fn resolve_element(
        &self,
        locator: &Locator,
        description: &ElementDescription,
    ) -> Result<L::Element> {
        self.resolve_element_with(locator, description, self.max_attempts)
            .await
    }

    /// Resolve with an explicit attempt budget
    ///
    /// # Errors
    /// - `ElementNotFound(description)` when neither the locator nor any
    ///   suggestion matched
    /// - any non-`NotFound` error from the direct lookup or the markup
    ///   capture, unchanged
    pub async fn resolve_element_with(
        &self,
        locator: &Locator,
        description: &ElementDescription,
        max_attempts: u32,
    ) -> Result<L::Element> {
        if let Lookup::Found(element) = self.lookup.find_element(locator).await? {
            return Ok(element);
        }

        self.heal(locator, description, max_attempts).await
    }

    /// Resolve, giving up once `deadline` has elapsed
    ///
    /// Expiry drops the in-flight model request and reports
    /// `ElementNotFound`, like any other failed resolution.
    pub async fn resolve_element_within(
        &self,
        locator: &Locator,
        description: &ElementDescription,
        deadline: Duration,
    ) -> Result<L::Element> {
        match tokio::time::timeout(deadline, self.resolve_element(locator, description)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Resolution of '{}' ({}) cancelled after {:?}",
                    description, locator, deadline
                );
                Err(MedicError::ElementNotFound(description.to_string()))
            }
        }
    }

    async fn heal(
        &self,
        locator: &Locator,
        description: &ElementDescription,
        max_attempts: u32,
    ) -> Result<L::Element> {
        info!(
            "Locator {} found nothing for '{}', healing with up to {} attempts",
            locator, description, max_attempts
        );

        let markup = self.lookup.current_markup().await?;
        let client = self.registry.get_or_create();
        let failed_locator = locator.describe();

        for attempt in 1..=max_attempts {
            self.observer
                .on_event(&HealingEvent::AttemptStarted {
                    description: description.to_string(),
                    locator: failed_locator.clone(),
                    attempt,
                    max_attempts,
                })
                .await;

            let raw = client
                .request_locator_suggestion(&markup, &failed_locator, description.as_str())
                .await;

            let failure = match clean_suggestion(&raw) {
                None => AttemptFailure::EmptySuggestion,
                Some(suggestion) => {
                    let outcome = self.try_suggestion(&suggestion).await;
                    match outcome {
                        Ok(Some((element, healed))) => {
                            self.observer
                                .on_event(&HealingEvent::Resolved {
                                    description: description.to_string(),
                                    locator: failed_locator.clone(),
                                    attempt,
                                    suggestion,
                                    healed_locator: healed.describe(),
                                })
                                .await;
                            return Ok(element);
                        }
                        Ok(None) => AttemptFailure::NoMatch { suggestion },
                        Err(e) => AttemptFailure::LookupError {
                            suggestion,
                            message: e.to_string(),
                        },
                    }
                }
            };

            self.observer
                .on_event(&HealingEvent::AttemptFailed {
                    description: description.to_string(),
                    locator: failed_locator.clone(),
                    attempt,
                    max_attempts,
                    failure,
                })
                .await;
        }

        self.observer
            .on_event(&HealingEvent::Exhausted {
                description: description.to_string(),
                locator: failed_locator,
                attempts: max_attempts,
            })
            .await;

        Err(MedicError::ElementNotFound(description.to_string()))
    }

    /// Look up each interpretation of a suggestion in order
    ///
    /// Returns the first element found. A lookup error on one interpretation
    /// does not stop the next one from being tried; it is only returned when
    /// no interpretation produced an element.
    async fn try_suggestion(&self, suggestion: &str) -> Result<Option<(L::Element, Locator)>> {
        let mut last_error = None;

        for candidate in candidate_locators(suggestion) {
            match self.lookup.find_element(&candidate).await {
                Ok(Lookup::Found(element)) => return Ok(Some((element, candidate))),
                Ok(Lookup::NotFound) => debug!("Candidate {} matched nothing", candidate),
                Err(e) => {
                    debug!("Candidate {} failed: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}
