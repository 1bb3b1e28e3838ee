//! Healing checkpoints and the observers that record them
//!
//! The resolver reports four checkpoints: an attempt starting, an attempt
//! failing, a successful resolution, and an exhausted budget. The direct
//! stage reports nothing.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Why a healing attempt did not produce an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptFailure {
    /// The backend returned nothing usable
    EmptySuggestion,
    /// The suggestion was interpreted but matched no element
    NoMatch { suggestion: String },
    /// Looking up the suggested locator raised a collaborator error
    LookupError { suggestion: String, message: String },
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::EmptySuggestion => write!(f, "empty suggestion"),
            AttemptFailure::NoMatch { suggestion } => {
                write!(f, "suggestion '{}' matched nothing", suggestion)
            }
            AttemptFailure::LookupError {
                suggestion,
                message,
            } => write!(f, "lookup for '{}' failed: {}", suggestion, message),
        }
    }
}

/// A healing checkpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HealingEvent {
    AttemptStarted {
        description: String,
        locator: String,
        attempt: u32,
        max_attempts: u32,
    },
    AttemptFailed {
        description: String,
        locator: String,
        attempt: u32,
        max_attempts: u32,
        failure: AttemptFailure,
    },
    Resolved {
        description: String,
        locator: String,
        attempt: u32,
        suggestion: String,
        healed_locator: String,
    },
    Exhausted {
        description: String,
        locator: String,
        attempts: u32,
    },
}

impl fmt::Display for HealingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealingEvent::AttemptStarted {
                description,
                locator,
                attempt,
                max_attempts,
            } => write!(
                f,
                "attempt {}/{} started for '{}' ({})",
                attempt, max_attempts, description, locator
            ),
            HealingEvent::AttemptFailed {
                description,
                locator,
                attempt,
                max_attempts,
                failure,
            } => write!(
                f,
                "attempt {}/{} failed for '{}' ({}): {}",
                attempt, max_attempts, description, locator, failure
            ),
            HealingEvent::Resolved {
                description,
                locator,
                attempt,
                suggestion,
                healed_locator,
            } => write!(
                f,
                "healed '{}' ({}) on attempt {} with suggestion '{}' as {}",
                description, locator, attempt, suggestion, healed_locator
            ),
            HealingEvent::Exhausted {
                description,
                locator,
                attempts,
            } => write!(
                f,
                "healing exhausted for '{}' ({}) after {} attempts",
                description, locator, attempts
            ),
        }
    }
}

/// Sink for healing checkpoints
#[async_trait]
pub trait HealingObserver: Send + Sync {
    async fn on_event(&self, event: &HealingEvent);
}

/// Default observer: structured `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

#[async_trait]
impl HealingObserver for TracingObserver {
    async fn on_event(&self, event: &HealingEvent) {
        match event {
            HealingEvent::AttemptStarted {
                description,
                attempt,
                max_attempts,
                ..
            } => info!(
                attempt = *attempt,
                max_attempts = *max_attempts,
                "Healing attempt started for '{}'",
                description
            ),
            HealingEvent::AttemptFailed {
                description,
                attempt,
                failure,
                ..
            } => warn!(attempt = *attempt, "Healing attempt failed for '{}': {}", description, failure),
            HealingEvent::Resolved {
                description,
                suggestion,
                healed_locator,
                attempt,
                ..
            } => info!(
                attempt = *attempt,
                suggestion = %suggestion,
                "Healed '{}' using {}",
                description,
                healed_locator
            ),
            HealingEvent::Exhausted {
                description,
                locator,
                attempts,
            } => warn!(
                "Healing exhausted for '{}' ({}) after {} attempts",
                description, locator, attempts
            ),
        }
    }
}

/// Fan out every event to several observers, in order
#[async_trait]
impl HealingObserver for Vec<Arc<dyn HealingObserver>> {
    async fn on_event(&self, event: &HealingEvent) {
        for observer in self {
            observer.on_event(event).await;
        }
    }
}
