//! Self-healing element resolution for browser tests
//!
//! A test names an element twice: with a locator and with a plain-language
//! description. When the locator stops matching, the resolver asks a language
//! model for a replacement based on the current page markup and the
//! description, interprets the answer as CSS or XPath, and retries.
//!
//! # Example
//!
//! ```no_run
//! use medic_agent::SharedClientRegistry;
//! use medic_browser::{interaction, BrowserSession, LocatorResolver};
//! use medic_core::{ElementDescription, LayeredSource, Locator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One registry per process; the model client is built on first heal
//!     let registry = Arc::new(SharedClientRegistry::from_source(
//!         LayeredSource::file_then_env(Some("medic.toml".into())),
//!     ));
//!
//!     let session = BrowserSession::launch().await?;
//!     session.navigate("https://www.wikipedia.org").await?;
//!
//!     let resolver = LocatorResolver::new(session, registry);
//!     interaction::set_text(
//!         &resolver,
//!         &Locator::id("searchInputOld"),
//!         &ElementDescription::new("Wikipedia search box"),
//!         "Rust (programming language)",
//!     )
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`lookup`]: the collaborator traits the resolver drives
//! - [`resolver`]: the direct / healing / exhausted state machine
//! - [`suggestion`]: cleaning and classifying model output
//! - [`observer`]: healing checkpoints and the `tracing` observer
//! - [`activity_log`]: append-only file of healing checkpoints
//! - [`interaction`]: click, type, read text, visibility
//! - [`browser`]: headless Chrome implementation of the collaborator traits
//! - [`error`]: error types for browser operations

pub mod activity_log;
pub mod browser;
pub mod error;
pub mod interaction;
pub mod lookup;
pub mod observer;
pub mod resolver;
pub mod suggestion;

// Re-export commonly used types
pub use activity_log::ActivityLog;
pub use browser::{BrowserConfig, BrowserElement, BrowserSession};
pub use error::{BrowserError, MedicError, Result};
pub use lookup::{ElementActions, ElementLookup, Lookup};
pub use observer::{AttemptFailure, HealingEvent, HealingObserver, TracingObserver};
pub use resolver::{LocatorResolver, DEFAULT_MAX_ATTEMPTS};
pub use suggestion::{classify_suggestion, clean_suggestion, SuggestionKind};
