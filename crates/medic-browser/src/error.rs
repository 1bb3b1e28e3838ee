//! Browser-side error types - re-exports unified MedicError from medic-core
//!
//! - `ElementNotFound(description)` is the only error a resolution raises itself
//! - `Browser(String)` carries collaborator failures (launch, navigation, CDP)
//!
//! Collaborator error messages should name the operation and the locator.

pub use medic_core::{MedicError, Result};

pub type BrowserError = MedicError;
