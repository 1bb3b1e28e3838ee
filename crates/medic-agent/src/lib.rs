//! # medic-agent
//!
//! Language-model side of locator healing.
//!
//! - [`ModelClient`] turns one recovery request into exactly one HTTP call to
//!   either a self-hosted generate endpoint or a hosted chat-completion API,
//!   and returns the raw suggestion text
//! - [`SharedClientRegistry`] lazily builds one client and hands the same
//!   instance to every resolution that needs it
//!
//! ## Key Pattern
//!
//! The client never fails. Transport errors, timeouts, non-2xx statuses and
//! malformed bodies all come back as an empty suggestion, so a broken
//! recovery channel can only ever lead to an ordinary "element not found".

pub mod auth;
mod client;
pub mod prompt;
mod registry;
mod types;

pub use client::{LocatorSuggester, ModelClient, CLOUD_COMPLETIONS_URL};
pub use prompt::{build_prompt, truncate_markup, TRUNCATION_MARKER};
pub use registry::SharedClientRegistry;
pub use types::*;
