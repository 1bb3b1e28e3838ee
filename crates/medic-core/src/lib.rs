//! # medic-core
//!
//! Core types for Medic, a self-healing element locator for browser tests.
//!
//! When a test's primary locator stops matching, Medic asks a language model
//! for a replacement derived from the page markup and a plain-language
//! description of the element. This crate holds the pieces every other crate
//! shares:
//!
//! - [`Locator`] and [`ElementDescription`], the inputs of a resolution
//! - [`ModelConfig`] and the [`ConfigSource`] loaders that produce it
//! - [`MedicError`], the unified error type
//! - [`fail_open`], for infrastructure work that must never abort a test

pub mod config;
mod error;
pub mod fail_open;
mod types;

pub use config::{
    ConfigPairs, ConfigSource, EnvSource, FileSource, LayeredSource, ModelConfig, Provider,
};
pub use error::{MedicError, Result};
pub use types::*;
