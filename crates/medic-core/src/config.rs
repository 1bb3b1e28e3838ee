//! Model backend configuration
//!
//! [`ModelConfig`] is an immutable value describing which backend to talk to.
//! It is built from a flat key-value document whose keys are matched
//! case-insensitively (`Provider`, `ApiKey`, `BaseUrl`, `Model`,
//! `Temperature`, `MaxTokens`, `RequestTimeoutSecs`, `MaxMarkupChars`).
//! Missing or unparsable values fall back to the documented defaults.
//!
//! Loading the document is the job of a [`ConfigSource`]: a TOML/JSON file,
//! the process environment, or both layered.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{MedicError, Result};

/// Which backend protocol to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Self-hosted generate endpoint (`{base_url}/api/generate`)
    #[default]
    Local,
    /// Hosted chat-completion API with bearer-token auth
    Cloud,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Local => write!(f, "local"),
            Provider::Cloud => write!(f, "cloud"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "ollama" => Ok(Provider::Local),
            "cloud" | "openai" => Ok(Provider::Cloud),
            _ => Err(format!("Invalid provider: {}. Use local or cloud.", s)),
        }
    }
}

/// Model backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: Provider,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    /// Sampling temperature, expected within 0.0..=2.0
    pub temperature: f32,
    /// Maximum output length requested from the backend
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    /// Page markup beyond this many characters is cut from the prompt
    pub max_markup_chars: usize,
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_MARKUP_CHARS: usize = 3000;

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Local,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_markup_chars: DEFAULT_MAX_MARKUP_CHARS,
        }
    }
}

impl ModelConfig {
    /// Build a config from key-value pairs, defaulting anything absent or invalid
    pub fn from_pairs(pairs: &ConfigPairs) -> Self {
        let mut config = Self::default();

        if let Some(raw) = pairs.get("provider") {
            match raw.parse() {
                Ok(provider) => config.provider = provider,
                Err(e) => warn!("{}; using {}", e, config.provider),
            }
        }
        if let Some(url) = pairs.get("baseurl").filter(|v| !v.is_empty()) {
            config.base_url = url.to_string();
        }
        if let Some(key) = pairs.get("apikey").filter(|v| !v.is_empty()) {
            config.api_key = Some(key.to_string());
        }
        if let Some(model) = pairs.get("model").filter(|v| !v.is_empty()) {
            config.model = model.to_string();
        }
        if let Some(temperature) = parse_value::<f32>(pairs, "temperature") {
            if !temperature.is_finite() {
                warn!(
                    "Invalid Temperature value '{}'; using {}",
                    temperature, config.temperature
                );
            } else {
                if !(0.0..=2.0).contains(&temperature) {
                    warn!("Temperature {} is outside 0.0..=2.0", temperature);
                }
                config.temperature = temperature;
            }
        }
        if let Some(max_tokens) = parse_positive::<u32>(pairs, "maxtokens") {
            config.max_tokens = max_tokens;
        }
        if let Some(secs) = parse_positive::<u64>(pairs, "requesttimeoutsecs") {
            config.request_timeout_secs = secs;
        }
        if let Some(chars) = parse_positive::<usize>(pairs, "maxmarkupchars") {
            config.max_markup_chars = chars;
        }

        config
    }

    /// Load from a source, falling back to defaults when the source fails
    pub fn load(source: &dyn ConfigSource) -> Self {
        match source.load() {
            Ok(pairs) => {
                debug!("Loaded {} config keys from {}", pairs.len(), source.describe());
                Self::from_pairs(&pairs)
            }
            Err(e) => {
                warn!(
                    "Failed to load model config from {} ({}); using defaults",
                    source.describe(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Copy with the API key masked, for display
    pub fn redacted(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }
}

fn parse_value<T: FromStr>(pairs: &ConfigPairs, key: &str) -> Option<T> {
    let raw = pairs.get(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value '{}' for config key {}", raw, key);
            None
        }
    }
}

fn parse_positive<T: FromStr + PartialOrd + Default>(pairs: &ConfigPairs, key: &str) -> Option<T> {
    let value = parse_value::<T>(pairs, key)?;
    if value > T::default() {
        Some(value)
    } else {
        warn!("Ignoring non-positive value for config key {}", key);
        None
    }
}

/// Flat key-value configuration document
///
/// Keys are normalized on insert: lowercased, with `_` and `-` removed, so
/// `MaxTokens`, `max_tokens` and `MAX-TOKENS` are the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPairs {
    entries: BTreeMap<String, String>,
}

impl ConfigPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize_key(key: &str) -> String {
        key.chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(Self::normalize_key(key), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&Self::normalize_key(key))
            .map(String::as_str)
    }

    /// Overlay `other` on top of `self`; `other` wins on conflicts
    pub fn merge(&mut self, other: ConfigPairs) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect pairs from environment-style variables carrying `prefix`
    pub fn from_env_vars<I>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = prefix.to_uppercase();
        let mut pairs = Self::new();
        for (key, value) in vars {
            if let Some(stripped) = key.to_uppercase().strip_prefix(&prefix) {
                if !stripped.is_empty() {
                    pairs.insert(stripped, value);
                }
            }
        }
        pairs
    }

    /// Collect scalar keys from a JSON document
    ///
    /// Top-level scalars are read first; a nested section named `medic`,
    /// `llm` or `llm_settings` (any case) overrides them.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| MedicError::Config("config document is not a table".to_string()))?;

        let mut pairs = Self::new();
        let mut section = None;
        for (key, value) in object {
            match value {
                serde_json::Value::Object(_) => {
                    if CONFIG_SECTIONS.contains(&Self::normalize_key(key).as_str()) {
                        section = Some(value);
                    }
                }
                other => {
                    if let Some(text) = scalar_to_string(other) {
                        pairs.insert(key, text);
                    }
                }
            }
        }

        if let Some(serde_json::Value::Object(section)) = section {
            for (key, value) in section {
                if let Some(text) = scalar_to_string(value) {
                    pairs.insert(key, text);
                }
            }
        }

        Ok(pairs)
    }
}

const CONFIG_SECTIONS: &[&str] = &["medic", "llm", "llmsettings"];

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Loader for a configuration document
pub trait ConfigSource: Send + Sync {
    /// Read the document into flat key-value pairs
    fn load(&self) -> Result<ConfigPairs>;

    /// Short label for log messages
    fn describe(&self) -> String;
}

/// TOML or JSON configuration file
///
/// Files ending in `.toml` are parsed as TOML; anything else as JSON.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<ConfigPairs> {
        let content = std::fs::read_to_string(&self.path)?;

        let is_toml = self
            .path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let document: serde_json::Value = if is_toml {
            let parsed: toml::Value = toml::from_str(&content)
                .map_err(|e| MedicError::Config(format!("Failed to parse config file: {}", e)))?;
            serde_json::to_value(parsed)?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| MedicError::Config(format!("Failed to parse config file: {}", e)))?
        };

        ConfigPairs::from_json_value(&document)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Environment variables sharing a prefix (default `MEDIC_`)
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
}

pub const DEFAULT_ENV_PREFIX: &str = "MEDIC_";

impl EnvSource {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for EnvSource {
    fn load(&self) -> Result<ConfigPairs> {
        Ok(ConfigPairs::from_env_vars(&self.prefix, std::env::vars()))
    }

    fn describe(&self) -> String {
        format!("environment ({}*)", self.prefix)
    }
}

/// Several sources applied in order; later layers win
///
/// A layer that fails to load is skipped with a warning so that, for
/// example, a missing file still lets environment overrides apply.
pub struct LayeredSource {
    layers: Vec<Box<dyn ConfigSource>>,
}

impl LayeredSource {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn with_layer(mut self, source: impl ConfigSource + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }

    /// Optional file, then `MEDIC_*` environment variables
    pub fn file_then_env(path: Option<PathBuf>) -> Self {
        let mut layered = Self::new();
        if let Some(path) = path {
            layered = layered.with_layer(FileSource::new(path));
        }
        layered.with_layer(EnvSource::new())
    }
}

impl Default for LayeredSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for LayeredSource {
    fn load(&self) -> Result<ConfigPairs> {
        let mut merged = ConfigPairs::new();
        for layer in &self.layers {
            match layer.load() {
                Ok(pairs) => merged.merge(pairs),
                Err(e) => warn!("Skipping config layer {}: {}", layer.describe(), e),
            }
        }
        Ok(merged)
    }

    fn describe(&self) -> String {
        let names: Vec<String> = self.layers.iter().map(|l| l.describe()).collect();
        format!("[{}]", names.join(", "))
    }
}
