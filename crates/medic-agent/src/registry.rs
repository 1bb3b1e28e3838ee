//! Lazily-built shared model client
//!
//! A [`SharedClientRegistry`] is an explicit context object: create one per
//! test process (or per suite), wrap it in an `Arc` and hand it to every
//! resolver. The client is only built the first time a resolution actually
//! needs to heal, and it is built exactly once even when many scenarios hit
//! that point at the same moment.

use medic_core::{ConfigSource, ModelConfig};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::info;

use crate::client::{LocatorSuggester, ModelClient};

type ClientFactory = Box<dyn Fn() -> Arc<dyn LocatorSuggester> + Send + Sync>;

/// Holder of the one shared suggestion client
pub struct SharedClientRegistry {
    client: OnceLock<Arc<dyn LocatorSuggester>>,
    factory: ClientFactory,
}

impl SharedClientRegistry {
    /// Registry that builds its client with `factory` on first use
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn LocatorSuggester> + Send + Sync + 'static,
    {
        Self {
            client: OnceLock::new(),
            factory: Box::new(factory),
        }
    }

    /// Registry that reads `source` and builds a [`ModelClient`] on first use
    ///
    /// A source that cannot be loaded yields the default configuration.
    pub fn from_source(source: impl ConfigSource + 'static) -> Self {
        Self::new(move || {
            let config = ModelConfig::load(&source);
            info!(
                "Model client: provider={}, model={}, base_url={}",
                config.provider, config.model, config.base_url
            );
            Arc::new(ModelClient::new(config))
        })
    }

    /// Registry around an already-known configuration
    pub fn from_config(config: ModelConfig) -> Self {
        Self::new(move || Arc::new(ModelClient::new(config.clone())))
    }

    /// Registry that is already initialized with `client`
    pub fn with_client(client: Arc<dyn LocatorSuggester>) -> Self {
        let registry = Self::new({
            let client = Arc::clone(&client);
            move || Arc::clone(&client)
        });
        let _ = registry.client.set(client);
        registry
    }

    /// The shared client, built on the first call
    ///
    /// After initialization this is a lock-free read.
    pub fn get_or_create(&self) -> Arc<dyn LocatorSuggester> {
        let client = self.client.get_or_init(|| {
            info!("Constructing shared model client");
            (self.factory)()
        });
        Arc::clone(client)
    }

    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }
}

impl fmt::Debug for SharedClientRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedClientRegistry")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
