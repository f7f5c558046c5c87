//! Provider registry
//!
//! Read-only table of vendor descriptors, each paired with the [`WireAdapter`]
//! that speaks its protocol. Lookups never fail loudly: an unknown provider or
//! model is `None`, and the caller decides which error to surface.
//!
//! A process-wide instance built from [`BridgeConfig::from_env`] is available
//! through [`global`]; it is initialized once and never mutated afterwards.

mod catalog;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::config::BridgeConfig;
use crate::error::RegistryError;
use crate::providers::{AnthropicAdapter, GeminiAdapter, OpenAiAdapter, WireAdapter};

/// One model a provider offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Identifier sent on the wire.
    pub api_id: String,
    pub display_name: String,
}

impl ModelDescriptor {
    pub fn new(api_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            api_id: api_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Static description of a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: String,
    pub display_name: String,
    /// The first model is the provider's default.
    pub models: Vec<ModelDescriptor>,
}

impl ProviderDescriptor {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        models: Vec<ModelDescriptor>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            models,
        }
    }

    /// Check that api ids and display names are each unique within the provider.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut api_ids = HashSet::new();
        let mut names = HashSet::new();
        for model in &self.models {
            if !api_ids.insert(model.api_id.as_str()) {
                return Err(RegistryError::DuplicateApiId {
                    provider: self.id.clone(),
                    api_id: model.api_id.clone(),
                });
            }
            if !names.insert(model.display_name.as_str()) {
                return Err(RegistryError::DuplicateDisplayName {
                    provider: self.id.clone(),
                    display_name: model.display_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Resolve a model reference to its api id: exact api id first, then exact display name.
    pub fn resolve_model(&self, model_ref: &str) -> Option<&str> {
        self.models
            .iter()
            .find(|m| m.api_id == model_ref)
            .or_else(|| self.models.iter().find(|m| m.display_name == model_ref))
            .map(|m| m.api_id.as_str())
    }

    pub fn default_model(&self) -> Option<&ModelDescriptor> {
        self.models.first()
    }
}

/// Registry entry: descriptor plus the adapter for its protocol.
#[derive(Debug, Clone)]
pub struct ProviderEntry {
    pub descriptor: ProviderDescriptor,
    pub adapter: Arc<dyn WireAdapter>,
}

/// Ordered provider table.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    entries: Vec<ProviderEntry>,
    by_id: HashMap<String, usize>,
}

static_assertions::assert_impl_all!(ProviderRegistry: Send, Sync);

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the three built-in vendors, wired to `config`'s endpoints.
    pub fn builtin(config: &BridgeConfig) -> Self {
        let mut registry = Self::new();
        registry.insert(catalog::openai(), Arc::new(OpenAiAdapter::new(config)));
        registry.insert(catalog::anthropic(), Arc::new(AnthropicAdapter::new(config)));
        registry.insert(catalog::google(), Arc::new(GeminiAdapter::new(config)));
        registry
    }

    /// Add a provider after validating its descriptor.
    pub fn register(
        &mut self,
        descriptor: ProviderDescriptor,
        adapter: Arc<dyn WireAdapter>,
    ) -> Result<(), RegistryError> {
        if self.by_id.contains_key(&descriptor.id) {
            return Err(RegistryError::DuplicateProvider(descriptor.id));
        }
        descriptor.validate()?;
        self.insert(descriptor, adapter);
        Ok(())
    }

    fn insert(&mut self, descriptor: ProviderDescriptor, adapter: Arc<dyn WireAdapter>) {
        self.by_id.insert(descriptor.id.clone(), self.entries.len());
        self.entries.push(ProviderEntry {
            descriptor,
            adapter,
        });
    }

    fn entry(&self, provider_id: &str) -> Option<&ProviderEntry> {
        self.by_id.get(provider_id).map(|i| &self.entries[*i])
    }

    pub fn resolve(&self, provider_id: &str) -> Option<&ProviderDescriptor> {
        self.entry(provider_id).map(|e| &e.descriptor)
    }

    pub fn resolve_model(&self, provider_id: &str, model_ref: &str) -> Option<&str> {
        self.resolve(provider_id)?.resolve_model(model_ref)
    }

    pub fn adapter(&self, provider_id: &str) -> Option<Arc<dyn WireAdapter>> {
        self.entry(provider_id).map(|e| Arc::clone(&e.adapter))
    }

    /// Descriptors in registration order.
    pub fn providers(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    pub fn default_model(&self, provider_id: &str) -> Option<&ModelDescriptor> {
        self.resolve(provider_id)?.default_model()
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.by_id.contains_key(provider_id)
    }
}

/// The process-wide registry, built from the environment on first use.
pub fn global() -> &'static Arc<ProviderRegistry> {
    static GLOBAL_REGISTRY: OnceLock<Arc<ProviderRegistry>> = OnceLock::new();
    GLOBAL_REGISTRY.get_or_init(|| Arc::new(ProviderRegistry::builtin(&BridgeConfig::from_env())))
}
