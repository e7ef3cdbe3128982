//! Registry of Atlas resource types

use crate::client::AtlasClient;
use crate::config::AtlasConfig;
use crate::resources;
use cloudstate_core::{ProviderError, RemoteClient, ResourceHandler, ResourceType};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Atlas provider: resource definitions bound to one client
pub struct AtlasProvider {
    client: Arc<dyn RemoteClient>,
    resources: BTreeMap<String, Arc<ResourceType>>,
}

impl AtlasProvider {
    pub fn new(config: AtlasConfig) -> crate::Result<Self> {
        let mut client = AtlasClient::new(config)?;
        for (resource, route) in resources::all() {
            client = client.with_route(resource.name(), route);
        }
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Bind the Atlas resource definitions to any remote client
    pub fn with_client(client: Arc<dyn RemoteClient>) -> Self {
        let resources = resources::all()
            .into_iter()
            .map(|(resource, _)| (resource.name().to_string(), Arc::new(resource)))
            .collect();
        Self { client, resources }
    }

    pub fn name(&self) -> &str {
        "atlas"
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &ResourceType> {
        self.resources.values().map(|r| r.as_ref())
    }

    pub fn resource(&self, name: &str) -> cloudstate_core::Result<&ResourceType> {
        self.resources
            .get(name)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::UnknownResourceType(name.to_string()))
    }

    pub fn handler(&self, name: &str) -> cloudstate_core::Result<ResourceHandler> {
        let resource = self
            .resources
            .get(name)
            .ok_or_else(|| ProviderError::UnknownResourceType(name.to_string()))?;
        Ok(ResourceHandler::new(resource.clone(), self.client.clone()))
    }
}
