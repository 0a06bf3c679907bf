//! Generic ARM resource envelope and the resource group.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level ARM resource: identity, location and a typed property bag.
///
/// `id` is only known once the provider has created the resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    pub properties: P,
}

impl<P> Resource<P> {
    pub fn new(name: &str, location: &str, properties: P) -> Resource<P> {
        Resource {
            id: None,
            name: name.to_string(),
            location: location.to_string(),
            tags: BTreeMap::new(),
            properties,
        }
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Resource<P> {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }
}

/// Access to `properties.provisioningState` of a provider response.
pub trait Provisioned {
    fn provisioning_state(&self) -> Option<&str>;
}

impl<P: Provisioned> Provisioned for Resource<P> {
    fn provisioning_state(&self) -> Option<&str> {
        self.properties.provisioning_state()
    }
}

/// Reference to another resource by id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubResource {
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl Provisioned for ResourceGroupProperties {
    fn provisioning_state(&self) -> Option<&str> {
        self.provisioning_state.as_deref()
    }
}

/// Root scope of the deployment; deleting it cascades to everything else.
pub type ResourceGroup = Resource<ResourceGroupProperties>;
