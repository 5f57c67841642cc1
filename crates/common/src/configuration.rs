//! Provider configuration schema and user-supplied values

use crate::{ProviderError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Block holding per-resource endpoint overrides
pub const ENDPOINTS_PROPERTY: &str = "endpoints";

/// Where a configuration property's default value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultSource {
    None,
    Static,
    /// Produced after running the property's configured command
    Command,
}

/// Shape of a configuration property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationKind {
    String,
    /// Nested block of optional string properties
    Block(Vec<ConfigurationProperty>),
}

/// A provider-level configuration property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationProperty {
    pub name: String,
    pub description: Option<String>,
    pub required: bool,
    pub kind: ConfigurationKind,
    pub default_value: Option<String>,
    pub default_source: DefaultSource,
    /// Values accepted by the validator; empty accepts anything
    pub allowed_values: Vec<String>,
}

impl ConfigurationProperty {
    pub fn string(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: None,
            required,
            kind: ConfigurationKind::String,
            default_value: None,
            default_source: DefaultSource::None,
            allowed_values: Vec::new(),
        }
    }

    pub fn block(name: impl Into<String>, properties: Vec<ConfigurationProperty>) -> Self {
        Self {
            kind: ConfigurationKind::Block(properties),
            ..Self::string(name, false)
        }
    }

    pub fn with_default(mut self, value: impl Into<String>, source: DefaultSource) -> Self {
        self.default_value = Some(value.into());
        self.default_source = source;
        self
    }

    pub fn with_allowed_values(mut self, allowed_values: Vec<String>) -> Self {
        self.allowed_values = allowed_values;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Environment variable that overrides the default, e.g. `API_KEY_AUTH`
    pub fn env_var(&self) -> String {
        self.name.to_uppercase()
    }

    /// Default the host tool should use when the user supplies no value
    pub fn resolve_default(&self) -> Option<String> {
        std::env::var(self.env_var())
            .ok()
            .or_else(|| self.default_value.clone())
    }

    /// Check a user-supplied value against the allowed set
    pub fn validate(&self, value: &str) -> Result<()> {
        if self.allowed_values.is_empty() || self.allowed_values.iter().any(|v| v == value) {
            return Ok(());
        }
        Err(ProviderError::InvalidValue {
            key: self.name.clone(),
            value: value.to_string(),
            allowed: self.allowed_values.clone(),
        })
    }

    pub fn nested(&self) -> &[ConfigurationProperty] {
        match &self.kind {
            ConfigurationKind::Block(properties) => properties,
            ConfigurationKind::String => &[],
        }
    }
}

/// Provider configuration schema, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigurationSchema {
    properties: IndexMap<String, ConfigurationProperty>,
}

impl ConfigurationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a property, replacing any previous property with that name
    pub fn insert(&mut self, property: ConfigurationProperty) {
        self.properties.insert(property.name.clone(), property);
    }

    pub fn get(&self, name: &str) -> Option<&ConfigurationProperty> {
        self.properties.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigurationProperty> {
        self.properties.values()
    }

    /// Whether the endpoints block declares an override for `resource`
    pub fn accepts_endpoint(&self, resource: &str) -> bool {
        self.get(ENDPOINTS_PROPERTY)
            .is_some_and(|block| block.nested().iter().any(|p| p.name == resource))
    }

    /// Validate a user configuration the way the host tool does before
    /// invoking the configuration callback
    pub fn validate(&self, values: &ConfigurationValues) -> Result<()> {
        if let Some(resource) = values
            .endpoints
            .keys()
            .find(|resource| !self.accepts_endpoint(resource))
        {
            let allowed = self
                .get(ENDPOINTS_PROPERTY)
                .map(|block| block.nested().iter().map(|p| p.name.clone()).collect())
                .unwrap_or_default();
            return Err(ProviderError::UnsupportedBlockKey {
                block: ENDPOINTS_PROPERTY.to_string(),
                key: resource.clone(),
                allowed,
            });
        }

        for property in self.properties.values() {
            if let ConfigurationKind::Block(_) = property.kind {
                continue;
            }
            match values.get(&property.name) {
                Some(value) => property.validate(value)?,
                None if property.required && property.resolve_default().is_none() => {
                    return Err(ProviderError::MissingRequiredValue(property.name.clone()));
                }
                None => {}
            }
        }
        Ok(())
    }
}

/// Snapshot of the values a user configured for the provider
///
/// ```yaml
/// api_key_auth: secret
/// region: eu
/// endpoints:
///   widgets_v1: staging.example.com
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationValues {
    #[serde(default)]
    pub endpoints: IndexMap<String, String>,

    #[serde(flatten)]
    pub values: IndexMap<String, String>,
}

impl ConfigurationValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn with_endpoint(mut self, resource: impl Into<String>, host: impl Into<String>) -> Self {
        self.endpoints.insert(resource.into(), host.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn endpoint(&self, resource: &str) -> Option<&str> {
        self.endpoints
            .get(resource)
            .map(String::as_str)
            .filter(|host| !host.is_empty())
    }
}
