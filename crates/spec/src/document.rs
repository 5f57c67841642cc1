//! Spec model document
//!
//! Serialized form of an already-parsed API description, loaded from JSON
//! or YAML.

use openapi_provider_common::naming::parent_paths;
use openapi_provider_common::{
    BackendConfiguration, DescriptorKind, HeaderParameter, ParentResource, ProviderError,
    ResourceDescriptor, Result, SecurityDefinition, SpecModel,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Serialization format of a spec document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// Detect the format from the file extension, falling back to the content
    pub fn detect(path: &Path, content: &str) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => SpecFormat::Json,
            Some("yaml") | Some("yml") => SpecFormat::Yaml,
            _ if content.trim_start().starts_with('{') => SpecFormat::Json,
            _ => SpecFormat::Yaml,
        }
    }
}

impl fmt::Display for SpecFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecFormat::Json => write!(f, "JSON"),
            SpecFormat::Yaml => write!(f, "YAML"),
        }
    }
}

/// Security requirements of the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySection {
    /// Scheme names applied to every operation
    #[serde(default)]
    pub global: Vec<String>,

    #[serde(default)]
    pub definitions: Vec<SecurityDefinition>,
}

/// Document root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecDocument {
    pub backend: BackendConfiguration,

    #[serde(default)]
    pub security: SecuritySection,

    #[serde(default)]
    pub headers: Vec<HeaderParameter>,

    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,

    #[serde(default)]
    pub data_sources: Vec<ResourceDescriptor>,
}

impl SpecDocument {
    /// Load a spec document from a JSON or YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ProviderError::Parse(format!(
                "Failed to read spec document {}: {}",
                path.display(),
                e
            ))
        })?;

        let format = SpecFormat::detect(path, &content);
        debug!(path = %path.display(), %format, "loading spec document");
        match format {
            SpecFormat::Json => Self::from_json(&content),
            SpecFormat::Yaml => Self::from_yaml(&content),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let document: SpecDocument = serde_json::from_str(json).map_err(|e| {
            ProviderError::Parse(format!("Failed to parse spec document JSON: {}", e))
        })?;
        Ok(document.resolve_descriptors())
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document: SpecDocument = serde_yaml::from_str(yaml).map_err(|e| {
            ProviderError::Parse(format!("Failed to parse spec document YAML: {}", e))
        })?;
        Ok(document.resolve_descriptors())
    }

    /// Settle each descriptor's variant and parents from its path
    fn resolve_descriptors(mut self) -> Self {
        for resource in &mut self.resources {
            resource.kind = DescriptorKind::Resource;
            resolve_identity(resource);
        }
        for data_source in &mut self.data_sources {
            resolve_identity(data_source);
            data_source.kind = if data_source.parents.is_empty() {
                DescriptorKind::DataSource
            } else {
                DescriptorKind::SubResourceDataSource
            };
        }
        self
    }
}

fn resolve_identity(descriptor: &mut ResourceDescriptor) {
    if descriptor.name.is_empty() {
        descriptor.name = descriptor.path.clone();
    }
    descriptor.parents = parent_paths(&descriptor.path)
        .into_iter()
        .map(|path| ParentResource { path })
        .collect();
}

impl SpecModel for SpecDocument {
    fn backend_configuration(&self) -> Result<BackendConfiguration> {
        Ok(self.backend.clone())
    }

    fn global_security_schemes(&self) -> Result<Vec<String>> {
        for scheme in &self.security.global {
            if !self.security.definitions.iter().any(|d| &d.name == scheme) {
                return Err(ProviderError::SpecModel(format!(
                    "global security scheme '{}' has no matching security definition",
                    scheme
                )));
            }
        }
        Ok(self.security.global.clone())
    }

    fn api_key_security_definitions(&self) -> Result<Vec<SecurityDefinition>> {
        Ok(self.security.definitions.clone())
    }

    fn header_parameters(&self) -> Result<Vec<HeaderParameter>> {
        Ok(self.headers.clone())
    }

    fn resources(&self) -> Result<Vec<ResourceDescriptor>> {
        Ok(self.resources.clone())
    }

    fn data_sources(&self) -> Result<Vec<ResourceDescriptor>> {
        Ok(self.data_sources.clone())
    }
}
