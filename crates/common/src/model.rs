//! Spec model data types
//!
//! These types describe an already-parsed API: its backend, security
//! definitions, headers and the resources and data sources it exposes. They
//! also describe what the factories produce for each descriptor.

use crate::{ProviderError, Result};
use serde::{Deserialize, Serialize};

/// Placeholder in a multi-region host template
pub const REGION_PLACEHOLDER: &str = "${region}";

/// Represents a field type in a resource or data source schema
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    String,
    Integer,
    Float,
    Boolean,
    List(Box<FieldType>),
    Object(Vec<SchemaProperty>),
}

/// A named property in a structural schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaProperty {
    pub name: String,

    #[serde(default, rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub computed: bool,

    #[serde(default)]
    pub sensitive: bool,

    /// Marks the property that identifies a remote instance
    #[serde(default)]
    pub identifier: bool,

    #[serde(default)]
    pub description: Option<String>,
}

impl SchemaProperty {
    /// Optional string property with no flags set
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::String,
            required: false,
            read_only: false,
            computed: false,
            sensitive: false,
            identifier: false,
            description: None,
        }
    }

    /// Required, user-supplied string property
    pub fn required_string(name: impl Into<String>) -> Self {
        Self {
            required: true,
            ..Self::string(name)
        }
    }

    /// Computed string property, populated from the API response
    pub fn computed_string(name: impl Into<String>) -> Self {
        Self {
            computed: true,
            ..Self::string(name)
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// A property named `id` is always an identifier
    pub fn is_identifier(&self) -> bool {
        self.identifier || self.name == "id"
    }
}

/// Variant of a descriptor, resolved once when the spec model is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    #[default]
    Resource,
    DataSource,
    /// Data source whose path is nested below one or more parent resources
    SubResourceDataSource,
}

/// Parent collection of a nested descriptor, e.g. `/v1/cdns` for
/// `/v1/cdns/{cdn_id}/firewalls`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentResource {
    pub path: String,
}

/// Which CRUD operations the API exposes for a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperationSet {
    #[serde(default)]
    pub create: bool,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub update: bool,
    #[serde(default)]
    pub delete: bool,
    #[serde(default)]
    pub list: bool,
}

impl OperationSet {
    /// Create, read, update and delete all available
    pub fn crud() -> Self {
        Self {
            create: true,
            read: true,
            update: true,
            delete: true,
            list: false,
        }
    }

    /// Only the collection listing is available
    pub fn list_only() -> Self {
        Self {
            list: true,
            ..Self::default()
        }
    }
}

/// A resource or data source as declared by the spec model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Raw declared name, used in reports
    #[serde(default)]
    pub name: String,

    /// Collection path, e.g. `/v1/widgets`
    pub path: String,

    /// Explicit name hint overriding the path-derived leaf name
    #[serde(default)]
    pub preferred_name: Option<String>,

    #[serde(default)]
    pub ignore: bool,

    #[serde(default)]
    pub kind: DescriptorKind,

    #[serde(default)]
    pub parents: Vec<ParentResource>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub properties: Vec<SchemaProperty>,

    #[serde(default)]
    pub operations: OperationSet,
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            preferred_name: None,
            ignore: false,
            kind: DescriptorKind::Resource,
            parents: Vec::new(),
            description: None,
            properties: Vec::new(),
            operations: OperationSet::crud(),
        }
    }

    pub fn with_preferred_name(mut self, preferred_name: impl Into<String>) -> Self {
        self.preferred_name = Some(preferred_name.into());
        self
    }

    pub fn with_property(mut self, property: SchemaProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_operations(mut self, operations: OperationSet) -> Self {
        self.operations = operations;
        self
    }

    pub fn with_kind(mut self, kind: DescriptorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_parents(mut self, parents: Vec<ParentResource>) -> Self {
        self.parents = parents;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Path of a single instance below the collection
    pub fn instance_path(&self) -> String {
        format!("{}/{{id}}", self.path.trim_end_matches('/'))
    }
}

/// CRUD operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudOperation {
    Create,
    Read,
    Update,
    Delete,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Binds an operation to the HTTP call the executor performs for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationBinding {
    pub operation: CrudOperation,
    pub method: HttpMethod,
    pub path: String,
}

impl OperationBinding {
    pub fn new(operation: CrudOperation, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            operation,
            method,
            path: path.into(),
        }
    }
}

/// Operations bound for a manageable resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOperations {
    pub create: OperationBinding,
    pub read: OperationBinding,
    pub update: Option<OperationBinding>,
    pub delete: Option<OperationBinding>,
}

/// Schema and operation bindings of a registered resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub description: Option<String>,
    pub properties: Vec<SchemaProperty>,
    pub operations: ResourceOperations,
}

/// Read-only schema and read binding of a registered data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceSchema {
    pub description: Option<String>,
    pub properties: Vec<SchemaProperty>,
    pub read: OperationBinding,
}

impl ResourceSchema {
    pub fn property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

impl DataSourceSchema {
    pub fn property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Where the API expects its backend to be reached
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendConfiguration {
    /// Host, optionally templated with `${region}`
    pub host: String,

    #[serde(default)]
    pub base_path: String,

    #[serde(default)]
    pub schemes: Vec<String>,

    #[serde(default)]
    pub regions: Vec<String>,
}

/// Multi-region details of a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiRegion {
    pub host: String,
    pub regions: Vec<String>,
}

impl BackendConfiguration {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_regions(mut self, regions: Vec<String>) -> Self {
        self.regions = regions;
        self
    }

    /// Reports whether the backend is multi-region
    ///
    /// A host templated with `${region}` is multi-region and must advertise at
    /// least one region.
    pub fn multi_region(&self) -> Result<Option<MultiRegion>> {
        if !self.host.contains(REGION_PLACEHOLDER) {
            return Ok(None);
        }
        if self.regions.is_empty() {
            return Err(ProviderError::SpecModel(format!(
                "mis-configuration: multi-region host '{}' does not declare any region",
                self.host
            )));
        }
        Ok(Some(MultiRegion {
            host: self.host.clone(),
            regions: self.regions.clone(),
        }))
    }

    /// Host with the region placeholder substituted
    pub fn resolve_host(&self, region: Option<&str>) -> String {
        match region {
            Some(region) => self.host.replace(REGION_PLACEHOLDER, region),
            None => self.host.clone(),
        }
    }
}

/// Where an API key travels on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyLocation {
    Header,
    Query,
}

/// API-key style security definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDefinition {
    /// Declared scheme name, not necessarily compliant
    pub name: String,

    #[serde(rename = "in")]
    pub location: ApiKeyLocation,

    /// Header or query parameter carrying the key
    pub key_name: String,
}

impl SecurityDefinition {
    pub fn configuration_name(&self) -> String {
        crate::naming::to_compliant_name(&self.name)
    }
}

/// Header parameter declared by one or more operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderParameter {
    /// Literal wire header name
    pub name: String,

    #[serde(default)]
    pub preferred_name: Option<String>,
}

impl HeaderParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preferred_name: None,
        }
    }

    pub fn configuration_name(&self) -> String {
        crate::naming::to_compliant_name(self.preferred_name.as_deref().unwrap_or(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_region_backend() {
        let backend = BackendConfiguration::new("api.example.com");
        assert_eq!(backend.multi_region().unwrap(), None);
        assert_eq!(backend.resolve_host(Some("us")), "api.example.com");
    }

    #[test]
    fn test_multi_region_backend() {
        let backend = BackendConfiguration::new("svc.${region}.example.com")
            .with_regions(vec!["us".to_string(), "eu".to_string()]);

        let multi = backend.multi_region().unwrap().unwrap();
        assert_eq!(multi.regions, vec!["us", "eu"]);
        assert_eq!(backend.resolve_host(Some("eu")), "svc.eu.example.com");
    }

    #[test]
    fn test_multi_region_backend_without_regions() {
        let backend = BackendConfiguration::new("svc.${region}.example.com");
        let err = backend.multi_region().unwrap_err();
        assert!(err.to_string().contains("does not declare any region"));
    }

    #[test]
    fn test_configuration_names() {
        let security = SecurityDefinition {
            name: "apiKeyAuth".to_string(),
            location: ApiKeyLocation::Header,
            key_name: "Authorization".to_string(),
        };
        assert_eq!(security.configuration_name(), "api_key_auth");

        let header = HeaderParameter::new("X-Request-ID");
        assert_eq!(header.configuration_name(), "x_request_id");

        let preferred = HeaderParameter {
            name: "X-Tenant".to_string(),
            preferred_name: Some("tenant".to_string()),
        };
        assert_eq!(preferred.configuration_name(), "tenant");
    }

    #[test]
    fn test_identifier_detection() {
        assert!(SchemaProperty::string("id").is_identifier());
        assert!(!SchemaProperty::string("label").is_identifier());

        let mut key = SchemaProperty::string("key");
        key.identifier = true;
        assert!(key.is_identifier());
    }
}
