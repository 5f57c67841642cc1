//! Common types and utilities for the OpenAPI provider assembler
//!
//! This crate contains the shared data model (resource descriptors, schemas,
//! configuration properties), the naming rules that turn API paths into
//! registry keys, the collaborator traits the assembly engine consumes, and
//! the error type used across the spec loader, engine, docs and CLI crates.

mod collaborators;
mod configuration;
mod model;
pub mod naming;

pub use collaborators::{
    DataSourceFactory, PropertyDefault, ResourceFactory, ServiceConfiguration, SpecModel,
};
pub use configuration::{
    ConfigurationKind, ConfigurationProperty, ConfigurationSchema, ConfigurationValues,
    DefaultSource, ENDPOINTS_PROPERTY,
};
pub use model::{
    ApiKeyLocation, BackendConfiguration, CrudOperation, DataSourceSchema, DescriptorKind,
    FieldType, HeaderParameter, HttpMethod, MultiRegion, OperationBinding, OperationSet,
    ParentResource, ResourceDescriptor, ResourceOperations, ResourceSchema, SchemaProperty,
    SecurityDefinition,
};
pub use naming::QualifiedName;

use thiserror::Error;

/// Errors that can occur while assembling or configuring a provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider name not specified")]
    MissingProviderName,

    #[error("provider name '{name}' not terraform name compliant, please consider renaming provider to '{compliant}'")]
    NonCompliantProviderName { name: String, compliant: String },

    #[error("provider missing an API spec model")]
    MissingSpecModel,

    #[error("provider missing the service configuration")]
    MissingServiceConfiguration,

    #[error("resource name can not be empty")]
    EmptyResourceName,

    /// Failure reported by the spec model; displayed verbatim
    #[error("{0}")]
    SpecModel(String),

    /// Failure reported by the service configuration; displayed verbatim
    #[error("{0}")]
    ServiceConfiguration(String),

    /// Failure reported by a resource or data source factory; displayed verbatim
    #[error("{0}")]
    Factory(String),

    #[error("command {command:?} configured for property '{property}' failed: {message}")]
    Command {
        property: String,
        command: Vec<String>,
        message: String,
    },

    #[error("property {key} value {value} is not valid, please make sure the value is one of [{}]", allowed.join(", "))]
    InvalidValue {
        key: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("block {block} does not support '{key}', please make sure the key is one of [{}]", allowed.join(", "))]
    UnsupportedBlockKey {
        block: String,
        key: String,
        allowed: Vec<String>,
    },

    #[error("required property '{0}' has no configured value")]
    MissingRequiredValue(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Documentation error: {0}")]
    Documentation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for provider assembly operations
pub type Result<T> = std::result::Result<T, ProviderError>;
