//! Collaborators consumed by the assembly engine
//!
//! The engine never parses API documents, executes commands or builds
//! schemas for a single descriptor itself; it asks these traits.

use crate::{
    BackendConfiguration, DataSourceSchema, HeaderParameter, ResourceDescriptor, ResourceSchema,
    Result, SecurityDefinition,
};
use std::sync::Arc;

/// Already-parsed description of an HTTP API
///
/// Every query may fail, and any failure aborts the assembly it is part of.
pub trait SpecModel {
    fn backend_configuration(&self) -> Result<BackendConfiguration>;

    /// Names of the security schemes applied to every operation by default
    fn global_security_schemes(&self) -> Result<Vec<String>>;

    fn api_key_security_definitions(&self) -> Result<Vec<SecurityDefinition>>;

    fn header_parameters(&self) -> Result<Vec<HeaderParameter>>;

    fn resources(&self) -> Result<Vec<ResourceDescriptor>>;

    fn data_sources(&self) -> Result<Vec<ResourceDescriptor>>;
}

/// Default value strategy for a single configuration property
pub trait PropertyDefault {
    /// Whether a command runs before the default is read
    fn has_command(&self) -> bool;

    fn execute_command(&self) -> Result<()>;

    fn default_value(&self) -> Result<String>;

    /// Run the command, if any, then read the default value
    fn resolve(&self) -> Result<String> {
        self.execute_command()?;
        self.default_value()
    }
}

/// Per-property configuration of the service being exposed
pub trait ServiceConfiguration {
    fn property_default(&self, property_name: &str) -> Option<Arc<dyn PropertyDefault>>;
}

/// Builds the schema and CRUD bindings of a single resource
pub trait ResourceFactory {
    fn create_resource(&self, descriptor: &ResourceDescriptor) -> Result<ResourceSchema>;
}

/// Builds the read-only schema and read binding of a single data source
pub trait DataSourceFactory {
    fn create_data_source(&self, descriptor: &ResourceDescriptor) -> Result<DataSourceSchema>;
}
