//! Provider assembly for OpenAPI-described services
//!
//! This crate walks a [`SpecModel`](openapi_provider_common::SpecModel) and
//! produces a [`ProviderDefinition`]:
//!
//! - a configuration schema (region, security, header and endpoint override
//!   properties)
//! - a registry of resources with their CRUD bindings
//! - a registry of data sources, including a read-only `_instance` data
//!   source for every resource
//! - a configuration callback turning user values into a [`ProviderClient`]
//!
//! ## Naming
//! Registry keys are `<provider>_<derived name>`. Descriptors whose names
//! collide over different paths are all dropped and reported in
//! [`ProviderDefinition::collisions`]; duplicates over the same path keep the
//! first declaration.
//!
//! ## Usage
//! ```rust,ignore
//! use openapi_provider_engine::ProviderFactory;
//!
//! let provider = ProviderFactory::builder("acme")
//!     .spec_model(Arc::new(spec))
//!     .service_configuration(Arc::new(service_config))
//!     .build()?
//!     .create_provider()?;
//! ```

mod configure;
mod factory;
mod naming;
mod provider;
mod registry;
mod schema;
#[cfg(test)]
mod testing;

pub use configure::{
    ApiAuthenticator, ClientContext, ConfigurationAssembler, Credentials, ProviderClient,
    SecurityContext,
};
pub use factory::{filter_property, SchemaFactory, DATA_SOURCE_FILTER_PROPERTY};
pub use naming::{CollisionReport, NamingResolver, ResolvedNames};
pub use provider::{ConfigureFunc, ProviderDefinition, ProviderFactory, ProviderFactoryBuilder};
pub use registry::{
    instance_data_source, merge_data_sources, DataSourceRegistry, RegistryBuilder,
    ResourceRegistry,
};
pub use schema::{ConfigurationSchemaBuilder, PROVIDER_PROPERTY_ENDPOINTS, PROVIDER_PROPERTY_REGION};
