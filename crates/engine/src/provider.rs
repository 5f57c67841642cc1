//! Provider factory and the assembled provider definition

use crate::configure::{ConfigurationAssembler, ProviderClient};
use crate::factory::SchemaFactory;
use crate::naming::CollisionReport;
use crate::registry::{merge_data_sources, RegistryBuilder};
use crate::schema::ConfigurationSchemaBuilder;
use indexmap::IndexMap;
use openapi_provider_common::naming::to_compliant_name;
use openapi_provider_common::{
    ConfigurationSchema, ConfigurationValues, DataSourceFactory, DataSourceSchema, ProviderError,
    QualifiedName, ResourceFactory, ResourceSchema, Result, ServiceConfiguration, SpecModel,
};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Configuration callback of a provider definition
pub type ConfigureFunc = Arc<dyn Fn(&ConfigurationValues) -> ProviderClient + Send + Sync>;

/// Fully assembled provider
#[derive(Clone)]
pub struct ProviderDefinition {
    pub configuration_schema: ConfigurationSchema,
    pub resources: IndexMap<QualifiedName, ResourceSchema>,
    /// Instance and standalone data sources
    pub data_sources: IndexMap<QualifiedName, DataSourceSchema>,
    /// Names dropped because descriptors at different paths claimed them
    pub collisions: Vec<CollisionReport>,
    pub configure: ConfigureFunc,
}

impl ProviderDefinition {
    pub fn configure(&self, values: &ConfigurationValues) -> ProviderClient {
        (self.configure)(values)
    }
}

impl fmt::Debug for ProviderDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDefinition")
            .field("configuration_schema", &self.configuration_schema)
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .field("collisions", &self.collisions)
            .finish_non_exhaustive()
    }
}

/// Assembles a [`ProviderDefinition`] from a spec model
pub struct ProviderFactory {
    name: String,
    spec: Arc<dyn SpecModel>,
    service_configuration: Arc<dyn ServiceConfiguration>,
    resource_factory: Arc<dyn ResourceFactory>,
    data_source_factory: Arc<dyn DataSourceFactory>,
}

impl fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ProviderFactoryBuilder {
    name: String,
    spec: Option<Arc<dyn SpecModel>>,
    service_configuration: Option<Arc<dyn ServiceConfiguration>>,
    resource_factory: Option<Arc<dyn ResourceFactory>>,
    data_source_factory: Option<Arc<dyn DataSourceFactory>>,
}

impl ProviderFactoryBuilder {
    pub fn spec_model(mut self, spec: Arc<dyn SpecModel>) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn service_configuration(mut self, configuration: Arc<dyn ServiceConfiguration>) -> Self {
        self.service_configuration = Some(configuration);
        self
    }

    pub fn resource_factory(mut self, factory: Arc<dyn ResourceFactory>) -> Self {
        self.resource_factory = Some(factory);
        self
    }

    pub fn data_source_factory(mut self, factory: Arc<dyn DataSourceFactory>) -> Self {
        self.data_source_factory = Some(factory);
        self
    }

    pub fn build(self) -> Result<ProviderFactory> {
        if self.name.is_empty() {
            return Err(ProviderError::MissingProviderName);
        }
        let compliant = to_compliant_name(&self.name);
        if compliant != self.name {
            return Err(ProviderError::NonCompliantProviderName {
                name: self.name,
                compliant,
            });
        }
        let spec = self.spec.ok_or(ProviderError::MissingSpecModel)?;
        let service_configuration = self
            .service_configuration
            .ok_or(ProviderError::MissingServiceConfiguration)?;

        Ok(ProviderFactory {
            name: self.name,
            spec,
            service_configuration,
            resource_factory: self
                .resource_factory
                .unwrap_or_else(|| Arc::new(SchemaFactory) as Arc<dyn ResourceFactory>),
            data_source_factory: self
                .data_source_factory
                .unwrap_or_else(|| Arc::new(SchemaFactory) as Arc<dyn DataSourceFactory>),
        })
    }
}

impl ProviderFactory {
    pub fn builder(name: impl Into<String>) -> ProviderFactoryBuilder {
        ProviderFactoryBuilder {
            name: name.into(),
            ..ProviderFactoryBuilder::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assemble the provider definition
    ///
    /// Any spec model, service configuration or factory error aborts the
    /// assembly; name collisions only drop the colliding entries.
    pub fn create_provider(&self) -> Result<ProviderDefinition> {
        let start = Instant::now();
        let spec = self.spec.as_ref();

        let backend = spec.backend_configuration()?;

        let registries = RegistryBuilder::new(
            &self.name,
            self.resource_factory.as_ref(),
            self.data_source_factory.as_ref(),
        );
        let resource_registry = registries.build_resources(spec.resources()?)?;

        let configuration_schema =
            ConfigurationSchemaBuilder::new(spec, self.service_configuration.as_ref())
                .build(&backend, &resource_registry.derived_names())?;

        let data_source_registry =
            registries.build_data_sources(spec.data_sources()?, &resource_registry.names_by_path)?;
        let data_sources =
            merge_data_sources(resource_registry.instances, data_source_registry.data_sources);

        let mut collisions = resource_registry.collisions;
        collisions.extend(data_source_registry.collisions);

        let configure =
            ConfigurationAssembler::from_spec(spec, backend, configuration_schema.clone())?
                .into_callback();

        info!(
            provider = %self.name,
            resources = resource_registry.resources.len(),
            data_sources = data_sources.len(),
            collisions = collisions.len(),
            elapsed = ?start.elapsed(),
            "assembled provider"
        );

        Ok(ProviderDefinition {
            configuration_schema,
            resources: resource_registry.resources,
            data_sources,
            collisions,
            configure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{plain_spec, MockSpec, StubServiceConfiguration};
    use openapi_provider_common::{BackendConfiguration, ResourceDescriptor};

    fn factory(spec: MockSpec) -> ProviderFactory {
        ProviderFactory::builder("acme")
            .spec_model(Arc::new(spec))
            .service_configuration(Arc::new(StubServiceConfiguration::default()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_validations() {
        let err = ProviderFactory::builder("").build().unwrap_err();
        assert!(matches!(err, ProviderError::MissingProviderName));

        let err = ProviderFactory::builder("someNonTerraformCompliantName")
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "provider name 'someNonTerraformCompliantName' not terraform name compliant, please consider renaming provider to 'some_non_terraform_compliant_name'"
        );

        let err = ProviderFactory::builder("acme").build().unwrap_err();
        assert!(matches!(err, ProviderError::MissingSpecModel));

        let err = ProviderFactory::builder("acme")
            .spec_model(Arc::new(MockSpec::new()))
            .build()
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingServiceConfiguration));
    }

    #[test]
    fn test_create_provider() {
        let spec = plain_spec(
            vec![ResourceDescriptor::new("widgets", "/v1/widgets")],
            Vec::new(),
        );
        let provider = factory(spec).create_provider().unwrap();

        let resources: Vec<&str> = provider.resources.keys().map(|n| n.as_str()).collect();
        assert_eq!(resources, vec!["acme_widgets_v1"]);
        assert!(provider.data_sources.contains_key("acme_widgets_v1_instance"));
        assert!(provider.collisions.is_empty());

        let endpoints = provider.configuration_schema.get("endpoints").unwrap();
        assert_eq!(endpoints.nested()[0].name, "widgets_v1");

        let client = provider.configure(&ConfigurationValues::new());
        assert_eq!(client.resource_host("widgets_v1"), "api.example.com");
    }

    #[test]
    fn test_backend_error_aborts() {
        let mut spec = MockSpec::new();
        spec.expect_backend_configuration()
            .returning(|| Err(ProviderError::SpecModel("backend error".to_string())));

        let err = factory(spec).create_provider().unwrap_err();
        assert_eq!(err.to_string(), "backend error");
    }

    #[test]
    fn test_multi_region_without_regions_aborts() {
        let mut spec = MockSpec::new();
        spec.expect_backend_configuration()
            .returning(|| Ok(BackendConfiguration::new("svc.${region}.example.com")));
        spec.expect_resources().returning(|| Ok(Vec::new()));

        let err = factory(spec).create_provider().unwrap_err();
        assert!(err.to_string().contains("does not declare any region"));
    }
}
