//! Provider configuration schema synthesis

use openapi_provider_common::{
    BackendConfiguration, ConfigurationProperty, ConfigurationSchema, DefaultSource,
    PropertyDefault, Result, ServiceConfiguration, SpecModel, ENDPOINTS_PROPERTY,
};
use std::collections::HashSet;
use tracing::debug;

pub const PROVIDER_PROPERTY_REGION: &str = "region";
pub const PROVIDER_PROPERTY_ENDPOINTS: &str = ENDPOINTS_PROPERTY;

/// Builds the provider-level configuration schema
///
/// Properties are registered in a fixed order: region, security schemes,
/// headers, then the endpoint override block.
pub struct ConfigurationSchemaBuilder<'a> {
    spec: &'a dyn SpecModel,
    service_configuration: &'a dyn ServiceConfiguration,
}

impl<'a> ConfigurationSchemaBuilder<'a> {
    pub fn new(
        spec: &'a dyn SpecModel,
        service_configuration: &'a dyn ServiceConfiguration,
    ) -> Self {
        Self {
            spec,
            service_configuration,
        }
    }

    /// Build the schema
    ///
    /// `resource_names` are the derived names (without provider prefix) of
    /// the registered resources, one endpoint override each.
    pub fn build(
        &self,
        backend: &BackendConfiguration,
        resource_names: &[String],
    ) -> Result<ConfigurationSchema> {
        let mut schema = ConfigurationSchema::new();

        if let Some(region) = self.region_property(backend)? {
            schema.insert(region);
        }

        for property in self.security_properties()? {
            schema.insert(property);
        }

        for property in self.header_properties()? {
            schema.insert(property);
        }

        if !resource_names.is_empty() {
            schema.insert(endpoints_property(resource_names));
        }

        debug!(properties = schema.len(), "built provider configuration schema");
        Ok(schema)
    }

    fn region_property(
        &self,
        backend: &BackendConfiguration,
    ) -> Result<Option<ConfigurationProperty>> {
        let Some(multi_region) = backend.multi_region()? else {
            return Ok(None);
        };

        let description = format!(
            "The region the provider talks to. One of {}",
            multi_region.regions.join(", ")
        );
        // multi_region() guarantees at least one region
        let default_region = multi_region.regions.first().cloned().unwrap_or_default();
        debug!(
            host = %multi_region.host,
            regions = ?multi_region.regions,
            "backend is multi-region"
        );

        Ok(Some(
            ConfigurationProperty::string(PROVIDER_PROPERTY_REGION, true)
                .with_default(default_region, DefaultSource::Static)
                .with_allowed_values(multi_region.regions)
                .with_description(description),
        ))
    }

    fn security_properties(&self) -> Result<Vec<ConfigurationProperty>> {
        let global: HashSet<String> = self
            .spec
            .global_security_schemes()?
            .into_iter()
            .collect();

        self.spec
            .api_key_security_definitions()?
            .into_iter()
            .map(|definition| {
                let required = global.contains(&definition.name);
                let name = definition.configuration_name();
                self.property_from_service_configuration(&name, required)
            })
            .collect()
    }

    fn header_properties(&self) -> Result<Vec<ConfigurationProperty>> {
        self.spec
            .header_parameters()?
            .into_iter()
            .map(|header| {
                let name = header.configuration_name();
                self.property_from_service_configuration(&name, false)
            })
            .collect()
    }

    /// String property whose default comes from the service configuration
    ///
    /// The configured command, if any, runs before the default is read.
    fn property_from_service_configuration(
        &self,
        name: &str,
        required: bool,
    ) -> Result<ConfigurationProperty> {
        let property = ConfigurationProperty::string(name, required);
        let Some(strategy) = self.service_configuration.property_default(name) else {
            return Ok(property);
        };

        let source = if strategy.has_command() {
            DefaultSource::Command
        } else {
            DefaultSource::Static
        };
        let value = strategy.resolve()?;
        debug!(property = %name, source = ?source, "resolved property default");

        if value.is_empty() {
            return Ok(property);
        }
        Ok(property.with_default(value, source))
    }
}

fn endpoints_property(resource_names: &[String]) -> ConfigurationProperty {
    let properties = resource_names
        .iter()
        .map(|name| {
            ConfigurationProperty::string(name.clone(), false)
                .with_description(format!("Use this to override the resource endpoint URL (the default one or the one constructed from the region property) for '{}'", name))
        })
        .collect();
    ConfigurationProperty::block(PROVIDER_PROPERTY_ENDPOINTS, properties)
}
