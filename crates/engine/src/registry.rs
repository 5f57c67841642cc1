//! Resource and data source registries

use crate::naming::{CollisionReport, NamingResolver};
use indexmap::IndexMap;
use openapi_provider_common::{
    DataSourceFactory, DataSourceSchema, DescriptorKind, QualifiedName, ResourceDescriptor,
    ResourceFactory, ResourceSchema, Result, SchemaProperty,
};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

/// Registered resources and the instance data sources derived from them
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    pub resources: IndexMap<QualifiedName, ResourceSchema>,
    /// `<name>_instance` data source per registered resource
    pub instances: IndexMap<QualifiedName, DataSourceSchema>,
    pub collisions: Vec<CollisionReport>,
    /// Registered resource names keyed by collection path
    pub names_by_path: HashMap<String, QualifiedName>,
}

impl ResourceRegistry {
    /// Derived names of the registered resources, in registration order
    pub fn derived_names(&self) -> Vec<String> {
        self.resources
            .keys()
            .map(|name| name.derived_name().to_string())
            .collect()
    }
}

/// Registered standalone data sources
#[derive(Debug, Clone, Default)]
pub struct DataSourceRegistry {
    pub data_sources: IndexMap<QualifiedName, DataSourceSchema>,
    pub collisions: Vec<CollisionReport>,
}

pub struct RegistryBuilder<'a> {
    provider_name: &'a str,
    resource_factory: &'a dyn ResourceFactory,
    data_source_factory: &'a dyn DataSourceFactory,
}

impl<'a> RegistryBuilder<'a> {
    pub fn new(
        provider_name: &'a str,
        resource_factory: &'a dyn ResourceFactory,
        data_source_factory: &'a dyn DataSourceFactory,
    ) -> Self {
        Self {
            provider_name,
            resource_factory,
            data_source_factory,
        }
    }

    /// Register every resource and its instance data source
    ///
    /// A factory error aborts the whole build.
    pub fn build_resources(&self, descriptors: Vec<ResourceDescriptor>) -> Result<ResourceRegistry> {
        let resolved = NamingResolver::new(self.provider_name).resolve(descriptors)?;
        let mut registry = ResourceRegistry {
            collisions: resolved.collisions,
            ..ResourceRegistry::default()
        };

        for (name, descriptor) in resolved.entries {
            let start = Instant::now();
            let resource = self.resource_factory.create_resource(&descriptor)?;
            let instance = instance_data_source(&resource);

            registry
                .names_by_path
                .insert(descriptor.path.clone(), name.clone());
            registry.instances.insert(name.instance_name(), instance);
            registry.resources.insert(name.clone(), resource);
            info!(
                resource = %name,
                path = %descriptor.path,
                elapsed = ?start.elapsed(),
                "registered resource"
            );
        }

        Ok(registry)
    }

    /// Register every standalone data source
    ///
    /// Nested data sources are named after the registered resource at their
    /// parent path. Sub-resource data sources get one required `<parent>_id`
    /// property per parent, named after the parent's qualified name.
    pub fn build_data_sources(
        &self,
        descriptors: Vec<ResourceDescriptor>,
        names_by_path: &HashMap<String, QualifiedName>,
    ) -> Result<DataSourceRegistry> {
        let parent_names = names_by_path
            .iter()
            .map(|(path, name)| (path.clone(), name.derived_name().to_string()))
            .collect();
        let resolver = NamingResolver::new(self.provider_name).with_parent_names(parent_names);
        let resolved = resolver.resolve(descriptors)?;
        let mut registry = DataSourceRegistry {
            collisions: resolved.collisions,
            ..DataSourceRegistry::default()
        };

        for (name, descriptor) in resolved.entries {
            let start = Instant::now();
            let mut data_source = self.data_source_factory.create_data_source(&descriptor)?;

            if descriptor.kind == DescriptorKind::SubResourceDataSource {
                let parent_properties = descriptor
                    .parents
                    .iter()
                    .map(|parent| -> Result<SchemaProperty> {
                        let parent_name = match names_by_path.get(&parent.path) {
                            Some(name) => name.clone(),
                            None => resolver
                                .qualified_name(&ResourceDescriptor::new("", parent.path.clone()))?,
                        };
                        Ok(SchemaProperty::required_string(parent_name.id_property())
                            .with_description(format!(
                                "The identifier of the parent {} instance",
                                parent_name
                            )))
                    })
                    .collect::<Result<Vec<_>>>()?;
                add_parent_properties(&mut data_source, parent_properties);
            }

            info!(
                data_source = %name,
                path = %descriptor.path,
                elapsed = ?start.elapsed(),
                "registered data source"
            );
            registry.data_sources.insert(name, data_source);
        }

        Ok(registry)
    }
}

/// Parent id properties lead the schema and are always user-supplied
fn add_parent_properties(data_source: &mut DataSourceSchema, mut parents: Vec<SchemaProperty>) {
    data_source
        .properties
        .retain(|p| !parents.iter().any(|parent| parent.name == p.name));
    parents.append(&mut data_source.properties);
    data_source.properties = parents;
}

/// Read-only projection of a resource
///
/// Identifier properties become the required lookup input; every other
/// property is computed. Only the read binding is kept.
pub fn instance_data_source(resource: &ResourceSchema) -> DataSourceSchema {
    let mut properties: Vec<SchemaProperty> = resource
        .properties
        .iter()
        .cloned()
        .map(|mut property| {
            if property.is_identifier() {
                property.required = true;
                property.computed = false;
            } else {
                property.required = false;
                property.computed = true;
            }
            property
        })
        .collect();

    if !properties.iter().any(SchemaProperty::is_identifier) {
        properties.insert(0, SchemaProperty::required_string("id"));
    }

    DataSourceSchema {
        description: resource.description.clone(),
        properties,
        read: resource.operations.read.clone(),
    }
}

/// Combine instance and standalone data sources
///
/// Standalone data sources are merged last and replace instance data sources
/// of the same name.
pub fn merge_data_sources(
    instances: IndexMap<QualifiedName, DataSourceSchema>,
    standalone: IndexMap<QualifiedName, DataSourceSchema>,
) -> IndexMap<QualifiedName, DataSourceSchema> {
    let mut merged = instances;
    for (name, data_source) in standalone {
        if merged.insert(name.clone(), data_source).is_some() {
            debug!(data_source = %name, "standalone data source replaces instance data source");
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::SchemaFactory;
    use openapi_provider_common::{
        CrudOperation, OperationSet, ParentResource, ProviderError,
    };

    struct FailingFactory;

    impl ResourceFactory for FailingFactory {
        fn create_resource(&self, descriptor: &ResourceDescriptor) -> Result<ResourceSchema> {
            Err(ProviderError::Factory(format!(
                "failed to build resource '{}'",
                descriptor.name
            )))
        }
    }

    impl DataSourceFactory for FailingFactory {
        fn create_data_source(&self, descriptor: &ResourceDescriptor) -> Result<DataSourceSchema> {
            Err(ProviderError::Factory(format!(
                "failed to build data source '{}'",
                descriptor.name
            )))
        }
    }

    fn widget() -> ResourceDescriptor {
        ResourceDescriptor::new("widgets", "/v1/widgets")
            .with_property(SchemaProperty::required_string("label"))
            .with_property(SchemaProperty::string("color"))
    }

    fn firewalls() -> ResourceDescriptor {
        ResourceDescriptor::new("firewalls", "/v1/cdns/{cdn_id}/firewalls")
            .with_kind(DescriptorKind::SubResourceDataSource)
            .with_parents(vec![ParentResource {
                path: "/v1/cdns".to_string(),
            }])
            .with_operations(OperationSet::list_only())
            .with_property(SchemaProperty::string("name"))
    }

    #[test]
    fn test_build_resources_with_instances() {
        let builder = RegistryBuilder::new("acme", &SchemaFactory, &SchemaFactory);
        let registry = builder.build_resources(vec![widget()]).unwrap();

        assert!(registry.resources.contains_key("acme_widgets_v1"));
        assert!(registry.instances.contains_key("acme_widgets_v1_instance"));
        assert_eq!(registry.derived_names(), vec!["widgets_v1"]);
        assert_eq!(
            registry.names_by_path["/v1/widgets"].as_str(),
            "acme_widgets_v1"
        );
    }

    #[test]
    fn test_instance_data_source_projection() {
        let resource = SchemaFactory.create_resource(&widget()).unwrap();
        let instance = instance_data_source(&resource);

        let id = instance.property("id").unwrap();
        assert!(id.required);
        assert!(!id.computed);

        for name in ["label", "color"] {
            let property = instance.property(name).unwrap();
            assert!(property.computed, "{} should be computed", name);
            assert!(!property.required, "{} should not be required", name);
        }
        assert_eq!(instance.read.operation, CrudOperation::Read);
        assert_eq!(instance.read.path, "/v1/widgets/{id}");
    }

    #[test]
    fn test_nested_resource_named_after_parent() {
        let builder = RegistryBuilder::new("openapi", &SchemaFactory, &SchemaFactory);
        let registry = builder
            .build_resources(vec![
                ResourceDescriptor::new("cdns", "/v1/cdns").with_preferred_name("cdn"),
                ResourceDescriptor::new("firewalls", "/v1/cdns/{id}/firewalls")
                    .with_preferred_name("firewall"),
            ])
            .unwrap();

        assert!(registry.resources.contains_key("openapi_cdn_v1_firewall"));
        assert!(registry.instances.contains_key("openapi_cdn_v1_firewall_instance"));
        assert_eq!(registry.derived_names(), vec!["cdn_v1", "cdn_v1_firewall"]);
    }

    #[test]
    fn test_resource_factory_error_aborts() {
        let builder = RegistryBuilder::new("acme", &FailingFactory, &SchemaFactory);
        let err = builder.build_resources(vec![widget()]).unwrap_err();
        assert_eq!(err.to_string(), "failed to build resource 'widgets'");
    }

    #[test]
    fn test_sub_resource_parent_property_from_registered_parent() {
        let builder = RegistryBuilder::new("acme", &SchemaFactory, &SchemaFactory);
        let mut names_by_path = HashMap::new();
        names_by_path.insert(
            "/v1/cdns".to_string(),
            QualifiedName::new("acme", "cdn_v1").unwrap(),
        );

        let registry = builder
            .build_data_sources(vec![firewalls()], &names_by_path)
            .unwrap();

        let data_source = &registry.data_sources["acme_cdn_v1_firewalls"];
        let parent = &data_source.properties[0];
        assert_eq!(parent.name, "acme_cdn_v1_id");
        assert!(parent.required);
        assert!(!parent.computed);
    }

    #[test]
    fn test_sub_resource_parent_property_derived_from_path() {
        let builder = RegistryBuilder::new("acme", &SchemaFactory, &SchemaFactory);
        let registry = builder
            .build_data_sources(vec![firewalls()], &HashMap::new())
            .unwrap();

        let data_source = &registry.data_sources["acme_cdns_v1_firewalls"];
        assert!(data_source.property("acme_cdns_v1_id").unwrap().required);
    }

    #[test]
    fn test_data_source_factory_error_aborts() {
        let builder = RegistryBuilder::new("acme", &SchemaFactory, &FailingFactory);
        let err = builder
            .build_data_sources(vec![firewalls()], &HashMap::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to build data source 'firewalls'");
    }

    #[test]
    fn test_merge_prefers_standalone() {
        let resource = SchemaFactory.create_resource(&widget()).unwrap();
        let name = QualifiedName::new("acme", "widgets_v1").unwrap();

        let mut instances = IndexMap::new();
        instances.insert(name.instance_name(), instance_data_source(&resource));
        instances.insert(
            QualifiedName::new("acme", "other").unwrap(),
            instance_data_source(&resource),
        );

        let standalone_descriptor = ResourceDescriptor::new("custom", "/v1/custom")
            .with_operations(OperationSet::list_only());
        let standalone_schema = SchemaFactory
            .create_data_source(&standalone_descriptor)
            .unwrap();
        let mut standalone = IndexMap::new();
        standalone.insert(name.instance_name(), standalone_schema.clone());

        let merged = merge_data_sources(instances, standalone);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["acme_widgets_v1_instance"], standalone_schema);
    }
}
