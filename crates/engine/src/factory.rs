//! Default resource and data source factories
//!
//! Builds schemas straight from the descriptor's structural schema. Hosts
//! with richer spec models plug their own factories into the provider
//! factory instead.

use openapi_provider_common::{
    CrudOperation, DataSourceFactory, DataSourceSchema, FieldType, HttpMethod, OperationBinding,
    ProviderError, ResourceDescriptor, ResourceFactory, ResourceOperations, ResourceSchema,
    Result, SchemaProperty,
};

/// Name of the filter block carried by every list-bound data source
pub const DATA_SOURCE_FILTER_PROPERTY: &str = "filter";

#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaFactory;

/// Prepend a computed `id` unless some property already identifies instances
fn ensure_identifier(properties: &mut Vec<SchemaProperty>) {
    if !properties.iter().any(SchemaProperty::is_identifier) {
        properties.insert(0, SchemaProperty::computed_string("id"));
    }
}

/// Optional, repeatable `filter { name = ..., values = [...] }` block
///
/// Selects the single item a list-bound data source reads. Every block must
/// match: `name` is a property of the listed item and `values` the accepted
/// values for it.
pub fn filter_property() -> SchemaProperty {
    let element = FieldType::Object(vec![
        SchemaProperty::required_string("name"),
        SchemaProperty::required_string("values")
            .with_type(FieldType::List(Box::new(FieldType::String))),
    ]);
    SchemaProperty::string(DATA_SOURCE_FILTER_PROPERTY)
        .with_type(FieldType::List(Box::new(element)))
        .with_description("Filters the listed items down to the one being read")
}

impl ResourceFactory for SchemaFactory {
    fn create_resource(&self, descriptor: &ResourceDescriptor) -> Result<ResourceSchema> {
        let operations = descriptor.operations;
        if !operations.create || !operations.read {
            return Err(ProviderError::Factory(format!(
                "resource '{}' ({}) must expose create and read operations",
                descriptor.name, descriptor.path
            )));
        }

        let mut properties: Vec<SchemaProperty> = descriptor
            .properties
            .iter()
            .cloned()
            .map(|mut property| {
                if property.read_only {
                    property.computed = true;
                    property.required = false;
                }
                property
            })
            .collect();
        ensure_identifier(&mut properties);

        let instance_path = descriptor.instance_path();
        Ok(ResourceSchema {
            description: descriptor.description.clone(),
            properties,
            operations: ResourceOperations {
                create: OperationBinding::new(
                    CrudOperation::Create,
                    HttpMethod::Post,
                    descriptor.path.clone(),
                ),
                read: OperationBinding::new(
                    CrudOperation::Read,
                    HttpMethod::Get,
                    instance_path.clone(),
                ),
                update: operations.update.then(|| {
                    OperationBinding::new(CrudOperation::Update, HttpMethod::Put, instance_path.clone())
                }),
                delete: operations.delete.then(|| {
                    OperationBinding::new(CrudOperation::Delete, HttpMethod::Delete, instance_path.clone())
                }),
            },
        })
    }
}

impl DataSourceFactory for SchemaFactory {
    fn create_data_source(&self, descriptor: &ResourceDescriptor) -> Result<DataSourceSchema> {
        if !descriptor.operations.list {
            return Err(ProviderError::Factory(format!(
                "data source '{}' ({}) must expose a list operation",
                descriptor.name, descriptor.path
            )));
        }

        let mut properties: Vec<SchemaProperty> = descriptor
            .properties
            .iter()
            .cloned()
            .map(|mut property| {
                property.computed = true;
                property.required = false;
                property
            })
            .filter(|property| property.name != DATA_SOURCE_FILTER_PROPERTY)
            .collect();
        ensure_identifier(&mut properties);
        properties.push(filter_property());

        Ok(DataSourceSchema {
            description: descriptor.description.clone(),
            properties,
            read: OperationBinding::new(
                CrudOperation::List,
                HttpMethod::Get,
                descriptor.path.clone(),
            ),
        })
    }
}
