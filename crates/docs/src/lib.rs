//! Markdown documentation for assembled providers
//!
//! Renders an index page with the provider configuration, plus one page per
//! resource and data source:
//!
//! ```text
//! docs/
//! ├── index.md
//! ├── resources/<name>.md
//! └── data-sources/<name>.md
//! ```

mod templates;

use openapi_provider_common::{
    ConfigurationProperty, DataSourceSchema, HttpMethod, OperationBinding, ProviderError,
    ResourceSchema, Result, SchemaProperty,
};
use openapi_provider_engine::ProviderDefinition;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::Tera;
use tracing::debug;

#[derive(Debug, Serialize)]
struct PropertyView<'a> {
    name: &'a str,
    description: Option<&'a str>,
    required: bool,
    default_value: Option<&'a str>,
    allowed_values: &'a [String],
    /// Nested property names of a block
    nested: Vec<&'a str>,
}

impl<'a> From<&'a ConfigurationProperty> for PropertyView<'a> {
    fn from(property: &'a ConfigurationProperty) -> Self {
        Self {
            name: &property.name,
            description: property.description.as_deref(),
            required: property.required,
            default_value: property.default_value.as_deref(),
            allowed_values: &property.allowed_values,
            nested: property.nested().iter().map(|p| p.name.as_str()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OperationView<'a> {
    operation: String,
    method: &'static str,
    path: &'a str,
}

impl<'a> From<&'a OperationBinding> for OperationView<'a> {
    fn from(binding: &'a OperationBinding) -> Self {
        let method = match binding.method {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        Self {
            operation: format!("{:?}", binding.operation),
            method,
            path: &binding.path,
        }
    }
}

/// A resource or data source page
#[derive(Debug, Serialize)]
struct EntryView<'a> {
    name: &'a str,
    description: Option<&'a str>,
    /// Properties the user sets
    arguments: Vec<&'a SchemaProperty>,
    /// Properties populated from the API
    attributes: Vec<&'a SchemaProperty>,
    operations: Vec<OperationView<'a>>,
}

impl<'a> EntryView<'a> {
    fn new(
        name: &'a str,
        description: Option<&'a str>,
        properties: &'a [SchemaProperty],
        operations: Vec<OperationView<'a>>,
    ) -> Self {
        let (attributes, arguments): (Vec<&SchemaProperty>, Vec<&SchemaProperty>) = properties
            .iter()
            .partition(|p| p.computed && !p.required);
        Self {
            name,
            description,
            arguments,
            attributes,
            operations,
        }
    }

    fn resource(name: &'a str, resource: &'a ResourceSchema) -> Self {
        let bindings = &resource.operations;
        let operations = [
            Some(&bindings.create),
            Some(&bindings.read),
            bindings.update.as_ref(),
            bindings.delete.as_ref(),
        ]
        .into_iter()
        .flatten()
        .map(OperationView::from)
        .collect();
        Self::new(
            name,
            resource.description.as_deref(),
            &resource.properties,
            operations,
        )
    }

    fn data_source(name: &'a str, data_source: &'a DataSourceSchema) -> Self {
        Self::new(
            name,
            data_source.description.as_deref(),
            &data_source.properties,
            vec![OperationView::from(&data_source.read)],
        )
    }
}

/// Documentation generator for one provider definition
pub struct DocsGenerator<'a> {
    provider_name: &'a str,
    provider: &'a ProviderDefinition,
    tera: Tera,
}

impl<'a> DocsGenerator<'a> {
    pub fn new(provider_name: &'a str, provider: &'a ProviderDefinition) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self {
            provider_name,
            provider,
            tera,
        })
    }

    /// Write every page below `output_dir`
    pub fn generate_to_directory(&self, output_dir: &Path) -> Result<()> {
        let resources_dir = output_dir.join("resources");
        let data_sources_dir = output_dir.join("data-sources");
        for dir in [output_dir, resources_dir.as_path(), data_sources_dir.as_path()] {
            fs::create_dir_all(dir).map_err(|e| {
                ProviderError::Documentation(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        write_page(&output_dir.join("index.md"), &self.render_index()?)?;

        for (name, resource) in &self.provider.resources {
            let page = self.render_resource(name.as_str(), resource)?;
            write_page(&resources_dir.join(format!("{}.md", name)), &page)?;
        }

        for (name, data_source) in &self.provider.data_sources {
            let page = self.render_data_source(name.as_str(), data_source)?;
            write_page(&data_sources_dir.join(format!("{}.md", name)), &page)?;
        }

        debug!(
            output = %output_dir.display(),
            resources = self.provider.resources.len(),
            data_sources = self.provider.data_sources.len(),
            "generated documentation"
        );
        Ok(())
    }

    pub fn render_index(&self) -> Result<String> {
        let mut context = self.create_context();
        let properties: Vec<PropertyView> = self
            .provider
            .configuration_schema
            .iter()
            .map(PropertyView::from)
            .collect();
        let resources: Vec<&str> = self.provider.resources.keys().map(|n| n.as_str()).collect();
        let data_sources: Vec<&str> = self
            .provider
            .data_sources
            .keys()
            .map(|n| n.as_str())
            .collect();
        let collisions: Vec<&str> = self
            .provider
            .collisions
            .iter()
            .map(|c| c.name.as_str())
            .collect();

        context.insert("properties", &properties);
        context.insert("resources", &resources);
        context.insert("data_sources", &data_sources);
        context.insert("collisions", &collisions);
        self.render("index.md", &context)
    }

    pub fn render_resource(&self, name: &str, resource: &ResourceSchema) -> Result<String> {
        let mut context = self.create_context();
        context.insert("entry", &EntryView::resource(name, resource));
        self.render("resource.md", &context)
    }

    pub fn render_data_source(&self, name: &str, data_source: &DataSourceSchema) -> Result<String> {
        let mut context = self.create_context();
        context.insert("entry", &EntryView::data_source(name, data_source));
        self.render("data_source.md", &context)
    }

    fn render(&self, template: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(template, context)
            .map_err(|e| ProviderError::Documentation(format!("Template error: {:?}", e)))
    }

    fn create_context(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("provider_name", self.provider_name);
        context
    }
}

fn write_page(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| {
        ProviderError::Documentation(format!("Failed to write {}: {}", path.display(), e))
    })
}
