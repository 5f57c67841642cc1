//! Template loading and filters

use openapi_provider_common::{ProviderError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("field_type", field_type_filter);

    let templates = [
        ("index.md", include_str!("../templates/index.md.tera")),
        ("resource.md", include_str!("../templates/resource.md.tera")),
        ("data_source.md", include_str!("../templates/data_source.md.tera")),
    ];
    for (name, content) in templates {
        tera.add_raw_template(name, content).map_err(|e| {
            ProviderError::Documentation(format!("Failed to load {} template: {}", name, e))
        })?;
    }

    Ok(tera)
}

/// Filter rendering a serialized FieldType for readers
fn field_type_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(display_type(value)?))
}

fn display_type(value: &Value) -> tera::Result<String> {
    match value {
        Value::String(name) => Ok(match name.as_str() {
            "string" => "String",
            "integer" | "float" => "Number",
            "boolean" => "Bool",
            _ => "String",
        }
        .to_string()),
        Value::Object(map) => {
            if let Some(inner) = map.get("list") {
                return Ok(format!("List of {}", display_type(inner)?));
            }
            if map.contains_key("object") {
                return Ok("Block".to_string());
            }
            Err(tera::Error::msg(format!(
                "field_type filter got an unknown type: {}",
                value
            )))
        }
        _ => Err(tera::Error::msg("field_type filter expects a field type")),
    }
}
