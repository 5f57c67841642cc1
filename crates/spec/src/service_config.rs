//! Service configuration loading from YAML files
//!
//! A service configuration supplies default values for provider
//! configuration properties. A default may be static, read from an external
//! file, or produced by a command that runs before the default is read.

use openapi_provider_common::{
    PropertyDefault, ProviderError, Result, ServiceConfiguration,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::debug;

/// Root structure of a service configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceConfigurationFile {
    /// Per-property default configuration
    #[serde(default)]
    pub schema_configuration: Vec<PropertyConfiguration>,
}

/// Default value configuration for one provider property
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PropertyConfiguration {
    /// Canonical property name (e.g., "api_key_auth")
    pub schema_property_name: String,

    /// Static default, used when no external configuration is set
    #[serde(default)]
    pub default_value: Option<String>,

    /// Command executed before the default is read
    /// Format: ["program", "arg1", "arg2"]
    #[serde(default)]
    pub cmd: Vec<String>,

    /// File the default is read from
    #[serde(default)]
    pub external_configuration: Option<ExternalConfiguration>,
}

/// Default value stored in a file, typically written by `cmd`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExternalConfiguration {
    pub file: PathBuf,

    /// JSON pointer to the value when the content type is json
    #[serde(default)]
    pub key_name: String,

    #[serde(default)]
    pub content_type: ContentType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Raw,
    Json,
}

impl ServiceConfigurationFile {
    /// Load a service configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ProviderError::Parse(format!(
                "Failed to read service configuration file {:?}: {}",
                path, e
            ))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            ProviderError::Parse(format!(
                "Failed to parse service configuration YAML from {:?}: {}",
                path, e
            ))
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn property(&self, property_name: &str) -> Option<&PropertyConfiguration> {
        self.schema_configuration
            .iter()
            .find(|p| p.schema_property_name == property_name)
    }
}

impl ServiceConfiguration for ServiceConfigurationFile {
    fn property_default(&self, property_name: &str) -> Option<Arc<dyn PropertyDefault>> {
        self.property(property_name)
            .cloned()
            .map(|p| Arc::new(p) as Arc<dyn PropertyDefault>)
    }
}

impl PropertyConfiguration {
    fn command_error(&self, message: impl Into<String>) -> ProviderError {
        ProviderError::Command {
            property: self.schema_property_name.clone(),
            command: self.cmd.clone(),
            message: message.into(),
        }
    }
}

impl PropertyDefault for PropertyConfiguration {
    fn has_command(&self) -> bool {
        !self.cmd.is_empty()
    }

    fn execute_command(&self) -> Result<()> {
        let Some((program, args)) = self.cmd.split_first() else {
            return Ok(());
        };

        debug!(property = %self.schema_property_name, command = ?self.cmd, "executing default value command");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| self.command_error(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.command_error(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn default_value(&self) -> Result<String> {
        let Some(external) = &self.external_configuration else {
            return Ok(self.default_value.clone().unwrap_or_default());
        };

        let content = fs::read_to_string(&external.file).map_err(|e| {
            ProviderError::ServiceConfiguration(format!(
                "failed to read external configuration {:?} for property '{}': {}",
                external.file, self.schema_property_name, e
            ))
        })?;

        match external.content_type {
            ContentType::Raw => Ok(content.trim().to_string()),
            ContentType::Json => {
                let document: serde_json::Value = serde_json::from_str(&content)?;
                let value = document.pointer(&external.key_name).ok_or_else(|| {
                    ProviderError::ServiceConfiguration(format!(
                        "key '{}' not found in external configuration {:?} for property '{}'",
                        external.key_name, external.file, self.schema_property_name
                    ))
                })?;
                Ok(match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
            }
        }
    }
}
