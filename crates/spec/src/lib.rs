//! Spec model and service configuration loading
//!
//! This crate provides file-backed implementations of the collaborators the
//! assembly engine consumes:
//!
//! - [`SpecDocument`] implements `SpecModel` over an already-parsed API model
//!   stored as JSON or YAML
//! - [`ServiceConfigurationFile`] implements `ServiceConfiguration` over a YAML
//!   file of per-property defaults, optionally produced by running a command
//!
//! ## Usage
//! ```rust,ignore
//! use openapi_provider_spec::{ServiceConfigurationFile, SpecDocument};
//!
//! let spec = SpecDocument::from_file("acme.yaml")?;
//! let service_config = ServiceConfigurationFile::load("acme-config.yaml")?;
//! ```

mod document;
mod service_config;

pub use document::{
    SecuritySection, SpecDocument, SpecFormat,
};
pub use service_config::{
    ContentType, ExternalConfiguration, PropertyConfiguration, ServiceConfigurationFile,
};
