//! Configure-time assembly: user values to client context and client

use crate::provider::ConfigureFunc;
use crate::schema::PROVIDER_PROPERTY_REGION;
use indexmap::IndexMap;
use openapi_provider_common::naming::to_compliant_name;
use openapi_provider_common::{
    ApiKeyLocation, BackendConfiguration, ConfigurationSchema, ConfigurationValues,
    HeaderParameter, ProviderError, Result, SecurityDefinition, SpecModel,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Configured secret of one security scheme and where it travels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityContext {
    pub location: ApiKeyLocation,
    /// Header or query parameter name on the wire
    pub key_name: String,
    pub value: Option<String>,
}

/// Values the HTTP client needs, resolved from user configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientContext {
    pub region: Option<String>,
    /// Header values keyed by the literal wire header name
    pub headers: IndexMap<String, String>,
    /// Security contexts keyed by canonical scheme name
    pub security: IndexMap<String, SecurityContext>,
    /// Host overrides keyed by derived resource name
    pub endpoints: IndexMap<String, String>,
}

/// Credentials to attach to one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

/// Applies API keys of the global security schemes, or of an operation's
/// own schemes when it declares any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiAuthenticator {
    global_schemes: Vec<String>,
}

impl ApiAuthenticator {
    pub fn new(global_schemes: Vec<String>) -> Self {
        Self { global_schemes }
    }

    pub fn global_schemes(&self) -> &[String] {
        &self.global_schemes
    }

    pub fn authenticate(
        &self,
        context: &ClientContext,
        operation_schemes: &[String],
    ) -> Result<Credentials> {
        let schemes = if operation_schemes.is_empty() {
            &self.global_schemes
        } else {
            operation_schemes
        };

        let mut credentials = Credentials::default();
        for scheme in schemes {
            let security = context
                .security
                .get(scheme)
                .ok_or_else(|| ProviderError::MissingRequiredValue(scheme.clone()))?;
            let value = security
                .value
                .clone()
                .ok_or_else(|| ProviderError::MissingRequiredValue(scheme.clone()))?;

            let pair = (security.key_name.clone(), value);
            match security.location {
                ApiKeyLocation::Header => credentials.headers.push(pair),
                ApiKeyLocation::Query => credentials.query.push(pair),
            }
        }
        Ok(credentials)
    }
}

/// Client handed to the CRUD executor by the configuration callback
#[derive(Debug, Clone)]
pub struct ProviderClient {
    backend: BackendConfiguration,
    authenticator: ApiAuthenticator,
    http: reqwest::Client,
    context: ClientContext,
}

impl ProviderClient {
    pub fn backend(&self) -> &BackendConfiguration {
        &self.backend
    }

    pub fn authenticator(&self) -> &ApiAuthenticator {
        &self.authenticator
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// Endpoint override for the resource, or the backend host resolved
    /// with the configured region
    pub fn resource_host(&self, resource: &str) -> String {
        match self.context.endpoints.get(resource) {
            Some(host) => host.clone(),
            None => self.backend.resolve_host(self.context.region.as_deref()),
        }
    }

    /// Absolute URL of a path on the resource's host
    pub fn resource_url(&self, resource: &str, path: &str) -> String {
        let scheme = self
            .backend
            .schemes
            .first()
            .map(String::as_str)
            .unwrap_or("https");
        format!(
            "{}://{}{}{}",
            scheme,
            self.resource_host(resource),
            self.backend.base_path.trim_end_matches('/'),
            path
        )
    }
}

/// Routes user configuration values into a [`ClientContext`]
///
/// Everything it needs from the spec model is captured on construction, so
/// configuring a client never fails.
#[derive(Debug, Clone)]
pub struct ConfigurationAssembler {
    backend: BackendConfiguration,
    schema: ConfigurationSchema,
    security_definitions: Vec<SecurityDefinition>,
    headers: Vec<HeaderParameter>,
    global_schemes: Vec<String>,
    http: reqwest::Client,
}

impl ConfigurationAssembler {
    pub fn from_spec(
        spec: &dyn SpecModel,
        backend: BackendConfiguration,
        schema: ConfigurationSchema,
    ) -> Result<Self> {
        let global_schemes = spec
            .global_security_schemes()?
            .iter()
            .map(|scheme| to_compliant_name(scheme))
            .collect();
        let security_definitions = spec.api_key_security_definitions()?;
        let headers = spec.header_parameters()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("openapi-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::HttpClient(e.to_string()))?;

        Ok(Self {
            backend,
            schema,
            security_definitions,
            headers,
            global_schemes,
            http,
        })
    }

    /// Value of a property: the user's, else the default the host tool
    /// would apply
    fn value_of(&self, values: &ConfigurationValues, name: &str) -> Option<String> {
        values.get(name).map(str::to_string).or_else(|| {
            self.schema
                .get(name)
                .and_then(|property| property.resolve_default())
        })
    }

    pub fn client_context(&self, values: &ConfigurationValues) -> ClientContext {
        let mut context = ClientContext::default();

        if self.schema.contains(PROVIDER_PROPERTY_REGION) {
            context.region = self.value_of(values, PROVIDER_PROPERTY_REGION);
        }

        for definition in &self.security_definitions {
            let name = definition.configuration_name();
            let value = self.value_of(values, &name);
            context.security.insert(
                name,
                SecurityContext {
                    location: definition.location,
                    key_name: definition.key_name.clone(),
                    value,
                },
            );
        }

        for header in &self.headers {
            if let Some(value) = self.value_of(values, &header.configuration_name()) {
                context.headers.insert(header.name.clone(), value);
            }
        }

        for (resource, override_host) in &values.endpoints {
            if !self.schema.accepts_endpoint(resource) {
                debug!(resource = %resource, "ignoring endpoint override for unregistered resource");
            } else if override_host.is_empty() {
                debug!(resource = %resource, "ignoring empty endpoint override");
            } else {
                context
                    .endpoints
                    .insert(resource.clone(), override_host.clone());
            }
        }

        context
    }

    pub fn configure(&self, values: &ConfigurationValues) -> ProviderClient {
        let context = self.client_context(values);
        debug!(
            region = ?context.region,
            headers = context.headers.len(),
            security = context.security.len(),
            endpoints = context.endpoints.len(),
            "configured provider client"
        );
        ProviderClient {
            backend: self.backend.clone(),
            authenticator: ApiAuthenticator::new(self.global_schemes.clone()),
            http: self.http.clone(),
            context,
        }
    }

    pub fn into_callback(self) -> ConfigureFunc {
        Arc::new(move |values: &ConfigurationValues| self.configure(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PROVIDER_PROPERTY_ENDPOINTS;
    use crate::testing::MockSpec;
    use openapi_provider_common::{ConfigurationProperty, DefaultSource};

    fn api_key(name: &str, location: ApiKeyLocation, key_name: &str) -> SecurityDefinition {
        SecurityDefinition {
            name: name.to_string(),
            location,
            key_name: key_name.to_string(),
        }
    }

    fn assembler(backend: BackendConfiguration, schema: ConfigurationSchema) -> ConfigurationAssembler {
        let mut spec = MockSpec::new();
        spec.expect_global_security_schemes()
            .returning(|| Ok(vec!["apiKeyAuth".to_string()]));
        spec.expect_api_key_security_definitions().returning(|| {
            Ok(vec![
                api_key("apiKeyAuth", ApiKeyLocation::Header, "Authorization"),
                api_key("queryKey", ApiKeyLocation::Query, "key"),
            ])
        });
        spec.expect_header_parameters().returning(|| {
            Ok(vec![HeaderParameter {
                name: "X-Request-ID".to_string(),
                preferred_name: Some("request_id".to_string()),
            }])
        });
        ConfigurationAssembler::from_spec(&spec, backend, schema).unwrap()
    }

    #[test]
    fn test_client_context_reads_canonical_names() {
        let assembler = assembler(
            BackendConfiguration::new("api.example.com"),
            ConfigurationSchema::new(),
        );
        let values = ConfigurationValues::new()
            .with_value("api_key_auth", "secret")
            .with_value("apiKeyAuth", "wrong")
            .with_value("request_id", "abc");

        let context = assembler.client_context(&values);

        let security = &context.security["api_key_auth"];
        assert_eq!(security.value.as_deref(), Some("secret"));
        assert_eq!(security.location, ApiKeyLocation::Header);
        assert_eq!(security.key_name, "Authorization");
        assert_eq!(context.security["query_key"].value, None);

        assert_eq!(context.headers.get("X-Request-ID").map(String::as_str), Some("abc"));
        assert!(!context.headers.contains_key("request_id"));
    }

    #[test]
    fn test_region_defaults_from_schema() {
        let mut schema = ConfigurationSchema::new();
        schema.insert(
            ConfigurationProperty::string(PROVIDER_PROPERTY_REGION, true)
                .with_default("us", DefaultSource::Static),
        );
        let backend = BackendConfiguration::new("svc.${region}.example.com")
            .with_regions(vec!["us".to_string(), "eu".to_string()]);
        let assembler = assembler(backend, schema);

        let client = assembler.configure(&ConfigurationValues::new());
        assert_eq!(client.context().region.as_deref(), Some("us"));
        assert_eq!(client.resource_host("widgets_v1"), "svc.us.example.com");

        let client = assembler.configure(&ConfigurationValues::new().with_value("region", "eu"));
        assert_eq!(client.resource_host("widgets_v1"), "svc.eu.example.com");
    }

    fn endpoints_schema(resources: &[&str]) -> ConfigurationSchema {
        let mut schema = ConfigurationSchema::new();
        schema.insert(ConfigurationProperty::block(
            PROVIDER_PROPERTY_ENDPOINTS,
            resources
                .iter()
                .map(|name| ConfigurationProperty::string(*name, false))
                .collect(),
        ));
        schema
    }

    #[test]
    fn test_endpoint_override() {
        let assembler = assembler(
            BackendConfiguration::new("api.example.com"),
            endpoints_schema(&["widgets_v1", "gadgets_v1"]),
        );
        let values = ConfigurationValues::new()
            .with_endpoint("widgets_v1", "staging.example.com")
            .with_endpoint("gadgets_v1", "");

        let client = assembler.configure(&values);
        assert_eq!(client.resource_host("widgets_v1"), "staging.example.com");
        assert_eq!(client.resource_host("gadgets_v1"), "api.example.com");
        assert!(!client.context().endpoints.contains_key("gadgets_v1"));
        assert_eq!(
            client.resource_url("widgets_v1", "/v1/widgets"),
            "https://staging.example.com/v1/widgets"
        );
    }

    #[test]
    fn test_endpoint_override_for_unregistered_resource_is_dropped() {
        let assembler = assembler(
            BackendConfiguration::new("api.example.com"),
            endpoints_schema(&["widgets_v1"]),
        );
        let values = ConfigurationValues::new()
            .with_endpoint("widgets_v1", "staging.example.com")
            .with_endpoint("unknown_v1", "unknown.example.com");

        let context = assembler.client_context(&values);
        assert_eq!(context.endpoints.len(), 1);
        assert!(!context.endpoints.contains_key("unknown_v1"));
    }

    #[test]
    fn test_authenticate_with_global_schemes() {
        let assembler = assembler(
            BackendConfiguration::new("api.example.com"),
            ConfigurationSchema::new(),
        );
        let client = assembler.configure(
            &ConfigurationValues::new()
                .with_value("api_key_auth", "secret")
                .with_value("query_key", "q"),
        );

        let credentials = client
            .authenticator()
            .authenticate(client.context(), &[])
            .unwrap();
        assert_eq!(
            credentials.headers,
            vec![("Authorization".to_string(), "secret".to_string())]
        );
        assert!(credentials.query.is_empty());

        let credentials = client
            .authenticator()
            .authenticate(client.context(), &["query_key".to_string()])
            .unwrap();
        assert_eq!(credentials.query, vec![("key".to_string(), "q".to_string())]);
    }

    #[test]
    fn test_authenticate_without_value() {
        let assembler = assembler(
            BackendConfiguration::new("api.example.com"),
            ConfigurationSchema::new(),
        );
        let client = assembler.configure(&ConfigurationValues::new());

        let err = client
            .authenticator()
            .authenticate(client.context(), &[])
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingRequiredValue(name) if name == "api_key_auth"));
    }

    #[test]
    fn test_callback_builds_independent_clients() {
        let callback = assembler(
            BackendConfiguration::new("api.example.com"),
            ConfigurationSchema::new(),
        )
        .into_callback();

        let first = callback(&ConfigurationValues::new().with_value("api_key_auth", "one"));
        let second = callback(&ConfigurationValues::new().with_value("api_key_auth", "two"));
        assert_eq!(
            first.context().security["api_key_auth"].value.as_deref(),
            Some("one")
        );
        assert_eq!(
            second.context().security["api_key_auth"].value.as_deref(),
            Some("two")
        );
    }
}
