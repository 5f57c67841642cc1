//! Collaborator doubles shared by the engine unit tests

use mockall::mock;
use openapi_provider_common::{
    BackendConfiguration, HeaderParameter, PropertyDefault, ProviderError, ResourceDescriptor,
    Result, SecurityDefinition, ServiceConfiguration, SpecModel,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mock! {
    pub Spec {}
    impl SpecModel for Spec {
        fn backend_configuration(&self) -> Result<BackendConfiguration>;
        fn global_security_schemes(&self) -> Result<Vec<String>>;
        fn api_key_security_definitions(&self) -> Result<Vec<SecurityDefinition>>;
        fn header_parameters(&self) -> Result<Vec<HeaderParameter>>;
        fn resources(&self) -> Result<Vec<ResourceDescriptor>>;
        fn data_sources(&self) -> Result<Vec<ResourceDescriptor>>;
    }
}

/// Property default that records whether its command ran
pub struct StubDefault {
    value: String,
    command: bool,
    fail_command: bool,
    executed: AtomicBool,
}

impl PropertyDefault for StubDefault {
    fn has_command(&self) -> bool {
        self.command
    }

    fn execute_command(&self) -> Result<()> {
        self.executed.store(true, Ordering::SeqCst);
        if self.fail_command {
            return Err(ProviderError::ServiceConfiguration(
                "some error executing the command".to_string(),
            ));
        }
        Ok(())
    }

    fn default_value(&self) -> Result<String> {
        Ok(self.value.clone())
    }
}

#[derive(Default)]
pub struct StubServiceConfiguration {
    defaults: HashMap<String, Arc<StubDefault>>,
}

impl StubServiceConfiguration {
    pub fn with(mut self, name: &str, value: &str, command: bool, fail_command: bool) -> Self {
        self.defaults.insert(
            name.to_string(),
            Arc::new(StubDefault {
                value: value.to_string(),
                command,
                fail_command,
                executed: AtomicBool::new(false),
            }),
        );
        self
    }

    pub fn executed(&self, name: &str) -> bool {
        self.defaults
            .get(name)
            .is_some_and(|d| d.executed.load(Ordering::SeqCst))
    }
}

impl ServiceConfiguration for StubServiceConfiguration {
    fn property_default(&self, property_name: &str) -> Option<Arc<dyn PropertyDefault>> {
        self.defaults
            .get(property_name)
            .map(|d| d.clone() as Arc<dyn PropertyDefault>)
    }
}

/// Spec model with a single-region backend and no security or headers
pub fn plain_spec(
    resources: Vec<ResourceDescriptor>,
    data_sources: Vec<ResourceDescriptor>,
) -> MockSpec {
    let mut spec = MockSpec::new();
    spec.expect_backend_configuration()
        .returning(|| Ok(BackendConfiguration::new("api.example.com")));
    spec.expect_global_security_schemes()
        .returning(|| Ok(Vec::new()));
    spec.expect_api_key_security_definitions()
        .returning(|| Ok(Vec::new()));
    spec.expect_header_parameters().returning(|| Ok(Vec::new()));
    spec.expect_resources()
        .returning(move || Ok(resources.clone()));
    spec.expect_data_sources()
        .returning(move || Ok(data_sources.clone()));
    spec
}
