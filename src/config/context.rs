//! Deployment context handed to resolution.

pub const FALLBACK_STAGE: &str = "dev";
pub const FALLBACK_REGION: &str = "us-east-1";

/// Already-resolved facts about the deployment a resolution pass runs for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentContext {
    /// Service name (e.g., "shop")
    pub service: String,
    /// Deployment stage (e.g., "dev", "prod")
    pub stage: String,
    /// Provider region (e.g., "us-east-1")
    pub region: String,
    /// Keys of the provider-level environment
    pub provider_environment: Vec<String>,
    /// Service-level package patterns
    pub service_patterns: Vec<String>,
}

impl DeploymentContext {
    /// Create a new context with no provider environment or patterns
    pub fn new(
        service: impl Into<String>,
        stage: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            stage: stage.into(),
            region: region.into(),
            provider_environment: Vec::new(),
            service_patterns: Vec::new(),
        }
    }

    /// Builder: set provider environment keys
    pub fn with_provider_environment(mut self, keys: Vec<String>) -> Self {
        self.provider_environment = keys;
        self
    }

    /// Builder: set service-level package patterns
    pub fn with_service_patterns(mut self, patterns: Vec<String>) -> Self {
        self.service_patterns = patterns;
        self
    }
}

/// Pick the first setting present
///
/// Priority: explicit option > provider setting > service `defaults` > fallback
pub fn resolve_setting(
    option: Option<&str>,
    provider: Option<&str>,
    defaults: Option<&str>,
    fallback: &str,
) -> String {
    [option, provider, defaults]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
