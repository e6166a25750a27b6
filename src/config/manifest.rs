//! Service manifest (`serverless.yml`) sections read by warmup.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::warn;

use super::context::{resolve_setting, DeploymentContext, FALLBACK_REGION, FALLBACK_STAGE};
use crate::domain::cascade::TargetDeclaration;
use crate::domain::coerce;

/// Service name, either `service: shop` or the older `service: { name: shop }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceName {
    Name(String),
    Detailed { name: String },
}

impl ServiceName {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Name(name) | Self::Detailed { name } => name,
        }
    }
}

/// Provider section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSection {
    #[serde(default)]
    pub stage: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    /// Environment injected into every function of the service
    #[serde(default)]
    pub environment: Mapping,
}

/// Service-wide `defaults` section of older manifests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyDefaults {
    #[serde(default)]
    pub stage: Option<String>,

    #[serde(default)]
    pub region: Option<String>,
}

/// Service-level packaging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageSection {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// The parts of the service manifest warmup reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceManifest {
    pub service: ServiceName,

    #[serde(default)]
    pub provider: ProviderSection,

    #[serde(default)]
    pub defaults: Option<LegacyDefaults>,

    #[serde(default)]
    pub package: Option<PackageSection>,

    /// Plugin sections; warmers live under `custom.warmup`
    #[serde(default)]
    pub custom: Mapping,

    /// Function declarations in manifest order
    #[serde(default)]
    pub functions: Mapping,
}

impl ServiceManifest {
    /// Raw `custom.warmup` section
    pub fn warmup_section(&self) -> Option<&Value> {
        self.custom.get("warmup")
    }

    /// Resolve stage and region and collect the inputs resolution needs
    pub fn context(&self, stage: Option<&str>, region: Option<&str>) -> DeploymentContext {
        let defaults = self.defaults.clone().unwrap_or_default();

        let stage = resolve_setting(
            stage,
            self.provider.stage.as_deref(),
            defaults.stage.as_deref(),
            FALLBACK_STAGE,
        );
        let region = resolve_setting(
            region,
            self.provider.region.as_deref(),
            defaults.region.as_deref(),
            FALLBACK_REGION,
        );

        let provider_environment = self
            .provider
            .environment
            .keys()
            .map(coerce::key_name)
            .collect();
        let service_patterns = self
            .package
            .as_ref()
            .map(|package| package.patterns.clone())
            .unwrap_or_default();

        DeploymentContext::new(self.service.as_str(), stage, region)
            .with_provider_environment(provider_environment)
            .with_service_patterns(service_patterns)
    }

    /// Target functions in declaration order
    ///
    /// The deployed name is `functions.<key>.name`, or
    /// `<service>-<stage>-<key>` when not set.
    pub fn targets(&self, stage: &str) -> Vec<TargetDeclaration> {
        self.functions
            .iter()
            .map(|(key, function)| {
                let key = coerce::key_name(key);
                let declared = function.as_mapping();
                let name = declared
                    .and_then(|f| f.get("name"))
                    .and_then(coerce::as_string)
                    .unwrap_or_else(|| format!("{}-{}-{}", self.service.as_str(), stage, key));
                if function.as_mapping().is_none() && !function.is_null() {
                    warn!("Function {} is not a mapping, no warmup settings read", key);
                }
                TargetDeclaration {
                    key,
                    name,
                    warmup: declared.and_then(|f| f.get("warmup")).cloned(),
                }
            })
            .collect()
    }
}
