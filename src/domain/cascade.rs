//! Cascade orchestration
//!
//! Resolves every declared warmer, validates that targets only reference
//! declared warmers, resolves each (target, warmer) pair against the warmer's
//! baseline and keeps the pairs enabled for the current stage.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use super::coerce;
use super::enabled::is_enabled;
use super::group::{resolve_group, BuiltinGroupDefaults, GroupConfig};
use super::target::{resolve_target, TargetOverride};
use crate::config::DeploymentContext;
use crate::error::ConfigError;

/// Name of the implicit warmer a bare shorthand declares
pub const DEFAULT_WARMER: &str = "default";

/// A target function as declared by the service
#[derive(Debug, Clone, PartialEq)]
pub struct TargetDeclaration {
    /// Key under `functions`
    pub key: String,
    /// Deployed function name, used for the remote call
    pub name: String,
    /// Raw `warmup` value of the function
    pub warmup: Option<Value>,
}

#[cfg(test)]
impl TargetDeclaration {
    pub fn new(name: impl Into<String>, warmup: Option<Value>) -> Self {
        let name = name.into();
        Self {
            key: name.clone(),
            name,
            warmup,
        }
    }
}

/// Resolved settings of one target for one warmer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    /// Deployed function name
    pub name: String,
    /// Warmer this entry belongs to
    pub warmer: String,
    pub config: TargetOverride,
}

/// One warmer with the targets it keeps warm, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWarmer {
    pub config: GroupConfig,
    pub targets: Vec<ResolvedTarget>,
}

impl ResolvedWarmer {
    /// No enabled target: nothing to generate or invoke
    pub fn is_inert(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Output of one resolution pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWarmers {
    pub stage: String,
    pub warmers: Vec<ResolvedWarmer>,
}

impl ResolvedWarmers {
    pub fn get(&self, warmer: &str) -> Option<&ResolvedWarmer> {
        self.warmers.iter().find(|w| w.config.name == warmer)
    }

    /// Target names of a warmer, empty when the warmer is unknown
    pub fn target_names(&self, warmer: &str) -> Vec<&str> {
        self.get(warmer)
            .map(|w| w.targets.iter().map(|t| t.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Warmers with at least one enabled target
    pub fn active(&self) -> impl Iterator<Item = &ResolvedWarmer> {
        self.warmers.iter().filter(|w| !w.is_inert())
    }
}

/// Declared warmers from the raw `custom.warmup` section, in order
///
/// A bare shorthand declares one warmer named `default`.
pub fn declared_warmers(raw: Option<&Value>) -> Vec<(String, Option<Value>)> {
    match raw {
        Some(Value::Mapping(warmers)) => warmers
            .iter()
            .map(|(name, block)| (coerce::key_name(name), Some(block.clone())))
            .collect(),
        Some(shorthand) if coerce::is_shorthand(shorthand) => {
            vec![(DEFAULT_WARMER.to_string(), Some(shorthand.clone()))]
        }
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            warn!("custom.warmup must be a mapping of warmers, no warmer declared");
            Vec::new()
        }
    }
}

/// Per-warmer overrides of one target
///
/// A bare shorthand applies to the `default` warmer.
fn target_overrides(target: &TargetDeclaration) -> Mapping {
    match &target.warmup {
        Some(Value::Mapping(overrides)) => overrides.clone(),
        Some(shorthand) if coerce::is_shorthand(shorthand) => {
            let mut overrides = Mapping::new();
            overrides.insert(Value::from(DEFAULT_WARMER), shorthand.clone());
            overrides
        }
        Some(Value::Null) | None => Mapping::new(),
        Some(_) => {
            warn!(
                "Function {}: warmup must be a mapping of warmers, ignoring it",
                target.name
            );
            Mapping::new()
        }
    }
}

/// Run one resolution pass
///
/// # Errors
/// - [`ConfigError::UnknownWarmers`] when a target references an undeclared
///   warmer
/// - [`ConfigError::DuplicateFolder`] / [`ConfigError::DuplicateDeploymentName`]
///   when two warmers resolve to the same folder or function name
pub fn resolve_all(
    raw_warmers: Option<&Value>,
    targets: &[TargetDeclaration],
    context: &DeploymentContext,
) -> Result<ResolvedWarmers, ConfigError> {
    let builtins = BuiltinGroupDefaults::from_context(context);

    let groups: Vec<GroupConfig> = declared_warmers(raw_warmers)
        .iter()
        .map(|(name, block)| resolve_group(block.as_ref(), name, &builtins))
        .collect();
    check_unique(&groups)?;

    let overrides: Vec<Mapping> = targets.iter().map(target_overrides).collect();
    for (target, overrides) in targets.iter().zip(&overrides) {
        let unknown: Vec<String> = overrides
            .keys()
            .map(coerce::key_name)
            .filter(|name| !groups.iter().any(|g| g.name == *name))
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::UnknownWarmers {
                function: target.key.clone(),
                warmers: unknown,
            });
        }
    }

    let warmers = groups
        .into_iter()
        .map(|group| {
            let targets: Vec<ResolvedTarget> = targets
                .iter()
                .zip(&overrides)
                .map(|(target, overrides)| ResolvedTarget {
                    name: target.name.clone(),
                    warmer: group.name.clone(),
                    config: resolve_target(overrides.get(group.name.as_str()), &group.defaults),
                })
                .filter(|resolved| is_enabled(&resolved.config.enabled, &context.stage))
                .collect();

            debug!(
                "Warmer {} resolved with {} enabled target(s) for stage {}",
                group.name,
                targets.len(),
                context.stage
            );
            ResolvedWarmer {
                config: group,
                targets,
            }
        })
        .collect();

    Ok(ResolvedWarmers {
        stage: context.stage.clone(),
        warmers,
    })
}

fn check_unique(groups: &[GroupConfig]) -> Result<(), ConfigError> {
    for (index, group) in groups.iter().enumerate() {
        for earlier in &groups[..index] {
            if earlier.folder_name == group.folder_name {
                return Err(ConfigError::DuplicateFolder {
                    first: earlier.name.clone(),
                    second: group.name.clone(),
                    folder: group.folder_name.clone(),
                });
            }
            if earlier.deployment_name == group.deployment_name {
                return Err(ConfigError::DuplicateDeploymentName {
                    first: earlier.name.clone(),
                    second: group.name.clone(),
                    name: group.deployment_name.clone(),
                });
            }
        }
    }
    Ok(())
}
