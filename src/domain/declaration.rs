//! Deployable-unit declaration of a warmer function
//!
//! Describes the function the deployment pipeline creates for each active
//! warmer. Pure data; writing it anywhere is up to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cascade::ResolvedWarmer;
use super::group::{EnvValue, PackageConfig, ScheduleTrigger, HANDLER_FILE};

/// IAM statement granting the warmer permission to invoke its targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamStatement {
    pub effect: String,
    pub action: Vec<String>,
    pub resource: Vec<String>,
}

impl IamStatement {
    /// `lambda:InvokeFunction` on every target, qualified or not
    pub fn invoke_targets<'a>(region: &str, targets: impl IntoIterator<Item = &'a str>) -> Self {
        let resource = targets
            .into_iter()
            .flat_map(|name| {
                let arn = format!("arn:aws:lambda:{}:*:function:{}", region, name);
                [arn.clone(), format!("{}:*", arn)]
            })
            .collect();

        Self {
            effect: "Allow".to_string(),
            action: vec!["lambda:InvokeFunction".to_string()],
            resource,
        }
    }
}

/// Function declaration for one warmer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    pub handler: String,
    pub description: String,
    pub events: Vec<ScheduleTrigger>,
    pub memory_size: u32,
    pub timeout: u32,
    pub environment: BTreeMap<String, EnvValue>,
    pub package: PackageConfig,
    pub tracing: bool,
    pub architecture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<serde_json::Value>,
    /// Present only when no role is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_statement: Option<IamStatement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_retention_in_days: Option<u32>,
}

impl FunctionDeclaration {
    pub fn for_warmer(warmer: &ResolvedWarmer, region: &str) -> Self {
        let config = &warmer.config;
        let iam_statement = match config.role {
            Some(_) => None,
            None => Some(IamStatement::invoke_targets(
                region,
                warmer.targets.iter().map(|t| t.name.as_str()),
            )),
        };

        Self {
            name: config.deployment_name.clone(),
            handler: format!("{}/{}", config.folder_name, HANDLER_FILE),
            description: format!("Warmer {} keeping functions warm", config.name),
            events: config.events.clone(),
            memory_size: config.memory_size,
            timeout: config.timeout,
            environment: config.environment.clone(),
            package: config.package.clone(),
            tracing: config.tracing,
            architecture: config.architecture.clone(),
            role: config.role.clone(),
            iam_statement,
            tags: config.tags.clone(),
            vpc: config.vpc.clone(),
            log_retention_in_days: config.log_retention_in_days,
        }
    }
}
