//! Warmer (group) level resolution
//!
//! Merges one raw warmer block with the built-in defaults: naming, schedule,
//! packaging, sizing, environment and the warmer's own baseline for its
//! targets.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::warn;

use super::alias;
use super::coerce;
use super::target::{resolve_block, TargetOverride};
use crate::config::DeploymentContext;

pub const DEFAULT_FOLDER_BASE: &str = ".warmup";
pub const DEFAULT_SCHEDULE: &str = "rate(5 minutes)";
pub const DEFAULT_MEMORY_SIZE: u32 = 128;
pub const DEFAULT_TIMEOUT_SECS: u32 = 10;
pub const DEFAULT_ARCHITECTURE: &str = "x86_64";

/// Entry point file written into each warmer folder
pub const HANDLER_FILE: &str = "warmup.json";

/// Defaults every warmer block is merged against
#[derive(Debug, Clone)]
pub struct BuiltinGroupDefaults {
    pub service: String,
    pub stage: String,
    pub folder_base: String,
    /// Keys of the provider-level environment
    pub provider_environment: Vec<String>,
    /// Service-level package patterns
    pub service_patterns: Vec<String>,
    pub target: TargetOverride,
}

impl BuiltinGroupDefaults {
    pub fn from_context(context: &DeploymentContext) -> Self {
        Self {
            service: context.service.clone(),
            stage: context.stage.clone(),
            folder_base: DEFAULT_FOLDER_BASE.to_string(),
            provider_environment: context.provider_environment.clone(),
            service_patterns: context.service_patterns.clone(),
            target: TargetOverride::default(),
        }
    }

    fn folder(&self, warmer: &str) -> String {
        format!("{}/{}", self.folder_base, warmer)
    }

    fn deployment_name(&self, warmer: &str) -> String {
        format!("{}-{}-warmup-plugin-{}", self.service, self.stage, warmer)
    }

    /// `!**` followed by every non-negated service pattern, negated
    ///
    /// Service patterns that are already negations are left out; negating
    /// them again would re-include paths.
    fn default_patterns(&self) -> Vec<String> {
        let mut patterns = vec!["!**".to_string()];
        patterns.extend(
            self.service_patterns
                .iter()
                .filter(|pattern| !pattern.starts_with('!'))
                .map(|pattern| format!("!{}", pattern)),
        );
        patterns
    }
}

/// Environment variable value of the warmer function
///
/// `Unset` clears a variable the provider would otherwise inject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Set(String),
    Unset,
}

/// One schedule trigger of the warmer function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTrigger {
    pub schedule: Schedule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schedule {
    Expression(String),
    Detailed(DetailedSchedule),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedSchedule {
    pub rate: Rates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rates {
    One(String),
    Many(Vec<String>),
}

impl ScheduleTrigger {
    pub fn expression(expression: impl Into<String>) -> Self {
        Self {
            schedule: Schedule::Expression(expression.into()),
        }
    }

    /// Every rate/cron expression of this trigger
    pub fn expressions(&self) -> Vec<&str> {
        match &self.schedule {
            Schedule::Expression(expression) => vec![expression.as_str()],
            Schedule::Detailed(detailed) => match &detailed.rate {
                Rates::One(expression) => vec![expression.as_str()],
                Rates::Many(expressions) => expressions.iter().map(String::as_str).collect(),
            },
        }
    }
}

/// Packaging hints for the warmer function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfig {
    pub individually: bool,
    pub patterns: Vec<String>,
}

/// Resolved warmer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    /// Warmer name (key under `custom.warmup`)
    pub name: String,
    /// Artifact folder
    pub folder_name: String,
    pub clean_folder: bool,
    /// Name of the deployed warmer function
    pub deployment_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<serde_json::Value>,
    pub events: Vec<ScheduleTrigger>,
    pub package: PackageConfig,
    pub memory_size: u32,
    pub timeout: u32,
    pub environment: BTreeMap<String, EnvValue>,
    pub tracing: bool,
    pub verbose: bool,
    pub architecture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_retention_in_days: Option<u32>,
    pub prewarm: bool,
    /// Baseline every target of this warmer inherits
    pub defaults: TargetOverride,
}

/// Resolve one warmer block
///
/// `raw` may be a mapping, a bare shorthand for `{ enabled: <raw> }` or
/// absent. Unknown fields are ignored.
pub fn resolve_group(
    raw: Option<&Value>,
    warmer: &str,
    builtins: &BuiltinGroupDefaults,
) -> GroupConfig {
    let block = match raw {
        Some(Value::Mapping(block)) => alias::normalize_group(block),
        Some(shorthand) if coerce::is_shorthand(shorthand) => {
            let mut block = Mapping::new();
            block.insert(Value::from("enabled"), shorthand.clone());
            block
        }
        _ => Mapping::new(),
    };

    let folder_name = coerce::merge(
        block.get("folderName"),
        coerce::as_string,
        builtins.folder(warmer),
    );

    GroupConfig {
        name: warmer.to_string(),
        clean_folder: coerce::merge(block.get("cleanFolder"), coerce::as_bool, true),
        deployment_name: coerce::merge(
            block.get("name"),
            coerce::as_string,
            builtins.deployment_name(warmer),
        ),
        role: block.get("role").and_then(opaque),
        tags: block.get("tags").and_then(opaque),
        vpc: block.get("vpc").and_then(resolve_vpc),
        events: resolve_events(block.get("events"), warmer),
        package: resolve_package(block.get("package"), &folder_name, builtins),
        memory_size: coerce::merge(
            block.get("memorySize"),
            coerce::as_positive_u32,
            DEFAULT_MEMORY_SIZE,
        ),
        timeout: coerce::merge(
            block.get("timeout"),
            coerce::as_positive_u32,
            DEFAULT_TIMEOUT_SECS,
        ),
        environment: resolve_environment(block.get("environment"), builtins, warmer),
        tracing: coerce::merge(block.get("tracing"), coerce::as_bool, false),
        verbose: coerce::merge(block.get("verbose"), coerce::as_bool, true),
        architecture: coerce::merge(
            block.get("architecture"),
            coerce::as_string,
            DEFAULT_ARCHITECTURE.to_string(),
        ),
        log_retention_in_days: block
            .get("logRetentionInDays")
            .and_then(coerce::as_positive_u32),
        prewarm: coerce::merge(block.get("prewarm"), coerce::as_bool, false),
        defaults: resolve_block(&block, &builtins.target),
        folder_name,
    }
}

fn opaque(value: &Value) -> Option<serde_json::Value> {
    match value {
        Value::Null => None,
        other => coerce::to_json(other),
    }
}

/// `false` means "outside any VPC", which is a concrete empty descriptor
fn resolve_vpc(value: &Value) -> Option<serde_json::Value> {
    match value {
        Value::Bool(false) => Some(serde_json::json!({
            "securityGroupIds": [],
            "subnetIds": [],
        })),
        Value::Mapping(_) => coerce::to_json(value),
        _ => None,
    }
}

fn resolve_events(raw: Option<&Value>, warmer: &str) -> Vec<ScheduleTrigger> {
    let parsed = raw
        .and_then(Value::as_sequence)
        .and_then(|events| {
            events
                .iter()
                .map(|event| serde_yaml::from_value::<ScheduleTrigger>(event.clone()).ok())
                .collect::<Option<Vec<_>>>()
        });

    let events = match parsed {
        Some(events) => events,
        None => {
            if raw.is_some() {
                warn!(
                    "Warmer {}: events must be a list of schedule triggers, using {}",
                    warmer, DEFAULT_SCHEDULE
                );
            }
            vec![ScheduleTrigger::expression(DEFAULT_SCHEDULE)]
        }
    };

    check_expressions(&events, warmer);
    events
}

static SCHEDULE_EXPRESSION: OnceLock<Regex> = OnceLock::new();

/// `rate(...)` or `cron(...)`
fn is_schedule_expression(expression: &str) -> bool {
    SCHEDULE_EXPRESSION
        .get_or_init(|| Regex::new(r"^(rate|cron)\(.+\)$").unwrap())
        .is_match(expression.trim())
}

fn check_expressions(events: &[ScheduleTrigger], warmer: &str) {
    for expression in events.iter().flat_map(ScheduleTrigger::expressions) {
        if !is_schedule_expression(expression) {
            warn!(
                "Warmer {}: schedule expression '{}' is neither rate(...) nor cron(...)",
                warmer, expression
            );
        }
    }
}

fn resolve_package(
    raw: Option<&Value>,
    folder_name: &str,
    builtins: &BuiltinGroupDefaults,
) -> PackageConfig {
    let (individually, patterns) = match raw.and_then(Value::as_mapping) {
        Some(package) => (
            coerce::merge(package.get("individually"), coerce::as_bool, true),
            alias::package_patterns(package).unwrap_or_else(|| builtins.default_patterns()),
        ),
        None => (true, builtins.default_patterns()),
    };

    PackageConfig {
        individually,
        patterns: with_folder_pattern(patterns, folder_name),
    }
}

/// Ensure the list holds the folder's own pattern exactly once
pub fn with_folder_pattern(patterns: Vec<String>, folder_name: &str) -> Vec<String> {
    let own = format!("{}/**", folder_name);
    let mut seen = false;
    let mut merged: Vec<String> = patterns
        .into_iter()
        .filter(|pattern| {
            if *pattern != own {
                return true;
            }
            !std::mem::replace(&mut seen, true)
        })
        .collect();

    if !seen {
        merged.push(own);
    }
    merged
}

fn resolve_environment(
    raw: Option<&Value>,
    builtins: &BuiltinGroupDefaults,
    warmer: &str,
) -> BTreeMap<String, EnvValue> {
    let mut environment: BTreeMap<String, EnvValue> = builtins
        .provider_environment
        .iter()
        .map(|key| (key.clone(), EnvValue::Unset))
        .collect();

    let Some(raw) = raw.and_then(Value::as_mapping) else {
        return environment;
    };

    for (key, value) in raw {
        let key = coerce::key_name(key);
        let value = match value {
            Value::Null => EnvValue::Unset,
            Value::String(s) => EnvValue::Set(s.clone()),
            Value::Bool(b) => EnvValue::Set(b.to_string()),
            Value::Number(n) => EnvValue::Set(n.to_string()),
            _ => {
                warn!(
                    "Warmer {}: environment variable {} must be a scalar, ignoring it",
                    warmer, key
                );
                continue;
            }
        };
        environment.insert(key, value);
    }

    environment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enabled::EnabledSpec;

    fn builtins() -> BuiltinGroupDefaults {
        BuiltinGroupDefaults {
            service: "shop".to_string(),
            stage: "dev".to_string(),
            folder_base: DEFAULT_FOLDER_BASE.to_string(),
            provider_environment: vec!["DB_URL".to_string(), "SECRET".to_string()],
            service_patterns: vec!["src/**".to_string(), "!tests/**".to_string()],
            target: TargetOverride::default(),
        }
    }

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_defaults() {
        let group = resolve_group(None, "default", &builtins());
        assert_eq!(group.folder_name, ".warmup/default");
        assert_eq!(group.deployment_name, "shop-dev-warmup-plugin-default");
        assert!(group.clean_folder);
        assert_eq!(group.memory_size, 128);
        assert_eq!(group.timeout, 10);
        assert_eq!(group.architecture, "x86_64");
        assert!(!group.tracing);
        assert!(group.verbose);
        assert!(!group.prewarm);
        assert_eq!(group.events, vec![ScheduleTrigger::expression("rate(5 minutes)")]);
        assert_eq!(group.defaults, TargetOverride::default());
        assert_eq!(group.vpc, None);
    }

    #[test]
    fn test_overrides() {
        let raw = yaml(
            r#"
enabled: true
folderName: build/warmer
name: custom-warmer
memorySize: 256
timeout: 20
concurrency: 3
prewarm: true
architecture: arm64
logRetentionInDays: 7
role: arn:aws:iam::1:role/warm
tags: {team: core}
"#,
        );
        let group = resolve_group(Some(&raw), "default", &builtins());
        assert_eq!(group.folder_name, "build/warmer");
        assert_eq!(group.deployment_name, "custom-warmer");
        assert_eq!(group.memory_size, 256);
        assert_eq!(group.timeout, 20);
        assert!(group.prewarm);
        assert_eq!(group.architecture, "arm64");
        assert_eq!(group.log_retention_in_days, Some(7));
        assert_eq!(group.defaults.enabled, EnabledSpec::Bool(true));
        assert_eq!(group.defaults.concurrency, 3);
        assert_eq!(group.role, Some(serde_json::json!("arn:aws:iam::1:role/warm")));
        assert_eq!(group.tags, Some(serde_json::json!({ "team": "core" })));
        assert!(group.package.patterns.contains(&"build/warmer/**".to_string()));
    }

    #[test]
    fn test_mistyped_sizes_fall_back() {
        let raw = yaml("{memorySize: big, timeout: 0, cleanFolder: 'no'}");
        let group = resolve_group(Some(&raw), "default", &builtins());
        assert_eq!(group.memory_size, DEFAULT_MEMORY_SIZE);
        assert_eq!(group.timeout, DEFAULT_TIMEOUT_SECS);
        assert!(group.clean_folder);
    }

    #[test]
    fn test_shorthand_group() {
        let group = resolve_group(Some(&yaml("prod")), "default", &builtins());
        assert_eq!(group.defaults.enabled, EnabledSpec::StageName("prod".to_string()));
    }

    #[test]
    fn test_legacy_schedule_forms() {
        let single = resolve_group(Some(&yaml("{schedule: 'rate(1 hour)'}")), "a", &builtins());
        assert_eq!(single.events, vec![ScheduleTrigger::expression("rate(1 hour)")]);

        let list = resolve_group(
            Some(&yaml("{schedule: ['rate(1 hour)', 'cron(0 8 * * ? *)']}")),
            "a",
            &builtins(),
        );
        assert_eq!(
            list.events,
            vec![
                ScheduleTrigger::expression("rate(1 hour)"),
                ScheduleTrigger::expression("cron(0 8 * * ? *)"),
            ]
        );
    }

    #[test]
    fn test_structured_events() {
        let raw = yaml(
            r#"
events:
  - schedule: rate(2 minutes)
  - schedule:
      rate: [rate(1 hour)]
      enabled: false
      input: {warm: true}
"#,
        );
        let group = resolve_group(Some(&raw), "a", &builtins());
        assert_eq!(group.events.len(), 2);
        assert_eq!(group.events[1].expressions(), vec!["rate(1 hour)"]);
        match &group.events[1].schedule {
            Schedule::Detailed(detailed) => {
                assert_eq!(detailed.enabled, Some(false));
                assert_eq!(detailed.input, Some(serde_json::json!({ "warm": true })));
            }
            other => panic!("expected detailed schedule, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_events_fall_back() {
        let group = resolve_group(Some(&yaml("{events: 'rate(1 hour)'}")), "a", &builtins());
        assert_eq!(group.events, vec![ScheduleTrigger::expression(DEFAULT_SCHEDULE)]);
    }

    #[test]
    fn test_default_patterns_skip_negated_service_patterns() {
        let group = resolve_group(None, "default", &builtins());
        assert_eq!(
            group.package.patterns,
            vec![
                "!**".to_string(),
                "!src/**".to_string(),
                ".warmup/default/**".to_string(),
            ]
        );
        assert!(group.package.individually);
    }

    #[test]
    fn test_folder_pattern_appended_once() {
        let raw = yaml("{package: {individually: false, patterns: ['.warmup/default/**', 'extra/**']}}");
        let group = resolve_group(Some(&raw), "default", &builtins());
        assert!(!group.package.individually);
        assert_eq!(
            group.package.patterns,
            vec![".warmup/default/**".to_string(), "extra/**".to_string()]
        );

        let again = with_folder_pattern(group.package.patterns.clone(), ".warmup/default");
        assert_eq!(again.len(), group.package.patterns.len());
    }

    #[test]
    fn test_folder_pattern_duplicates_collapse() {
        let patterns = vec![
            "a/**".to_string(),
            "f/**".to_string(),
            "f/**".to_string(),
        ];
        assert_eq!(
            with_folder_pattern(patterns, "f"),
            vec!["a/**".to_string(), "f/**".to_string()]
        );
    }

    #[test]
    fn test_environment_unsets_provider_keys() {
        let raw = yaml("{environment: {DB_URL: postgres://warm, SECRET: ~, PORT: 8080}}");
        let group = resolve_group(Some(&raw), "default", &builtins());
        assert_eq!(
            group.environment.get("DB_URL"),
            Some(&EnvValue::Set("postgres://warm".to_string()))
        );
        assert_eq!(group.environment.get("SECRET"), Some(&EnvValue::Unset));
        assert_eq!(
            group.environment.get("PORT"),
            Some(&EnvValue::Set("8080".to_string()))
        );

        let bare = resolve_group(None, "default", &builtins());
        assert_eq!(bare.environment.len(), 2);
        assert!(bare.environment.values().all(|v| *v == EnvValue::Unset));
    }

    #[test]
    fn test_vpc_false_is_empty_descriptor() {
        let group = resolve_group(Some(&yaml("{vpc: false}")), "default", &builtins());
        assert_eq!(
            group.vpc,
            Some(serde_json::json!({ "securityGroupIds": [], "subnetIds": [] }))
        );

        let group = resolve_group(
            Some(&yaml("{vpc: {securityGroupIds: [sg-1], subnetIds: [sn-1]}}")),
            "default",
            &builtins(),
        );
        assert_eq!(
            group.vpc,
            Some(serde_json::json!({ "securityGroupIds": ["sg-1"], "subnetIds": ["sn-1"] }))
        );
    }

    #[test]
    fn test_env_value_serializes_unset_as_null() {
        let mut environment = BTreeMap::new();
        environment.insert("A".to_string(), EnvValue::Set("1".to_string()));
        environment.insert("B".to_string(), EnvValue::Unset);
        let json = serde_json::to_string(&environment).unwrap();
        assert_eq!(json, r#"{"A":"1","B":null}"#);
    }

    #[test]
    fn test_schedule_expression_shapes() {
        assert!(is_schedule_expression("rate(5 minutes)"));
        assert!(is_schedule_expression(" cron(0 12 * * ? *) "));
        assert!(!is_schedule_expression("every 5 minutes"));
        assert!(!is_schedule_expression("rate()"));
        // Unusual expressions are kept, only warned about
        let group = resolve_group(Some(&yaml("{schedule: 'every 5 minutes'}")), "a", &builtins());
        assert_eq!(group.events, vec![ScheduleTrigger::expression("every 5 minutes")]);
    }
}
