//! Stage enablement
//!
//! `enabled` may be a boolean, a single stage name or a list of stage names.
//! It is turned into an [`EnabledSpec`] once, at the boundary.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::coerce;

/// When a warmer (or one of its targets) is active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnabledSpec {
    /// Active or inactive regardless of stage
    Bool(bool),
    /// Active only on this stage
    StageName(String),
    /// Active on any of these stages
    StageList(Vec<String>),
}

impl EnabledSpec {
    /// Coerce a raw value, `None` when it has none of the accepted shapes
    pub fn from_raw(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(enabled) => Some(Self::Bool(*enabled)),
            Value::String(stage) => Some(Self::StageName(stage.clone())),
            Value::Sequence(_) => coerce::as_string_list(value).map(Self::StageList),
            _ => None,
        }
    }

    /// Evaluate against the current stage
    pub fn is_enabled(&self, stage: &str) -> bool {
        match self {
            Self::Bool(enabled) => *enabled,
            Self::StageName(name) => name == stage,
            Self::StageList(stages) => stages.iter().any(|s| s == stage),
        }
    }
}

impl Default for EnabledSpec {
    fn default() -> Self {
        Self::Bool(false)
    }
}

/// Free-function form of [`EnabledSpec::is_enabled`]
pub fn is_enabled(spec: &EnabledSpec, stage: &str) -> bool {
    spec.is_enabled(stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_ignores_stage() {
        for stage in ["dev", "prod", ""] {
            assert!(is_enabled(&EnabledSpec::Bool(true), stage));
            assert!(!is_enabled(&EnabledSpec::Bool(false), stage));
        }
    }

    #[test]
    fn test_stage_name() {
        let spec = EnabledSpec::StageName("dev".to_string());
        assert!(is_enabled(&spec, "dev"));
        assert!(!is_enabled(&spec, "prod"));
    }

    #[test]
    fn test_stage_list() {
        let spec = EnabledSpec::StageList(vec!["a".to_string(), "b".to_string()]);
        assert!(is_enabled(&spec, "b"));
        assert!(!is_enabled(&spec, "c"));
        assert!(!is_enabled(&EnabledSpec::StageList(vec![]), "a"));
    }

    #[test]
    fn test_from_raw_shapes() {
        let raw: Value = serde_yaml::from_str("[dev, staging]").unwrap();
        assert_eq!(
            EnabledSpec::from_raw(&raw),
            Some(EnabledSpec::StageList(vec![
                "dev".to_string(),
                "staging".to_string()
            ]))
        );
        assert_eq!(
            EnabledSpec::from_raw(&Value::from("prod")),
            Some(EnabledSpec::StageName("prod".to_string()))
        );
        assert_eq!(
            EnabledSpec::from_raw(&Value::Bool(true)),
            Some(EnabledSpec::Bool(true))
        );
        assert_eq!(EnabledSpec::from_raw(&Value::from(1)), None);
        let mixed: Value = serde_yaml::from_str("[dev, 2]").unwrap();
        assert_eq!(EnabledSpec::from_raw(&mixed), None);
    }
}
