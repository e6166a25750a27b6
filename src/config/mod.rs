//! # Warmup Configuration
//!
//! Loads the service manifest and resolves the deployment context.
//!
//! ## Levels
//!
//! 1. **Built-in defaults** (`domain::group`, `domain::target`)
//! 2. **Warmer** (`custom.warmup.<warmer>` in the service manifest)
//! 3. **Function** (`functions.<function>.warmup.<warmer>`)
//!
//! Stage and region resolve as: CLI option > `provider` > `defaults` >
//! `dev` / `us-east-1`.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let manifest = load_manifest(Path::new("serverless.yml"))?;
//! let context = manifest.context(Some("prod"), None);
//! let targets = manifest.targets(&context.stage);
//! ```

mod context;
mod manifest;

pub use context::DeploymentContext;

use anyhow::{Context, Result};
use std::path::Path;

use crate::error::ConfigError;
use manifest::ServiceManifest;

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "serverless.yml";

/// Load and parse a service manifest
///
/// # Errors
/// Returns error if the file is missing, unreadable or not valid YAML
pub fn load_manifest(path: &Path) -> Result<ServiceManifest> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read service manifest: {}\n  Ensure the file is readable.",
            path.display()
        )
    })?;

    parse_manifest(&content).with_context(|| {
        format!(
            "Failed to parse service manifest: {}\n  Check YAML syntax. Common issues:\n  \
             - Incorrect indentation\n  \
             - Missing quotes around strings with special characters\n  \
             - Missing top-level `service:` field",
            path.display()
        )
    })
}

/// Parse manifest content
pub fn parse_manifest(content: &str) -> Result<ServiceManifest, ConfigError> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_manifest_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "service: shop\ncustom:\n  warmup: true").unwrap();

        let manifest = load_manifest(file.path()).unwrap();
        assert_eq!(manifest.service.as_str(), "shop");
        assert_eq!(
            manifest.warmup_section(),
            Some(&serde_yaml::Value::Bool(true))
        );
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(&dir.path().join("serverless.yml")).unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(config_err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_manifest("provider: {stage: dev}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
