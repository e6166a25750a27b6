//! Command implementations
//!
//! Every command starts from the same [`Workspace`]: the loaded manifest,
//! its deployment context and the resolved warmers.

pub mod clean;
pub mod invoke;
pub mod package;
pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::{ManifestArgs, OutputFormat};
use crate::config::{load_manifest, DeploymentContext};
use crate::domain::{resolve_all, ResolvedWarmers};

/// Manifest resolved for one stage and region
pub struct Workspace {
    /// Directory warmer folders are relative to
    pub root: PathBuf,
    pub context: DeploymentContext,
    pub warmers: ResolvedWarmers,
}

impl Workspace {
    pub fn load(args: &ManifestArgs) -> Result<Self> {
        let manifest = load_manifest(&args.config)?;
        let context = manifest.context(args.stage.as_deref(), args.region.as_deref());
        debug!(
            "Resolving {} for stage {} in {}",
            context.service, context.stage, context.region
        );

        let targets = manifest.targets(&context.stage);
        let warmers = resolve_all(manifest.warmup_section(), &targets, &context)
            .with_context(|| format!("Failed to resolve warmers in {}", args.config.display()))?;

        Ok(Self {
            root: manifest_root(&args.config),
            context,
            warmers,
        })
    }
}

fn manifest_root(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Render a value in the requested format
pub fn render<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to render YAML"),
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to render JSON")
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::io::Write;

    pub const MANIFEST: &str = r#"
service: shop
provider:
  stage: dev
  region: eu-west-1
custom:
  warmup:
    default:
      enabled: true
      prewarm: true
    nightly:
      enabled: prod
functions:
  cart:
    handler: cart.handler
  orders:
    name: orders-fn
    handler: orders.handler
    warmup:
      default:
        enabled: false
"#;

    /// Manifest written into a fresh directory
    pub fn manifest_dir() -> (tempfile::TempDir, ManifestArgs) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serverless.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(MANIFEST.as_bytes()).unwrap();

        let args = ManifestArgs {
            config: path,
            stage: None,
            region: None,
        };
        (dir, args)
    }
}
