//! Package warmers
//!
//! Cleans stale folders, writes one artifact per active warmer and prints
//! the function declarations keyed by deployment name. Stdout carries only
//! the declarations; progress goes to the log on stderr.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use super::{render, Workspace};
use crate::cli::{ManifestArgs, OutputFormat};
use crate::domain::FunctionDeclaration;
use crate::error::WarmupError;
use crate::infrastructure::{clean_folder, WarmerArtifact};

/// What a package run produced
pub struct PackageOutput {
    pub artifacts: Vec<PathBuf>,
    pub declarations: BTreeMap<String, FunctionDeclaration>,
}

pub fn execute(args: ManifestArgs, format: OutputFormat) -> Result<()> {
    print!("{}", run(&args, format)?);
    Ok(())
}

/// Package and render the declarations
fn run(args: &ManifestArgs, format: OutputFormat) -> Result<String> {
    let workspace = Workspace::load(args)?;
    let output = package(&workspace)?;

    for path in &output.artifacts {
        info!("Wrote {}", path.display());
    }
    render(&output.declarations, format)
}

pub fn package(workspace: &Workspace) -> Result<PackageOutput, WarmupError> {
    let mut output = PackageOutput {
        artifacts: Vec::new(),
        declarations: BTreeMap::new(),
    };

    for warmer in &workspace.warmers.warmers {
        let config = &warmer.config;
        if config.clean_folder {
            clean_folder(&workspace.root, &config.folder_name);
        }

        if warmer.is_inert() {
            info!(
                "Warmer {} has no enabled function for stage {}, skipping",
                config.name, workspace.context.stage
            );
            continue;
        }

        info!(
            "Packaging warmer {}: {}",
            config.name,
            workspace.warmers.target_names(&config.name).join(", ")
        );
        let path = WarmerArtifact::from_warmer(warmer).write(&workspace.root, &config.folder_name)?;
        output.artifacts.push(path);

        output.declarations.insert(
            config.deployment_name.clone(),
            FunctionDeclaration::for_warmer(warmer, &workspace.context.region),
        );
    }

    Ok(output)
}
