//! Print resolved warmers

use anyhow::{bail, Result};

use super::{render, Workspace};
use crate::cli::{ManifestArgs, OutputFormat};
use crate::domain::ResolvedWarmers;

pub fn execute(args: ManifestArgs, warmer: Option<String>, format: OutputFormat) -> Result<()> {
    let workspace = Workspace::load(&args)?;
    let selected = select(workspace.warmers, warmer.as_deref())?;
    print!("{}", render(&selected, format)?);
    Ok(())
}

fn select(warmers: ResolvedWarmers, name: Option<&str>) -> Result<ResolvedWarmers> {
    let Some(name) = name else {
        return Ok(warmers);
    };
    if warmers.get(name).is_none() {
        bail!("Unknown warmer: {}", name);
    }

    Ok(ResolvedWarmers {
        stage: warmers.stage,
        warmers: warmers
            .warmers
            .into_iter()
            .filter(|w| w.config.name == name)
            .collect(),
    })
}
