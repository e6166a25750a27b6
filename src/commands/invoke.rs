//! Run invocation passes from packaged artifacts
//!
//! Targets come from `<folder>/warmup.json`, not from a fresh resolution, so
//! a pass warms exactly what was packaged.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tracing::info;

use super::Workspace;
use crate::cli::ManifestArgs;
use crate::domain::ResolvedWarmer;
use crate::infrastructure::{regional_endpoint, LambdaHttpInvoker, WarmerArtifact};
use crate::observability::{emit_event, PassCompletedEvent, WarmupEvent};
use crate::services::{InvocationOverrides, WarmupService};
use crate::ui;

pub struct InvokeOptions {
    pub warmers: Vec<String>,
    pub prewarm: bool,
    pub endpoint: Option<String>,
    pub timeout: u64,
    pub fail_on_error: bool,
}

pub async fn execute(args: ManifestArgs, options: InvokeOptions) -> Result<()> {
    let workspace = Workspace::load(&args)?;
    let selected = select(&workspace, &options.warmers, options.prewarm)?;
    if selected.is_empty() {
        ui::print_note("No warmer to invoke");
        return Ok(());
    }

    let endpoint = options
        .endpoint
        .unwrap_or_else(|| regional_endpoint(&workspace.context.region));
    let invoker = LambdaHttpInvoker::new(endpoint, Duration::from_secs(options.timeout))
        .context("Failed to create Lambda client")?;
    let overrides = InvocationOverrides::from_env();
    info!(
        "Invoking {} warmers through {}",
        selected.len(),
        invoker.endpoint()
    );

    let mut service = WarmupService::new(invoker)
        .with_log(Arc::new(ui::TerminalLog))
        .with_overrides(overrides);
    let mut failures = 0;

    for warmer in selected {
        let path = WarmerArtifact::path(&workspace.root, &warmer.config.folder_name);
        let artifact = WarmerArtifact::read(&path).with_context(|| {
            format!(
                "Warmer {} is not packaged\n  Run `warmup package` first.",
                warmer.config.name
            )
        })?;

        ui::print_header(&format!("Warmer {}", artifact.warmer));
        service = service.with_verbose(artifact.verbose);
        let started = Instant::now();
        let report = service.run(&artifact.warmer, &artifact.targets).await;

        emit_event(WarmupEvent::PassCompleted(PassCompletedEvent::from_report(
            &report,
            &workspace.context.stage,
            started.elapsed().as_secs_f64(),
        )));
        ui::print_pass_summary(&report);
        failures += report.total_failures();
    }

    if failures > 0 {
        ui::print_failure_total(failures);
        if options.fail_on_error {
            bail!("{} invocations failed", failures);
        }
    }
    Ok(())
}

/// Explicit names, prewarm warmers, or every active warmer
fn select<'a>(
    workspace: &'a Workspace,
    names: &[String],
    prewarm: bool,
) -> Result<Vec<&'a ResolvedWarmer>> {
    if names.is_empty() {
        return Ok(workspace
            .warmers
            .active()
            .filter(|w| !prewarm || w.config.prewarm)
            .collect());
    }

    names
        .iter()
        .map(|name| match workspace.warmers.get(name) {
            Some(warmer) => Ok(warmer),
            None => bail!("Unknown warmer: {}", name),
        })
        .filter(|w| !matches!(w, Ok(warmer) if warmer.is_inert()))
        .collect()
}
