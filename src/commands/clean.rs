//! Remove warmer folders

use anyhow::Result;

use super::Workspace;
use crate::cli::ManifestArgs;
use crate::ui;

pub fn execute(args: ManifestArgs, all: bool) -> Result<()> {
    let workspace = Workspace::load(&args)?;
    let removed = clean(&workspace, all);

    if removed.is_empty() {
        ui::print_note("Nothing to clean");
    }
    for folder in removed {
        ui::print_removed(&folder);
    }
    Ok(())
}

/// Folders actually removed
pub fn clean(workspace: &Workspace, all: bool) -> Vec<String> {
    workspace
        .warmers
        .warmers
        .iter()
        .filter(|w| all || w.config.clean_folder)
        .filter(|w| crate::infrastructure::clean_folder(&workspace.root, &w.config.folder_name))
        .map(|w| w.config.folder_name.clone())
        .collect()
}
