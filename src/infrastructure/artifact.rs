//! Warmer artifact folders
//!
//! Each active warmer gets `<folder>/warmup.json` holding the targets it
//! captured at resolution time. The invoke command reads it back, so a pass
//! runs against exactly what was packaged.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::group::HANDLER_FILE;
use crate::domain::{ResolvedTarget, ResolvedWarmer};
use crate::error::ArtifactError;

/// Contents of `warmup.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarmerArtifact {
    pub warmer: String,
    pub deployment_name: String,
    pub verbose: bool,
    pub targets: Vec<ResolvedTarget>,
}

impl WarmerArtifact {
    pub fn from_warmer(warmer: &ResolvedWarmer) -> Self {
        Self {
            warmer: warmer.config.name.clone(),
            deployment_name: warmer.config.deployment_name.clone(),
            verbose: warmer.config.verbose,
            targets: warmer.targets.clone(),
        }
    }

    /// Path of the artifact file for `folder_name` under `root`
    pub fn path(root: &Path, folder_name: &str) -> PathBuf {
        root.join(folder_name).join(HANDLER_FILE)
    }

    /// Write the artifact, creating the folder as needed
    pub fn write(&self, root: &Path, folder_name: &str) -> Result<PathBuf, ArtifactError> {
        let path = Self::path(root, folder_name);
        let write_failed = |message: String| ArtifactError::WriteFailed {
            path: path.display().to_string(),
            message,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| write_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| write_failed(e.to_string()))?;

        debug!("Wrote artifact {}", path.display());
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<Self, ArtifactError> {
        let read_failed = |message: String| ArtifactError::ReadFailed {
            path: path.display().to_string(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| read_failed(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| read_failed(e.to_string()))
    }
}

/// Remove a warmer folder
///
/// Returns whether something was removed. A missing folder is not an error;
/// any other failure is logged and swallowed.
pub fn clean_folder(root: &Path, folder_name: &str) -> bool {
    let folder = root.join(folder_name);
    match std::fs::remove_dir_all(&folder) {
        Ok(()) => {
            debug!("Removed {}", folder.display());
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Failed to clean {}: {}", folder.display(), e);
            false
        }
    }
}
