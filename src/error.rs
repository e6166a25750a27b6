//! Centralized error types for warmup
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

/// Top-level error type for warmup operations
#[derive(Error, Debug)]
pub enum WarmupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invocation error: {0}")]
    Invoke(#[from] InvokeError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Configuration errors
///
/// `UnknownWarmers` and the duplicate variants abort a whole resolution pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "Invalid function-level warmup configuration ({}) in function {function}. \
         Every warmer should be declared in the custom section.",
        warmers.join(", ")
    )]
    UnknownWarmers {
        function: String,
        warmers: Vec<String>,
    },

    #[error("Warmers {first} and {second} resolve to the same folder: {folder}")]
    DuplicateFolder {
        first: String,
        second: String,
        folder: String,
    },

    #[error("Warmers {first} and {second} resolve to the same deployment name: {name}")]
    DuplicateDeploymentName {
        first: String,
        second: String,
        name: String,
    },

    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },
}

/// Remote invocation errors (one failed attempt)
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Request to {function} failed: {message}")]
    Transport { function: String, message: String },

    #[error("{function} returned HTTP {status}: {body}")]
    Status {
        function: String,
        status: u16,
        body: String,
    },

    #[error("{function} raised a function error: {kind}")]
    Function { function: String, kind: String },

    #[error("Attempt task for {function} did not complete: {message}")]
    Join { function: String, message: String },
}

/// Artifact folder errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to write artifact at {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("Failed to read artifact at {path}: {message}")]
    ReadFailed { path: String, message: String },
}
