//! Infrastructure layer - external I/O adapters
//!
//! - Lambda Invoke REST endpoint (reqwest)
//! - Warmer artifact folders on disk

pub mod artifact;
pub mod lambda;

// Re-export commonly used types
pub use artifact::{clean_folder, WarmerArtifact};
pub use lambda::{regional_endpoint, LambdaHttpInvoker};
