//! Domain layer - pure business logic
//!
//! Configuration resolution for warmers and their targets. No I/O: every
//! function here is a deterministic computation over in-memory values, so
//! resolving the same input twice yields the same output.

pub mod alias;
pub mod cascade;
pub mod coerce;
pub mod declaration;
pub mod enabled;
pub mod group;
pub mod target;

// Re-export commonly used types
pub use cascade::{resolve_all, ResolvedTarget, ResolvedWarmer, ResolvedWarmers};
pub use declaration::FunctionDeclaration;
