//! Services layer - orchestrates invocation passes
//!
//! Coordinates domain configuration with the invocation transport.

pub mod warmup_service;

pub use warmup_service::{
    InvocationOverrides, InvokeRequest, Invoker, PassReport, WarmupLog, WarmupService,
};
