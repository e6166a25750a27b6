//! Warmup service - runs one invocation pass for a warmer
//!
//! Every target gets `concurrency` attempts. All attempts of all targets are
//! spawned before any is awaited, then every handle is awaited. A failed
//! attempt is logged and counted; it never cancels its siblings and never
//! fails the pass.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::domain::ResolvedTarget;
use crate::error::InvokeError;

/// Operator-level qualifier pin
pub const ALIAS_ENV: &str = "WARMUP_ALIAS";
/// Concurrency for every target
pub const CONCURRENCY_ENV: &str = "WARMUP_CONCURRENCY";

/// One remote invocation as the transport sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    pub function_name: String,
    pub qualifier: Option<String>,
    /// JSON payload string
    pub payload: String,
    /// Base64 client context
    pub client_context: Option<String>,
}

/// Remote invocation transport
#[async_trait]
pub trait Invoker: Send + Sync + 'static {
    async fn invoke(&self, request: InvokeRequest) -> Result<(), InvokeError>;
}

/// Where pass messages go
pub trait WarmupLog: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards pass messages to tracing
pub struct TracingLog;

impl WarmupLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Invocation-time overrides read from the execution environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationOverrides {
    /// Qualifier taking precedence over every target alias
    pub qualifier: Option<String>,
    /// Concurrency for every target
    pub concurrency: Option<u32>,
    /// Concurrency per target, keyed by [`concurrency_env_key`]
    pub per_target: HashMap<String, u32>,
}

impl InvocationOverrides {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut overrides = Self::default();
        let per_target_prefix = format!("{}_", CONCURRENCY_ENV);

        for (key, value) in vars {
            if key == ALIAS_ENV {
                overrides.qualifier = Some(value).filter(|v| !v.is_empty());
            } else if key == CONCURRENCY_ENV {
                overrides.concurrency = parse_concurrency(&value);
            } else if let Some(target) = key.strip_prefix(&per_target_prefix) {
                if let Some(concurrency) = parse_concurrency(&value) {
                    overrides.per_target.insert(target.to_string(), concurrency);
                }
            }
        }

        overrides
    }

    /// Per-target variable > global variable > resolved setting
    fn concurrency_for(&self, target: &ResolvedTarget) -> (u32, &'static str) {
        if let Some(c) = self.per_target.get(&concurrency_env_key(&target.name)) {
            return (*c, "function-specific environment variable");
        }
        if let Some(c) = self.concurrency {
            return (c, "global environment variable");
        }
        (target.config.concurrency, "configuration")
    }

    /// Operator pin > target alias > none
    fn qualifier_for(&self, target: &ResolvedTarget) -> Option<String> {
        self.qualifier
            .clone()
            .or_else(|| target.config.alias.clone())
    }
}

fn parse_concurrency(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|c| *c >= 1)
}

/// `my-func` -> `MY_FUNC`
pub fn concurrency_env_key(target: &str) -> String {
    target.to_uppercase().replace('-', "_")
}

/// Outcome of one target in one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub target: String,
    pub succeeded: u32,
    pub failed: u32,
}

impl InvocationResult {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Outcome of one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub warmer: String,
    pub results: Vec<InvocationResult>,
}

impl PassReport {
    pub fn attempts(&self) -> u32 {
        self.results.iter().map(|r| r.succeeded + r.failed).sum()
    }

    pub fn total_failures(&self) -> u32 {
        self.results.iter().map(|r| r.failed).sum()
    }

    pub fn failed_targets(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.has_failures())
            .map(|r| r.target.as_str())
            .collect()
    }
}

/// Service running invocation passes
pub struct WarmupService<I: Invoker> {
    invoker: Arc<I>,
    log: Arc<dyn WarmupLog>,
    overrides: InvocationOverrides,
    verbose: bool,
}

impl<I: Invoker> WarmupService<I> {
    /// Create a new warmup service logging through tracing
    pub fn new(invoker: I) -> Self {
        Self {
            invoker: Arc::new(invoker),
            log: Arc::new(TracingLog),
            overrides: InvocationOverrides::default(),
            verbose: true,
        }
    }

    /// Builder: set the logging sink
    pub fn with_log(mut self, log: Arc<dyn WarmupLog>) -> Self {
        self.log = log;
        self
    }

    /// Builder: set invocation-time overrides
    pub fn with_overrides(mut self, overrides: InvocationOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Builder: suppress info messages when false
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Build the request every attempt for `target` sends
    pub fn request_for(&self, target: &ResolvedTarget) -> InvokeRequest {
        InvokeRequest {
            function_name: target.name.clone(),
            qualifier: self.overrides.qualifier_for(target),
            payload: target.config.payload.clone(),
            client_context: target.config.client_context.encode(&target.config.payload),
        }
    }

    /// Run one pass over `targets`
    ///
    /// Completes once every attempt has settled. Never fails.
    pub async fn run(&self, warmer: &str, targets: &[ResolvedTarget]) -> PassReport {
        self.info(&format!("Warm Up Start ({})", warmer));

        // Fan out: one task per attempt, tagged with its target's index
        let mut attempts: Vec<(usize, JoinHandle<Result<(), InvokeError>>)> = Vec::new();
        for (index, target) in targets.iter().enumerate() {
            let (concurrency, source) = self.overrides.concurrency_for(target);
            self.info(&format!(
                "Warming up function: {} with concurrency: {} (from {})",
                target.name, concurrency, source
            ));

            let request = self.request_for(target);
            for _ in 0..concurrency {
                let invoker = Arc::clone(&self.invoker);
                let request = request.clone();
                attempts.push((
                    index,
                    tokio::spawn(async move { invoker.invoke(request).await }),
                ));
            }
        }

        // Settle: every attempt owns its slot until all are done
        let mut settled = Vec::with_capacity(attempts.len());
        for (index, handle) in attempts {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(InvokeError::Join {
                    function: targets[index].name.clone(),
                    message: e.to_string(),
                }),
            };
            settled.push((index, outcome));
        }

        let mut results: Vec<InvocationResult> = targets
            .iter()
            .map(|target| InvocationResult {
                target: target.name.clone(),
                succeeded: 0,
                failed: 0,
            })
            .collect();

        for (index, outcome) in settled {
            match outcome {
                Ok(()) => results[index].succeeded += 1,
                Err(e) => {
                    results[index].failed += 1;
                    self.log
                        .error(&format!("Warm Up Invoke Error: {}: {}", targets[index].name, e));
                }
            }
        }

        for result in &results {
            if !result.has_failures() {
                self.info(&format!("Warm Up Invoke Success: {}", result.target));
            }
        }

        let report = PassReport {
            warmer: warmer.to_string(),
            results,
        };
        self.info(&format!(
            "Warm Up Finished with {} invoke errors",
            report.total_failures()
        ));
        report
    }

    fn info(&self, message: &str) {
        if self.verbose {
            self.log.info(message);
        }
    }
}
