//! # Pass Observability
//!
//! One structured event per completed invocation pass, printed to stdout as
//! `WARMUP_EVENT:{json}` so a log shipper can pick it up.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::PassReport;

/// Event prefix for log collectors
const EVENT_PREFIX: &str = "WARMUP_EVENT:";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum WarmupEvent {
    /// Every attempt of a pass settled
    PassCompleted(PassCompletedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassCompletedEvent {
    /// RFC3339
    pub timestamp: String,
    pub pass_id: Uuid,
    pub warmer: String,
    pub stage: String,
    pub targets: usize,
    pub attempts: u32,
    pub failures: u32,
    pub failed_targets: Vec<String>,
    pub duration_secs: f64,
}

impl PassCompletedEvent {
    pub fn from_report(report: &PassReport, stage: impl Into<String>, duration_secs: f64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            pass_id: Uuid::new_v4(),
            warmer: report.warmer.clone(),
            stage: stage.into(),
            targets: report.results.len(),
            attempts: report.attempts(),
            failures: report.total_failures(),
            failed_targets: report
                .failed_targets()
                .into_iter()
                .map(str::to_string)
                .collect(),
            duration_secs,
        }
    }
}

/// Render an event line
pub fn format_event(event: &WarmupEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event).map(|json| format!("{}{}", EVENT_PREFIX, json))
}

/// Emit a structured event to stdout
pub fn emit_event(event: WarmupEvent) {
    match format_event(&event) {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::error!("Failed to serialize event: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::warmup_service::InvocationResult;

    #[test]
    fn test_pass_completed_event() {
        let report = PassReport {
            warmer: "default".to_string(),
            results: vec![
                InvocationResult {
                    target: "a".to_string(),
                    succeeded: 2,
                    failed: 1,
                },
                InvocationResult {
                    target: "b".to_string(),
                    succeeded: 1,
                    failed: 0,
                },
            ],
        };

        let event = PassCompletedEvent::from_report(&report, "dev", 0.5);
        assert_eq!(event.targets, 2);
        assert_eq!(event.attempts, 4);
        assert_eq!(event.failures, 1);
        assert_eq!(event.failed_targets, vec!["a"]);

        let line = format_event(&WarmupEvent::PassCompleted(event)).unwrap();
        assert!(line.starts_with("WARMUP_EVENT:{\"event_type\":\"PassCompleted\""));
        assert!(line.contains("\"warmer\":\"default\""));
    }
}
