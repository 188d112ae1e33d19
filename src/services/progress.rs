//! Stage reporting for pipeline requests.
//!
//! The orchestrator announces each stage transition here. MCP tools forward
//! these as progress notifications; the CLI and tests use the no-op reporter.

use std::sync::Arc;

use async_trait::async_trait;

/// Receives pipeline progress.
///
/// `current` runs from 0.0 to `total` (normally 1.0).
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// Must never fail the caller.
    async fn report(&self, current: f64, total: f64, message: Option<String>);

    /// Report step `step` of `total_steps`.
    async fn step(&self, step: usize, total_steps: usize, message: &str) {
        let current = if total_steps == 0 {
            1.0
        } else {
            step as f64 / total_steps as f64
        };
        self.report(current, 1.0, Some(message.to_string())).await;
    }
}

pub struct NoopProgressReporter;

#[async_trait]
impl ProgressReporter for NoopProgressReporter {
    async fn report(&self, _current: f64, _total: f64, _message: Option<String>) {}
}

pub fn noop_progress() -> Arc<dyn ProgressReporter> {
    Arc::new(NoopProgressReporter)
}
