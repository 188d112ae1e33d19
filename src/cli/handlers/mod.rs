//! CLI command handlers.

pub mod metrics;
pub mod pipeline;
