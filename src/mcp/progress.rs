//! Pipeline progress over MCP.
//!
//! When a tool call carries a progress token, stage transitions are sent to
//! the client as progress notifications. Calls without one get the no-op
//! reporter.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{Meta, ProgressNotificationParam, ProgressToken};
use rmcp::{Peer, RoleServer};

use crate::services::progress::{noop_progress, ProgressReporter};

pub struct McpProgressReporter {
    client: Peer<RoleServer>,
    token: ProgressToken,
}

impl McpProgressReporter {
    pub fn new(client: Peer<RoleServer>, token: ProgressToken) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl ProgressReporter for McpProgressReporter {
    async fn report(&self, current: f64, total: f64, message: Option<String>) {
        let sent = self
            .client
            .notify_progress(ProgressNotificationParam {
                progress_token: self.token.clone(),
                progress: current,
                total: Some(total),
                message,
            })
            .await;
        if let Err(e) = sent {
            tracing::debug!("Dropped progress notification: {}", e);
        }
    }
}

/// Reporter for one tool call.
pub fn make_mcp_progress(meta: &Meta, client: &Peer<RoleServer>) -> Arc<dyn ProgressReporter> {
    match meta.get_progress_token() {
        Some(token) => Arc::new(McpProgressReporter::new(client.clone(), token.clone())),
        None => noop_progress(),
    }
}
