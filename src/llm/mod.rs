//! Generative language model boundary.
//!
//! Every generative stage (rewrite, plan, expand, emotion, intent) talks to the
//! model through [`LlmClient`]. The production implementation is
//! [`HttpLlmClient`], an OpenAI-compatible chat-completions client; tests swap
//! in scripted clients.

pub mod http;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use http::{HttpLlmClient, HttpLlmClientConfig};

/// A single chat-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 0.7,
            max_tokens: 400,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Failures of the generative backend.
///
/// Best-effort stages recover from all of these by passing their input
/// through unchanged.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured")]
    MissingCredentials,
    #[error("http error: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("response error: {0}")]
    Response(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// LLM client trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one chat completion and return the assistant message content.
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError>;

    /// Whether a credential is configured. When false, `complete` always
    /// fails with [`LlmError::MissingCredentials`].
    fn is_configured(&self) -> bool;
}

#[async_trait]
impl LlmClient for Arc<dyn LlmClient> {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError> {
        (**self).complete(request).await
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }
}

/// Client used when no API key is available.
pub struct NoopLlmClient;

impl Default for NoopLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NoopLlmClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmClient for NoopLlmClient {
    async fn complete(&self, _request: LlmRequest) -> Result<String, LlmError> {
        Err(LlmError::MissingCredentials)
    }

    fn is_configured(&self) -> bool {
        false
    }
}
