use crate::mcp::progress::make_mcp_progress;
use rmcp::{
    handler::server::tool::ToolRouter,
    handler::server::wrapper::{Json, Parameters},
    model::*,
    tool, tool_handler, tool_router, Peer, RoleServer, ServerHandler, ServiceExt,
};
use std::sync::Arc;
use tracing::instrument;

use crate::mcp::error::ToolError;
use crate::mcp::{
    AnalyzeInput, GenerateInput, PipelineResponse, TextMetricsInput, TextMetricsResponse,
    WriterInput, WriterResponse,
};
use crate::models::{AnalyzeRequest, GenerateRequest, WriterRequest};
use crate::services::{analyze_text, Orchestrator};

/// MCP server exposing the writing pipeline.
///
/// Session consistency state lives as long as the server process.
#[derive(Clone)]
pub struct ScrivenerServer {
    pub(crate) orchestrator: Arc<Orchestrator>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ScrivenerServer {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            tool_router: Self::tool_router(),
        }
    }

    pub fn from_context(ctx: &crate::init::AppContext) -> Self {
        Self::new(ctx.orchestrator.clone())
    }

    #[tool(
        description = "Enhance a paragraph: rewrite it under a tone (formal, academic, casual, storyteller, technical, persuasive, dark, or free-form) and level (low, medium, high), then report emotion, drift/consistency against the session, readability before/after and an explanation."
    )]
    #[instrument(name = "mcp.analyze", skip_all)]
    pub async fn analyze(
        &self,
        request: Parameters<AnalyzeInput>,
        meta: Meta,
        client: Peer<RoleServer>,
    ) -> Result<Json<PipelineResponse>, ToolError> {
        let progress = make_mcp_progress(&meta, &client);
        let Parameters(input) = request;
        let request = AnalyzeRequest::try_from(input)?;
        self.orchestrator
            .analyze(&request, progress)
            .await
            .map(|result| Json(result.into()))
            .map_err(ToolError::from)
    }

    #[tool(
        description = "Generate a story: outline the prompt for a genre, expand the outline under a tone and length preset (short, medium, long) with optional target_words/target_sentences, then report emotion, drift/consistency and readability."
    )]
    #[instrument(name = "mcp.generate", skip_all)]
    pub async fn generate(
        &self,
        request: Parameters<GenerateInput>,
        meta: Meta,
        client: Peer<RoleServer>,
    ) -> Result<Json<PipelineResponse>, ToolError> {
        let progress = make_mcp_progress(&meta, &client);
        let Parameters(input) = request;
        let request = GenerateRequest::try_from(input)?;
        self.orchestrator
            .generate(&request, progress)
            .await
            .map(|result| Json(result.into()))
            .map_err(ToolError::from)
    }

    #[tool(
        description = "Route free-form input: classify whether the user wants their text enhanced or a story generated, run that pipeline, and return the result with the routed intent and how to record the paragraph. Use 'mode' to pick the branch when no classifier is configured."
    )]
    #[instrument(name = "mcp.writer", skip_all)]
    pub async fn writer(
        &self,
        request: Parameters<WriterInput>,
        meta: Meta,
        client: Peer<RoleServer>,
    ) -> Result<Json<WriterResponse>, ToolError> {
        let progress = make_mcp_progress(&meta, &client);
        let Parameters(input) = request;
        let request = WriterRequest::try_from(input)?;
        self.orchestrator
            .writer(&request, progress)
            .await
            .map(|result| Json(result.into()))
            .map_err(ToolError::from)
    }

    #[tool(
        description = "Sentence, word and syllable counts plus Flesch Reading Ease for a text. No model calls, no session state."
    )]
    #[instrument(name = "mcp.text_metrics", skip_all)]
    pub async fn text_metrics(
        &self,
        request: Parameters<TextMetricsInput>,
    ) -> Result<Json<TextMetricsResponse>, ToolError> {
        let Parameters(input) = request;
        Ok(Json(TextMetricsResponse {
            stats: analyze_text(&input.text),
        }))
    }
}

#[tool_handler]
impl ServerHandler for ScrivenerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "scrivener".to_string(),
                title: Some("Scrivener Writing Assistant".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                r#"# Scrivener

Writing-session assistant. Every paragraph is scored against the session it belongs to (session_id).

- writer: free-form request, routed to enhancement or generation
- analyze: rewrite a paragraph under a tone and level
- generate: outline and write a story
- text_metrics: readability only

drift_score + consistency_score = 1. The first paragraph of a session is the anchor (drift 0).
A result listing `fallbacks` means the model was unavailable for those stages and input passed through."#
                    .to_string(),
            ),
        }
    }
}

/// Serve MCP over stdio until the client disconnects.
pub async fn run_mcp_server(ctx: crate::init::AppContext) -> anyhow::Result<()> {
    let server = ScrivenerServer::from_context(&ctx);

    tracing::info!("Starting Scrivener MCP server v{}", env!("CARGO_PKG_VERSION"));

    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = server.serve(transport).await?;
    tracing::info!("MCP server listening on stdio (4 tools)");

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
    });

    service.waiting().await?;

    tracing::info!(
        "MCP server shutting down ({} sessions tracked)",
        ctx.orchestrator.tracker().session_count().await
    );
    Ok(())
}
