//! Scrivener - writing-session engine
//!
//! Usage:
//!   scrivener mcp                      Start MCP server on stdio
//!   scrivener analyze "text"           Rewrite and score a paragraph
//!   scrivener generate "prompt"        Plan and write a story
//!   scrivener writer "request"         Route free-form input
//!   scrivener metrics "text"           Readability metrics only
//!   scrivener --help                   Show all commands

use anyhow::Result;
use clap::Parser;

use scrivener::cli::output::OutputMode;
use scrivener::cli::{Cli, Commands};
use scrivener::init::AppContext;
use scrivener::mcp::server::run_mcp_server;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing to stderr (safe for MCP stdio transport)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scrivener=info".parse()?),
        )
        .init();

    let mode = OutputMode::from_json_flag(cli.json);

    match &cli.command {
        Commands::Mcp => {
            let ctx = AppContext::new(cli.data_path.clone()).await?;
            run_mcp_server(ctx).await?;
        }
        cmd if !cmd.needs_context() => scrivener::cli::execute_local(cmd, mode)?,
        cmd => {
            let ctx = AppContext::new(cli.data_path.clone()).await?;
            scrivener::cli::execute(cmd, &ctx, mode).await?;
        }
    }

    Ok(())
}
