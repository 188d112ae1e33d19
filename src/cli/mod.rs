//! CLI interface for Scrivener.

pub mod handlers;
pub mod output;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::session::SessionId;
use output::OutputMode;

/// Scrivener - readability, drift tracking and LLM-driven rewriting for writing sessions
#[derive(Parser)]
#[command(name = "scrivener", version, about, long_about = None)]
pub struct Cli {
    /// Override data directory (default: ~/.scrivener)
    #[arg(long, env = "SCRIVENER_DATA_PATH", global = true)]
    pub data_path: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start MCP server (stdio transport)
    Mcp,

    /// Rewrite text under a tone and level, then score it
    Analyze {
        /// Text to enhance (reads stdin when omitted)
        text: Option<String>,
        /// Writing session the text belongs to
        #[arg(long, short, default_value = "0")]
        session: SessionId,
        /// Tone (formal, academic, casual, storyteller, dark, technical, persuasive, or free-form)
        #[arg(long, default_value = "formal")]
        tone: String,
        /// Enhancement level (low, medium, high)
        #[arg(long, default_value = "medium")]
        level: String,
    },

    /// Plan and write a story from a prompt
    Generate {
        /// Story prompt (reads stdin when omitted)
        prompt: Option<String>,
        #[arg(long, short, default_value = "0")]
        session: SessionId,
        #[arg(long, default_value = "general")]
        genre: String,
        #[arg(long, default_value = "storyteller")]
        tone: String,
        /// Length preset (short, medium, long)
        #[arg(long, default_value = "medium")]
        length: String,
        /// Approximate word count
        #[arg(long)]
        words: Option<u32>,
        /// Approximate sentence count
        #[arg(long)]
        sentences: Option<u32>,
    },

    /// Route free-form input to enhancement or generation
    Writer {
        /// Free-form request (reads stdin when omitted)
        input: Option<String>,
        #[arg(long, short, default_value = "0")]
        session: SessionId,
        /// Branch to take when the intent cannot be classified (enhance, generate)
        #[arg(long, default_value = "enhance")]
        mode: String,
        /// Override the inferred tone
        #[arg(long)]
        tone: Option<String>,
        /// Override the inferred level
        #[arg(long)]
        level: Option<String>,
        /// Override the inferred genre
        #[arg(long)]
        genre: Option<String>,
        /// Output language (default english)
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        words: Option<u32>,
        #[arg(long)]
        sentences: Option<u32>,
    },

    /// Text metrics only (no model calls)
    Metrics {
        /// Text to measure (reads stdin when omitted)
        text: Option<String>,
    },

    /// Track drift across paragraphs of a file (blank-line separated)
    Batch {
        /// Input file (reads stdin when omitted)
        #[arg(long, short)]
        file: Option<PathBuf>,
        #[arg(long, short, default_value = "0")]
        session: SessionId,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// Whether the command needs models and config loaded.
    pub fn needs_context(&self) -> bool {
        !matches!(
            self,
            Commands::Metrics { .. } | Commands::Completions { .. }
        )
    }
}

/// Run commands that need no [`AppContext`](crate::init::AppContext).
pub fn execute_local(command: &Commands, mode: OutputMode) -> anyhow::Result<()> {
    match command {
        Commands::Metrics { text } => handlers::metrics::handle_metrics(text.as_deref(), mode),
        Commands::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "scrivener",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        _ => unreachable!("command requires an application context"),
    }
}

/// Execute a pipeline command against the loaded context.
pub async fn execute(
    command: &Commands,
    ctx: &crate::init::AppContext,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match command {
        Commands::Mcp => unreachable!("MCP handled in main"),

        Commands::Analyze {
            text,
            session,
            tone,
            level,
        } => {
            handlers::pipeline::handle_analyze(ctx, text.as_deref(), *session, tone, level, mode)
                .await?
        }

        Commands::Generate {
            prompt,
            session,
            genre,
            tone,
            length,
            words,
            sentences,
        } => {
            handlers::pipeline::handle_generate(
                ctx,
                handlers::pipeline::GenerateArgs {
                    prompt: prompt.as_deref(),
                    session: *session,
                    genre,
                    tone,
                    length,
                    words: *words,
                    sentences: *sentences,
                },
                mode,
            )
            .await?
        }

        Commands::Writer {
            input,
            session,
            mode: writer_mode,
            tone,
            level,
            genre,
            language,
            words,
            sentences,
        } => {
            handlers::pipeline::handle_writer(
                ctx,
                handlers::pipeline::WriterArgs {
                    input: input.as_deref(),
                    session: *session,
                    mode: writer_mode,
                    tone: tone.as_deref(),
                    level: level.as_deref(),
                    genre: genre.as_deref(),
                    language: language.as_deref(),
                    words: *words,
                    sentences: *sentences,
                },
                mode,
            )
            .await?
        }

        Commands::Batch { file, session } => {
            handlers::metrics::handle_batch(ctx, file.as_deref(), *session, mode).await?
        }

        Commands::Metrics { .. } | Commands::Completions { .. } => {
            execute_local(command, mode)?
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_with_targets() {
        let cli = Cli::try_parse_from([
            "scrivener",
            "--json",
            "generate",
            "a lighthouse keeper",
            "--session",
            "42",
            "--words",
            "50",
        ])
        .expect("parse");
        assert!(cli.json);
        match cli.command {
            Commands::Generate {
                prompt,
                session,
                words,
                sentences,
                ..
            } => {
                assert_eq!(prompt.as_deref(), Some("a lighthouse keeper"));
                assert_eq!(session, 42);
                assert_eq!(words, Some(50));
                assert_eq!(sentences, None);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_metrics_needs_no_context() {
        let cli = Cli::try_parse_from(["scrivener", "metrics", "The cat sat."]).expect("parse");
        assert!(!cli.command.needs_context());
        let cli = Cli::try_parse_from(["scrivener", "writer", "hi"]).expect("parse");
        assert!(cli.command.needs_context());
    }
}
