//! Pipeline command handlers: analyze, generate, writer.

use anyhow::Result;

use crate::cli::output::{
    input_or_stdin, output_json, print_kv, print_pipeline_result, report_pipeline_error,
    OutputMode,
};
use crate::init::AppContext;
use crate::models::{AnalyzeRequest, GenerateRequest, Length, Level, Tone, WriterRequest};
use crate::services::noop_progress;
use crate::session::SessionId;
use crate::ScrivenerError;

pub struct GenerateArgs<'a> {
    pub prompt: Option<&'a str>,
    pub session: SessionId,
    pub genre: &'a str,
    pub tone: &'a str,
    pub length: &'a str,
    pub words: Option<u32>,
    pub sentences: Option<u32>,
}

pub struct WriterArgs<'a> {
    pub input: Option<&'a str>,
    pub session: SessionId,
    pub mode: &'a str,
    pub tone: Option<&'a str>,
    pub level: Option<&'a str>,
    pub genre: Option<&'a str>,
    pub language: Option<&'a str>,
    pub words: Option<u32>,
    pub sentences: Option<u32>,
}

/// Print the error in `mode` and hand it back for the exit status.
fn surface(err: ScrivenerError, mode: OutputMode) -> anyhow::Error {
    report_pipeline_error(&err, mode);
    err.into()
}

pub async fn handle_analyze(
    ctx: &AppContext,
    text: Option<&str>,
    session: SessionId,
    tone: &str,
    level: &str,
    mode: OutputMode,
) -> Result<()> {
    let text = input_or_stdin(text)?;
    let level: Level = level.parse().map_err(|e| surface(e, mode))?;
    let request = AnalyzeRequest {
        session_id: session,
        text,
        tone: Tone::parse(tone),
        level,
    };

    let result = ctx
        .orchestrator
        .analyze(&request, noop_progress())
        .await
        .map_err(|e| surface(e, mode))?;

    if mode == OutputMode::Json {
        output_json(&result);
    } else {
        print_pipeline_result(&result);
    }
    Ok(())
}

pub async fn handle_generate(ctx: &AppContext, args: GenerateArgs<'_>, mode: OutputMode) -> Result<()> {
    let prompt = input_or_stdin(args.prompt)?;
    let length: Length = args.length.parse().map_err(|e| surface(e, mode))?;
    let request = GenerateRequest {
        session_id: args.session,
        prompt,
        genre: args.genre.to_string(),
        tone: Tone::parse(args.tone),
        length,
        target_words: args.words,
        target_sentences: args.sentences,
    };

    let result = ctx
        .orchestrator
        .generate(&request, noop_progress())
        .await
        .map_err(|e| surface(e, mode))?;

    if mode == OutputMode::Json {
        output_json(&result);
    } else {
        print_pipeline_result(&result);
    }
    Ok(())
}

pub async fn handle_writer(ctx: &AppContext, args: WriterArgs<'_>, mode: OutputMode) -> Result<()> {
    let user_input = input_or_stdin(args.input)?;
    let request = build_writer_request(user_input, &args).map_err(|e| surface(e, mode))?;

    let result = ctx
        .orchestrator
        .writer(&request, noop_progress())
        .await
        .map_err(|e| surface(e, mode))?;

    if mode == OutputMode::Json {
        output_json(&result);
        return Ok(());
    }

    print_pipeline_result(&result.result);
    println!();
    print_kv(
        "Routed as",
        &format!("{} ({:?})", result.intent.decision.task_type(), result.intent.source),
    );
    Ok(())
}

fn build_writer_request(
    user_input: String,
    args: &WriterArgs<'_>,
) -> Result<WriterRequest, ScrivenerError> {
    Ok(WriterRequest {
        session_id: args.session,
        user_input,
        mode: args.mode.parse()?,
        tone: args.tone.map(Tone::parse),
        level: args.level.map(str::parse).transpose()?,
        genre: args.genre.map(str::to_string),
        language: args.language.map(str::to_string),
        target_words: args.words,
        target_sentences: args.sentences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WriterMode;

    fn args<'a>() -> WriterArgs<'a> {
        WriterArgs {
            input: None,
            session: 9,
            mode: "generate",
            tone: Some("dark"),
            level: None,
            genre: Some("horror"),
            language: Some("spanish"),
            words: Some(120),
            sentences: None,
        }
    }

    #[test]
    fn test_build_writer_request() {
        let request = build_writer_request("a haunted mill".into(), &args()).expect("request");
        assert_eq!(request.mode, WriterMode::Generate);
        assert_eq!(request.tone, Some(Tone::Dark));
        assert_eq!(request.level, None);
        assert_eq!(request.genre.as_deref(), Some("horror"));
        assert_eq!(request.target_words, Some(120));
    }

    #[test]
    fn test_bad_mode_or_level_is_validation() {
        let mut bad = args();
        bad.mode = "rewrite";
        assert!(build_writer_request("x".into(), &bad)
            .expect_err("mode")
            .is_client_error());

        let mut bad = args();
        bad.level = Some("max");
        assert!(build_writer_request("x".into(), &bad)
            .expect_err("level")
            .is_client_error());
    }
}
