//! Output formatting infrastructure for CLI commands.

use std::io::Read;

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::models::{ErrorPayload, PipelineResult, PipelineStage};
use crate::ScrivenerError;

/// Output mode for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

/// Use `arg` if given, otherwise read all of stdin.
pub fn input_or_stdin(arg: Option<&str>) -> anyhow::Result<String> {
    match arg {
        Some(text) => Ok(text.to_string()),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            Ok(buf)
        }
    }
}

/// Print a single item as pretty-printed JSON.
pub fn output_json<T: Serialize>(item: &T) {
    match serde_json::to_string_pretty(item) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to serialize to JSON: {}", e)),
    }
}

/// Report a pipeline error in the selected mode.
///
/// JSON mode prints the `{"error": ...}` payload on stdout.
pub fn report_pipeline_error(err: &ScrivenerError, mode: OutputMode) {
    let payload = ErrorPayload::from(err);
    if mode == OutputMode::Json {
        output_json(&payload);
        return;
    }
    print_error(&payload.error);
    if let Some(raw) = &payload.raw_output {
        print_kv("Model output", raw);
    }
}

/// Print a formatted table with headers and rows.
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        println!("{}", "No results found.".dimmed());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(headers);

    for row in rows {
        table.add_row(row);
    }

    println!("{table}");
}

/// Print an error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

/// Print a bold section header.
pub fn print_header(title: &str) {
    println!("\n{}\n", title.bold());
}

/// Print a key-value pair line.
pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a titled section with content.
pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.bold().underline());
    println!("{}", content);
}

/// Print a dimmed hint/suggestion message.
pub fn print_hint(msg: &str) {
    println!("{}", msg.dimmed());
}

/// Human rendering of a pipeline result.
pub fn print_pipeline_result(result: &PipelineResult) {
    match result {
        PipelineResult::Enhancement {
            enhanced_text,
            readability_before,
            readability_after,
            explanation,
            ..
        } => {
            print_header("Enhancement");
            print_kv("Tone", explanation.tone_applied.as_str());
            print_kv("Level", explanation.enhancement_level.as_str());
            print_scores(result);
            print_kv(
                "Readability",
                &format!(
                    "{:.2} -> {:.2} ({:+.2})",
                    readability_before, readability_after, explanation.readability_change
                ),
            );
            print_section("Enhanced text", enhanced_text);
        }
        PipelineResult::ScriptGeneration {
            generated_text,
            readability,
            plan_used,
            ..
        } => {
            print_header("Script generation");
            print_scores(result);
            print_kv("Readability", &format!("{:.2}", readability));
            print_section("Plan", plan_used);
            print_section("Story", generated_text);
        }
    }

    let fallbacks = result.fallbacks();
    if !fallbacks.is_empty() {
        let stages: Vec<&str> = fallbacks.iter().map(PipelineStage::as_str).collect();
        println!();
        print_hint(&format!(
            "Model unavailable for: {} (input passed through)",
            stages.join(", ")
        ));
    }
}

fn print_scores(result: &PipelineResult) {
    print_kv("Emotion", result.emotion().as_str());
    print_kv("Drift", &format!("{:.4}", result.drift_score()));
    print_kv("Consistency", &format!("{:.4}", result.consistency_score()));
}
