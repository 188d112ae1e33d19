//! Text metrics and drift batch handlers.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{
    input_or_stdin, output_json, print_header, print_hint, print_kv, print_table,
    report_pipeline_error, OutputMode,
};
use crate::init::AppContext;
use crate::services::{analyze_text, noop_progress, DriftEntry};
use crate::session::SessionId;

pub fn handle_metrics(text: Option<&str>, mode: OutputMode) -> Result<()> {
    let text = input_or_stdin(text)?;
    let stats = analyze_text(&text);

    if mode == OutputMode::Json {
        output_json(&stats);
        return Ok(());
    }

    print_header("Text metrics");
    print_kv("Sentences", &stats.sentences.to_string());
    print_kv("Words", &stats.words.to_string());
    print_kv("Syllables", &stats.syllables.to_string());
    print_kv("Readability", &format!("{:.2}", stats.readability));
    Ok(())
}

/// Split text into paragraphs on blank lines.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}

#[derive(Serialize)]
struct BatchReport<'a> {
    session_id: SessionId,
    paragraphs: &'a [DriftEntry],
}

pub async fn handle_batch(
    ctx: &AppContext,
    file: Option<&Path>,
    session: SessionId,
    mode: OutputMode,
) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read file '{}': {}", path.display(), e))?,
        None => input_or_stdin(None)?,
    };
    let paragraphs = split_paragraphs(&text);
    if paragraphs.is_empty() {
        anyhow::bail!("No paragraphs found in input");
    }

    let entries = match ctx
        .orchestrator
        .drift_report(session, &paragraphs, noop_progress())
        .await
    {
        Ok(entries) => entries,
        Err(e) => {
            report_pipeline_error(&e, mode);
            return Err(e.into());
        }
    };

    if mode == OutputMode::Json {
        output_json(&BatchReport {
            session_id: session,
            paragraphs: &entries,
        });
        return Ok(());
    }

    print_header(&format!("Drift across {} paragraphs (session {})", entries.len(), session));
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                (e.index + 1).to_string(),
                format!("{:.4}", e.score.drift_score),
                format!("{:.4}", e.score.consistency_score),
                e.stats.words.to_string(),
                format!("{:.2}", e.stats.readability),
            ]
        })
        .collect();
    print_table(
        &["#", "Drift", "Consistency", "Words", "Readability"],
        rows,
    );
    print_hint(&format!(
        "Comparison policy: {:?}",
        ctx.orchestrator.tracker().policy()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_paragraphs() {
        let text = "First line\ncontinues.\n\n\nSecond.\n   \nThird.\n";
        assert_eq!(
            split_paragraphs(text),
            vec![
                "First line\ncontinues.".to_string(),
                "Second.".to_string(),
                "Third.".to_string()
            ]
        );
        assert!(split_paragraphs("\n \n").is_empty());
    }
}
