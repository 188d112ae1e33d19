//! Writer routing: intent classification, branch selection and records.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{ScriptedLlm, TestHarness};
use scrivener::llm::LlmError;
use scrivener::models::{
    Emotion, ErrorKind, ErrorPayload, IntentDecision, IntentSource, Length, Level,
    PipelineResult, RecordContent, Tone, WriterMode, WriterRequest,
};
use scrivener::services::noop_progress;
use scrivener::ScrivenerError;

const INTENT_SYSTEM: &str = "Strict JSON intent classifier.";

#[tokio::test]
async fn test_no_backend_defaults_to_formal_enhancement() {
    let harness = TestHarness::offline();

    let out = harness
        .orchestrator
        .writer(
            &WriterRequest::new(42, "Please improve this paragraph."),
            noop_progress(),
        )
        .await
        .expect("writer");

    assert_eq!(out.intent.decision, IntentDecision::fallback());
    assert_eq!(out.intent.source, IntentSource::Default);
    assert_eq!(out.result.mode(), "enhancement");
    assert!(harness.llm.requests_for(INTENT_SYSTEM).is_empty());

    let RecordContent::Enhancement {
        original_text,
        enhanced_text,
        ..
    } = &out.record.content
    else {
        panic!("expected enhancement record");
    };
    assert_eq!(original_text, "Please improve this paragraph.");
    assert_eq!(enhanced_text, out.result.text());
    assert_eq!(out.record.session_id, 42);
}

#[tokio::test]
async fn test_generate_mode_without_backend_runs_generation() {
    let harness = TestHarness::offline();
    let mut request = WriterRequest::new(4, "a dragon who fears fire");
    request.mode = WriterMode::Generate;

    let out = harness
        .orchestrator
        .writer(&request, noop_progress())
        .await
        .expect("writer");

    assert_eq!(out.intent.decision, IntentDecision::default_script());
    assert_eq!(out.intent.source, IntentSource::Default);
    assert_eq!(
        out.record.content,
        RecordContent::Generation {
            content: "a dragon who fears fire".into()
        }
    );
}

#[tokio::test]
async fn test_classified_script_decision_runs_generation() {
    let harness = TestHarness::scripted(vec![
        r#"{"task_type": "script_generation", "genre": "fantasy", "tone": "dark", "length": "long"}"#,
        "- a cursed crown",
        "The crown whispered to its bearer.",
        "surprise",
    ]);

    let out = harness
        .orchestrator
        .writer(
            &WriterRequest::new(8, "write me a story about a cursed crown"),
            noop_progress(),
        )
        .await
        .expect("writer");

    assert_eq!(
        out.intent.decision,
        IntentDecision::ScriptGeneration {
            genre: "fantasy".into(),
            tone: Tone::Dark,
            length: Length::Long,
        }
    );
    assert_eq!(out.intent.source, IntentSource::Classified);
    assert_eq!(out.result.emotion(), Emotion::Surprise);
    assert_eq!(
        out.record.content,
        RecordContent::Generation {
            content: "The crown whispered to its bearer.".into()
        }
    );

    let expand = &harness
        .llm
        .requests_for("You write cinematic high-quality stories.")[0];
    assert!(expand.user.contains("dark and intense"));
    assert!(expand.user.contains("Preset length level: long"));
}

#[tokio::test]
async fn test_intent_parse_error_keeps_raw_output() {
    let raw = r#"Sure! Here's the JSON: {"task_type": "content_enhancement"}"#;
    let harness = TestHarness::scripted(vec![raw]);

    let err = harness
        .orchestrator
        .writer(&WriterRequest::new(1, "fix my text"), noop_progress())
        .await
        .expect_err("prose around JSON");

    match &err {
        ScrivenerError::IntentParse { raw_output, .. } => assert_eq!(raw_output, raw),
        other => panic!("expected intent parse error, got {other:?}"),
    }
    let payload = ErrorPayload::from(&err);
    assert_eq!(payload.kind, ErrorKind::Intent);
    assert_eq!(payload.raw_output.as_deref(), Some(raw));
    assert_eq!(harness.llm.requests().len(), 1);
}

#[tokio::test]
async fn test_unknown_task_type_is_parse_error() {
    let harness = TestHarness::scripted(vec![r#"{"task_type": "translation"}"#]);

    let err = harness
        .orchestrator
        .writer(&WriterRequest::new(1, "translate this"), noop_progress())
        .await
        .expect_err("unknown task");

    assert!(matches!(err, ScrivenerError::IntentParse { .. }));
}

#[tokio::test]
async fn test_configured_backend_failure_is_intent_unavailable() {
    let harness =
        TestHarness::with_llm(ScriptedLlm::with_results(vec![Err(LlmError::Timeout)]));

    let err = harness
        .orchestrator
        .writer(&WriterRequest::new(1, "fix my text"), noop_progress())
        .await
        .expect_err("backend down");

    assert!(matches!(err, ScrivenerError::IntentUnavailable(_)));
    assert_eq!(ErrorPayload::from(&err).kind, ErrorKind::Intent);
}

#[tokio::test]
async fn test_language_prefix_reaches_stages() {
    let harness = TestHarness::offline();
    let mut request = WriterRequest::new(6, "The meeting is at noon.");
    request.language = Some("french".into());

    let out = harness
        .orchestrator
        .writer(&request, noop_progress())
        .await
        .expect("writer");

    let rewrite = &harness.llm.requests_for("Professional writing assistant.")[0];
    assert!(rewrite
        .user
        .contains("[OUTPUT IN FRENCH] The meeting is at noon."));

    let RecordContent::Enhancement { original_text, .. } = &out.record.content else {
        panic!("expected enhancement record");
    };
    assert_eq!(original_text, "The meeting is at noon.");
}

#[tokio::test]
async fn test_caller_overrides_classified_parameters() {
    let harness = TestHarness::scripted(vec![
        r#"{"task_type": "content_enhancement", "tone": "casual", "level": "low"}"#,
        "Rewritten.",
        "neutral",
    ]);
    let mut request = WriterRequest::new(2, "make this better: it was ok");
    request.tone = Some(Tone::Academic);

    let out = harness
        .orchestrator
        .writer(&request, noop_progress())
        .await
        .expect("writer");

    assert_eq!(
        out.intent.decision,
        IntentDecision::ContentEnhancement {
            tone: Tone::Academic,
            level: Level::Low,
        }
    );
    let PipelineResult::Enhancement { explanation, .. } = &out.result else {
        panic!("expected enhancement");
    };
    assert_eq!(explanation.tone_applied, Tone::Academic);
    assert_eq!(explanation.enhancement_level, Level::Low);
}

#[tokio::test]
async fn test_writer_result_json_shape() {
    let harness = TestHarness::offline();

    let out = harness
        .orchestrator
        .writer(&WriterRequest::new(42, "The sky is blue."), noop_progress())
        .await
        .expect("writer");
    let value = serde_json::to_value(&out).expect("serialize");

    assert_eq!(value["mode"], json!("enhancement"));
    assert_eq!(value["enhanced_text"], json!("The sky is blue."));
    assert_eq!(value["drift_score"], json!(0.0));
    assert_eq!(value["consistency_score"], json!(1.0));
    assert_eq!(value["fallbacks"], json!(["rewriting"]));
    assert_eq!(value["intent"]["task_type"], json!("content_enhancement"));
    assert_eq!(value["intent"]["source"], json!("default"));
    assert_eq!(value["record"]["kind"], json!("enhancement"));
    assert_eq!(value["record"]["session_id"], json!(42));
}
