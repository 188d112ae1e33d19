//! Pipeline orchestration: `analyze`, `generate` and `writer`.
//!
//! Each request walks the stage machine
//! `Routing (writer only) -> Rewriting | Planning+Generating -> MetricsCollection -> Aggregation -> Done`.
//! Generative stages degrade to passthrough; a consistency failure moves the
//! request to `Failed` during aggregation. There are no retries.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::llm::LlmClient;
use crate::models::{
    AnalyzeRequest, Emotion, GenerateRequest, IntentDecision, IntentSource, Length, Level,
    ParagraphRecord, PipelineResult, PipelineStage, RoutedIntent, Tone, WriterMode,
    WriterRequest, WriterResult,
};
use crate::services::consistency::{ConsistencyScore, ConsistencyTracker};
use crate::services::emotion::{EmotionService, LlmEmotionClassifier};
use crate::services::explain::explain;
use crate::services::intent::IntentClassifier;
use crate::services::planner::{ScriptGenerator, StoryPlanner};
use crate::services::progress::ProgressReporter;
use crate::services::readability::{analyze_text, readability, TextStats};
use crate::services::style::StyleRewriter;
use crate::session::SessionId;
use crate::utils::text::normalize_whitespace;
use crate::ScrivenerError;

/// Walks a request through its stages, logging and reporting progress.
struct StageWalker {
    progress: Arc<dyn ProgressReporter>,
    total: usize,
    step: usize,
}

impl StageWalker {
    fn new(progress: Arc<dyn ProgressReporter>, total: usize) -> Self {
        Self {
            progress,
            total,
            step: 0,
        }
    }

    async fn enter(&mut self, stage: PipelineStage) {
        self.step += 1;
        debug!(stage = stage.as_str(), step = self.step, "stage");
        self.progress
            .step(self.step.min(self.total), self.total, stage.as_str())
            .await;
    }

    async fn fail(&self, at: PipelineStage, err: &ScrivenerError) {
        warn!(stage = at.as_str(), "Pipeline failed: {}", err);
        self.progress
            .report(
                1.0,
                1.0,
                Some(format!("{}: {}", PipelineStage::Failed.as_str(), err)),
            )
            .await;
    }
}

/// Per-paragraph line of a drift report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftEntry {
    pub index: usize,
    #[serde(flatten)]
    pub score: ConsistencyScore,
    #[serde(flatten)]
    pub stats: TextStats,
}

pub struct Orchestrator {
    rewriter: StyleRewriter,
    planner: StoryPlanner,
    generator: ScriptGenerator,
    intent: IntentClassifier,
    emotion: Arc<dyn EmotionService>,
    tracker: Arc<ConsistencyTracker>,
}

impl Orchestrator {
    /// Build every generative stage over one shared client.
    pub fn new(llm: Arc<dyn LlmClient>, tracker: Arc<ConsistencyTracker>) -> Self {
        Self {
            rewriter: StyleRewriter::new(llm.clone()),
            planner: StoryPlanner::new(llm.clone()),
            generator: ScriptGenerator::new(llm.clone()),
            intent: IntentClassifier::new(llm.clone()),
            emotion: Arc::new(LlmEmotionClassifier::new(llm)),
            tracker,
        }
    }

    pub fn with_emotion_service(mut self, emotion: Arc<dyn EmotionService>) -> Self {
        self.emotion = emotion;
        self
    }

    pub fn tracker(&self) -> &ConsistencyTracker {
        &self.tracker
    }

    /// Rewrite `text` and score the result.
    pub async fn analyze(
        &self,
        request: &AnalyzeRequest,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<PipelineResult, ScrivenerError> {
        request.validate()?;
        let span = info_span!(
            "pipeline",
            request_id = %Uuid::new_v4(),
            op = "analyze",
            session_id = request.session_id
        );
        async {
            let mut walker = StageWalker::new(progress, 4);
            let result = self
                .run_enhancement(
                    &mut walker,
                    request.session_id,
                    &request.text,
                    &request.tone,
                    request.level,
                )
                .await?;
            info!(mode = result.mode(), "Pipeline done");
            Ok::<_, ScrivenerError>(result)
        }
        .instrument(span)
        .await
    }

    /// Plan and write a story from `prompt`, then score it.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<PipelineResult, ScrivenerError> {
        request.validate()?;
        let span = info_span!(
            "pipeline",
            request_id = %Uuid::new_v4(),
            op = "generate",
            session_id = request.session_id
        );
        async {
            let mut walker = StageWalker::new(progress, 5);
            let result = self
                .run_generation(
                    &mut walker,
                    request.session_id,
                    &request.prompt,
                    &request.genre,
                    &request.tone,
                    request.length,
                    request.target_words,
                    request.target_sentences,
                )
                .await?;
            info!(mode = result.mode(), "Pipeline done");
            Ok::<_, ScrivenerError>(result)
        }
        .instrument(span)
        .await
    }

    /// Route free-form input to enhancement or generation.
    ///
    /// A classified intent decides the branch. When the classifier fell back
    /// to its no-credential default, `request.mode` decides instead. Caller
    /// `tone`, `level` and `genre` override inferred values either way.
    pub async fn writer(
        &self,
        request: &WriterRequest,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<WriterResult, ScrivenerError> {
        request.validate()?;
        let span = info_span!(
            "pipeline",
            request_id = %Uuid::new_v4(),
            op = "writer",
            session_id = request.session_id
        );
        async {
            let input = request.routed_input();
            let mut walker = StageWalker::new(progress, 5);

            walker.enter(PipelineStage::Routing).await;
            let (decision, source) = match self.intent.classify(&input).await {
                Ok(routed) => routed,
                Err(err) => {
                    walker.fail(PipelineStage::Routing, &err).await;
                    return Err(err);
                }
            };
            let decision = apply_overrides(select_branch(decision, source, request.mode), request);
            info!(
                task_type = decision.task_type(),
                source = ?source,
                "Intent routed"
            );

            let result = match &decision {
                IntentDecision::ContentEnhancement { tone, level } => {
                    self.run_enhancement(&mut walker, request.session_id, &input, tone, *level)
                        .await?
                }
                IntentDecision::ScriptGeneration {
                    genre,
                    tone,
                    length,
                } => {
                    // Generation runs one stage more than enhancement.
                    walker.total += 1;
                    self.run_generation(
                        &mut walker,
                        request.session_id,
                        &input,
                        genre,
                        tone,
                        *length,
                        request.target_words,
                        request.target_sentences,
                    )
                    .await?
                }
            };

            let record =
                ParagraphRecord::for_result(request.session_id, &request.user_input, &result);
            info!(mode = result.mode(), "Pipeline done");
            Ok::<_, ScrivenerError>(WriterResult {
                result,
                intent: RoutedIntent { decision, source },
                record,
            })
        }
        .instrument(span)
        .await
    }

    /// Feed `paragraphs` through one session in order, without rewriting.
    pub async fn drift_report(
        &self,
        session_id: SessionId,
        paragraphs: &[String],
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<Vec<DriftEntry>, ScrivenerError> {
        let mut entries = Vec::with_capacity(paragraphs.len());
        for (index, paragraph) in paragraphs.iter().enumerate() {
            if paragraph.trim().is_empty() {
                continue;
            }
            let score = self.tracker.evaluate(session_id, paragraph).await?;
            entries.push(DriftEntry {
                index,
                score,
                stats: analyze_text(paragraph),
            });
            progress
                .step(index + 1, paragraphs.len(), "metrics_collection")
                .await;
        }
        Ok(entries)
    }

    async fn run_enhancement(
        &self,
        walker: &mut StageWalker,
        session_id: SessionId,
        text: &str,
        tone: &Tone,
        level: Level,
    ) -> Result<PipelineResult, ScrivenerError> {
        let readability_before = readability(text);

        walker.enter(PipelineStage::Rewriting).await;
        let rewritten = self.rewriter.rewrite(text, tone, level).await;
        let mut fallbacks = Vec::new();
        if rewritten.degraded() {
            fallbacks.push(PipelineStage::Rewriting);
        }
        let enhanced_text = normalize_whitespace(&rewritten.text);

        walker.enter(PipelineStage::MetricsCollection).await;
        let readability_after = readability(&enhanced_text);
        let (consistency, emotion) = self.collect_metrics(session_id, &enhanced_text).await;

        walker.enter(PipelineStage::Aggregation).await;
        let consistency = match consistency {
            Ok(score) => score,
            Err(err) => {
                walker.fail(PipelineStage::Aggregation, &err).await;
                return Err(err);
            }
        };
        let explanation = explain(
            text,
            &enhanced_text,
            readability_before,
            readability_after,
            tone,
            level,
        );

        walker.enter(PipelineStage::Done).await;
        Ok(PipelineResult::Enhancement {
            enhanced_text,
            emotion,
            drift_score: consistency.drift_score,
            consistency_score: consistency.consistency_score,
            readability_before,
            readability_after,
            explanation,
            fallbacks,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_generation(
        &self,
        walker: &mut StageWalker,
        session_id: SessionId,
        prompt: &str,
        genre: &str,
        tone: &Tone,
        length: Length,
        target_words: Option<u32>,
        target_sentences: Option<u32>,
    ) -> Result<PipelineResult, ScrivenerError> {
        let mut fallbacks = Vec::new();

        walker.enter(PipelineStage::Planning).await;
        let plan = self.planner.plan(prompt, genre).await;
        if plan.degraded() {
            fallbacks.push(PipelineStage::Planning);
        }
        let plan_used = normalize_whitespace(&plan.text);

        walker.enter(PipelineStage::Generating).await;
        let story = self
            .generator
            .expand(&plan_used, tone, length, target_words, target_sentences)
            .await;
        if story.degraded() {
            fallbacks.push(PipelineStage::Generating);
        }
        let generated_text = normalize_whitespace(&story.text);

        walker.enter(PipelineStage::MetricsCollection).await;
        let (consistency, emotion) = self.collect_metrics(session_id, &generated_text).await;
        let readability = readability(&generated_text);

        walker.enter(PipelineStage::Aggregation).await;
        let consistency = match consistency {
            Ok(score) => score,
            Err(err) => {
                walker.fail(PipelineStage::Aggregation, &err).await;
                return Err(err);
            }
        };

        walker.enter(PipelineStage::Done).await;
        Ok(PipelineResult::ScriptGeneration {
            generated_text,
            emotion,
            drift_score: consistency.drift_score,
            consistency_score: consistency.consistency_score,
            readability,
            plan_used,
            fallbacks,
        })
    }

    async fn collect_metrics(
        &self,
        session_id: SessionId,
        text: &str,
    ) -> (Result<ConsistencyScore, ScrivenerError>, Emotion) {
        tokio::join!(
            self.tracker.evaluate(session_id, text),
            self.emotion.classify(text)
        )
    }
}

/// Branch to run given the classifier verdict and the caller's mode.
fn select_branch(decision: IntentDecision, source: IntentSource, mode: WriterMode) -> IntentDecision {
    match (source, mode) {
        (IntentSource::Classified, _) => decision,
        (IntentSource::Default, WriterMode::Enhance) => IntentDecision::fallback(),
        (IntentSource::Default, WriterMode::Generate) => IntentDecision::default_script(),
    }
}

fn apply_overrides(decision: IntentDecision, request: &WriterRequest) -> IntentDecision {
    match decision {
        IntentDecision::ContentEnhancement { tone, level } => IntentDecision::ContentEnhancement {
            tone: request.tone.clone().unwrap_or(tone),
            level: request.level.unwrap_or(level),
        },
        IntentDecision::ScriptGeneration {
            genre,
            tone,
            length,
        } => IntentDecision::ScriptGeneration {
            genre: request
                .genre
                .clone()
                .filter(|g| !g.trim().is_empty())
                .unwrap_or(genre),
            tone: request.tone.clone().unwrap_or(tone),
            length,
        },
    }
}
