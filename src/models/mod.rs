pub mod emotion;
pub mod intent;
pub mod request;
pub mod result;
pub mod style;

pub use emotion::Emotion;
pub use intent::{IntentDecision, IntentSource, RoutedIntent, DEFAULT_GENRE};
pub use request::{
    AnalyzeRequest, GenerateRequest, WriterRequest, MAX_TARGET_SENTENCES, MAX_TARGET_WORDS,
};
pub use result::{
    ErrorKind, ErrorPayload, Explanation, ParagraphRecord, PipelineResult, PipelineStage,
    RecordContent, StageOutput, WriterResult,
};
pub use style::{Length, Level, Tone, WriterMode};
