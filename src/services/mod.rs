pub mod consistency;
pub mod emotion;
pub mod explain;
pub mod intent;
pub mod pipeline;
pub mod planner;
pub mod progress;
pub mod readability;
mod stage;
pub mod style;

pub use consistency::{ComparisonPolicy, ConsistencyScore, ConsistencyTracker};
pub use emotion::{EmotionService, LlmEmotionClassifier, NoopEmotionService};
pub use explain::explain;
pub use intent::{parse_intent, IntentClassifier};
pub use pipeline::{DriftEntry, Orchestrator};
pub use planner::{ScriptGenerator, StoryPlanner};
pub use progress::{noop_progress, NoopProgressReporter, ProgressReporter};
pub use readability::{analyze_text, readability, TextStats};
pub use style::StyleRewriter;
