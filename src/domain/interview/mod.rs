//! Interview module - the adaptive interview domain.
//!
//! # Components
//!
//! - `phase` - Phase profile and resolver
//! - `batch` - Question index windows
//! - `session`, `question`, `answer`, `analysis`, `report` - Entities
//! - `context` - Generation context builder
//! - `progression` - Pure progression policy
//! - `preset` - Session templates

mod analysis;
mod answer;
mod batch;
mod context;
mod errors;
mod phase;
mod preset;
mod progression;
mod question;
mod report;
mod session;

pub use analysis::Analysis;
pub use answer::{Answer, AnswerBook, MAX_FREE_TEXT_LENGTH};
pub use batch::{BatchWindow, IndexWindow, DEFAULT_BATCH_SIZE, DEFAULT_TARGET_QUESTION_COUNT};
pub use context::{
    format_answer, AnalysisEntry, ContextEntry, GenerationContext, GenerationMode, OTHER_LABEL,
    UNANSWERED_LABEL,
};
pub use errors::InterviewError;
pub use phase::{resolve_phase, Phase, PhaseProfile, PhaseRange};
pub use preset::{PresetStatement, SessionPreset};
pub use progression::{
    decide, ActionKind, Decision, Progress, ProgressionState, ScheduledAction,
};
pub use question::{
    AnswerOptions, Question, QuestionDraft, QuestionSource, OPTION_COUNT, OTHER_OPTION_INDEX,
};
pub use report::{Report, ReportDraft};
pub use session::{InterviewPolicy, Session, MAX_PURPOSE_LENGTH};
