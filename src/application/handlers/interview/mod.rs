//! Interview command and query handlers.
//!
//! - `CreateSessionHandler` - new sessions, optionally seeded from a preset
//! - `SubmitAnswerHandler` - answer upsert
//! - `PresetOverviewHandler` - sessions, answers and reports of one preset
//! - `BatchGenerator`, `AnalysisGenerator`, `ReportGenerator` - generation steps
//! - `ProgressionEngine` - progression policy plus single-flight execution

mod create_session;
mod generate_analysis;
mod generate_batch;
mod generate_report;
mod preset_overview;
mod progression_engine;
mod repositories;
mod snapshot;
mod submit_answer;

pub use create_session::{CreateSessionCommand, CreateSessionHandler, CreateSessionResult};
pub use generate_analysis::AnalysisGenerator;
pub use generate_batch::BatchGenerator;
pub use generate_report::ReportGenerator;
pub use preset_overview::{
    AnsweredQuestion, PresetOverview, PresetOverviewHandler, PresetSessionEntry,
};
pub use progression_engine::{
    ActionOutcome, ActionStatus, ActionStatusKind, EngineSettings, Evaluation, ProgressionEngine,
    SessionState,
};
pub use repositories::InterviewRepositories;
pub use snapshot::SessionSnapshot;
pub use submit_answer::{SubmitAnswerCommand, SubmitAnswerHandler};
