//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod interview;

pub use interview::{
    // Commands and results
    CreateSessionCommand, CreateSessionResult, SubmitAnswerCommand,
    // Engine
    ActionOutcome, ActionStatus, ActionStatusKind, EngineSettings, Evaluation, ProgressionEngine,
    SessionState,
    // Queries
    AnsweredQuestion, PresetOverview, PresetOverviewHandler, PresetSessionEntry,
    // Building blocks
    AnalysisGenerator, BatchGenerator, CreateSessionHandler, InterviewRepositories,
    ReportGenerator, SessionSnapshot, SubmitAnswerHandler,
};
