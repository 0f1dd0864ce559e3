//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
pub mod single_flight;

pub use handlers::{
    ActionOutcome, ActionStatus, ActionStatusKind, AnsweredQuestion, CreateSessionCommand,
    CreateSessionResult, EngineSettings, Evaluation, InterviewRepositories, PresetOverview,
    PresetSessionEntry, ProgressionEngine, SessionState, SubmitAnswerCommand,
};
pub use single_flight::{FlightGuard, SingleFlight};
