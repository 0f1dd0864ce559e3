//! HTTP adapter for interview endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ActionOutcomeResponse, AnalysisResponse, AnswerResponse, CreateSessionRequest,
    CreateSessionResponse, ErrorResponse, EvaluationResponse, PresetResponse,
    PresetSummaryResponse, ProgressResponse, QuestionResponse, ReportResponse, SessionResponse,
    SessionStateResponse, SubmitAnswerRequest,
};
pub use handlers::InterviewHandlers;
pub use routes::{preset_routes, session_routes};
