//! Error taxonomy for interview operations.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

use super::batch::IndexWindow;
use super::progression::ActionKind;

/// Errors surfaced by interview handlers and the progression engine.
#[derive(Debug, Clone, Error)]
pub enum InterviewError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Batch {batch_index} is incomplete: question {missing_index} is missing or unanswered")]
    IncompleteBatch { batch_index: u32, missing_index: u32 },

    #[error("{action} failed for {}: {reason}", describe_window(.window))]
    Generation {
        action: ActionKind,
        window: Option<IndexWindow>,
        reason: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Infrastructure failure: {0}")]
    Infrastructure(DomainError),
}

impl InterviewError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        InterviewError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn generation(
        action: ActionKind,
        window: Option<IndexWindow>,
        reason: impl Into<String>,
    ) -> Self {
        InterviewError::Generation {
            action,
            window,
            reason: reason.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        InterviewError::InvalidState(message.into())
    }

    /// Stable error code for API responses.
    pub fn code(&self) -> ErrorCode {
        match self {
            InterviewError::Validation(_) => ErrorCode::ValidationFailed,
            InterviewError::IncompleteBatch { .. } => ErrorCode::IncompleteBatch,
            InterviewError::Generation { .. } => ErrorCode::GenerationFailed,
            InterviewError::NotFound { entity, .. } => match *entity {
                "Question" => ErrorCode::QuestionNotFound,
                "Report" => ErrorCode::ReportNotFound,
                "Preset" => ErrorCode::PresetNotFound,
                _ => ErrorCode::SessionNotFound,
            },
            InterviewError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            InterviewError::Infrastructure(err) => err.code,
        }
    }
}

impl From<DomainError> for InterviewError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition | ErrorCode::Conflict => {
                InterviewError::InvalidState(err.message)
            }
            _ => InterviewError::Infrastructure(err),
        }
    }
}

fn describe_window(window: &Option<IndexWindow>) -> String {
    match window {
        Some(w) => w.to_string(),
        None => "session".to_string(),
    }
}
