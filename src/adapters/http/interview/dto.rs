//! HTTP DTOs for interview endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::{
    ActionOutcome, ActionStatusKind, AnsweredQuestion, CreateSessionCommand, CreateSessionResult,
    Evaluation, PresetOverview, SessionState,
};
use crate::domain::foundation::{SessionStatus, ValidationError};
use crate::domain::interview::{
    resolve_phase, ActionKind, Analysis, Answer, InterviewError, Phase, PresetStatement,
    ProgressionState, Question, Report, ScheduledAction, Session, SessionPreset,
    OTHER_OPTION_INDEX,
};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start a session, from a preset or from scratch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub background_text: Option<String>,
    #[serde(default)]
    pub report_instructions: Option<String>,
    #[serde(default)]
    pub preset_slug: Option<String>,
    #[serde(default)]
    pub target_question_count: Option<u32>,
}

impl From<CreateSessionRequest> for CreateSessionCommand {
    fn from(req: CreateSessionRequest) -> Self {
        Self {
            purpose: req.purpose,
            title: req.title,
            background_text: req.background_text,
            report_instructions: req.report_instructions,
            preset_slug: req.preset_slug,
            target_question_count: req.target_question_count,
        }
    }
}

/// Request to answer one question.
///
/// `selected_option` is taken as any JSON integer so that out-of-range
/// choices fail validation instead of deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_id: String,
    pub selected_option: i64,
    #[serde(default)]
    pub free_text: Option<String>,
}

impl SubmitAnswerRequest {
    /// Narrows `selected_option` to an option index.
    ///
    /// Values that fit a `u8` are range-checked later by `Answer::new`.
    pub fn option_index(&self) -> Result<u8, ValidationError> {
        u8::try_from(self.selected_option).map_err(|_| {
            let actual = i32::try_from(self.selected_option).unwrap_or(if self.selected_option < 0 {
                i32::MIN
            } else {
                i32::MAX
            });
            ValidationError::out_of_range("selected_option", 0, OTHER_OPTION_INDEX as i32, actual)
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Session settings and lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub title: String,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_slug: Option<String>,
    pub batch_size: u32,
    pub target_question_count: u32,
    pub status: SessionStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id().to_string(),
            title: session.title().to_string(),
            purpose: session.purpose().to_string(),
            background_text: session.background_text().map(String::from),
            report_instructions: session.report_instructions().map(String::from),
            preset_slug: session.preset_slug().map(String::from),
            batch_size: session.batch_size(),
            target_question_count: session.target_question_count(),
            status: session.status(),
            created_at: session.created_at().as_datetime().to_rfc3339(),
            updated_at: session.updated_at().as_datetime().to_rfc3339(),
        }
    }
}

/// One statement with its five options.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionResponse {
    pub id: String,
    pub index: u32,
    pub statement: String,
    pub detail: String,
    pub options: Vec<String>,
    pub source: String,
    pub phase: Phase,
}

impl QuestionResponse {
    pub fn new(question: &Question, session: &Session) -> Self {
        Self {
            id: question.id().to_string(),
            index: question.index(),
            statement: question.statement().to_string(),
            detail: question.detail().to_string(),
            options: question.options().as_slice().to_vec(),
            source: question.source().to_string(),
            phase: resolve_phase(question.index(), session.phase_profile()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub question_id: String,
    pub selected_option: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
    pub answered_at: String,
}

impl From<&Answer> for AnswerResponse {
    fn from(answer: &Answer) -> Self {
        Self {
            question_id: answer.question_id().to_string(),
            selected_option: answer.selected_option(),
            free_text: answer.free_text().map(String::from),
            answered_at: answer.answered_at().as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub id: String,
    pub batch_index: u32,
    pub start: u32,
    pub end: u32,
    pub text: String,
    pub created_at: String,
}

impl From<&Analysis> for AnalysisResponse {
    fn from(analysis: &Analysis) -> Self {
        Self {
            id: analysis.id().to_string(),
            batch_index: analysis.batch_index(),
            start: analysis.batch().start(),
            end: analysis.batch().end(),
            text: analysis.text().to_string(),
            created_at: analysis.created_at().as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub id: String,
    pub session_id: String,
    pub version: u32,
    pub content: String,
    pub created_at: String,
}

impl From<&Report> for ReportResponse {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id().to_string(),
            session_id: report.session_id().to_string(),
            version: report.version(),
            content: report.content().to_string(),
            created_at: report.created_at().as_datetime().to_rfc3339(),
        }
    }
}

/// Counters behind the derived state.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    pub question_count: u32,
    pub answered_count: u32,
    pub target_question_count: u32,
    pub batch_size: u32,
    pub analyzed_batches: Vec<u32>,
}

/// Full view of a session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStateResponse {
    pub session: SessionResponse,
    pub questions: Vec<QuestionResponse>,
    pub answers: Vec<AnswerResponse>,
    pub analyses: Vec<AnalysisResponse>,
    pub progress: ProgressResponse,
    pub state: ProgressionState,
    pub finish_available: bool,
    pub pending_actions: Vec<ScheduledAction>,
    pub in_flight: Vec<ActionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_report_version: Option<u32>,
}

impl From<&SessionState> for SessionStateResponse {
    fn from(state: &SessionState) -> Self {
        Self {
            session: SessionResponse::from(&state.session),
            questions: state
                .questions
                .iter()
                .map(|q| QuestionResponse::new(q, &state.session))
                .collect(),
            answers: state.answers.iter().map(AnswerResponse::from).collect(),
            analyses: state.analyses.iter().map(AnalysisResponse::from).collect(),
            progress: ProgressResponse {
                question_count: state.progress.question_count,
                answered_count: state.progress.answered_count,
                target_question_count: state.progress.target_question_count,
                batch_size: state.progress.batch_size,
                analyzed_batches: state.progress.analyzed_batches.iter().copied().collect(),
            },
            state: state.state,
            finish_available: state.finish_available,
            pending_actions: state.pending_actions.clone(),
            in_flight: state.in_flight.clone(),
            latest_report_version: state.latest_report_version,
        }
    }
}

/// How one scheduled action ended.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcomeResponse {
    pub action: ScheduledAction,
    pub status: ActionStatusKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl From<&ActionOutcome> for ActionOutcomeResponse {
    fn from(outcome: &ActionOutcome) -> Self {
        Self {
            action: outcome.action,
            status: outcome.status.kind(),
            error: outcome.error().map(ErrorResponse::from),
        }
    }
}

/// Outcomes of the actions a trigger ran, plus the settled state.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResponse {
    pub outcomes: Vec<ActionOutcomeResponse>,
    pub state: SessionStateResponse,
}

impl From<&Evaluation> for EvaluationResponse {
    fn from(eval: &Evaluation) -> Self {
        Self {
            outcomes: eval.outcomes.iter().map(ActionOutcomeResponse::from).collect(),
            state: SessionStateResponse::from(&eval.state),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionResponse {
    pub session: SessionResponse,
    pub preset_questions: Vec<QuestionResponse>,
}

impl From<&CreateSessionResult> for CreateSessionResponse {
    fn from(result: &CreateSessionResult) -> Self {
        Self {
            session: SessionResponse::from(&result.session),
            preset_questions: result
                .preset_questions
                .iter()
                .map(|q| QuestionResponse::new(q, &result.session))
                .collect(),
        }
    }
}

/// Preset summary for list responses.
#[derive(Debug, Clone, Serialize)]
pub struct PresetSummaryResponse {
    pub slug: String,
    pub title: String,
    pub purpose: String,
    pub statement_count: usize,
}

impl From<&SessionPreset> for PresetSummaryResponse {
    fn from(preset: &SessionPreset) -> Self {
        Self {
            slug: preset.slug.clone(),
            title: preset.title.clone(),
            purpose: preset.purpose.clone(),
            statement_count: preset.statements.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetResponse {
    pub slug: String,
    pub title: String,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_question_count: Option<u32>,
    pub statements: Vec<PresetStatement>,
}

impl From<SessionPreset> for PresetResponse {
    fn from(preset: SessionPreset) -> Self {
        Self {
            slug: preset.slug,
            title: preset.title,
            purpose: preset.purpose,
            background_text: preset.background_text,
            report_instructions: preset.report_instructions,
            target_question_count: preset.target_question_count,
            statements: preset.statements,
        }
    }
}

/// One answer joined with the statement it answers.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEntryResponse {
    pub index: u32,
    pub statement: String,
    pub options: Vec<String>,
    pub selected_option: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
    pub answered_at: String,
}

impl From<&AnsweredQuestion> for ResponseEntryResponse {
    fn from(entry: &AnsweredQuestion) -> Self {
        Self {
            index: entry.question.index(),
            statement: entry.question.statement().to_string(),
            options: entry.question.options().as_slice().to_vec(),
            selected_option: entry.answer.selected_option(),
            free_text: entry.answer.free_text().map(String::from),
            answered_at: entry.answer.answered_at().as_datetime().to_rfc3339(),
        }
    }
}

/// A session listed under its preset.
#[derive(Debug, Clone, Serialize)]
pub struct PresetSessionResponse {
    pub session: SessionResponse,
    pub responses: Vec<ResponseEntryResponse>,
    pub reports: Vec<ReportResponse>,
}

/// Every session of one preset.
#[derive(Debug, Clone, Serialize)]
pub struct PresetOverviewResponse {
    pub preset: PresetSummaryResponse,
    pub sessions: Vec<PresetSessionResponse>,
}

impl From<&PresetOverview> for PresetOverviewResponse {
    fn from(overview: &PresetOverview) -> Self {
        Self {
            preset: PresetSummaryResponse::from(&overview.preset),
            sessions: overview
                .sessions
                .iter()
                .map(|entry| PresetSessionResponse {
                    session: SessionResponse::from(&entry.session),
                    responses: entry.responses.iter().map(ResponseEntryResponse::from).collect(),
                    reports: entry.reports.iter().map(ReportResponse::from).collect(),
                })
                .collect(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<&InterviewError> for ErrorResponse {
    fn from(err: &InterviewError) -> Self {
        let details = match err {
            InterviewError::IncompleteBatch {
                batch_index,
                missing_index,
            } => Some(serde_json::json!({
                "batch_index": batch_index,
                "missing_index": missing_index,
            })),
            InterviewError::Generation { action, window, .. } => Some(serde_json::json!({
                "action": action,
                "window": window,
            })),
            _ => None,
        };
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details,
        }
    }
}
