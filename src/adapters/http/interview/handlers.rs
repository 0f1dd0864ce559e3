//! HTTP handlers for interview endpoints.
//!
//! Each handler parses path and body input, delegates to the
//! [`ProgressionEngine`], and maps the result to a JSON response.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{ProgressionEngine, SubmitAnswerCommand};
use crate::domain::foundation::{QuestionId, SessionId};
use crate::domain::interview::InterviewError;

use super::dto::{
    AnalysisResponse, CreateSessionRequest, CreateSessionResponse, ErrorResponse,
    EvaluationResponse, PresetOverviewResponse, PresetResponse, PresetSummaryResponse,
    ReportResponse, SessionResponse, SessionStateResponse, SubmitAnswerRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for interview routes.
#[derive(Clone)]
pub struct InterviewHandlers {
    engine: ProgressionEngine,
}

impl InterviewHandlers {
    pub fn new(engine: ProgressionEngine) -> Self {
        Self { engine }
    }
}

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Session handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions
pub async fn create_session(
    State(handlers): State<InterviewHandlers>,
    Json(request): Json<CreateSessionRequest>,
) -> Response {
    match handlers.engine.create_session(request.into()).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(CreateSessionResponse::from(&result)),
        )
            .into_response(),
        Err(e) => handle_interview_error(e),
    }
}

/// GET /api/sessions
pub async fn list_sessions(State(handlers): State<InterviewHandlers>) -> Response {
    match handlers.engine.list_sessions().await {
        Ok(sessions) => {
            let items: Vec<SessionResponse> = sessions.iter().map(SessionResponse::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => handle_interview_error(e),
    }
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(handlers): State<InterviewHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.engine.get_state(&session_id).await {
        Ok(state) => (StatusCode::OK, Json(SessionStateResponse::from(&state))).into_response(),
        Err(e) => handle_interview_error(e),
    }
}

/// POST /api/sessions/:id/answers
pub async fn submit_answer(
    State(handlers): State<InterviewHandlers>,
    Path(session_id): Path<String>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let question_id = match request.question_id.parse::<QuestionId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid question ID")),
            )
                .into_response()
        }
    };

    let selected_option = match request.option_index() {
        Ok(option) => option,
        Err(e) => return handle_interview_error(InterviewError::Validation(e)),
    };

    let cmd = SubmitAnswerCommand {
        session_id,
        question_id,
        selected_option,
        free_text: request.free_text,
    };

    match handlers.engine.submit_answer(cmd).await {
        Ok(eval) => (StatusCode::OK, Json(EvaluationResponse::from(&eval))).into_response(),
        Err(e) => handle_interview_error(e),
    }
}

/// POST /api/sessions/:id/progression
pub async fn evaluate(
    State(handlers): State<InterviewHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.engine.evaluate(&session_id).await {
        Ok(eval) => (StatusCode::OK, Json(EvaluationResponse::from(&eval))).into_response(),
        Err(e) => handle_interview_error(e),
    }
}

/// POST /api/sessions/:id/extend
pub async fn extend(
    State(handlers): State<InterviewHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.engine.extend(&session_id).await {
        Ok(eval) => (StatusCode::OK, Json(EvaluationResponse::from(&eval))).into_response(),
        Err(e) => handle_interview_error(e),
    }
}

/// POST /api/sessions/:id/complete
pub async fn complete_session(
    State(handlers): State<InterviewHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.engine.complete(&session_id).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => handle_interview_error(e),
    }
}

/// GET /api/sessions/:id/analyses
pub async fn list_analyses(
    State(handlers): State<InterviewHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.engine.get_state(&session_id).await {
        Ok(state) => {
            let items: Vec<AnalysisResponse> =
                state.analyses.iter().map(AnalysisResponse::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => handle_interview_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Report handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions/:id/reports
pub async fn request_report(
    State(handlers): State<InterviewHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.engine.request_report(&session_id).await {
        Ok(report) => (StatusCode::CREATED, Json(ReportResponse::from(&report))).into_response(),
        Err(e) => handle_interview_error(e),
    }
}

/// GET /api/sessions/:id/reports
pub async fn list_reports(
    State(handlers): State<InterviewHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.engine.list_reports(&session_id).await {
        Ok(reports) => {
            let items: Vec<ReportResponse> = reports.iter().map(ReportResponse::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => handle_interview_error(e),
    }
}

/// GET /api/sessions/:id/reports/:version
///
/// `version` is a positive number or `latest`.
pub async fn get_report(
    State(handlers): State<InterviewHandlers>,
    Path((session_id, version)): Path<(String, String)>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let version = if version == "latest" {
        None
    } else {
        match version.parse::<u32>() {
            Ok(v) if v > 0 => Some(v),
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::bad_request(
                        "Report version must be a positive number or 'latest'",
                    )),
                )
                    .into_response()
            }
        }
    };

    match handlers.engine.report(&session_id, version).await {
        Ok(report) => (StatusCode::OK, Json(ReportResponse::from(&report))).into_response(),
        Err(e) => handle_interview_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Preset handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/presets
pub async fn list_presets(State(handlers): State<InterviewHandlers>) -> Response {
    let items: Vec<PresetSummaryResponse> = handlers
        .engine
        .presets()
        .iter()
        .map(PresetSummaryResponse::from)
        .collect();
    (StatusCode::OK, Json(items)).into_response()
}

/// GET /api/presets/:slug
pub async fn get_preset(
    State(handlers): State<InterviewHandlers>,
    Path(slug): Path<String>,
) -> Response {
    match handlers.engine.preset(&slug) {
        Ok(preset) => (StatusCode::OK, Json(PresetResponse::from(preset))).into_response(),
        Err(e) => handle_interview_error(e),
    }
}

/// GET /api/presets/:slug/sessions
pub async fn preset_overview(
    State(handlers): State<InterviewHandlers>,
    Path(slug): Path<String>,
) -> Response {
    match handlers.engine.preset_overview(&slug).await {
        Ok(overview) => {
            (StatusCode::OK, Json(PresetOverviewResponse::from(&overview))).into_response()
        }
        Err(e) => handle_interview_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════

fn handle_interview_error(error: InterviewError) -> Response {
    let status = match &error {
        InterviewError::Validation(_) => StatusCode::BAD_REQUEST,
        InterviewError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterviewError::IncompleteBatch { .. } | InterviewError::InvalidState(_) => {
            StatusCode::CONFLICT
        }
        InterviewError::Generation { .. } => StatusCode::BAD_GATEWAY,
        InterviewError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %error, "Interview request failed");
        return (
            status,
            Json(ErrorResponse::internal("An internal error occurred")),
        )
            .into_response();
    }

    (status, Json(ErrorResponse::from(&error))).into_response()
}
