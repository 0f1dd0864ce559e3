//! HTTP routes for interview endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    complete_session, create_session, evaluate, extend, get_preset, get_report, get_session,
    list_analyses, list_presets, list_reports, list_sessions, preset_overview, request_report,
    submit_answer, InterviewHandlers,
};

/// Session router, mounted at `/api/sessions`.
pub fn session_routes(handlers: InterviewHandlers) -> Router {
    Router::new()
        .route("/", post(create_session).get(list_sessions))
        .route("/:id", get(get_session))
        .route("/:id/answers", post(submit_answer))
        .route("/:id/progression", post(evaluate))
        .route("/:id/extend", post(extend))
        .route("/:id/complete", post(complete_session))
        .route("/:id/analyses", get(list_analyses))
        .route("/:id/reports", post(request_report).get(list_reports))
        .route("/:id/reports/:version", get(get_report))
        .with_state(handlers)
}

/// Preset router, mounted at `/api/presets`.
pub fn preset_routes(handlers: InterviewHandlers) -> Router {
    Router::new()
        .route("/", get(list_presets))
        .route("/:slug", get(get_preset))
        .route("/:slug/sessions", get(preset_overview))
        .with_state(handlers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockStatementGenerator;
    use crate::adapters::memory::InMemoryInterviewStore;
    use crate::adapters::presets::YamlPresetCatalog;
    use crate::application::{EngineSettings, InterviewRepositories, ProgressionEngine};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const PRESETS: &str = r#"
presets:
  - slug: career
    title: Career values
    purpose: Understand what matters at work
    statements:
      - statement: I enjoy my current job
        options: [Yes, Unsure, No, Partly, Used to]
"#;

    fn handlers() -> InterviewHandlers {
        let store = Arc::new(InMemoryInterviewStore::new());
        let engine = ProgressionEngine::new(
            InterviewRepositories::from_store(store),
            Arc::new(MockStatementGenerator::new()),
            Arc::new(YamlPresetCatalog::from_yaml(PRESETS).unwrap()),
            EngineSettings::default(),
        );
        InterviewHandlers::new(engine)
    }

    fn app() -> Router {
        let handlers = handlers();
        Router::new()
            .nest("/sessions", session_routes(handlers.clone()))
            .nest("/presets", preset_routes(handlers))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/sessions",
            Some(json!({"purpose": "Find my priorities"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["session"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn create_then_evaluate_generates_first_batch() {
        let app = app();
        let id = create(&app).await;

        let (status, body) = send(&app, "POST", &format!("/sessions/{}/progression", id), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcomes"][0]["status"], "completed");
        assert_eq!(body["outcomes"][0]["action"]["kind"], "generate_batch");
        assert_eq!(body["state"]["questions"].as_array().unwrap().len(), 5);
        assert_eq!(body["state"]["questions"][0]["phase"], "exploration");
        assert_eq!(body["state"]["state"], "in_progress");
    }

    #[tokio::test]
    async fn other_option_without_text_is_400() {
        let app = app();
        let id = create(&app).await;
        let (_, body) = send(&app, "POST", &format!("/sessions/{}/progression", id), None).await;
        let question_id = body["state"]["questions"][0]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "POST",
            &format!("/sessions/{}/answers", id),
            Some(json!({"question_id": question_id, "selected_option": 5, "free_text": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");

        let (status, body) = send(
            &app,
            "POST",
            &format!("/sessions/{}/answers", id),
            Some(json!({"question_id": question_id, "selected_option": 5, "free_text": "it depends"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"]["answers"][0]["free_text"], "it depends");
    }

    #[tokio::test]
    async fn reports_are_versioned() {
        let app = app();
        let id = create(&app).await;

        let (status, first) = send(&app, "POST", &format!("/sessions/{}/reports", id), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["version"], 1);
        send(&app, "POST", &format!("/sessions/{}/reports", id), None).await;

        let (_, latest) = send(&app, "GET", &format!("/sessions/{}/reports/latest", id), None).await;
        assert_eq!(latest["version"], 2);
        let (status, _) = send(&app, "GET", &format!("/sessions/{}/reports/1", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, "GET", &format!("/sessions/{}/reports/9", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "REPORT_NOT_FOUND");
        let (status, _) = send(&app, "GET", &format!("/sessions/{}/reports/zero", id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn complete_without_report_is_409() {
        let app = app();
        let id = create(&app).await;

        let (status, body) = send(&app, "POST", &format!("/sessions/{}/complete", id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_STATE_TRANSITION");

        send(&app, "POST", &format!("/sessions/{}/reports", id), None).await;
        let (status, body) = send(&app, "POST", &format!("/sessions/{}/complete", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");
    }

    #[tokio::test]
    async fn invalid_and_unknown_ids() {
        let app = app();

        let (status, body) = send(&app, "GET", "/sessions/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        let missing = crate::domain::foundation::SessionId::new();
        let (status, body) = send(&app, "GET", &format!("/sessions/{}", missing), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn preset_session_starts_with_fixed_statement() {
        let app = app();

        let (status, presets) = send(&app, "GET", "/presets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(presets[0]["slug"], "career");
        assert_eq!(presets[0]["statement_count"], 1);

        let (status, body) =
            send(&app, "POST", "/sessions", Some(json!({"preset_slug": "career"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["session"]["title"], "Career values");
        assert_eq!(body["preset_questions"][0]["source"], "preset");
        assert_eq!(body["preset_questions"][0]["index"], 1);

        let (status, _) = send(&app, "GET", "/presets/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn selected_option_beyond_u8_is_400() {
        let app = app();
        let id = create(&app).await;
        let (_, body) = send(&app, "POST", &format!("/sessions/{}/progression", id), None).await;
        let question_id = body["state"]["questions"][0]["id"].as_str().unwrap().to_string();

        for option in [300, 6, -1] {
            let (status, body) = send(
                &app,
                "POST",
                &format!("/sessions/{}/answers", id),
                Some(json!({"question_id": question_id, "selected_option": option})),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "option {}", option);
            assert_eq!(body["code"], "VALIDATION_FAILED");
        }
    }

    #[tokio::test]
    async fn preset_overview_lists_answers_and_reports() {
        let app = app();
        create(&app).await;
        let (_, created) =
            send(&app, "POST", "/sessions", Some(json!({"preset_slug": "career"}))).await;
        let id = created["session"]["id"].as_str().unwrap().to_string();
        let question_id = created["preset_questions"][0]["id"].as_str().unwrap().to_string();
        send(
            &app,
            "POST",
            &format!("/sessions/{}/answers", id),
            Some(json!({"question_id": question_id, "selected_option": 3})),
        )
        .await;
        send(&app, "POST", &format!("/sessions/{}/reports", id), None).await;

        let (status, body) = send(&app, "GET", "/presets/career/sessions", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preset"]["slug"], "career");
        let sessions = body["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0]["session"]["id"], id.as_str());
        let response = &sessions[0]["responses"][0];
        assert_eq!(response["index"], 1);
        assert_eq!(response["statement"], "I enjoy my current job");
        assert_eq!(response["options"][3], "Partly");
        assert_eq!(response["selected_option"], 3);
        assert_eq!(sessions[0]["reports"][0]["version"], 1);

        let (status, body) = send(&app, "GET", "/presets/unknown/sessions", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "PRESET_NOT_FOUND");
    }

    #[tokio::test]
    async fn list_sessions_returns_created() {
        let app = app();
        create(&app).await;
        create(&app).await;

        let (status, body) = send(&app, "GET", "/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }
}
