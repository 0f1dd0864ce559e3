//! Sonar server binary.
//!
//! Wires configuration, storage, the statement generator and the preset
//! catalog into a [`ProgressionEngine`] and serves the `/api` router.

use std::error::Error;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use sonar::adapters::ai::{MockStatementGenerator, OpenAIConfig, OpenAIProvider, PromptedGenerator};
use sonar::adapters::http::api_router;
use sonar::adapters::memory::InMemoryInterviewStore;
use sonar::adapters::postgres::{
    self, PostgresAnalysisRepository, PostgresAnswerRepository, PostgresQuestionRepository,
    PostgresReportRepository, PostgresSessionRepository,
};
use sonar::adapters::presets::YamlPresetCatalog;
use sonar::application::{EngineSettings, InterviewRepositories, ProgressionEngine};
use sonar::config::{AiBackend, AppConfig, ServerConfig};
use sonar::domain::interview::{InterviewPolicy, PhaseProfile};
use sonar::ports::{PresetCatalog, StatementGenerator};

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let repos = build_repositories(&config).await?;
    let generator = build_generator(&config)?;
    let presets = build_presets(&config).await?;

    let settings = EngineSettings {
        defaults: InterviewPolicy::new(
            config.interview.batch_size,
            config.interview.target_question_count,
            PhaseProfile::default(),
        )?,
        recent_sessions_limit: config.interview.recent_sessions_limit,
    };
    let engine = ProgressionEngine::new(repos, generator, presets, settings);

    let app = with_layers(api_router(engine), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, environment = ?config.server.environment, "Sonar listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn build_repositories(config: &AppConfig) -> Result<InterviewRepositories, BoxError> {
    let Some(database) = &config.database else {
        tracing::warn!("No database configured, sessions are kept in memory");
        return Ok(InterviewRepositories::from_store(Arc::new(
            InMemoryInterviewStore::new(),
        )));
    };

    let pool = postgres::connect(database).await?;
    if database.run_migrations {
        postgres::run_migrations(&pool, &database.migrations_dir).await?;
        tracing::info!(dir = %database.migrations_dir.display(), "Migrations applied");
    }

    Ok(InterviewRepositories::new(
        Arc::new(PostgresSessionRepository::new(pool.clone())),
        Arc::new(PostgresQuestionRepository::new(pool.clone())),
        Arc::new(PostgresAnswerRepository::new(pool.clone())),
        Arc::new(PostgresAnalysisRepository::new(pool.clone())),
        Arc::new(PostgresReportRepository::new(pool)),
    ))
}

fn build_generator(config: &AppConfig) -> Result<Arc<dyn StatementGenerator>, BoxError> {
    match config.ai.backend {
        AiBackend::OpenAI => {
            let provider = OpenAIProvider::new(OpenAIConfig::from_app_config(&config.ai)?)?;
            tracing::info!(model = %config.ai.model, base_url = %config.ai.base_url, "Using prompted generator");
            Ok(Arc::new(PromptedGenerator::from_config(
                Arc::new(provider),
                &config.ai,
            )))
        }
        AiBackend::Mock => {
            tracing::warn!("Using mock statement generator");
            Ok(Arc::new(MockStatementGenerator::new()))
        }
    }
}

async fn build_presets(config: &AppConfig) -> Result<Arc<dyn PresetCatalog>, BoxError> {
    match &config.interview.presets_file {
        Some(path) => {
            let catalog = YamlPresetCatalog::load(path).await?;
            tracing::info!(path = %path.display(), count = catalog.len(), "Presets loaded");
            Ok(Arc::new(catalog))
        }
        None => Ok(Arc::new(YamlPresetCatalog::empty())),
    }
}

fn with_layers(router: Router, server: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = if origins.is_empty() && !server.is_production() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    router
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
