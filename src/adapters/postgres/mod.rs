//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSessionRepository` - Sessions
//! - `PostgresQuestionRepository` - Questions, unique on (session, index)
//! - `PostgresAnswerRepository` - Answers, unique on (session, question)
//! - `PostgresAnalysisRepository` - Analyses, unique on (session, batch)
//! - `PostgresReportRepository` - Reports, unique on (session, version)

mod analysis_repository;
mod answer_repository;
mod question_repository;
mod report_repository;
mod session_repository;

pub use analysis_repository::PostgresAnalysisRepository;
pub use answer_repository::PostgresAnswerRepository;
pub use question_repository::PostgresQuestionRepository;
pub use report_repository::PostgresReportRepository;
pub use session_repository::PostgresSessionRepository;

use std::path::Path;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::config::DatabaseConfig;
use crate::domain::foundation::DomainError;

/// Opens a connection pool from configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::database("Failed to connect to database", e))
}

/// Applies the migrations found in `dir`.
pub async fn run_migrations(pool: &PgPool, dir: &Path) -> Result<(), DomainError> {
    let migrator = Migrator::new(dir)
        .await
        .map_err(|e| DomainError::database("Failed to load migrations", e))?;
    migrator
        .run(pool)
        .await
        .map_err(|e| DomainError::database("Failed to run migrations", e))
}

pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database(&format!("Failed to get {}", name), e))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
