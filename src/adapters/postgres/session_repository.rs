//! PostgreSQL implementation of SessionRepository.
//!
//! Persists Session aggregates to PostgreSQL.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, SessionStatus, Timestamp};
use crate::domain::interview::{InterviewPolicy, PhaseProfile, Session};
use crate::ports::SessionRepository;

use super::column;

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a new PostgresSessionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, purpose, background_text, report_instructions, preset_slug,
           batch_size, target_question_count, phase_profile, status,
           created_at, updated_at
    FROM sessions
"#;

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, title, purpose, background_text, report_instructions, preset_slug,
                batch_size, target_question_count, phase_profile, status,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.title())
        .bind(session.purpose())
        .bind(session.background_text())
        .bind(session.report_instructions())
        .bind(session.preset_slug())
        .bind(session.batch_size() as i32)
        .bind(session.target_question_count() as i32)
        .bind(Json(session.phase_profile()))
        .bind(session.status().as_str())
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to insert session", e))?;

        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                status = $2,
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.status().as_str())
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to update session", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch session", e))?;

        row.map(row_to_session).transpose()
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Session>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} ORDER BY created_at DESC LIMIT $1",
            SELECT_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list sessions", e))?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn list_by_preset(&self, slug: &str) -> Result<Vec<Session>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE preset_slug = $1 ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .bind(slug)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list preset sessions", e))?;

        rows.into_iter().map(row_to_session).collect()
    }
}

fn row_to_session(row: PgRow) -> Result<Session, DomainError> {
    let status_str: String = column(&row, "status")?;
    let status = SessionStatus::parse(&status_str).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid session status: {}", status_str),
        )
    })?;

    let batch_size: i32 = column(&row, "batch_size")?;
    let target: i32 = column(&row, "target_question_count")?;
    let Json(phase_profile): Json<PhaseProfile> = column(&row, "phase_profile")?;

    Ok(Session::reconstitute(
        SessionId::from_uuid(column(&row, "id")?),
        column(&row, "title")?,
        column(&row, "purpose")?,
        column(&row, "background_text")?,
        column(&row, "report_instructions")?,
        column(&row, "preset_slug")?,
        InterviewPolicy {
            batch_size: batch_size.max(1) as u32,
            target_question_count: target.max(1) as u32,
            phase_profile,
        },
        status,
        Timestamp::from_datetime(column(&row, "created_at")?),
        Timestamp::from_datetime(column(&row, "updated_at")?),
    ))
}
