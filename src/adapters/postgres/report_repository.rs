//! PostgreSQL implementation of ReportRepository.
//!
//! Versions are computed inside the INSERT so concurrent appends cannot read
//! the same maximum; a unique-key collision is retried.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, ReportId, SessionId, Timestamp};
use crate::domain::interview::{Report, ReportDraft};
use crate::ports::ReportRepository;

use super::{column, is_unique_violation};

const MAX_APPEND_ATTEMPTS: u32 = 5;

/// PostgreSQL implementation of ReportRepository.
#[derive(Clone)]
pub struct PostgresReportRepository {
    pool: PgPool,
}

impl PostgresReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, session_id, version, content, created_at
    FROM reports
"#;

#[async_trait]
impl ReportRepository for PostgresReportRepository {
    async fn append(&self, draft: ReportDraft) -> Result<Report, DomainError> {
        let id = ReportId::new();
        let created_at = Timestamp::now();

        for attempt in 1..=MAX_APPEND_ATTEMPTS {
            let result = sqlx::query(
                r#"
                INSERT INTO reports (id, session_id, version, content, created_at)
                SELECT $1, $2, COALESCE(MAX(version), 0) + 1, $3, $4
                FROM reports WHERE session_id = $2
                RETURNING id, session_id, version, content, created_at
                "#,
            )
            .bind(id.as_uuid())
            .bind(draft.session_id.as_uuid())
            .bind(&draft.content)
            .bind(created_at.as_datetime())
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(row) => return row_to_report(row),
                Err(e) if is_unique_violation(&e) => {
                    tracing::debug!(
                        session_id = %draft.session_id,
                        attempt,
                        "Report version collision, retrying"
                    );
                }
                Err(e) => return Err(DomainError::database("Failed to insert report", e)),
            }
        }

        Err(DomainError::new(
            ErrorCode::Conflict,
            format!(
                "Could not assign a report version for session {} after {} attempts",
                draft.session_id, MAX_APPEND_ATTEMPTS
            ),
        ))
    }

    async fn latest(&self, session_id: &SessionId) -> Result<Option<Report>, DomainError> {
        let row = sqlx::query(&format!(
            "{} WHERE session_id = $1 ORDER BY version DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch latest report", e))?;

        row.map(row_to_report).transpose()
    }

    async fn find_version(
        &self,
        session_id: &SessionId,
        version: u32,
    ) -> Result<Option<Report>, DomainError> {
        let row = sqlx::query(&format!(
            "{} WHERE session_id = $1 AND version = $2",
            SELECT_COLUMNS
        ))
        .bind(session_id.as_uuid())
        .bind(version as i32)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch report", e))?;

        row.map(row_to_report).transpose()
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Report>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE session_id = $1 ORDER BY version",
            SELECT_COLUMNS
        ))
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list reports", e))?;

        rows.into_iter().map(row_to_report).collect()
    }
}

fn row_to_report(row: PgRow) -> Result<Report, DomainError> {
    let version: i32 = column(&row, "version")?;
    Ok(Report::reconstitute(
        ReportId::from_uuid(column(&row, "id")?),
        SessionId::from_uuid(column(&row, "session_id")?),
        version as u32,
        column(&row, "content")?,
        Timestamp::from_datetime(column(&row, "created_at")?),
    ))
}
