//! PostgreSQL implementation of AnalysisRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{AnalysisId, DomainError, SessionId, Timestamp};
use crate::domain::interview::{Analysis, BatchWindow, IndexWindow};
use crate::ports::AnalysisRepository;

use super::column;

/// PostgreSQL implementation of AnalysisRepository.
#[derive(Clone)]
pub struct PostgresAnalysisRepository {
    pool: PgPool,
}

impl PostgresAnalysisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, session_id, batch_index, start_index, end_index, text, created_at
    FROM analyses
"#;

#[async_trait]
impl AnalysisRepository for PostgresAnalysisRepository {
    async fn upsert(&self, analysis: &Analysis) -> Result<Analysis, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO analyses (id, session_id, batch_index, start_index, end_index, text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (session_id, batch_index) DO NOTHING
            "#,
        )
        .bind(analysis.id().as_uuid())
        .bind(analysis.session_id().as_uuid())
        .bind(analysis.batch_index() as i32)
        .bind(analysis.batch().start() as i32)
        .bind(analysis.batch().end() as i32)
        .bind(analysis.text())
        .bind(analysis.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to insert analysis", e))?;

        // The stored row may predate this call.
        self.find_by_batch(analysis.session_id(), analysis.batch_index())
            .await?
            .ok_or_else(|| DomainError::database("Analysis vanished after insert", analysis.id()))
    }

    async fn find_by_batch(
        &self,
        session_id: &SessionId,
        batch_index: u32,
    ) -> Result<Option<Analysis>, DomainError> {
        let row = sqlx::query(&format!(
            "{} WHERE session_id = $1 AND batch_index = $2",
            SELECT_COLUMNS
        ))
        .bind(session_id.as_uuid())
        .bind(batch_index as i32)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch analysis", e))?;

        row.map(row_to_analysis).transpose()
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Analysis>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE session_id = $1 ORDER BY batch_index",
            SELECT_COLUMNS
        ))
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list analyses", e))?;

        rows.into_iter().map(row_to_analysis).collect()
    }
}

fn row_to_analysis(row: PgRow) -> Result<Analysis, DomainError> {
    let batch_index: i32 = column(&row, "batch_index")?;
    let start: i32 = column(&row, "start_index")?;
    let end: i32 = column(&row, "end_index")?;

    Ok(Analysis::reconstitute(
        AnalysisId::from_uuid(column(&row, "id")?),
        SessionId::from_uuid(column(&row, "session_id")?),
        BatchWindow {
            batch_index: batch_index as u32,
            window: IndexWindow {
                start: start as u32,
                end: end as u32,
            },
        },
        column(&row, "text")?,
        Timestamp::from_datetime(column(&row, "created_at")?),
    ))
}
