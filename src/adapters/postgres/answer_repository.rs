//! PostgreSQL implementation of AnswerRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, QuestionId, SessionId, Timestamp};
use crate::domain::interview::Answer;
use crate::ports::AnswerRepository;

use super::column;

/// PostgreSQL implementation of AnswerRepository.
#[derive(Clone)]
pub struct PostgresAnswerRepository {
    pool: PgPool,
}

impl PostgresAnswerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnswerRepository for PostgresAnswerRepository {
    async fn upsert(&self, answer: &Answer) -> Result<Answer, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO answers (session_id, question_id, selected_option, free_text, answered_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_id, question_id) DO UPDATE SET
                selected_option = EXCLUDED.selected_option,
                free_text = EXCLUDED.free_text,
                answered_at = EXCLUDED.answered_at
            RETURNING session_id, question_id, selected_option, free_text, answered_at
            "#,
        )
        .bind(answer.session_id().as_uuid())
        .bind(answer.question_id().as_uuid())
        .bind(answer.selected_option() as i16)
        .bind(answer.free_text())
        .bind(answer.answered_at().as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to upsert answer", e))?;

        row_to_answer(row)
    }

    async fn find(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
    ) -> Result<Option<Answer>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT session_id, question_id, selected_option, free_text, answered_at
            FROM answers
            WHERE session_id = $1 AND question_id = $2
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(question_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch answer", e))?;

        row.map(row_to_answer).transpose()
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Answer>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, question_id, selected_option, free_text, answered_at
            FROM answers
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list answers", e))?;

        rows.into_iter().map(row_to_answer).collect()
    }
}

fn row_to_answer(row: PgRow) -> Result<Answer, DomainError> {
    let option: i16 = column(&row, "selected_option")?;
    Ok(Answer::reconstitute(
        SessionId::from_uuid(column(&row, "session_id")?),
        QuestionId::from_uuid(column(&row, "question_id")?),
        option as u8,
        column(&row, "free_text")?,
        Timestamp::from_datetime(column(&row, "answered_at")?),
    ))
}
