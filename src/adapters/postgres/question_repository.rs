//! PostgreSQL implementation of QuestionRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, QuestionId, SessionId, Timestamp};
use crate::domain::interview::{AnswerOptions, IndexWindow, Question, QuestionSource};
use crate::ports::QuestionRepository;

use super::column;

/// PostgreSQL implementation of QuestionRepository.
#[derive(Clone)]
pub struct PostgresQuestionRepository {
    pool: PgPool,
}

impl PostgresQuestionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, session_id, question_index, statement, detail, options, source, created_at
    FROM questions
"#;

#[async_trait]
impl QuestionRepository for PostgresQuestionRepository {
    async fn insert_batch(&self, questions: &[Question]) -> Result<Vec<Question>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        let mut inserted = Vec::with_capacity(questions.len());
        for question in questions {
            let result = sqlx::query(
                r#"
                INSERT INTO questions (
                    id, session_id, question_index, statement, detail, options, source, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (session_id, question_index) DO NOTHING
                "#,
            )
            .bind(question.id().as_uuid())
            .bind(question.session_id().as_uuid())
            .bind(question.index() as i32)
            .bind(question.statement())
            .bind(question.detail())
            .bind(Json(question.options().as_slice()))
            .bind(question.source().as_str())
            .bind(question.created_at().as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Failed to insert question", e))?;

            if result.rows_affected() > 0 {
                inserted.push(question.clone());
            }
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit question batch", e))?;

        Ok(inserted)
    }

    async fn find_by_id(&self, id: &QuestionId) -> Result<Option<Question>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch question", e))?;

        row.map(row_to_question).transpose()
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Question>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE session_id = $1 ORDER BY question_index",
            SELECT_COLUMNS
        ))
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list questions", e))?;

        rows.into_iter().map(row_to_question).collect()
    }

    async fn list_in_window(
        &self,
        session_id: &SessionId,
        window: IndexWindow,
    ) -> Result<Vec<Question>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE session_id = $1 AND question_index BETWEEN $2 AND $3 ORDER BY question_index",
            SELECT_COLUMNS
        ))
        .bind(session_id.as_uuid())
        .bind(window.start as i32)
        .bind(window.end as i32)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list questions in window", e))?;

        rows.into_iter().map(row_to_question).collect()
    }
}

fn row_to_question(row: PgRow) -> Result<Question, DomainError> {
    let Json(raw_options): Json<Vec<String>> = column(&row, "options")?;
    let options = AnswerOptions::new(raw_options).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored options: {}", e))
    })?;

    let source_str: String = column(&row, "source")?;
    let source = QuestionSource::parse(&source_str).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid question source: {}", source_str),
        )
    })?;

    let index: i32 = column(&row, "question_index")?;

    Ok(Question::reconstitute(
        QuestionId::from_uuid(column(&row, "id")?),
        SessionId::from_uuid(column(&row, "session_id")?),
        index as u32,
        column(&row, "statement")?,
        column(&row, "detail")?,
        options,
        source,
        Timestamp::from_datetime(column(&row, "created_at")?),
    ))
}
