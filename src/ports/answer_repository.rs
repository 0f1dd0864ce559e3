//! Answer repository port.

use crate::domain::foundation::{DomainError, QuestionId, SessionId};
use crate::domain::interview::Answer;
use async_trait::async_trait;

/// Repository port for answers, keyed on (session, question).
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Insert or replace the answer for its (session, question).
    ///
    /// Returns the stored answer.
    async fn upsert(&self, answer: &Answer) -> Result<Answer, DomainError>;

    /// Find the answer to one question.
    async fn find(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
    ) -> Result<Option<Answer>, DomainError>;

    /// All answers of a session.
    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Answer>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn AnswerRepository) {}
    }
}
