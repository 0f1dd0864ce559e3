//! Question repository port.
//!
//! Questions are created in batches and never mutated or deleted.

use crate::domain::foundation::{DomainError, QuestionId, SessionId};
use crate::domain::interview::{IndexWindow, Question};
use async_trait::async_trait;

/// Repository port for questions.
///
/// Implementations must key questions uniquely on (session, index).
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a batch all-or-nothing.
    ///
    /// Questions whose (session, index) already exists are skipped, so a
    /// replayed batch is a no-op. Returns the questions actually inserted.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure; nothing is stored
    async fn insert_batch(&self, questions: &[Question]) -> Result<Vec<Question>, DomainError>;

    /// Find a question by ID.
    async fn find_by_id(&self, id: &QuestionId) -> Result<Option<Question>, DomainError>;

    /// All questions of a session ordered by index.
    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Question>, DomainError>;

    /// Questions of a session within an index window, ordered by index.
    async fn list_in_window(
        &self,
        session_id: &SessionId,
        window: IndexWindow,
    ) -> Result<Vec<Question>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn QuestionRepository) {}
    }
}
