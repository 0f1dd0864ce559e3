//! BatchGenerator - generates and persists the statements of one window.

use std::sync::Arc;

use crate::domain::interview::{
    ActionKind, GenerationContext, GenerationMode, IndexWindow, InterviewError, Question,
    QuestionDraft, QuestionSource, Session,
};
use crate::ports::StatementGenerator;

use super::repositories::InterviewRepositories;
use super::snapshot::SessionSnapshot;

/// Generates a block of statements.
///
/// The generator's output is validated in full before anything is stored,
/// so a failed generation persists no questions.
#[derive(Clone)]
pub struct BatchGenerator {
    repos: InterviewRepositories,
    generator: Arc<dyn StatementGenerator>,
}

impl BatchGenerator {
    pub fn new(repos: InterviewRepositories, generator: Arc<dyn StatementGenerator>) -> Self {
        Self { repos, generator }
    }

    /// Generates questions for `window` and stores them.
    ///
    /// Generation starts at the first unoccupied index of `window` as seen
    /// by a fresh read. Returns the questions actually inserted; a fully
    /// occupied window makes no generator call.
    pub async fn generate(
        &self,
        session: &Session,
        window: IndexWindow,
    ) -> Result<Vec<Question>, InterviewError> {
        let snapshot = SessionSnapshot::load(&self.repos, session.id()).await?;

        // The decision may predate a concurrent run that already filled the window.
        let Some(start) = window.indices().find(|i| snapshot.question_at(*i).is_none()) else {
            tracing::debug!(
                session_id = %session.id(),
                start = window.start,
                end = window.end,
                "Batch window already filled"
            );
            return Ok(Vec::new());
        };
        let window = IndexWindow {
            start,
            end: window.end,
        };

        let fail = |reason: String| {
            InterviewError::generation(ActionKind::GenerateBatch, Some(window), reason)
        };

        let context = GenerationContext::for_batch(
            &snapshot.session,
            &snapshot.questions,
            &snapshot.answer_book(),
            &snapshot.analyses,
            window,
        );

        let statements = self
            .generator
            .generate(&context, GenerationMode::Batch)
            .await
            .and_then(|output| output.into_statements())
            .map_err(|e| fail(e.to_string()))?;

        if statements.len() != window.len() as usize {
            return Err(fail(format!(
                "expected {} statements, got {}",
                window.len(),
                statements.len()
            )));
        }

        let questions = statements
            .into_iter()
            .zip(window.indices())
            .map(|(item, index)| {
                QuestionDraft::new(item.statement, item.detail, item.options)
                    .map(|draft| {
                        Question::from_draft(*session.id(), index, draft, QuestionSource::Generated)
                    })
                    .map_err(|e| fail(format!("statement for Q{} is invalid: {}", index, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let inserted = self.repos.questions.insert_batch(&questions).await?;

        tracing::info!(
            session_id = %session.id(),
            start = window.start,
            end = window.end,
            inserted = inserted.len(),
            "Batch generated"
        );

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{sample_statement, MockStatementGenerator};
    use crate::adapters::memory::InMemoryInterviewStore;
    use crate::domain::foundation::SessionId;
    use crate::domain::interview::{InterviewPolicy, Phase};
    use crate::ports::{GeneratedStatement, GeneratorError, SessionRepository};

    async fn setup(
        generator: MockStatementGenerator,
    ) -> (Arc<InMemoryInterviewStore>, BatchGenerator, Session) {
        let store = Arc::new(InMemoryInterviewStore::new());
        let session = Session::new(SessionId::new(), "Purpose", InterviewPolicy::default()).unwrap();
        SessionRepository::save(&*store, &session).await.unwrap();
        let batch = BatchGenerator::new(
            InterviewRepositories::from_store(store.clone()),
            Arc::new(generator),
        );
        (store, batch, session)
    }

    fn window(start: u32, end: u32) -> IndexWindow {
        IndexWindow::new(start, end).unwrap()
    }

    #[tokio::test]
    async fn persists_full_window() {
        let (store, batch, session) = setup(MockStatementGenerator::new()).await;

        let questions = batch.generate(&session, window(1, 5)).await.unwrap();

        assert_eq!(questions.len(), 5);
        assert_eq!(store.question_count(session.id()).await, 5);
        let indices: Vec<u32> = questions.iter().map(|q| q.index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn short_output_persists_nothing() {
        let statements: Vec<GeneratedStatement> = (1..=4).map(sample_statement).collect();
        let (store, batch, session) =
            setup(MockStatementGenerator::new().with_statements(statements)).await;

        let err = batch.generate(&session, window(1, 5)).await.unwrap_err();

        match err {
            InterviewError::Generation { action, window: w, reason } => {
                assert_eq!(action, ActionKind::GenerateBatch);
                assert_eq!(w, Some(window(1, 5)));
                assert!(reason.contains("expected 5 statements, got 4"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.question_count(session.id()).await, 0);
    }

    #[tokio::test]
    async fn invalid_item_persists_nothing() {
        let mut statements: Vec<GeneratedStatement> = (1..=5).map(sample_statement).collect();
        statements[2].options.truncate(3);
        let (store, batch, session) =
            setup(MockStatementGenerator::new().with_statements(statements)).await;

        let err = batch.generate(&session, window(1, 5)).await.unwrap_err();
        assert!(err.to_string().contains("Q3"));
        assert_eq!(store.question_count(session.id()).await, 0);
    }

    #[tokio::test]
    async fn blank_statement_persists_nothing() {
        let mut statements: Vec<GeneratedStatement> = (1..=5).map(sample_statement).collect();
        statements[0].statement = "  ".into();
        let (store, batch, session) =
            setup(MockStatementGenerator::new().with_statements(statements)).await;

        assert!(batch.generate(&session, window(1, 5)).await.is_err());
        assert_eq!(store.question_count(session.id()).await, 0);
    }

    #[tokio::test]
    async fn generator_failure_is_generation_error() {
        let (_, batch, session) = setup(
            MockStatementGenerator::new().with_error(GeneratorError::malformed("not json")),
        )
        .await;

        let err = batch.generate(&session, window(1, 5)).await.unwrap_err();
        assert!(matches!(err, InterviewError::Generation { .. }));
    }

    #[tokio::test]
    async fn context_carries_window_phase() {
        let generator = MockStatementGenerator::new();
        let (_, batch, session) = setup(generator.clone()).await;

        batch.generate(&session, window(1, 5)).await.unwrap();
        batch.generate(&session, window(6, 10)).await.unwrap();
        batch.generate(&session, window(11, 15)).await.unwrap();
        batch.generate(&session, window(16, 20)).await.unwrap();

        let calls = generator.get_calls();
        assert_eq!(calls[0].entries.len(), 0);
        assert_eq!(calls[1].entries.len(), 5);
        assert_eq!(calls[1].entries[0].answer, "unanswered");
        assert_eq!(calls[2].phase, Some(Phase::Exploration));
        assert_eq!(calls[3].phase, Some(Phase::DeepDive));
    }

    #[tokio::test]
    async fn filled_window_skips_generator() {
        let generator = MockStatementGenerator::new();
        let (store, batch, session) = setup(generator.clone()).await;
        batch.generate(&session, window(1, 5)).await.unwrap();

        let again = batch.generate(&session, window(1, 5)).await.unwrap();
        assert!(again.is_empty());
        assert_eq!(store.question_count(session.id()).await, 5);
        assert_eq!(generator.calls_for(GenerationMode::Batch), 1);
    }

    #[tokio::test]
    async fn partly_filled_window_requests_only_the_rest() {
        let generator = MockStatementGenerator::new();
        let (store, batch, session) = setup(generator.clone()).await;
        batch.generate(&session, window(1, 3)).await.unwrap();

        let rest = batch.generate(&session, window(1, 5)).await.unwrap();

        let indices: Vec<u32> = rest.iter().map(|q| q.index()).collect();
        assert_eq!(indices, vec![4, 5]);
        assert_eq!(generator.get_calls()[1].target_window, Some(window(4, 5)));
        assert_eq!(store.question_count(session.id()).await, 5);
    }
}
