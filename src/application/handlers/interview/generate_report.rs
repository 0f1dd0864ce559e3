//! ReportGenerator - full synthesis stored as a new report version.

use std::sync::Arc;

use crate::domain::interview::{
    ActionKind, GenerationContext, GenerationMode, InterviewError, Report, ReportDraft, Session,
};
use crate::ports::StatementGenerator;

use super::repositories::InterviewRepositories;
use super::snapshot::SessionSnapshot;

/// Generates a report over the whole answered history.
#[derive(Clone)]
pub struct ReportGenerator {
    repos: InterviewRepositories,
    generator: Arc<dyn StatementGenerator>,
}

impl ReportGenerator {
    pub fn new(repos: InterviewRepositories, generator: Arc<dyn StatementGenerator>) -> Self {
        Self { repos, generator }
    }

    /// Generates a report; the store assigns the next version.
    pub async fn generate(&self, session: &Session) -> Result<Report, InterviewError> {
        let fail = |reason: String| InterviewError::generation(ActionKind::GenerateReport, None, reason);

        let snapshot = SessionSnapshot::load(&self.repos, session.id()).await?;
        let context = GenerationContext::for_report(
            &snapshot.session,
            &snapshot.questions,
            &snapshot.answer_book(),
            &snapshot.analyses,
        );

        let content = self
            .generator
            .generate(&context, GenerationMode::Report)
            .await
            .and_then(|output| output.into_text(GenerationMode::Report))
            .map_err(|e| fail(e.to_string()))?;

        let draft = ReportDraft::new(*session.id(), content).map_err(|e| fail(e.to_string()))?;
        let report = self.repos.reports.append(draft).await?;

        tracing::info!(
            session_id = %session.id(),
            version = report.version(),
            answered = context.entries.len(),
            "Report generated"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockStatementGenerator;
    use crate::adapters::memory::InMemoryInterviewStore;
    use crate::domain::foundation::SessionId;
    use crate::domain::interview::InterviewPolicy;
    use crate::ports::{ReportRepository, SessionRepository};

    async fn setup(
        generator: MockStatementGenerator,
    ) -> (Arc<InMemoryInterviewStore>, ReportGenerator, Session) {
        let store = Arc::new(InMemoryInterviewStore::new());
        let session = Session::new(SessionId::new(), "Purpose", InterviewPolicy::default())
            .unwrap()
            .with_report_instructions(Some("Use plain words".into()))
            .unwrap();
        SessionRepository::save(&*store, &session).await.unwrap();
        let reports = ReportGenerator::new(
            InterviewRepositories::from_store(store.clone()),
            Arc::new(generator),
        );
        (store, reports, session)
    }

    #[tokio::test]
    async fn versions_increase_per_request() {
        let (store, reports, session) = setup(MockStatementGenerator::new()).await;

        let v1 = reports.generate(&session).await.unwrap();
        let v2 = reports.generate(&session).await.unwrap();

        assert_eq!(v1.version(), 1);
        assert_eq!(v2.version(), 2);
        assert_eq!(store.latest(session.id()).await.unwrap().unwrap().version(), 2);
    }

    #[tokio::test]
    async fn report_without_answers_is_allowed() {
        let generator = MockStatementGenerator::new();
        let (_, reports, session) = setup(generator.clone()).await;

        reports.generate(&session).await.unwrap();

        let ctx = &generator.get_calls()[0];
        assert!(ctx.entries.is_empty());
        assert_eq!(ctx.report_instructions.as_deref(), Some("Use plain words"));
        assert_eq!(ctx.phase, None);
    }

    #[tokio::test]
    async fn failure_stores_nothing() {
        let (store, reports, session) =
            setup(MockStatementGenerator::new().failing(GenerationMode::Report)).await;

        let err = reports.generate(&session).await.unwrap_err();
        assert_eq!(
            err.code(),
            crate::domain::foundation::ErrorCode::GenerationFailed
        );
        assert!(store.latest(session.id()).await.unwrap().is_none());
    }
}
