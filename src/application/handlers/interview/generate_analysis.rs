//! AnalysisGenerator - synthesizes one completed batch.

use std::sync::Arc;

use crate::domain::interview::{
    ActionKind, Analysis, BatchWindow, GenerationContext, GenerationMode, InterviewError, Session,
};
use crate::ports::StatementGenerator;

use super::repositories::InterviewRepositories;
use super::snapshot::SessionSnapshot;

/// Generates the analysis of a fully answered batch.
#[derive(Clone)]
pub struct AnalysisGenerator {
    repos: InterviewRepositories,
    generator: Arc<dyn StatementGenerator>,
}

impl AnalysisGenerator {
    pub fn new(repos: InterviewRepositories, generator: Arc<dyn StatementGenerator>) -> Self {
        Self { repos, generator }
    }

    /// Generates and stores the analysis for `batch`.
    ///
    /// # Errors
    ///
    /// - `IncompleteBatch` naming the first index without a question or answer
    /// - `Generation` when the generator fails or returns blank text
    pub async fn generate(
        &self,
        session: &Session,
        batch: BatchWindow,
    ) -> Result<Analysis, InterviewError> {
        let snapshot = SessionSnapshot::load(&self.repos, session.id()).await?;
        let answers = snapshot.answer_book();

        for index in batch.window.indices() {
            let answered = snapshot
                .question_at(index)
                .is_some_and(|q| answers.is_answered(q.id()));
            if !answered {
                return Err(InterviewError::IncompleteBatch {
                    batch_index: batch.batch_index,
                    missing_index: index,
                });
            }
        }

        // Analyses are immutable; an existing row is the answer.
        if let Some(existing) = snapshot
            .analyses
            .iter()
            .find(|a| a.batch_index() == batch.batch_index)
        {
            return Ok(existing.clone());
        }

        let fail = |reason: String| {
            InterviewError::generation(ActionKind::GenerateAnalysis, Some(batch.window), reason)
        };

        let context = GenerationContext::for_analysis(
            &snapshot.session,
            &snapshot.questions,
            &answers,
            &snapshot.analyses,
            batch,
        );
        let text = self
            .generator
            .generate(&context, GenerationMode::Analysis)
            .await
            .and_then(|output| output.into_text(GenerationMode::Analysis))
            .map_err(|e| fail(e.to_string()))?;

        let analysis =
            Analysis::new(*session.id(), batch, text).map_err(|e| fail(e.to_string()))?;
        let stored = self.repos.analyses.upsert(&analysis).await?;

        tracing::info!(
            session_id = %session.id(),
            batch_index = batch.batch_index,
            start = batch.start(),
            end = batch.end(),
            "Analysis generated"
        );

        Ok(stored)
    }
}
