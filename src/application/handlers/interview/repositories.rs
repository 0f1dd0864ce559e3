//! Repository bundle shared by interview handlers.

use std::sync::Arc;

use crate::ports::{
    AnalysisRepository, AnswerRepository, QuestionRepository, ReportRepository,
    SessionRepository,
};

/// Every persistence port an interview handler may need.
#[derive(Clone)]
pub struct InterviewRepositories {
    pub sessions: Arc<dyn SessionRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub analyses: Arc<dyn AnalysisRepository>,
    pub reports: Arc<dyn ReportRepository>,
}

impl InterviewRepositories {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        questions: Arc<dyn QuestionRepository>,
        answers: Arc<dyn AnswerRepository>,
        analyses: Arc<dyn AnalysisRepository>,
        reports: Arc<dyn ReportRepository>,
    ) -> Self {
        Self {
            sessions,
            questions,
            answers,
            analyses,
            reports,
        }
    }

    /// One store object serving all five ports.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: SessionRepository
            + QuestionRepository
            + AnswerRepository
            + AnalysisRepository
            + ReportRepository
            + 'static,
    {
        Self {
            sessions: store.clone(),
            questions: store.clone(),
            answers: store.clone(),
            analyses: store.clone(),
            reports: store,
        }
    }
}
