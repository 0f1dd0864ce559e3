//! Fresh read of everything known about one session.

use std::collections::{BTreeSet, HashSet};

use crate::domain::foundation::SessionId;
use crate::domain::interview::{
    decide, Analysis, Answer, AnswerBook, Decision, InterviewError, Progress, Question, Session,
};

use super::repositories::InterviewRepositories;

/// Session with its questions, answers and analyses at one point in time.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session: Session,
    /// Ordered by index.
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
    /// Ordered by batch index.
    pub analyses: Vec<Analysis>,
}

impl SessionSnapshot {
    /// Loads a snapshot, or `NotFound` for an unknown session.
    pub async fn load(
        repos: &InterviewRepositories,
        session_id: &SessionId,
    ) -> Result<Self, InterviewError> {
        let session = repos
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| InterviewError::not_found("Session", session_id))?;

        let mut questions = repos.questions.list_by_session(session_id).await?;
        questions.sort_by_key(|q| q.index());

        let known: HashSet<_> = questions.iter().map(|q| *q.id()).collect();
        let answers = repos
            .answers
            .list_by_session(session_id)
            .await?
            .into_iter()
            .filter(|a| known.contains(a.question_id()))
            .collect();

        let mut analyses = repos.analyses.list_by_session(session_id).await?;
        analyses.sort_by_key(|a| a.batch_index());

        Ok(Self {
            session,
            questions,
            answers,
            analyses,
        })
    }

    pub fn answer_book(&self) -> AnswerBook {
        AnswerBook::new(self.answers.iter().cloned())
    }

    pub fn progress(&self) -> Progress {
        Progress {
            status: self.session.status(),
            batch_size: self.session.batch_size(),
            target_question_count: self.session.target_question_count(),
            question_count: self.questions.iter().map(|q| q.index()).max().unwrap_or(0),
            answered_count: self.answers.len() as u32,
            analyzed_batches: self
                .analyses
                .iter()
                .map(|a| a.batch_index())
                .collect::<BTreeSet<_>>(),
        }
    }

    pub fn decision(&self) -> Decision {
        decide(&self.progress())
    }

    pub fn question_at(&self, index: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.index() == index)
    }
}
