//! SubmitAnswerHandler - Command handler for recording an answer.

use crate::domain::foundation::{QuestionId, SessionId};
use crate::domain::interview::{Answer, InterviewError};

use super::repositories::InterviewRepositories;

/// Command to answer one question. Re-submitting replaces the answer.
#[derive(Debug, Clone)]
pub struct SubmitAnswerCommand {
    pub session_id: SessionId,
    pub question_id: QuestionId,
    pub selected_option: u8,
    pub free_text: Option<String>,
}

/// Handler for answer submission.
pub struct SubmitAnswerHandler {
    repos: InterviewRepositories,
}

impl SubmitAnswerHandler {
    pub fn new(repos: InterviewRepositories) -> Self {
        Self { repos }
    }

    pub async fn handle(&self, cmd: SubmitAnswerCommand) -> Result<Answer, InterviewError> {
        let answer = Answer::new(
            cmd.session_id,
            cmd.question_id,
            cmd.selected_option,
            cmd.free_text,
        )?;

        let session = self
            .repos
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| InterviewError::not_found("Session", cmd.session_id))?;
        if !session.is_active() {
            return Err(InterviewError::invalid_state(
                "Session is completed and no longer accepts answers",
            ));
        }

        let question = self
            .repos
            .questions
            .find_by_id(&cmd.question_id)
            .await?
            .filter(|q| q.session_id() == &cmd.session_id)
            .ok_or_else(|| InterviewError::not_found("Question", cmd.question_id))?;

        let stored = self.repos.answers.upsert(&answer).await?;

        tracing::debug!(
            session_id = %cmd.session_id,
            question_index = question.index(),
            option = stored.selected_option(),
            "Answer recorded"
        );

        Ok(stored)
    }
}
