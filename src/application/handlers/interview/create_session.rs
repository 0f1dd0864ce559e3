//! CreateSessionHandler - Command handler for starting an interview.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, ValidationError};
use crate::domain::interview::{
    InterviewError, InterviewPolicy, Question, QuestionSource, Session, SessionPreset,
};
use crate::ports::PresetCatalog;

use super::repositories::InterviewRepositories;

/// Command to create a session, optionally from a preset.
///
/// Explicit fields override the preset's values.
#[derive(Debug, Clone, Default)]
pub struct CreateSessionCommand {
    pub purpose: Option<String>,
    pub title: Option<String>,
    pub background_text: Option<String>,
    pub report_instructions: Option<String>,
    pub preset_slug: Option<String>,
    pub target_question_count: Option<u32>,
}

impl CreateSessionCommand {
    pub fn with_purpose(purpose: impl Into<String>) -> Self {
        Self {
            purpose: Some(purpose.into()),
            ..Default::default()
        }
    }

    pub fn from_preset(slug: impl Into<String>) -> Self {
        Self {
            preset_slug: Some(slug.into()),
            ..Default::default()
        }
    }
}

/// Result of successful session creation.
#[derive(Debug, Clone)]
pub struct CreateSessionResult {
    pub session: Session,
    /// Fixed opening statements from the preset, at indices 1..=k.
    pub preset_questions: Vec<Question>,
}

/// Handler for creating sessions.
pub struct CreateSessionHandler {
    repos: InterviewRepositories,
    presets: Arc<dyn PresetCatalog>,
    defaults: InterviewPolicy,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CreateSessionHandler {
    pub fn new(
        repos: InterviewRepositories,
        presets: Arc<dyn PresetCatalog>,
        defaults: InterviewPolicy,
    ) -> Self {
        Self {
            repos,
            presets,
            defaults,
        }
    }

    pub async fn handle(&self, cmd: CreateSessionCommand) -> Result<CreateSessionResult, InterviewError> {
        let preset = match cmd.preset_slug.as_deref() {
            Some(slug) => Some(
                self.presets
                    .find(slug)
                    .ok_or_else(|| InterviewError::not_found("Preset", slug))?,
            ),
            None => None,
        };

        let session = self.build_session(&cmd, preset.as_ref())?;
        let preset_questions = match &preset {
            Some(p) => p
                .drafts()?
                .into_iter()
                .zip(1u32..)
                .map(|(draft, index)| {
                    Question::from_draft(*session.id(), index, draft, QuestionSource::Preset)
                })
                .collect(),
            None => Vec::new(),
        };

        self.repos.sessions.save(&session).await?;
        if !preset_questions.is_empty() {
            self.repos.questions.insert_batch(&preset_questions).await?;
        }

        tracing::info!(
            session_id = %session.id(),
            preset = session.preset_slug().unwrap_or("-"),
            target = session.target_question_count(),
            preset_questions = preset_questions.len(),
            "Session created"
        );

        Ok(CreateSessionResult {
            session,
            preset_questions,
        })
    }

    fn build_session(
        &self,
        cmd: &CreateSessionCommand,
        preset: Option<&SessionPreset>,
    ) -> Result<Session, InterviewError> {
        let purpose = non_blank(cmd.purpose.clone())
            .or_else(|| preset.map(|p| p.purpose.clone()))
            .ok_or_else(|| ValidationError::empty_field("purpose"))?;

        let target = cmd
            .target_question_count
            .or_else(|| preset.and_then(|p| p.target_question_count))
            .unwrap_or(self.defaults.target_question_count);
        let policy = InterviewPolicy::new(
            self.defaults.batch_size,
            target,
            self.defaults.phase_profile.clone(),
        )?;

        let title = non_blank(cmd.title.clone()).or_else(|| preset.map(|p| p.title.clone()));
        let background = non_blank(cmd.background_text.clone())
            .or_else(|| preset.and_then(|p| p.background_text.clone()));
        let instructions = non_blank(cmd.report_instructions.clone())
            .or_else(|| preset.and_then(|p| p.report_instructions.clone()));

        let mut session = Session::new(SessionId::new(), purpose, policy)?
            .with_title(title)?
            .with_background(background)?
            .with_report_instructions(instructions)?;
        if let Some(p) = preset {
            session = session.with_preset_slug(p.slug.clone());
        }
        Ok(session)
    }
}
