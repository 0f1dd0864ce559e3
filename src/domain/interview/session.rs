//! Session aggregate entity.
//!
//! A session is one interview instance. Its purpose, background and pacing
//! policy (batch size, target count, phase profile) are fixed at creation;
//! only the lifecycle status changes afterwards.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, SessionId, SessionStatus, Timestamp, ValidationError,
};

use super::batch::{DEFAULT_BATCH_SIZE, DEFAULT_TARGET_QUESTION_COUNT};
use super::phase::PhaseProfile;

/// Maximum length for the interview purpose.
pub const MAX_PURPOSE_LENGTH: usize = 5_000;

/// Maximum length for background text.
pub const MAX_BACKGROUND_LENGTH: usize = 50_000;

/// Maximum length for report instructions.
pub const MAX_REPORT_INSTRUCTIONS_LENGTH: usize = 10_000;

/// Maximum length for the session title.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Characters of the purpose used when no title is given.
const DERIVED_TITLE_CHARS: usize = 50;

/// Pacing policy carried by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewPolicy {
    pub batch_size: u32,
    pub target_question_count: u32,
    pub phase_profile: PhaseProfile,
}

impl InterviewPolicy {
    /// Creates a policy, rejecting zero batch size or target.
    pub fn new(
        batch_size: u32,
        target_question_count: u32,
        phase_profile: PhaseProfile,
    ) -> Result<Self, ValidationError> {
        if batch_size == 0 {
            return Err(ValidationError::out_of_range("batch_size", 1, i32::MAX, 0));
        }
        if target_question_count == 0 {
            return Err(ValidationError::out_of_range(
                "target_question_count",
                1,
                i32::MAX,
                0,
            ));
        }
        Ok(Self {
            batch_size,
            target_question_count,
            phase_profile,
        })
    }
}

impl Default for InterviewPolicy {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            target_question_count: DEFAULT_TARGET_QUESTION_COUNT,
            phase_profile: PhaseProfile::default(),
        }
    }
}

/// Session aggregate.
///
/// # Invariants
///
/// - `purpose` is non-empty and at most 5000 characters
/// - `policy.batch_size` and `policy.target_question_count` are positive
/// - Completed sessions never return to active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    title: String,
    purpose: String,
    background_text: Option<String>,
    report_instructions: Option<String>,
    preset_slug: Option<String>,
    policy: InterviewPolicy,
    status: SessionStatus,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Session {
    /// Create a new active session.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if purpose is empty or too long
    pub fn new(
        id: SessionId,
        purpose: impl Into<String>,
        policy: InterviewPolicy,
    ) -> Result<Self, ValidationError> {
        let purpose = purpose.into().trim().to_string();
        if purpose.is_empty() {
            return Err(ValidationError::empty_field("purpose"));
        }
        if purpose.chars().count() > MAX_PURPOSE_LENGTH {
            return Err(ValidationError::too_long("purpose", MAX_PURPOSE_LENGTH));
        }

        let title = purpose.chars().take(DERIVED_TITLE_CHARS).collect();
        let now = Timestamp::now();
        Ok(Self {
            id,
            title,
            purpose,
            background_text: None,
            report_instructions: None,
            preset_slug: None,
            policy,
            status: SessionStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sets an explicit title. Blank titles keep the derived one.
    pub fn with_title(mut self, title: Option<String>) -> Result<Self, ValidationError> {
        if let Some(title) = non_blank(title) {
            if title.chars().count() > MAX_TITLE_LENGTH {
                return Err(ValidationError::too_long("title", MAX_TITLE_LENGTH));
            }
            self.title = title;
        }
        Ok(self)
    }

    /// Sets the background text.
    pub fn with_background(mut self, text: Option<String>) -> Result<Self, ValidationError> {
        let text = non_blank(text);
        if text.as_ref().is_some_and(|t| t.chars().count() > MAX_BACKGROUND_LENGTH) {
            return Err(ValidationError::too_long("background_text", MAX_BACKGROUND_LENGTH));
        }
        self.background_text = text;
        Ok(self)
    }

    /// Sets extra instructions for report generation.
    pub fn with_report_instructions(
        mut self,
        text: Option<String>,
    ) -> Result<Self, ValidationError> {
        let text = non_blank(text);
        if text
            .as_ref()
            .is_some_and(|t| t.chars().count() > MAX_REPORT_INSTRUCTIONS_LENGTH)
        {
            return Err(ValidationError::too_long(
                "report_instructions",
                MAX_REPORT_INSTRUCTIONS_LENGTH,
            ));
        }
        self.report_instructions = text;
        Ok(self)
    }

    /// Records the preset this session was seeded from.
    pub fn with_preset_slug(mut self, slug: impl Into<String>) -> Self {
        self.preset_slug = Some(slug.into());
        self
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        title: String,
        purpose: String,
        background_text: Option<String>,
        report_instructions: Option<String>,
        preset_slug: Option<String>,
        policy: InterviewPolicy,
        status: SessionStatus,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            title,
            purpose,
            background_text,
            report_instructions,
            preset_slug,
            policy,
            status,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn background_text(&self) -> Option<&str> {
        self.background_text.as_deref()
    }

    pub fn report_instructions(&self) -> Option<&str> {
        self.report_instructions.as_deref()
    }

    pub fn preset_slug(&self) -> Option<&str> {
        self.preset_slug.as_deref()
    }

    pub fn policy(&self) -> &InterviewPolicy {
        &self.policy
    }

    pub fn batch_size(&self) -> u32 {
        self.policy.batch_size
    }

    pub fn target_question_count(&self) -> u32 {
        self.policy.target_question_count
    }

    pub fn phase_profile(&self) -> &PhaseProfile {
        &self.policy.phase_profile
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Mark the interview as finished by the subject.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the session is already completed
    pub fn complete(&mut self) -> Result<(), DomainError> {
        if !self.status.can_transition_to(&SessionStatus::Completed) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Session {} is already completed", self.id),
            ));
        }
        self.status = SessionStatus::Completed;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
