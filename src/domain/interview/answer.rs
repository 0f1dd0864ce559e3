//! Answer entity: one per (session, question), upserted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{QuestionId, SessionId, Timestamp, ValidationError};

use super::question::OTHER_OPTION_INDEX;

/// Maximum length for free text on an "other" answer.
pub const MAX_FREE_TEXT_LENGTH: usize = 1_000;

/// A subject's answer to one question.
///
/// # Invariants
///
/// - `selected_option` is in `0..=5`
/// - `free_text` is `Some` (trimmed, non-empty) exactly when option 5 is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    session_id: SessionId,
    question_id: QuestionId,
    selected_option: u8,
    free_text: Option<String>,
    answered_at: Timestamp,
}

impl Answer {
    /// Validates and normalizes a submission.
    ///
    /// Free text sent with a regular option is discarded.
    pub fn new(
        session_id: SessionId,
        question_id: QuestionId,
        selected_option: u8,
        free_text: Option<String>,
    ) -> Result<Self, ValidationError> {
        if selected_option > OTHER_OPTION_INDEX {
            return Err(ValidationError::out_of_range(
                "selected_option",
                0,
                OTHER_OPTION_INDEX as i32,
                selected_option as i32,
            ));
        }

        let free_text = if selected_option == OTHER_OPTION_INDEX {
            let text = free_text.map(|t| t.trim().to_string()).unwrap_or_default();
            if text.is_empty() {
                return Err(ValidationError::empty_field("free_text"));
            }
            if text.chars().count() > MAX_FREE_TEXT_LENGTH {
                return Err(ValidationError::too_long("free_text", MAX_FREE_TEXT_LENGTH));
            }
            Some(text)
        } else {
            None
        };

        Ok(Self {
            session_id,
            question_id,
            selected_option,
            free_text,
            answered_at: Timestamp::now(),
        })
    }

    /// Reconstitute from persistence (no validation).
    pub fn reconstitute(
        session_id: SessionId,
        question_id: QuestionId,
        selected_option: u8,
        free_text: Option<String>,
        answered_at: Timestamp,
    ) -> Self {
        Self {
            session_id,
            question_id,
            selected_option,
            free_text,
            answered_at,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    pub fn selected_option(&self) -> u8 {
        self.selected_option
    }

    pub fn free_text(&self) -> Option<&str> {
        self.free_text.as_deref()
    }

    pub fn is_other(&self) -> bool {
        self.selected_option == OTHER_OPTION_INDEX
    }

    pub fn answered_at(&self) -> &Timestamp {
        &self.answered_at
    }
}

/// Answers of one session keyed by question.
#[derive(Debug, Clone, Default)]
pub struct AnswerBook {
    by_question: HashMap<QuestionId, Answer>,
}

impl AnswerBook {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            by_question: answers
                .into_iter()
                .map(|a| (*a.question_id(), a))
                .collect(),
        }
    }

    pub fn get(&self, question_id: &QuestionId) -> Option<&Answer> {
        self.by_question.get(question_id)
    }

    pub fn is_answered(&self, question_id: &QuestionId) -> bool {
        self.by_question.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.by_question.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_question.is_empty()
    }
}
