//! Question entity and its fixed answer options.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{QuestionId, SessionId, Timestamp, ValidationError};

/// Number of explicit answer options on every question.
pub const OPTION_COUNT: usize = 5;

/// Option index meaning "other, see free text".
pub const OTHER_OPTION_INDEX: u8 = 5;

/// Maximum length for a statement.
pub const MAX_STATEMENT_LENGTH: usize = 2_000;

/// Where a question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    /// Fixed opening statement from a preset.
    Preset,
    /// Produced by the statement generator.
    Generated,
}

impl QuestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionSource::Preset => "preset",
            QuestionSource::Generated => "generated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "preset" => Some(QuestionSource::Preset),
            "generated" => Some(QuestionSource::Generated),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Exactly five labelled options.
///
/// Option 0 is affirmative, option 1 uncertain, options 2-4 alternative
/// stances. The free-text escape at index 5 is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AnswerOptions([String; OPTION_COUNT]);

impl AnswerOptions {
    /// Builds options from a list, requiring five non-empty labels.
    pub fn new(options: Vec<String>) -> Result<Self, ValidationError> {
        if options.len() != OPTION_COUNT {
            return Err(ValidationError::invalid_format(
                "options",
                format!("expected {} options, got {}", OPTION_COUNT, options.len()),
            ));
        }
        let options: Vec<String> = options.into_iter().map(|o| o.trim().to_string()).collect();
        if let Some(pos) = options.iter().position(|o| o.is_empty()) {
            return Err(ValidationError::empty_field(format!("options[{}]", pos)));
        }
        let array: [String; OPTION_COUNT] = options.try_into().map_err(|_| {
            ValidationError::invalid_format("options", "expected exactly five options")
        })?;
        Ok(Self(array))
    }

    /// Label for an option index; `None` for the free-text slot or out of range.
    pub fn label(&self, index: u8) -> Option<&str> {
        self.0.get(index as usize).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for AnswerOptions {
    type Error = ValidationError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AnswerOptions> for Vec<String> {
    fn from(options: AnswerOptions) -> Self {
        options.0.into()
    }
}

/// Generator- or preset-supplied content for one question, before it has an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub statement: String,
    pub detail: String,
    pub options: AnswerOptions,
}

impl QuestionDraft {
    /// Validates raw generator output into a draft.
    pub fn new(
        statement: impl Into<String>,
        detail: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let statement = statement.into().trim().to_string();
        if statement.is_empty() {
            return Err(ValidationError::empty_field("statement"));
        }
        if statement.chars().count() > MAX_STATEMENT_LENGTH {
            return Err(ValidationError::too_long("statement", MAX_STATEMENT_LENGTH));
        }
        Ok(Self {
            statement,
            detail: detail.into().trim().to_string(),
            options: AnswerOptions::new(options)?,
        })
    }
}

/// A persisted question. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    session_id: SessionId,
    index: u32,
    statement: String,
    detail: String,
    options: AnswerOptions,
    source: QuestionSource,
    created_at: Timestamp,
}

impl Question {
    /// Places a draft at a 1-based index in a session.
    pub fn from_draft(
        session_id: SessionId,
        index: u32,
        draft: QuestionDraft,
        source: QuestionSource,
    ) -> Self {
        Self {
            id: QuestionId::new(),
            session_id,
            index,
            statement: draft.statement,
            detail: draft.detail,
            options: draft.options,
            source,
            created_at: Timestamp::now(),
        }
    }

    /// Reconstitute from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: QuestionId,
        session_id: SessionId,
        index: u32,
        statement: String,
        detail: String,
        options: AnswerOptions,
        source: QuestionSource,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            session_id,
            index,
            statement,
            detail,
            options,
            source,
            created_at,
        }
    }

    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn options(&self) -> &AnswerOptions {
        &self.options
    }

    pub fn source(&self) -> QuestionSource {
        self.source
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five(prefix: &str) -> Vec<String> {
        (0..5).map(|i| format!("{} {}", prefix, i)).collect()
    }

    #[test]
    fn options_require_exactly_five() {
        assert!(AnswerOptions::new(five("opt")).is_ok());
        assert!(AnswerOptions::new(vec!["a".into(); 4]).is_err());
        assert!(AnswerOptions::new(vec!["a".into(); 6]).is_err());
    }

    #[test]
    fn options_reject_blank_label() {
        let mut opts = five("opt");
        opts[3] = "  ".to_string();
        let err = AnswerOptions::new(opts).unwrap_err();
        assert_eq!(err.field(), "options[3]");
    }

    #[test]
    fn free_text_slot_has_no_label() {
        let opts = AnswerOptions::new(five("opt")).unwrap();
        assert_eq!(opts.label(0), Some("opt 0"));
        assert_eq!(opts.label(OTHER_OPTION_INDEX), None);
    }

    #[test]
    fn options_deserialize_through_validation() {
        let ok: Result<AnswerOptions, _> = serde_json::from_str(r#"["a","b","c","d","e"]"#);
        assert!(ok.is_ok());
        let bad: Result<AnswerOptions, _> = serde_json::from_str(r#"["a","b"]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn draft_rejects_empty_statement() {
        assert!(matches!(
            QuestionDraft::new("  ", "detail", five("o")),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn question_from_draft_keeps_content() {
        let draft = QuestionDraft::new("I prefer mornings", "About routine", five("o")).unwrap();
        let q = Question::from_draft(SessionId::new(), 3, draft, QuestionSource::Generated);
        assert_eq!(q.index(), 3);
        assert_eq!(q.statement(), "I prefer mornings");
        assert_eq!(q.source(), QuestionSource::Generated);
    }

    #[test]
    fn source_round_trips_through_str() {
        for s in [QuestionSource::Preset, QuestionSource::Generated] {
            assert_eq!(QuestionSource::parse(s.as_str()), Some(s));
        }
    }
}
