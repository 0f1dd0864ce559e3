//! Session presets: canned purposes with optional fixed opening statements.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

use super::question::QuestionDraft;

/// Fixed statement asked before any generated question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetStatement {
    pub statement: String,
    #[serde(default)]
    pub detail: String,
    pub options: Vec<String>,
}

/// A named session template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPreset {
    pub slug: String,
    pub title: String,
    pub purpose: String,
    #[serde(default)]
    pub background_text: Option<String>,
    #[serde(default)]
    pub report_instructions: Option<String>,
    #[serde(default)]
    pub target_question_count: Option<u32>,
    #[serde(default)]
    pub statements: Vec<PresetStatement>,
}

impl SessionPreset {
    /// Validated drafts for the fixed statements, in order.
    pub fn drafts(&self) -> Result<Vec<QuestionDraft>, ValidationError> {
        self.statements
            .iter()
            .map(|s| QuestionDraft::new(s.statement.clone(), s.detail.clone(), s.options.clone()))
            .collect()
    }
}
