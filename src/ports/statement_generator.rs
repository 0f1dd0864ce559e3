//! Statement Generator Port - the language-generation collaborator.
//!
//! Consumes a structured [`GenerationContext`] and returns either an ordered
//! list of statements (batch mode) or free text (analysis and report modes).
//! Output is returned raw; callers validate counts and shapes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::interview::{GenerationContext, GenerationMode};

use super::ai_provider::AIError;

/// Port for statement, analysis and report generation.
#[async_trait]
pub trait StatementGenerator: Send + Sync {
    /// Produce output for the given mode.
    ///
    /// # Errors
    ///
    /// - `GeneratorError::Provider` when the upstream service fails
    /// - `GeneratorError::MalformedOutput` when the reply cannot be parsed
    async fn generate(
        &self,
        context: &GenerationContext,
        mode: GenerationMode,
    ) -> Result<GenerationOutput, GeneratorError>;
}

/// One generated statement before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedStatement {
    pub statement: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl GeneratedStatement {
    pub fn new(
        statement: impl Into<String>,
        detail: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Self {
            statement: statement.into(),
            detail: detail.into(),
            options,
        }
    }
}

/// Generator output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutput {
    /// Batch mode.
    Statements(Vec<GeneratedStatement>),
    /// Analysis and report modes.
    Text(String),
}

impl GenerationOutput {
    /// Statements, or an error if the generator answered with text.
    pub fn into_statements(self) -> Result<Vec<GeneratedStatement>, GeneratorError> {
        match self {
            GenerationOutput::Statements(items) => Ok(items),
            GenerationOutput::Text(_) => Err(GeneratorError::ModeMismatch {
                expected: GenerationMode::Batch,
            }),
        }
    }

    /// Text, or an error if the generator answered with statements.
    pub fn into_text(self, expected: GenerationMode) -> Result<String, GeneratorError> {
        match self {
            GenerationOutput::Text(text) => Ok(text),
            GenerationOutput::Statements(_) => Err(GeneratorError::ModeMismatch { expected }),
        }
    }
}

/// Generator errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeneratorError {
    #[error("provider error: {0}")]
    Provider(#[from] AIError),

    #[error("malformed output: {0}")]
    MalformedOutput(String),

    #[error("output does not match {expected} mode")]
    ModeMismatch { expected: GenerationMode },
}

impl GeneratorError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedOutput(message.into())
    }
}
