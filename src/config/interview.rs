//! Interview pacing configuration

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::interview::{DEFAULT_BATCH_SIZE, DEFAULT_TARGET_QUESTION_COUNT};

use super::error::ValidationError;

/// Defaults applied to newly created sessions.
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewConfig {
    /// Questions per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Answered questions before finishing is offered
    #[serde(default = "default_target")]
    pub target_question_count: u32,

    /// YAML preset catalog; no presets when unset
    pub presets_file: Option<PathBuf>,

    /// Sessions returned by the listing endpoint
    #[serde(default = "default_recent_limit")]
    pub recent_sessions_limit: u32,
}

impl InterviewConfig {
    /// Validate interview configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_size == 0 || self.batch_size > 20 {
            return Err(ValidationError::InvalidBatchSize);
        }
        if self.target_question_count == 0 {
            return Err(ValidationError::InvalidTargetCount);
        }
        Ok(())
    }
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            target_question_count: default_target(),
            presets_file: None,
            recent_sessions_limit: default_recent_limit(),
        }
    }
}

fn default_batch_size() -> u32 {
    DEFAULT_BATCH_SIZE
}

fn default_target() -> u32 {
    DEFAULT_TARGET_QUESTION_COUNT
}

fn default_recent_limit() -> u32 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_five_and_fifty() {
        let config = InterviewConfig::default();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.target_question_count, 50);
        assert_eq!(config.recent_sessions_limit, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = InterviewConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidBatchSize));
    }

    #[test]
    fn zero_target_is_rejected() {
        let config = InterviewConfig {
            target_question_count: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTargetCount));
    }
}
