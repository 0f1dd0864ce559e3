//! Running analysis synthesized from one completed batch.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AnalysisId, SessionId, Timestamp, ValidationError};

use super::batch::BatchWindow;

/// Analysis of a single batch. Created once, immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    id: AnalysisId,
    session_id: SessionId,
    batch: BatchWindow,
    text: String,
    created_at: Timestamp,
}

impl Analysis {
    /// Creates an analysis, rejecting blank text.
    pub fn new(
        session_id: SessionId,
        batch: BatchWindow,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::empty_field("analysis_text"));
        }
        Ok(Self {
            id: AnalysisId::new(),
            session_id,
            batch,
            text,
            created_at: Timestamp::now(),
        })
    }

    pub fn reconstitute(
        id: AnalysisId,
        session_id: SessionId,
        batch: BatchWindow,
        text: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            session_id,
            batch,
            text,
            created_at,
        }
    }

    pub fn id(&self) -> &AnalysisId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn batch(&self) -> &BatchWindow {
        &self.batch
    }

    pub fn batch_index(&self) -> u32 {
        self.batch.batch_index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        let batch = BatchWindow::for_batch(1, 5).unwrap();
        assert!(Analysis::new(SessionId::new(), batch, " \n").is_err());
    }

    #[test]
    fn keeps_batch_window() {
        let batch = BatchWindow::for_batch(2, 5).unwrap();
        let analysis = Analysis::new(SessionId::new(), batch, "Values autonomy").unwrap();
        assert_eq!(analysis.batch_index(), 2);
        assert_eq!(analysis.batch().start(), 6);
        assert_eq!(analysis.text(), "Values autonomy");
    }
}
