//! Versioned final report.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ReportId, SessionId, Timestamp, ValidationError};

/// Report content awaiting a version from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub session_id: SessionId,
    pub content: String,
}

impl ReportDraft {
    pub fn new(session_id: SessionId, content: impl Into<String>) -> Result<Self, ValidationError> {
        let content = content.into().trim().to_string();
        if content.is_empty() {
            return Err(ValidationError::empty_field("report_content"));
        }
        Ok(Self {
            session_id,
            content,
        })
    }
}

/// A stored report. The current report is the one with the highest version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    id: ReportId,
    session_id: SessionId,
    version: u32,
    content: String,
    created_at: Timestamp,
}

impl Report {
    /// Assigns a version to a draft. Called by stores only.
    pub fn from_draft(draft: ReportDraft, version: u32) -> Self {
        Self {
            id: ReportId::new(),
            session_id: draft.session_id,
            version,
            content: draft.content,
            created_at: Timestamp::now(),
        }
    }

    pub fn reconstitute(
        id: ReportId,
        session_id: SessionId,
        version: u32,
        content: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            session_id,
            version,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> &ReportId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}
