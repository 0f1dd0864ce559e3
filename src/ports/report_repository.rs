//! Report repository port.

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::interview::{Report, ReportDraft};
use async_trait::async_trait;

/// Repository port for versioned reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Store a draft as the next version for its session.
    ///
    /// The version is `max(existing) + 1`, or 1 for the first report.
    /// Concurrent appends must receive distinct versions.
    async fn append(&self, draft: ReportDraft) -> Result<Report, DomainError>;

    /// Highest-version report.
    async fn latest(&self, session_id: &SessionId) -> Result<Option<Report>, DomainError>;

    /// A specific version.
    async fn find_version(
        &self,
        session_id: &SessionId,
        version: u32,
    ) -> Result<Option<Report>, DomainError>;

    /// All reports of a session ordered by version.
    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Report>, DomainError>;
}
