//! Analysis repository port.

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::interview::Analysis;
use async_trait::async_trait;

/// Repository port for analyses, unique on (session, batch index).
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    /// Store an analysis unless one exists for its batch.
    ///
    /// On conflict the existing row is kept and returned.
    async fn upsert(&self, analysis: &Analysis) -> Result<Analysis, DomainError>;

    /// Analysis for one batch.
    async fn find_by_batch(
        &self,
        session_id: &SessionId,
        batch_index: u32,
    ) -> Result<Option<Analysis>, DomainError>;

    /// All analyses of a session ordered by batch index.
    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Analysis>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn AnalysisRepository) {}
    }
}
