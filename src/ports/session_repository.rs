//! Session repository port.
//!
//! Defines the contract for persisting and retrieving Session aggregates.

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::interview::Session;
use async_trait::async_trait;

/// Repository port for Session aggregate persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, session: &Session) -> Result<(), DomainError>;

    /// Update an existing session (status and timestamps only).
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, session: &Session) -> Result<(), DomainError>;

    /// Find a session by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Most recently created sessions, newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<Session>, DomainError>;

    /// Every session started from the preset `slug`, oldest first.
    async fn list_by_preset(&self, slug: &str) -> Result<Vec<Session>, DomainError>;
}
