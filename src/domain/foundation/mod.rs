//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the interview domain.

mod errors;
mod ids;
mod session_status;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AnalysisId, QuestionId, ReportId, SessionId};
pub use session_status::SessionStatus;
pub use timestamp::Timestamp;
