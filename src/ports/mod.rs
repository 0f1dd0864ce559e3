//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `SessionRepository`, `QuestionRepository`, `AnswerRepository`,
//!   `AnalysisRepository`, `ReportRepository`
//!
//! ## Generation Ports
//!
//! - `StatementGenerator` - Context in, statements or text out
//! - `AIProvider` - Chat completion transport used by the prompted generator
//!
//! ## Lookup Ports
//!
//! - `PresetCatalog` - Session templates by slug

mod ai_provider;
mod analysis_repository;
mod answer_repository;
mod preset_catalog;
mod question_repository;
mod report_repository;
mod session_repository;
mod statement_generator;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use analysis_repository::AnalysisRepository;
pub use answer_repository::AnswerRepository;
pub use preset_catalog::PresetCatalog;
pub use question_repository::QuestionRepository;
pub use report_repository::ReportRepository;
pub use session_repository::SessionRepository;
pub use statement_generator::{
    GeneratedStatement, GenerationOutput, GeneratorError, StatementGenerator,
};
