//! AI Adapters.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - OpenAI-compatible chat completions (OpenRouter by default)
//! - `MockAIProvider` - Configurable AIProvider mock for testing
//! - `PromptedGenerator` - StatementGenerator that prompts an AIProvider
//! - `MockStatementGenerator` - Scripted StatementGenerator for tests and offline runs

mod mock_generator;
mod mock_provider;
mod openai_provider;
mod prompted_generator;

pub use mock_generator::{sample_statement, MockStatementGenerator, ScriptedReply};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
pub use prompted_generator::PromptedGenerator;
