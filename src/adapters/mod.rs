//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Statement generation over an OpenAI-compatible API, plus mocks
//! - `http` - axum REST API
//! - `memory` - In-memory repositories
//! - `postgres` - PostgreSQL repositories
//! - `presets` - YAML preset catalog

pub mod ai;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod presets;
