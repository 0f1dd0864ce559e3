//! Sonar - Adaptive Reflection Interview Backend
//!
//! This crate runs batched interviews: statements are generated five at a
//! time from the answers so far, every completed batch is analysed, and
//! versioned reports synthesize the whole session on demand.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
