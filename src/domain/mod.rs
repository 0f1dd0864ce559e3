//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `interview` - Sessions, questions, answers, analyses, reports and the
//!   progression policy

pub mod foundation;
pub mod interview;
