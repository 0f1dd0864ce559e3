//! In-memory adapters for tests and development.

mod interview_store;

pub use interview_store::InMemoryInterviewStore;
