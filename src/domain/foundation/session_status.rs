//! SessionStatus enum for tracking the lifecycle of interview sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an interview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
}

impl SessionStatus {
    /// Returns true if the session still accepts answers and generation.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Active)
    }

    /// Validates a transition from this status to another.
    ///
    /// Valid transitions:
    /// - Active -> Completed
    pub fn can_transition_to(&self, target: &SessionStatus) -> bool {
        use SessionStatus::*;
        matches!((self, target), (Active, Completed))
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SessionStatus::Active),
            "completed" => Some(SessionStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Active => "Active",
            SessionStatus::Completed => "Completed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_active() {
        assert_eq!(SessionStatus::default(), SessionStatus::Active);
    }

    #[test]
    fn active_can_transition_to_completed() {
        assert!(SessionStatus::Active.can_transition_to(&SessionStatus::Completed));
    }

    #[test]
    fn completed_cannot_transition() {
        assert!(!SessionStatus::Completed.can_transition_to(&SessionStatus::Active));
        assert!(!SessionStatus::Completed.can_transition_to(&SessionStatus::Completed));
    }

    #[test]
    fn storage_representation_parses_back() {
        for status in [SessionStatus::Active, SessionStatus::Completed] {
            assert_eq!(SessionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SessionStatus::parse("archived"), None);
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&SessionStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
