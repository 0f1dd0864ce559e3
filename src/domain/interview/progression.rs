//! Progression policy: pure decisions over a snapshot of session progress.
//!
//! Nothing here touches storage. The engine loads a [`Progress`], asks
//! [`decide`] what must happen, and executes the returned actions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::foundation::SessionStatus;

use super::batch::{BatchWindow, IndexWindow};

/// Kind of side-effecting generation; the single-flight key per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    GenerateBatch,
    GenerateAnalysis,
    GenerateReport,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::GenerateBatch => "generate_batch",
            ActionKind::GenerateAnalysis => "generate_analysis",
            ActionKind::GenerateReport => "generate_report",
        };
        write!(f, "{}", s)
    }
}

/// Action the policy requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduledAction {
    GenerateAnalysis { batch: BatchWindow },
    GenerateBatch { window: IndexWindow },
}

impl ScheduledAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            ScheduledAction::GenerateAnalysis { .. } => ActionKind::GenerateAnalysis,
            ScheduledAction::GenerateBatch { .. } => ActionKind::GenerateBatch,
        }
    }

    pub fn window(&self) -> IndexWindow {
        match self {
            ScheduledAction::GenerateAnalysis { batch } => batch.window,
            ScheduledAction::GenerateBatch { window } => *window,
        }
    }
}

/// Derived lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionState {
    AwaitingFirstBatch,
    InProgress,
    ReadyToFinish,
    Finalized,
}

/// Snapshot of a session's progress.
///
/// Question indices are contiguous from 1, so `question_count` is also the
/// highest persisted index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub status: SessionStatus,
    pub batch_size: u32,
    pub target_question_count: u32,
    pub question_count: u32,
    pub answered_count: u32,
    pub analyzed_batches: BTreeSet<u32>,
}

impl Progress {
    pub fn state(&self) -> ProgressionState {
        if !self.status.is_active() {
            ProgressionState::Finalized
        } else if self.question_count == 0 {
            ProgressionState::AwaitingFirstBatch
        } else if self.answered_count < self.target_question_count {
            ProgressionState::InProgress
        } else {
            ProgressionState::ReadyToFinish
        }
    }

    /// True when every persisted question has an answer.
    pub fn all_answered(&self) -> bool {
        self.answered_count >= self.question_count
    }

    /// Window for an explicit "go deeper" request.
    ///
    /// `None` unless the session is active, has questions, and all of them
    /// are answered.
    pub fn extension_window(&self) -> Option<IndexWindow> {
        if !self.status.is_active() || self.question_count == 0 || !self.all_answered() {
            return None;
        }
        let start = self.question_count + 1;
        Some(IndexWindow {
            start,
            end: start + self.batch_size - 1,
        })
    }
}

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub state: ProgressionState,
    pub actions: Vec<ScheduledAction>,
    pub finish_available: bool,
}

/// Applies the progression rules to a snapshot.
///
/// 1. A positive multiple of B answered with no analysis for that batch
///    schedules the analysis.
/// 2. A multiple of B answered below target with the next window not fully
///    persisted schedules generation of the missing part.
/// 3. At or past target, finishing is offered and no batch is scheduled.
pub fn decide(progress: &Progress) -> Decision {
    let state = progress.state();
    if state == ProgressionState::Finalized || progress.batch_size == 0 {
        return Decision {
            state,
            actions: Vec::new(),
            finish_available: false,
        };
    }

    let b = progress.batch_size;
    let answered = progress.answered_count;
    let on_boundary = answered % b == 0;
    let mut actions = Vec::new();

    if on_boundary && answered > 0 {
        let batch_index = answered / b;
        if !progress.analyzed_batches.contains(&batch_index) {
            if let Some(batch) = BatchWindow::for_batch(batch_index, b) {
                actions.push(ScheduledAction::GenerateAnalysis { batch });
            }
        }
    }

    if on_boundary && answered < progress.target_question_count {
        let window_end = answered + b;
        let start = progress.question_count.max(answered) + 1;
        if start <= window_end {
            actions.push(ScheduledAction::GenerateBatch {
                window: IndexWindow {
                    start,
                    end: window_end,
                },
            });
        }
    }

    Decision {
        state,
        actions,
        finish_available: answered >= progress.target_question_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(target: u32, questions: u32, answered: u32, analyzed: &[u32]) -> Progress {
        Progress {
            status: SessionStatus::Active,
            batch_size: 5,
            target_question_count: target,
            question_count: questions,
            answered_count: answered,
            analyzed_batches: analyzed.iter().copied().collect(),
        }
    }

    #[test]
    fn fresh_session_schedules_first_batch() {
        let d = decide(&progress(50, 0, 0, &[]));
        assert_eq!(d.state, ProgressionState::AwaitingFirstBatch);
        assert_eq!(
            d.actions,
            vec![ScheduledAction::GenerateBatch {
                window: IndexWindow { start: 1, end: 5 }
            }]
        );
        assert!(!d.finish_available);
    }

    #[test]
    fn mid_batch_schedules_nothing() {
        for answered in 1..5 {
            let d = decide(&progress(5, 5, answered, &[]));
            assert!(d.actions.is_empty(), "answered {}", answered);
            assert!(!d.finish_available);
        }
    }

    #[test]
    fn batch_boundary_schedules_analysis_and_next_batch() {
        let d = decide(&progress(50, 5, 5, &[]));
        assert_eq!(
            d.actions,
            vec![
                ScheduledAction::GenerateAnalysis {
                    batch: BatchWindow::for_batch(1, 5).unwrap()
                },
                ScheduledAction::GenerateBatch {
                    window: IndexWindow { start: 6, end: 10 }
                },
            ]
        );
    }

    #[test]
    fn existing_analysis_and_questions_suppress_actions() {
        let d = decide(&progress(50, 10, 5, &[1]));
        assert!(d.actions.is_empty());
    }

    #[test]
    fn partially_filled_window_generates_remainder() {
        let d = decide(&progress(50, 3, 0, &[]));
        assert_eq!(
            d.actions,
            vec![ScheduledAction::GenerateBatch {
                window: IndexWindow { start: 4, end: 5 }
            }]
        );
    }

    #[test]
    fn reaching_target_offers_finish_without_new_batch() {
        let d = decide(&progress(5, 5, 5, &[]));
        assert_eq!(d.state, ProgressionState::ReadyToFinish);
        assert!(d.finish_available);
        assert_eq!(
            d.actions,
            vec![ScheduledAction::GenerateAnalysis {
                batch: BatchWindow::for_batch(1, 5).unwrap()
            }]
        );
    }

    #[test]
    fn completed_session_schedules_nothing() {
        let mut p = progress(50, 5, 5, &[]);
        p.status = SessionStatus::Completed;
        let d = decide(&p);
        assert_eq!(d.state, ProgressionState::Finalized);
        assert!(d.actions.is_empty());
        assert!(!d.finish_available);
    }

    #[test]
    fn extension_requires_everything_answered() {
        assert_eq!(progress(5, 5, 4, &[]).extension_window(), None);
        assert_eq!(progress(5, 0, 0, &[]).extension_window(), None);
        assert_eq!(
            progress(5, 5, 5, &[1]).extension_window(),
            Some(IndexWindow { start: 6, end: 10 })
        );
    }

    #[test]
    fn action_kind_matches_variant() {
        let a = ScheduledAction::GenerateBatch {
            window: IndexWindow { start: 1, end: 5 },
        };
        assert_eq!(a.kind(), ActionKind::GenerateBatch);
        assert_eq!(a.kind().to_string(), "generate_batch");
    }
}
