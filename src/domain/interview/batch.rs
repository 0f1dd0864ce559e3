//! Question index windows and batch arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Default number of questions per batch.
pub const DEFAULT_BATCH_SIZE: u32 = 5;

/// Default number of answered questions before finishing is offered.
pub const DEFAULT_TARGET_QUESTION_COUNT: u32 = 50;

/// Inclusive window of 1-based question indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexWindow {
    pub start: u32,
    pub end: u32,
}

impl IndexWindow {
    /// Creates a window, rejecting zero or inverted bounds.
    pub fn new(start: u32, end: u32) -> Result<Self, ValidationError> {
        if start == 0 {
            return Err(ValidationError::out_of_range("start_index", 1, i32::MAX, 0));
        }
        if start > end {
            return Err(ValidationError::invalid_format(
                "end_index",
                format!("end {} precedes start {}", end, start),
            ));
        }
        Ok(Self { start, end })
    }

    /// Number of indices covered.
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Always false; windows cover at least one index.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: u32) -> bool {
        index >= self.start && index <= self.end
    }

    pub fn indices(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

impl fmt::Display for IndexWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}-Q{}", self.start, self.end)
    }
}

/// A batch: its 1-based number and the window it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchWindow {
    pub batch_index: u32,
    pub window: IndexWindow,
}

impl BatchWindow {
    /// Window of batch `batch_index` for the given batch size.
    ///
    /// Returns `None` for batch 0 or a zero batch size.
    pub fn for_batch(batch_index: u32, batch_size: u32) -> Option<Self> {
        if batch_index == 0 || batch_size == 0 {
            return None;
        }
        let start = (batch_index - 1) * batch_size + 1;
        Some(Self {
            batch_index,
            window: IndexWindow {
                start,
                end: batch_index * batch_size,
            },
        })
    }

    /// Batch that a question index belongs to.
    pub fn containing(question_index: u32, batch_size: u32) -> Option<Self> {
        if question_index == 0 || batch_size == 0 {
            return None;
        }
        Self::for_batch((question_index - 1) / batch_size + 1, batch_size)
    }

    pub fn start(&self) -> u32 {
        self.window.start
    }

    pub fn end(&self) -> u32 {
        self.window.end
    }
}

impl fmt::Display for BatchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch {} ({})", self.batch_index, self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rejects_zero_start() {
        assert!(IndexWindow::new(0, 5).is_err());
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(IndexWindow::new(6, 5).is_err());
    }

    #[test]
    fn window_len_is_inclusive() {
        let window = IndexWindow::new(6, 10).unwrap();
        assert_eq!(window.len(), 5);
        assert!(window.contains(6));
        assert!(window.contains(10));
        assert!(!window.contains(11));
        assert_eq!(window.indices().collect::<Vec<_>>(), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn batch_windows_are_contiguous() {
        let first = BatchWindow::for_batch(1, 5).unwrap();
        let third = BatchWindow::for_batch(3, 5).unwrap();
        assert_eq!((first.start(), first.end()), (1, 5));
        assert_eq!((third.start(), third.end()), (11, 15));
    }

    #[test]
    fn batch_zero_has_no_window() {
        assert!(BatchWindow::for_batch(0, 5).is_none());
        assert!(BatchWindow::for_batch(1, 0).is_none());
    }

    #[test]
    fn containing_maps_index_to_batch() {
        assert_eq!(BatchWindow::containing(5, 5).unwrap().batch_index, 1);
        assert_eq!(BatchWindow::containing(6, 5).unwrap().batch_index, 2);
        assert_eq!(BatchWindow::containing(23, 5).unwrap().batch_index, 5);
    }

    #[test]
    fn window_display_uses_question_labels() {
        let batch = BatchWindow::for_batch(2, 5).unwrap();
        assert_eq!(batch.to_string(), "batch 2 (Q6-Q10)");
    }
}
