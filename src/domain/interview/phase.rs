//! Interview phases and the phase profile carried by each session.
//!
//! A profile is a list of index ranges tagged with a phase. Indices beyond the
//! profile's highest covered index wrap around, so a 50-index profile repeats
//! from question 51 onward.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy tag biasing what the generator asks next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Broad coverage of themes not yet touched.
    Exploration,
    /// Probing themes that already surfaced.
    DeepDive,
}

impl Phase {
    /// Guidance handed to the generator alongside the context.
    pub fn guidance(&self) -> &'static str {
        match self {
            Phase::Exploration => {
                "Exploration phase: cover themes relevant to the subject's purpose that \
                 have not been asked about yet. When the main themes are covered, revisit \
                 them from a different angle (past/present/future, self/others/society, \
                 ideal/reality/constraints) or ask which themes matter most. Keep the \
                 overall purpose in view instead of following the latest answers too closely."
            }
            Phase::DeepDive => {
                "Deep-dive phase: deepen the themes that surfaced during exploration. \
                 Probe conditional cases, draw out the reasons and values behind surface \
                 answers, and locate the boundary of answers that seem to contradict each \
                 other. Every statement must be able to yield information not already known."
            }
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Exploration => "exploration",
            Phase::DeepDive => "deep-dive",
        };
        write!(f, "{}", s)
    }
}

/// Inclusive range of question indices sharing a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRange {
    pub start: u32,
    pub end: u32,
    pub phase: Phase,
}

impl PhaseRange {
    pub fn new(start: u32, end: u32, phase: Phase) -> Self {
        Self { start, end, phase }
    }

    fn contains(&self, index: u32) -> bool {
        index >= self.start && index <= self.end
    }
}

/// Ordered phase ranges for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseProfile {
    pub ranges: Vec<PhaseRange>,
}

static DEFAULT_PROFILE: Lazy<PhaseProfile> = Lazy::new(|| {
    use Phase::{DeepDive as D, Exploration as E};
    let phases = [E, E, E, D, E, D, E, D, E, D];
    PhaseProfile {
        ranges: phases
            .iter()
            .enumerate()
            .map(|(i, phase)| {
                let start = i as u32 * 5 + 1;
                PhaseRange::new(start, start + 4, *phase)
            })
            .collect(),
    }
});

impl PhaseProfile {
    pub fn new(ranges: Vec<PhaseRange>) -> Self {
        Self { ranges }
    }

    /// Highest index covered by any range; 0 for an empty profile.
    pub fn span(&self) -> u32 {
        self.ranges.iter().map(|r| r.end).max().unwrap_or(0)
    }

    /// Phase for a 1-based question index.
    pub fn phase_for(&self, index: u32) -> Phase {
        resolve_phase(index, self)
    }
}

impl Default for PhaseProfile {
    fn default() -> Self {
        DEFAULT_PROFILE.clone()
    }
}

/// Maps a 1-based question index to its phase.
///
/// Falls back to [`Phase::Exploration`] when no range matches, which covers
/// empty or gapped profiles.
pub fn resolve_phase(index: u32, profile: &PhaseProfile) -> Phase {
    let span = profile.span();
    if span == 0 || index == 0 {
        return Phase::Exploration;
    }
    let normalized = ((index - 1) % span) + 1;

    profile
        .ranges
        .iter()
        .find(|r| r.contains(normalized))
        .map(|r| r.phase)
        .unwrap_or(Phase::Exploration)
}
