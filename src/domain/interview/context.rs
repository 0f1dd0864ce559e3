//! Generation context: the structured payload handed to a statement generator.
//!
//! The context is data, not prompt text. Adapters decide how to render it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::SessionId;

use super::analysis::Analysis;
use super::answer::{Answer, AnswerBook};
use super::batch::{BatchWindow, IndexWindow};
use super::phase::{resolve_phase, Phase};
use super::question::{AnswerOptions, Question, OTHER_OPTION_INDEX};
use super::session::Session;

/// Label for a question without an answer.
pub const UNANSWERED_LABEL: &str = "unanswered";

/// Prefix for free-text answers.
pub const OTHER_LABEL: &str = "other";

/// What the generator is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Batch,
    Analysis,
    Report,
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenerationMode::Batch => "batch",
            GenerationMode::Analysis => "analysis",
            GenerationMode::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// One prior question with its formatted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub index: u32,
    pub statement: String,
    pub detail: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// A prior analysis as seen by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub batch_index: u32,
    pub window: IndexWindow,
    pub text: String,
}

/// Everything a generator needs for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub session_id: SessionId,
    pub mode: GenerationMode,
    pub purpose: String,
    pub background: Option<String>,
    pub entries: Vec<ContextEntry>,
    pub phase: Option<Phase>,
    pub phase_guidance: Option<String>,
    pub prior_analyses: Vec<AnalysisEntry>,
    pub target_window: Option<IndexWindow>,
    pub report_instructions: Option<String>,
}

/// Renders an answer for the generator.
///
/// Unanswered questions and missing labels read as "unanswered"; the free
/// text slot reads as "other: <text>".
pub fn format_answer(options: &AnswerOptions, answer: Option<&Answer>) -> String {
    let Some(answer) = answer else {
        return UNANSWERED_LABEL.to_string();
    };
    if answer.selected_option() == OTHER_OPTION_INDEX {
        return match answer.free_text().map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => format!("{}: {}", OTHER_LABEL, text),
            None => OTHER_LABEL.to_string(),
        };
    }
    options
        .label(answer.selected_option())
        .unwrap_or(UNANSWERED_LABEL)
        .to_string()
}

fn entry(question: &Question, answers: &AnswerBook) -> ContextEntry {
    ContextEntry {
        index: question.index(),
        statement: question.statement().to_string(),
        detail: question.detail().to_string(),
        options: question.options().as_slice().to_vec(),
        answer: format_answer(question.options(), answers.get(question.id())),
    }
}

fn analysis_entries<'a>(analyses: impl Iterator<Item = &'a Analysis>) -> Vec<AnalysisEntry> {
    let mut entries: Vec<AnalysisEntry> = analyses
        .map(|a| AnalysisEntry {
            batch_index: a.batch_index(),
            window: a.batch().window,
            text: a.text().to_string(),
        })
        .collect();
    entries.sort_by_key(|e| e.batch_index);
    entries
}

fn sorted_entries<'a>(
    questions: impl Iterator<Item = &'a Question>,
    answers: &AnswerBook,
) -> Vec<ContextEntry> {
    let mut entries: Vec<ContextEntry> = questions.map(|q| entry(q, answers)).collect();
    entries.sort_by_key(|e| e.index);
    entries
}

impl GenerationContext {
    fn base(mode: GenerationMode, session: &Session) -> Self {
        Self {
            session_id: *session.id(),
            mode,
            purpose: session.purpose().to_string(),
            background: session.background_text().map(String::from),
            entries: Vec::new(),
            phase: None,
            phase_guidance: None,
            prior_analyses: Vec::new(),
            target_window: None,
            report_instructions: None,
        }
    }

    fn with_phase_for(mut self, session: &Session, window: IndexWindow) -> Self {
        let phase = resolve_phase(window.start, session.phase_profile());
        self.phase = Some(phase);
        self.phase_guidance = Some(phase.guidance().to_string());
        self.target_window = Some(window);
        self
    }

    /// Context for generating the statements of `window`.
    ///
    /// Includes every question below the window and all analyses so far.
    pub fn for_batch(
        session: &Session,
        questions: &[Question],
        answers: &AnswerBook,
        analyses: &[Analysis],
        window: IndexWindow,
    ) -> Self {
        let mut ctx = Self::base(GenerationMode::Batch, session).with_phase_for(session, window);
        ctx.entries = sorted_entries(
            questions.iter().filter(|q| q.index() < window.start),
            answers,
        );
        ctx.prior_analyses = analysis_entries(analyses.iter());
        ctx
    }

    /// Context for analysing one batch.
    ///
    /// Entries are restricted to the batch window; only strictly earlier
    /// analyses are included.
    pub fn for_analysis(
        session: &Session,
        questions: &[Question],
        answers: &AnswerBook,
        analyses: &[Analysis],
        batch: BatchWindow,
    ) -> Self {
        let mut ctx =
            Self::base(GenerationMode::Analysis, session).with_phase_for(session, batch.window);
        ctx.entries = sorted_entries(
            questions.iter().filter(|q| batch.window.contains(q.index())),
            answers,
        );
        ctx.prior_analyses = analysis_entries(
            analyses
                .iter()
                .filter(|a| a.batch_index() < batch.batch_index),
        );
        ctx
    }

    /// Context for the final report over the whole answered history.
    pub fn for_report(
        session: &Session,
        questions: &[Question],
        answers: &AnswerBook,
        analyses: &[Analysis],
    ) -> Self {
        let mut ctx = Self::base(GenerationMode::Report, session);
        ctx.entries = sorted_entries(
            questions.iter().filter(|q| answers.is_answered(q.id())),
            answers,
        );
        ctx.prior_analyses = analysis_entries(analyses.iter());
        ctx.report_instructions = session.report_instructions().map(String::from);
        ctx
    }
}
