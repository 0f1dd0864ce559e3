//! Mock Statement Generator - scripted generator for tests and offline runs.
//!
//! With nothing queued it fabricates well-formed output: one statement per
//! index of the target window, a one-line analysis, or a short Markdown
//! report citing every answered question.

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::interview::{GenerationContext, GenerationMode};
use crate::ports::{
    AIError, GeneratedStatement, GenerationOutput, GeneratorError, StatementGenerator,
};

/// A queued reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Output(GenerationOutput),
    Error(GeneratorError),
}

/// Scripted StatementGenerator.
#[derive(Debug, Clone, Default)]
pub struct MockStatementGenerator {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    failing: Arc<Mutex<HashSet<GenerationMode>>>,
    calls: Arc<Mutex<Vec<GenerationContext>>>,
    delay: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockStatementGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an output returned by the next call, whatever its mode.
    pub fn with_output(self, output: GenerationOutput) -> Self {
        lock(&self.replies).push_back(ScriptedReply::Output(output));
        self
    }

    /// Queues a batch of statements.
    pub fn with_statements(self, statements: Vec<GeneratedStatement>) -> Self {
        self.with_output(GenerationOutput::Statements(statements))
    }

    /// Queues free text.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_output(GenerationOutput::Text(text.into()))
    }

    /// Queues an error.
    pub fn with_error(self, error: GeneratorError) -> Self {
        lock(&self.replies).push_back(ScriptedReply::Error(error));
        self
    }

    /// Every call in `mode` fails until [`recover`](Self::recover) is called.
    pub fn failing(self, mode: GenerationMode) -> Self {
        lock(&self.failing).insert(mode);
        self
    }

    pub fn recover(&self, mode: GenerationMode) {
        lock(&self.failing).remove(&mode);
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Number of calls made in `mode`.
    pub fn calls_for(&self, mode: GenerationMode) -> usize {
        lock(&self.calls).iter().filter(|c| c.mode == mode).count()
    }

    /// Contexts received, in call order.
    pub fn get_calls(&self) -> Vec<GenerationContext> {
        lock(&self.calls).clone()
    }
}

/// Builds a well-formed statement for question `index`.
pub fn sample_statement(index: u32) -> GeneratedStatement {
    GeneratedStatement::new(
        format!("Statement Q{}", index),
        format!("Context for Q{}", index),
        vec![
            "yes".to_string(),
            "don't know".to_string(),
            format!("stance A on Q{}", index),
            format!("stance B on Q{}", index),
            format!("stance C on Q{}", index),
        ],
    )
}

fn fabricate(context: &GenerationContext, mode: GenerationMode) -> GenerationOutput {
    match mode {
        GenerationMode::Batch => GenerationOutput::Statements(
            context
                .target_window
                .map(|w| w.indices().map(sample_statement).collect())
                .unwrap_or_default(),
        ),
        GenerationMode::Analysis => {
            let scope = context
                .target_window
                .map(|w| w.to_string())
                .unwrap_or_else(|| "session".to_string());
            GenerationOutput::Text(format!(
                "Analysis of {}: {} answers considered.",
                scope,
                context.entries.len()
            ))
        }
        GenerationMode::Report => {
            let citations: String = context
                .entries
                .iter()
                .map(|e| format!("[{}]", e.index))
                .collect();
            GenerationOutput::Text(format!(
                "## Overview\n{}\n\n## Summary\nBased on {} answers {}",
                context.purpose,
                context.entries.len(),
                citations
            ))
        }
    }
}

#[async_trait]
impl StatementGenerator for MockStatementGenerator {
    async fn generate(
        &self,
        context: &GenerationContext,
        mode: GenerationMode,
    ) -> Result<GenerationOutput, GeneratorError> {
        lock(&self.calls).push(context.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if lock(&self.failing).contains(&mode) {
            return Err(GeneratorError::Provider(AIError::unavailable(format!(
                "scripted {} failure",
                mode
            ))));
        }

        let scripted = lock(&self.replies).pop_front();
        match scripted {
            Some(ScriptedReply::Output(output)) => Ok(output),
            Some(ScriptedReply::Error(err)) => Err(err),
            None => Ok(fabricate(context, mode)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::domain::interview::IndexWindow;

    fn context(mode: GenerationMode, window: Option<IndexWindow>) -> GenerationContext {
        GenerationContext {
            session_id: SessionId::new(),
            mode,
            purpose: "purpose".into(),
            background: None,
            entries: vec![],
            phase: None,
            phase_guidance: None,
            prior_analyses: vec![],
            target_window: window,
            report_instructions: None,
        }
    }

    #[tokio::test]
    async fn fabricates_one_statement_per_index() {
        let generator = MockStatementGenerator::new();
        let ctx = context(GenerationMode::Batch, Some(IndexWindow::new(6, 10).unwrap()));

        let statements = generator
            .generate(&ctx, GenerationMode::Batch)
            .await
            .unwrap()
            .into_statements()
            .unwrap();

        assert_eq!(statements.len(), 5);
        assert_eq!(statements[0].statement, "Statement Q6");
        assert_eq!(statements[0].options.len(), 5);
    }

    #[tokio::test]
    async fn queued_replies_take_precedence() {
        let generator = MockStatementGenerator::new()
            .with_text("scripted")
            .with_error(GeneratorError::malformed("bad"));
        let ctx = context(GenerationMode::Analysis, None);

        let first = generator.generate(&ctx, GenerationMode::Analysis).await.unwrap();
        assert_eq!(first, GenerationOutput::Text("scripted".into()));
        assert!(generator.generate(&ctx, GenerationMode::Analysis).await.is_err());
        assert!(generator.generate(&ctx, GenerationMode::Analysis).await.is_ok());
        assert_eq!(generator.calls_for(GenerationMode::Analysis), 3);
    }

    #[tokio::test]
    async fn failing_mode_fails_until_recovered() {
        let generator = MockStatementGenerator::new().failing(GenerationMode::Report);
        let ctx = context(GenerationMode::Report, None);

        assert!(generator.generate(&ctx, GenerationMode::Report).await.is_err());
        generator.recover(GenerationMode::Report);
        assert!(generator.generate(&ctx, GenerationMode::Report).await.is_ok());
    }
}
