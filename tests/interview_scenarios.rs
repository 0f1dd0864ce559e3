//! End-to-end interview scenarios against the in-memory store.
//!
//! These tests drive the progression engine the way a client would:
//! create a session, evaluate, answer, and request reports.

use std::sync::Arc;
use std::time::Duration;

use sonar::adapters::ai::{sample_statement, MockStatementGenerator};
use sonar::adapters::memory::InMemoryInterviewStore;
use sonar::adapters::presets::YamlPresetCatalog;
use sonar::application::{
    ActionStatusKind, CreateSessionCommand, EngineSettings, Evaluation, InterviewRepositories,
    ProgressionEngine, SessionState, SubmitAnswerCommand,
};
use sonar::domain::foundation::SessionId;
use sonar::domain::interview::{
    ActionKind, Answer, GenerationMode, InterviewError, InterviewPolicy, PhaseProfile,
    Question, QuestionDraft, QuestionSource, ScheduledAction,
};
use sonar::ports::{AnalysisRepository, AnswerRepository, GeneratedStatement, QuestionRepository};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    store: Arc<InMemoryInterviewStore>,
    generator: MockStatementGenerator,
    engine: ProgressionEngine,
}

fn harness(generator: MockStatementGenerator, target: u32) -> Harness {
    let store = Arc::new(InMemoryInterviewStore::new());
    let engine = ProgressionEngine::new(
        InterviewRepositories::from_store(store.clone()),
        Arc::new(generator.clone()),
        Arc::new(YamlPresetCatalog::empty()),
        EngineSettings {
            defaults: InterviewPolicy::new(5, target, PhaseProfile::default()).unwrap(),
            recent_sessions_limit: 20,
        },
    );
    Harness {
        store,
        generator,
        engine,
    }
}

impl Harness {
    async fn start(&self) -> SessionId {
        let created = self
            .engine
            .create_session(CreateSessionCommand::with_purpose("Understand my sleep habits"))
            .await
            .unwrap();
        *created.session.id()
    }

    async fn answer(&self, id: &SessionId, index: u32, option: u8) -> Evaluation {
        let state = self.engine.get_state(id).await.unwrap();
        let question = state
            .questions
            .iter()
            .find(|q| q.index() == index)
            .unwrap_or_else(|| panic!("question {} not generated", index));
        self.engine
            .submit_answer(SubmitAnswerCommand {
                session_id: *id,
                question_id: *question.id(),
                selected_option: option,
                free_text: None,
            })
            .await
            .unwrap()
    }
}

fn assert_invariants(state: &SessionState) {
    assert!(state.progress.answered_count <= state.progress.question_count);

    let answered: Vec<u32> = state
        .questions
        .iter()
        .filter(|q| state.answers.iter().any(|a| a.question_id() == q.id()))
        .map(|q| q.index())
        .collect();
    for analysis in &state.analyses {
        for index in analysis.batch().window.indices() {
            assert!(
                answered.contains(&index),
                "analysis {} covers unanswered question {}",
                analysis.batch_index(),
                index
            );
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn target_reached_schedules_only_analysis() {
    let h = harness(MockStatementGenerator::new(), 5);
    let id = h.start().await;
    h.engine.evaluate(&id).await.unwrap();

    for index in 1..=4 {
        let eval = h.answer(&id, index, 0).await;
        assert!(eval.outcomes.is_empty(), "answer {} scheduled work", index);
        assert!(!eval.state.finish_available);
    }

    let eval = h.answer(&id, 5, 0).await;

    assert_eq!(eval.outcomes.len(), 1);
    match eval.outcomes[0].action {
        ScheduledAction::GenerateAnalysis { batch } => assert_eq!(batch.batch_index, 1),
        other => panic!("unexpected action: {other:?}"),
    }
    assert_eq!(eval.outcomes[0].status.kind(), ActionStatusKind::Completed);
    assert!(eval.state.finish_available);
    assert_eq!(h.store.question_count(&id).await, 5);
    assert_invariants(&eval.state);
}

#[tokio::test]
async fn other_option_requires_free_text() {
    let h = harness(MockStatementGenerator::new(), 50);
    let id = h.start().await;
    let state = h.engine.evaluate(&id).await.unwrap().state;
    let question_id = *state.questions[0].id();

    let empty = h
        .engine
        .submit_answer(SubmitAnswerCommand {
            session_id: id,
            question_id,
            selected_option: 5,
            free_text: Some(String::new()),
        })
        .await;
    assert!(matches!(empty, Err(InterviewError::Validation(_))));

    let eval = h
        .engine
        .submit_answer(SubmitAnswerCommand {
            session_id: id,
            question_id,
            selected_option: 5,
            free_text: Some("only on weekends".into()),
        })
        .await
        .unwrap();
    assert_eq!(eval.state.answers.len(), 1);
    assert_eq!(eval.state.answers[0].free_text(), Some("only on weekends"));
}

#[tokio::test]
async fn short_batch_persists_nothing() {
    let statements: Vec<GeneratedStatement> = (1..=4).map(sample_statement).collect();
    let h = harness(MockStatementGenerator::new().with_statements(statements), 50);
    let id = h.start().await;

    let eval = h.engine.evaluate(&id).await.unwrap();

    let err = eval.failures().next().expect("batch failure reported");
    match err {
        InterviewError::Generation { action, window, .. } => {
            assert_eq!(*action, ActionKind::GenerateBatch);
            assert_eq!(window.map(|w| (w.start, w.end)), Some((1, 5)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.store.question_count(&id).await, 0);

    // The next trigger retries with the default output.
    h.engine.evaluate(&id).await.unwrap();
    assert_eq!(h.store.question_count(&id).await, 5);
}

#[tokio::test]
async fn reports_are_versioned_and_reflect_later_answers() {
    let h = harness(MockStatementGenerator::new(), 50);
    let id = h.start().await;
    h.engine.evaluate(&id).await.unwrap();
    h.answer(&id, 1, 0).await;

    let first = h.engine.request_report(&id).await.unwrap();
    h.answer(&id, 2, 1).await;
    h.answer(&id, 3, 2).await;
    let second = h.engine.request_report(&id).await.unwrap();

    assert_eq!(first.version(), 1);
    assert_eq!(second.version(), 2);
    assert!(first.content().contains("Based on 1 answers"));
    assert!(second.content().contains("Based on 3 answers"));

    let v1 = h.engine.report(&id, Some(1)).await.unwrap();
    assert_eq!(v1.content(), first.content());
    let latest = h.engine.report(&id, None).await.unwrap();
    assert_eq!(latest.version(), 2);

    let report_contexts: Vec<usize> = h
        .generator
        .get_calls()
        .iter()
        .filter(|c| c.mode == GenerationMode::Report)
        .map(|c| c.entries.len())
        .collect();
    assert_eq!(report_contexts, vec![1, 3]);
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test]
async fn resubmitting_keeps_one_answer_with_latest_values() {
    let h = harness(MockStatementGenerator::new(), 50);
    let id = h.start().await;
    h.engine.evaluate(&id).await.unwrap();

    h.answer(&id, 1, 0).await;
    h.answer(&id, 1, 2).await;
    let eval = h.answer(&id, 1, 4).await;

    assert_eq!(eval.state.answers.len(), 1);
    assert_eq!(eval.state.answers[0].selected_option(), 4);
    assert_eq!(eval.state.progress.answered_count, 1);
}

#[tokio::test]
async fn concurrent_analysis_triggers_yield_one_analysis() {
    let generator = MockStatementGenerator::new().with_delay(Duration::from_millis(50));
    let h = harness(generator, 50);
    let id = h.start().await;

    // Seed a fully answered first batch directly in the store.
    let questions: Vec<Question> = (1..=5)
        .map(|i| {
            let draft = QuestionDraft::new(
                format!("Statement {}", i),
                "",
                vec!["yes".into(), "don't know".into(), "a".into(), "b".into(), "c".into()],
            )
            .unwrap();
            Question::from_draft(id, i, draft, QuestionSource::Generated)
        })
        .collect();
    QuestionRepository::insert_batch(&*h.store, &questions)
        .await
        .unwrap();
    for q in &questions {
        let answer = Answer::new(id, *q.id(), 1, None).unwrap();
        AnswerRepository::upsert(&*h.store, &answer).await.unwrap();
    }

    let (a, b) = tokio::join!(h.engine.evaluate(&id), h.engine.evaluate(&id));
    let outcomes: Vec<_> = a
        .unwrap()
        .outcomes
        .into_iter()
        .chain(b.unwrap().outcomes)
        .filter(|o| o.action.kind() == ActionKind::GenerateAnalysis)
        .collect();

    let completed = outcomes
        .iter()
        .filter(|o| o.status.kind() == ActionStatusKind::Completed)
        .count();
    assert_eq!(completed, 1);
    assert_eq!(h.generator.calls_for(GenerationMode::Analysis), 1);
    let analyses = AnalysisRepository::list_by_session(&*h.store, &id)
        .await
        .unwrap();
    assert_eq!(analyses.len(), 1);
}

#[tokio::test]
async fn invariants_hold_through_a_long_session() {
    let h = harness(MockStatementGenerator::new(), 15);
    let id = h.start().await;
    let mut state = h.engine.evaluate(&id).await.unwrap().state;
    assert_invariants(&state);

    for index in 1..=15u32 {
        let eval = h.answer(&id, index, (index % 5) as u8).await;
        assert!(eval.failures().next().is_none());
        state = eval.state;
        assert_invariants(&state);
    }

    assert_eq!(state.progress.question_count, 15);
    assert_eq!(state.analyses.len(), 3);
    assert!(state.finish_available);
    assert!(state.pending_actions.is_empty());

    let extended = h.engine.extend(&id).await.unwrap();
    assert_eq!(extended.state.progress.question_count, 20);
    assert_invariants(&extended.state);
}

#[tokio::test]
async fn phase_of_generated_batches_follows_profile() {
    let h = harness(MockStatementGenerator::new(), 50);
    let id = h.start().await;
    h.engine.evaluate(&id).await.unwrap();
    for index in 1..=15 {
        h.answer(&id, index, 0).await;
    }

    let phases: Vec<_> = h
        .generator
        .get_calls()
        .iter()
        .filter(|c| c.mode == GenerationMode::Batch)
        .map(|c| (c.target_window.map(|w| w.start), c.phase))
        .collect();

    use sonar::domain::interview::Phase::{DeepDive, Exploration};
    assert_eq!(
        phases,
        vec![
            (Some(1), Some(Exploration)),
            (Some(6), Some(Exploration)),
            (Some(11), Some(Exploration)),
            (Some(16), Some(DeepDive)),
        ]
    );
}
