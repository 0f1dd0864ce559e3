//! ProgressionEngine - decides and runs the next generation steps.
//!
//! Every entry point reads fresh state, applies the progression policy and
//! runs the resulting actions. Each action runs in its own tokio task holding
//! a single-flight guard keyed by (session, action kind); a duplicate trigger
//! for a key already in flight is dropped. Because the work is spawned,
//! dropping the caller's future does not cancel a generation that started.

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

use crate::application::single_flight::SingleFlight;
use crate::domain::foundation::SessionId;
use crate::domain::interview::{
    ActionKind, Analysis, Answer, InterviewError, InterviewPolicy, Progress, ProgressionState,
    Question, Report, ScheduledAction, Session, SessionPreset,
};
use crate::ports::{PresetCatalog, StatementGenerator};

use super::create_session::{CreateSessionCommand, CreateSessionHandler, CreateSessionResult};
use super::generate_analysis::AnalysisGenerator;
use super::generate_batch::BatchGenerator;
use super::generate_report::ReportGenerator;
use super::preset_overview::{PresetOverview, PresetOverviewHandler};
use super::repositories::InterviewRepositories;
use super::snapshot::SessionSnapshot;
use super::submit_answer::{SubmitAnswerCommand, SubmitAnswerHandler};

/// Engine-wide defaults.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Policy for new sessions unless a preset or command overrides it.
    pub defaults: InterviewPolicy,
    pub recent_sessions_limit: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            defaults: InterviewPolicy::default(),
            recent_sessions_limit: 20,
        }
    }
}

/// How one scheduled action ended.
#[derive(Debug, Clone)]
pub enum ActionStatus {
    Completed,
    /// Another run for the same session and kind was in flight.
    Skipped,
    Failed(InterviewError),
}

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub action: ScheduledAction,
    pub status: ActionStatus,
}

impl ActionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, ActionStatus::Failed(_))
    }

    pub fn error(&self) -> Option<&InterviewError> {
        match &self.status {
            ActionStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Everything a driver needs to render a session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session: Session,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
    pub analyses: Vec<Analysis>,
    pub progress: Progress,
    pub state: ProgressionState,
    pub finish_available: bool,
    /// Actions the policy still requires.
    pub pending_actions: Vec<ScheduledAction>,
    /// Kinds currently generating for this session.
    pub in_flight: Vec<ActionKind>,
    pub latest_report_version: Option<u32>,
}

/// Result of running the policy once.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub outcomes: Vec<ActionOutcome>,
    /// State re-read after the actions settled.
    pub state: SessionState,
}

impl Evaluation {
    pub fn failures(&self) -> impl Iterator<Item = &InterviewError> {
        self.outcomes.iter().filter_map(ActionOutcome::error)
    }
}

/// Wire-friendly label for [`ActionStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatusKind {
    Completed,
    Skipped,
    Failed,
}

impl ActionStatus {
    pub fn kind(&self) -> ActionStatusKind {
        match self {
            ActionStatus::Completed => ActionStatusKind::Completed,
            ActionStatus::Skipped => ActionStatusKind::Skipped,
            ActionStatus::Failed(_) => ActionStatusKind::Failed,
        }
    }
}

const SINGLE_FLIGHT_KINDS: [ActionKind; 2] = [ActionKind::GenerateBatch, ActionKind::GenerateAnalysis];

/// The interview progression engine.
#[derive(Clone)]
pub struct ProgressionEngine {
    repos: InterviewRepositories,
    presets: Arc<dyn PresetCatalog>,
    creator: Arc<CreateSessionHandler>,
    answers: Arc<SubmitAnswerHandler>,
    overview: Arc<PresetOverviewHandler>,
    batches: BatchGenerator,
    analyses: AnalysisGenerator,
    reports: ReportGenerator,
    flights: SingleFlight<(SessionId, ActionKind)>,
    recent_sessions_limit: u32,
}

impl ProgressionEngine {
    pub fn new(
        repos: InterviewRepositories,
        generator: Arc<dyn StatementGenerator>,
        presets: Arc<dyn PresetCatalog>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            creator: Arc::new(CreateSessionHandler::new(
                repos.clone(),
                presets.clone(),
                settings.defaults,
            )),
            answers: Arc::new(SubmitAnswerHandler::new(repos.clone())),
            overview: Arc::new(PresetOverviewHandler::new(repos.clone())),
            batches: BatchGenerator::new(repos.clone(), generator.clone()),
            analyses: AnalysisGenerator::new(repos.clone(), generator.clone()),
            reports: ReportGenerator::new(repos.clone(), generator),
            repos,
            presets,
            flights: SingleFlight::new(),
            recent_sessions_limit: settings.recent_sessions_limit,
        }
    }

    /// Creates a session. The first batch is generated by the next evaluation.
    pub async fn create_session(
        &self,
        cmd: CreateSessionCommand,
    ) -> Result<CreateSessionResult, InterviewError> {
        self.creator.handle(cmd).await
    }

    /// Records an answer, then evaluates the session.
    pub async fn submit_answer(&self, cmd: SubmitAnswerCommand) -> Result<Evaluation, InterviewError> {
        let session_id = cmd.session_id;
        self.answers.handle(cmd).await?;
        self.evaluate(&session_id).await
    }

    /// Applies the progression policy and runs whatever it schedules.
    ///
    /// Action failures are reported per outcome; only loading errors fail
    /// the call itself.
    pub async fn evaluate(&self, session_id: &SessionId) -> Result<Evaluation, InterviewError> {
        let snapshot = SessionSnapshot::load(&self.repos, session_id).await?;
        let decision = snapshot.decision();

        tracing::debug!(
            session_id = %session_id,
            state = ?decision.state,
            actions = decision.actions.len(),
            "Evaluated progression"
        );

        let outcomes = self.run(&snapshot.session, decision.actions).await;
        let state = self.get_state(session_id).await?;
        Ok(Evaluation { outcomes, state })
    }

    /// Generates the next batch past every answered question ("go deeper").
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the session is completed or has unanswered questions
    pub async fn extend(&self, session_id: &SessionId) -> Result<Evaluation, InterviewError> {
        let snapshot = SessionSnapshot::load(&self.repos, session_id).await?;
        if !snapshot.session.is_active() {
            return Err(InterviewError::invalid_state("Session is completed"));
        }
        let window = snapshot.progress().extension_window().ok_or_else(|| {
            InterviewError::invalid_state("Every question must be answered before extending")
        })?;

        let outcomes = self
            .run(&snapshot.session, vec![ScheduledAction::GenerateBatch { window }])
            .await;
        let state = self.get_state(session_id).await?;
        Ok(Evaluation { outcomes, state })
    }

    /// Generates a new report version on demand.
    pub async fn request_report(&self, session_id: &SessionId) -> Result<Report, InterviewError> {
        let session = self.find_session(session_id).await?;
        let reports = self.reports.clone();

        tokio::spawn(async move { reports.generate(&session).await })
            .await
            .map_err(|e| {
                InterviewError::generation(ActionKind::GenerateReport, None, e.to_string())
            })?
    }

    /// Marks the session completed. Requires at least one report.
    pub async fn complete(&self, session_id: &SessionId) -> Result<Session, InterviewError> {
        let mut session = self.find_session(session_id).await?;
        if self.repos.reports.latest(session_id).await?.is_none() {
            return Err(InterviewError::invalid_state(
                "A report must exist before the session can be completed",
            ));
        }

        session.complete()?;
        self.repos.sessions.update(&session).await?;

        tracing::info!(session_id = %session_id, "Session completed");
        Ok(session)
    }

    /// Current state without running any action.
    pub async fn get_state(&self, session_id: &SessionId) -> Result<SessionState, InterviewError> {
        let snapshot = SessionSnapshot::load(&self.repos, session_id).await?;
        let progress = snapshot.progress();
        let decision = snapshot.decision();
        let latest_report_version = self
            .repos
            .reports
            .latest(session_id)
            .await?
            .map(|r| r.version());
        let in_flight = SINGLE_FLIGHT_KINDS
            .into_iter()
            .filter(|kind| self.flights.is_in_flight(&(*session_id, *kind)))
            .collect();

        Ok(SessionState {
            session: snapshot.session,
            questions: snapshot.questions,
            answers: snapshot.answers,
            analyses: snapshot.analyses,
            progress,
            state: decision.state,
            finish_available: decision.finish_available,
            pending_actions: decision.actions,
            in_flight,
            latest_report_version,
        })
    }

    /// Most recently created sessions.
    pub async fn list_sessions(&self) -> Result<Vec<Session>, InterviewError> {
        Ok(self
            .repos
            .sessions
            .list_recent(self.recent_sessions_limit)
            .await?)
    }

    /// A specific report version, or the latest when `version` is `None`.
    pub async fn report(
        &self,
        session_id: &SessionId,
        version: Option<u32>,
    ) -> Result<Report, InterviewError> {
        self.find_session(session_id).await?;
        let report = match version {
            Some(v) => self.repos.reports.find_version(session_id, v).await?,
            None => self.repos.reports.latest(session_id).await?,
        };
        report.ok_or_else(|| {
            let id = match version {
                Some(v) => format!("{} v{}", session_id, v),
                None => format!("{} latest", session_id),
            };
            InterviewError::not_found("Report", id)
        })
    }

    /// All report versions, oldest first.
    pub async fn list_reports(&self, session_id: &SessionId) -> Result<Vec<Report>, InterviewError> {
        self.find_session(session_id).await?;
        let mut reports = self.repos.reports.list_by_session(session_id).await?;
        reports.sort_by_key(|r| r.version());
        Ok(reports)
    }

    pub fn preset(&self, slug: &str) -> Result<SessionPreset, InterviewError> {
        self.presets
            .find(slug)
            .ok_or_else(|| InterviewError::not_found("Preset", slug))
    }

    pub fn presets(&self) -> Vec<SessionPreset> {
        self.presets.list()
    }

    /// Every session started from preset `slug`, with answers and reports.
    pub async fn preset_overview(&self, slug: &str) -> Result<PresetOverview, InterviewError> {
        let preset = self.preset(slug)?;
        self.overview.handle(preset).await
    }

    async fn find_session(&self, session_id: &SessionId) -> Result<Session, InterviewError> {
        self.repos
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| InterviewError::not_found("Session", session_id))
    }

    /// Runs actions concurrently, each under its single-flight guard.
    async fn run(&self, session: &Session, actions: Vec<ScheduledAction>) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::with_capacity(actions.len());
        let mut spawned = Vec::new();

        for action in actions {
            let Some(guard) = self.flights.try_acquire((*session.id(), action.kind())) else {
                tracing::debug!(
                    session_id = %session.id(),
                    action = %action.kind(),
                    window = %action.window(),
                    "Action already in flight, dropped"
                );
                outcomes.push(ActionOutcome {
                    action,
                    status: ActionStatus::Skipped,
                });
                continue;
            };

            let batches = self.batches.clone();
            let analyses = self.analyses.clone();
            let session = session.clone();
            let handle = tokio::spawn(async move {
                let _guard = guard;
                match action {
                    ScheduledAction::GenerateBatch { window } => {
                        batches.generate(&session, window).await.map(|_| ())
                    }
                    ScheduledAction::GenerateAnalysis { batch } => {
                        analyses.generate(&session, batch).await.map(|_| ())
                    }
                }
            });
            spawned.push((action, handle));
        }

        let (pending, handles): (Vec<_>, Vec<_>) = spawned.into_iter().unzip();
        for (action, joined) in pending.into_iter().zip(join_all(handles).await) {
            let status = match joined {
                Ok(Ok(())) => ActionStatus::Completed,
                Ok(Err(err)) => {
                    tracing::warn!(
                        session_id = %session.id(),
                        action = %action.kind(),
                        window = %action.window(),
                        error = %err,
                        "Action failed"
                    );
                    ActionStatus::Failed(err)
                }
                Err(join_err) => ActionStatus::Failed(InterviewError::generation(
                    action.kind(),
                    Some(action.window()),
                    format!("task aborted: {}", join_err),
                )),
            };
            outcomes.push(ActionOutcome { action, status });
        }

        outcomes
    }
}
