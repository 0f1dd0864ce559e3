//! In-Memory Interview Store
//!
//! Implements every interview repository over one lock-guarded state, so a
//! batch insert or a report version assignment happens under a single write
//! lock. Useful for testing and development.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, QuestionId, SessionId};
use crate::domain::interview::{Analysis, Answer, IndexWindow, Question, Report, ReportDraft, Session};
use crate::ports::{
    AnalysisRepository, AnswerRepository, QuestionRepository, ReportRepository, SessionRepository,
};

#[derive(Debug, Default)]
struct StoreState {
    sessions: HashMap<SessionId, Session>,
    questions: BTreeMap<(SessionId, u32), Question>,
    answers: HashMap<(SessionId, QuestionId), Answer>,
    analyses: BTreeMap<(SessionId, u32), Analysis>,
    reports: BTreeMap<(SessionId, u32), Report>,
}

/// In-memory storage for all interview entities.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInterviewStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryInterviewStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        *self.state.write().await = StoreState::default();
    }

    /// Number of stored questions for a session.
    pub async fn question_count(&self, session_id: &SessionId) -> usize {
        let state = self.state.read().await;
        state.questions.range(session_range(session_id)).count()
    }

    /// Number of stored analyses for a session.
    pub async fn analysis_count(&self, session_id: &SessionId) -> usize {
        let state = self.state.read().await;
        state.analyses.range(session_range(session_id)).count()
    }
}

fn session_range(session_id: &SessionId) -> std::ops::RangeInclusive<(SessionId, u32)> {
    (*session_id, 0)..=(*session_id, u32::MAX)
}

#[async_trait]
impl SessionRepository for InMemoryInterviewStore {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.sessions.contains_key(session.id()) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Session {} already exists", session.id()),
            ));
        }
        state.sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state.sessions.get_mut(session.id()) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            )),
        }
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        Ok(self.state.read().await.sessions.get(id).cloned())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Session>, DomainError> {
        let state = self.state.read().await;
        let mut sessions: Vec<Session> = state.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn list_by_preset(&self, slug: &str) -> Result<Vec<Session>, DomainError> {
        let state = self.state.read().await;
        let mut sessions: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.preset_slug() == Some(slug))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| a.created_at().cmp(b.created_at()));
        Ok(sessions)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryInterviewStore {
    async fn insert_batch(&self, questions: &[Question]) -> Result<Vec<Question>, DomainError> {
        let mut state = self.state.write().await;
        let mut inserted = Vec::with_capacity(questions.len());
        for question in questions {
            let key = (*question.session_id(), question.index());
            if state.questions.contains_key(&key) {
                continue;
            }
            state.questions.insert(key, question.clone());
            inserted.push(question.clone());
        }
        Ok(inserted)
    }

    async fn find_by_id(&self, id: &QuestionId) -> Result<Option<Question>, DomainError> {
        let state = self.state.read().await;
        Ok(state.questions.values().find(|q| q.id() == id).cloned())
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Question>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .questions
            .range(session_range(session_id))
            .map(|(_, q)| q.clone())
            .collect())
    }

    async fn list_in_window(
        &self,
        session_id: &SessionId,
        window: IndexWindow,
    ) -> Result<Vec<Question>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .questions
            .range((*session_id, window.start)..=(*session_id, window.end))
            .map(|(_, q)| q.clone())
            .collect())
    }
}

#[async_trait]
impl AnswerRepository for InMemoryInterviewStore {
    async fn upsert(&self, answer: &Answer) -> Result<Answer, DomainError> {
        let mut state = self.state.write().await;
        state
            .answers
            .insert((*answer.session_id(), *answer.question_id()), answer.clone());
        Ok(answer.clone())
    }

    async fn find(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
    ) -> Result<Option<Answer>, DomainError> {
        let state = self.state.read().await;
        Ok(state.answers.get(&(*session_id, *question_id)).cloned())
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Answer>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .answers
            .iter()
            .filter(|((sid, _), _)| sid == session_id)
            .map(|(_, a)| a.clone())
            .collect())
    }
}

#[async_trait]
impl AnalysisRepository for InMemoryInterviewStore {
    async fn upsert(&self, analysis: &Analysis) -> Result<Analysis, DomainError> {
        let mut state = self.state.write().await;
        let stored = state
            .analyses
            .entry((*analysis.session_id(), analysis.batch_index()))
            .or_insert_with(|| analysis.clone());
        Ok(stored.clone())
    }

    async fn find_by_batch(
        &self,
        session_id: &SessionId,
        batch_index: u32,
    ) -> Result<Option<Analysis>, DomainError> {
        let state = self.state.read().await;
        Ok(state.analyses.get(&(*session_id, batch_index)).cloned())
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Analysis>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .analyses
            .range(session_range(session_id))
            .map(|(_, a)| a.clone())
            .collect())
    }
}

#[async_trait]
impl ReportRepository for InMemoryInterviewStore {
    async fn append(&self, draft: ReportDraft) -> Result<Report, DomainError> {
        let mut state = self.state.write().await;
        let session_id = draft.session_id;
        let next_version = state
            .reports
            .range(session_range(&session_id))
            .next_back()
            .map(|((_, v), _)| v + 1)
            .unwrap_or(1);
        let report = Report::from_draft(draft, next_version);
        state
            .reports
            .insert((session_id, next_version), report.clone());
        Ok(report)
    }

    async fn latest(&self, session_id: &SessionId) -> Result<Option<Report>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .reports
            .range(session_range(session_id))
            .next_back()
            .map(|(_, r)| r.clone()))
    }

    async fn find_version(
        &self,
        session_id: &SessionId,
        version: u32,
    ) -> Result<Option<Report>, DomainError> {
        let state = self.state.read().await;
        Ok(state.reports.get(&(*session_id, version)).cloned())
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Report>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .reports
            .range(session_range(session_id))
            .map(|(_, r)| r.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interview::{
        BatchWindow, InterviewPolicy, QuestionDraft, QuestionSource,
    };

    fn session() -> Session {
        Session::new(SessionId::new(), "Purpose", InterviewPolicy::default()).unwrap()
    }

    fn question(session_id: SessionId, index: u32) -> Question {
        let draft = QuestionDraft::new(
            format!("S{}", index),
            "",
            (0..5).map(|i| i.to_string()).collect(),
        )
        .unwrap();
        Question::from_draft(session_id, index, draft, QuestionSource::Generated)
    }

    #[tokio::test]
    async fn save_rejects_duplicate_session() {
        let store = InMemoryInterviewStore::new();
        let s = session();
        store.save(&s).await.unwrap();
        let err = store.save(&s).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn update_unknown_session_is_not_found() {
        let store = InMemoryInterviewStore::new();
        let err = store.update(&session()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotFound);
    }

    #[tokio::test]
    async fn list_recent_is_newest_first_and_limited() {
        let store = InMemoryInterviewStore::new();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let s = session();
            ids.push(*s.id());
            store.save(&s).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        let recent = store.list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id(), &ids[2]);
        assert_eq!(recent[1].id(), &ids[1]);
    }

    #[tokio::test]
    async fn list_by_preset_filters_on_slug_oldest_first() {
        let store = InMemoryInterviewStore::new();
        let mut career = Vec::new();
        for slug in ["career", "health", "career"] {
            let s = session().with_preset_slug(slug);
            if slug == "career" {
                career.push(*s.id());
            }
            store.save(&s).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        store.save(&session()).await.unwrap();

        let listed = store.list_by_preset("career").await.unwrap();
        let ids: Vec<SessionId> = listed.iter().map(|s| *s.id()).collect();
        assert_eq!(ids, career);
        assert!(store.list_by_preset("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_batch_skips_existing_indices() {
        let store = InMemoryInterviewStore::new();
        let sid = SessionId::new();
        let first: Vec<Question> = (1..=3).map(|i| question(sid, i)).collect();
        assert_eq!(store.insert_batch(&first).await.unwrap().len(), 3);

        let replay: Vec<Question> = (2..=5).map(|i| question(sid, i)).collect();
        let inserted = store.insert_batch(&replay).await.unwrap();
        assert_eq!(inserted.iter().map(|q| q.index()).collect::<Vec<_>>(), vec![4, 5]);

        let all = QuestionRepository::list_by_session(&store, &sid).await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[1].id(), first[1].id());
    }

    #[tokio::test]
    async fn list_in_window_is_scoped_to_session() {
        let store = InMemoryInterviewStore::new();
        let a = SessionId::new();
        let b = SessionId::new();
        let qs: Vec<Question> = (1..=10)
            .map(|i| question(a, i))
            .chain((1..=10).map(|i| question(b, i)))
            .collect();
        store.insert_batch(&qs).await.unwrap();

        let window = store
            .list_in_window(&a, IndexWindow::new(6, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(window.len(), 5);
        assert!(window.iter().all(|q| q.session_id() == &a));
    }

    #[tokio::test]
    async fn answer_upsert_replaces_previous() {
        let store = InMemoryInterviewStore::new();
        let sid = SessionId::new();
        let qid = QuestionId::new();
        AnswerRepository::upsert(&store, &Answer::new(sid, qid, 0, None).unwrap())
            .await
            .unwrap();
        AnswerRepository::upsert(
            &store,
            &Answer::new(sid, qid, 5, Some("depends".into())).unwrap(),
        )
        .await
        .unwrap();

        let answers = AnswerRepository::list_by_session(&store, &sid).await.unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].selected_option(), 5);
        assert_eq!(answers[0].free_text(), Some("depends"));
    }

    #[tokio::test]
    async fn analysis_upsert_keeps_first_row() {
        let store = InMemoryInterviewStore::new();
        let sid = SessionId::new();
        let batch = BatchWindow::for_batch(1, 5).unwrap();
        let first = Analysis::new(sid, batch, "first").unwrap();
        let second = Analysis::new(sid, batch, "second").unwrap();

        AnalysisRepository::upsert(&store, &first).await.unwrap();
        let stored = AnalysisRepository::upsert(&store, &second).await.unwrap();

        assert_eq!(stored.text(), "first");
        assert_eq!(store.analysis_count(&sid).await, 1);
    }

    #[tokio::test]
    async fn report_versions_increase_per_session() {
        let store = InMemoryInterviewStore::new();
        let a = SessionId::new();
        let b = SessionId::new();

        let r1 = store.append(ReportDraft::new(a, "one").unwrap()).await.unwrap();
        let r2 = store.append(ReportDraft::new(a, "two").unwrap()).await.unwrap();
        let other = store.append(ReportDraft::new(b, "x").unwrap()).await.unwrap();

        assert_eq!((r1.version(), r2.version(), other.version()), (1, 2, 1));
        assert_eq!(store.latest(&a).await.unwrap().unwrap().content(), "two");
        assert_eq!(store.find_version(&a, 1).await.unwrap().unwrap().content(), "one");
        assert!(store.find_version(&a, 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_report_appends_get_distinct_versions() {
        let store = InMemoryInterviewStore::new();
        let sid = SessionId::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .append(ReportDraft::new(sid, format!("r{}", i)).unwrap())
                        .await
                        .unwrap()
                        .version()
                })
            })
            .collect();

        let mut versions = Vec::new();
        for h in handles {
            versions.push(h.await.unwrap());
        }
        versions.sort_unstable();
        assert_eq!(versions, (1..=8).collect::<Vec<_>>());
    }
}
