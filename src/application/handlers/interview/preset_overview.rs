//! PresetOverviewHandler - Query handler for every session of one preset.

use std::collections::HashMap;

use crate::domain::interview::{Answer, InterviewError, Question, Report, Session, SessionPreset};

use super::repositories::InterviewRepositories;
use super::snapshot::SessionSnapshot;

/// An answered question paired with its answer.
#[derive(Debug, Clone)]
pub struct AnsweredQuestion {
    pub question: Question,
    pub answer: Answer,
}

/// One session as listed under its preset.
#[derive(Debug, Clone)]
pub struct PresetSessionEntry {
    pub session: Session,
    /// Ordered by question index; unanswered questions are left out.
    pub responses: Vec<AnsweredQuestion>,
    /// Ordered by version.
    pub reports: Vec<Report>,
}

/// Sessions started from a preset, oldest first.
#[derive(Debug, Clone)]
pub struct PresetOverview {
    pub preset: SessionPreset,
    pub sessions: Vec<PresetSessionEntry>,
}

/// Handler for the preset overview.
pub struct PresetOverviewHandler {
    repos: InterviewRepositories,
}

impl PresetOverviewHandler {
    pub fn new(repos: InterviewRepositories) -> Self {
        Self { repos }
    }

    pub async fn handle(&self, preset: SessionPreset) -> Result<PresetOverview, InterviewError> {
        let sessions = self.repos.sessions.list_by_preset(&preset.slug).await?;

        let mut entries = Vec::with_capacity(sessions.len());
        for session in sessions {
            entries.push(self.entry(session).await?);
        }

        tracing::debug!(preset = %preset.slug, sessions = entries.len(), "Preset overview loaded");
        Ok(PresetOverview {
            preset,
            sessions: entries,
        })
    }

    async fn entry(&self, session: Session) -> Result<PresetSessionEntry, InterviewError> {
        let snapshot = SessionSnapshot::load(&self.repos, session.id()).await?;

        let mut by_question: HashMap<_, _> = snapshot
            .answers
            .into_iter()
            .map(|a| (*a.question_id(), a))
            .collect();
        let responses = snapshot
            .questions
            .into_iter()
            .filter_map(|question| {
                by_question
                    .remove(question.id())
                    .map(|answer| AnsweredQuestion { question, answer })
            })
            .collect();

        let mut reports = self.repos.reports.list_by_session(session.id()).await?;
        reports.sort_by_key(|r| r.version());

        Ok(PresetSessionEntry {
            session: snapshot.session,
            responses,
            reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::memory::InMemoryInterviewStore;
    use crate::domain::foundation::SessionId;
    use crate::domain::interview::{InterviewPolicy, QuestionDraft, QuestionSource, ReportDraft};
    use crate::ports::{AnswerRepository, QuestionRepository, ReportRepository, SessionRepository};

    fn preset(slug: &str) -> SessionPreset {
        SessionPreset {
            slug: slug.into(),
            title: "Career values".into(),
            purpose: "Understand career values".into(),
            background_text: None,
            report_instructions: None,
            target_question_count: None,
            statements: Vec::new(),
        }
    }

    async fn seed_session(store: &InMemoryInterviewStore, slug: Option<&str>) -> SessionId {
        let mut session = Session::new(SessionId::new(), "Purpose", InterviewPolicy::default()).unwrap();
        if let Some(slug) = slug {
            session = session.with_preset_slug(slug);
        }
        store.save(&session).await.unwrap();
        *session.id()
    }

    async fn seed_questions(store: &InMemoryInterviewStore, id: SessionId, count: u32) -> Vec<Question> {
        let questions: Vec<Question> = (1..=count)
            .map(|i| {
                let draft = QuestionDraft::new(
                    format!("Statement {}", i),
                    "",
                    vec!["yes".into(), "don't know".into(), "a".into(), "b".into(), "c".into()],
                )
                .unwrap();
                Question::from_draft(id, i, draft, QuestionSource::Preset)
            })
            .collect();
        store.insert_batch(&questions).await.unwrap();
        questions
    }

    #[tokio::test]
    async fn joins_answers_to_questions_in_index_order() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let id = seed_session(&store, Some("career")).await;
        let questions = seed_questions(&store, id, 3).await;
        for (q, option) in [(&questions[2], 2u8), (&questions[0], 0u8)] {
            store.upsert(&Answer::new(id, *q.id(), option, None).unwrap()).await.unwrap();
        }
        store.append(ReportDraft::new(id, "first").unwrap()).await.unwrap();
        store.append(ReportDraft::new(id, "second").unwrap()).await.unwrap();

        let handler = PresetOverviewHandler::new(InterviewRepositories::from_store(store));
        let overview = handler.handle(preset("career")).await.unwrap();

        assert_eq!(overview.sessions.len(), 1);
        let entry = &overview.sessions[0];
        let answered: Vec<(u32, u8)> = entry
            .responses
            .iter()
            .map(|r| (r.question.index(), r.answer.selected_option()))
            .collect();
        assert_eq!(answered, vec![(1, 0), (3, 2)]);
        let versions: Vec<u32> = entry.reports.iter().map(|r| r.version()).collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[tokio::test]
    async fn lists_only_sessions_of_the_preset() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let career = seed_session(&store, Some("career")).await;
        seed_session(&store, Some("health")).await;
        seed_session(&store, None).await;

        let handler = PresetOverviewHandler::new(InterviewRepositories::from_store(store));
        let overview = handler.handle(preset("career")).await.unwrap();

        assert_eq!(overview.preset.slug, "career");
        let ids: Vec<SessionId> = overview.sessions.iter().map(|e| *e.session.id()).collect();
        assert_eq!(ids, vec![career]);
        assert!(overview.sessions[0].responses.is_empty());
        assert!(overview.sessions[0].reports.is_empty());
    }
}
