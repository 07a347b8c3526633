//! Interview session lifecycle
//!
//! A session walks the question bank in order. Each answer is scored into the
//! session's profile and counts toward the question's domain; skipped
//! questions only advance. The session completes after the last question.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::{Domain, NarrativeProfile};
use crate::questions::{Question, QuestionBank};
use crate::report::{NarrativeReport, ReportRenderer};
use crate::scoring::{ScoringEngine, TranscriptAnalysis};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(SessionStatus::InProgress),
            "completed" => Some(SessionStatus::Completed),
            _ => None,
        }
    }
}

/// One recorded answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub domain: Domain,
    pub transcript: String,
    pub analysis: TranscriptAnalysis,
    pub recorded_at: DateTime<Utc>,
}

/// Position within the interview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub skipped: usize,
    /// Index of the current question; equals `total` when completed
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub question_index: usize,
    pub profile: NarrativeProfile,
    pub answers: Vec<Answer>,
    /// Ids of skipped questions
    pub skipped: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            status: SessionStatus::InProgress,
            question_index: 0,
            profile: NarrativeProfile::new(),
            answers: Vec::new(),
            skipped: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Question awaiting an answer, `None` once completed
    pub fn current_question(&self, bank: &QuestionBank) -> Option<&'static Question> {
        if self.is_completed() {
            return None;
        }
        bank.get(self.question_index)
    }

    /// Score `transcript` as the answer to the current question
    pub fn record_answer(
        &mut self,
        bank: &QuestionBank,
        engine: &ScoringEngine,
        transcript: &str,
    ) -> Result<TranscriptAnalysis> {
        let question = self.require_current(bank)?;
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(Error::InvalidInput("transcript must not be empty".to_string()));
        }

        let analysis = engine.analyze(&mut self.profile, transcript);
        self.profile.record_coverage(question.domain);
        self.answers.push(Answer {
            question_id: question.id.to_string(),
            domain: question.domain,
            transcript: transcript.to_string(),
            analysis: analysis.clone(),
            recorded_at: Utc::now(),
        });
        self.advance(bank);

        Ok(analysis)
    }

    /// Move past the current question without scoring it
    pub fn skip_question(&mut self, bank: &QuestionBank) -> Result<()> {
        let question = self.require_current(bank)?;
        self.skipped.push(question.id.to_string());
        self.advance(bank);
        Ok(())
    }

    pub fn progress(&self, bank: &QuestionBank) -> Progress {
        Progress {
            answered: self.answers.len(),
            skipped: self.skipped.len(),
            current: self.question_index.min(bank.len()),
            total: bank.len(),
        }
    }

    /// Render the report for the answers so far
    ///
    /// Fails with `Conflict` until at least one question has been answered.
    pub fn report(&self, renderer: &ReportRenderer) -> Result<NarrativeReport> {
        if self.answers.is_empty() {
            return Err(Error::Conflict(format!(
                "session {} has no answers yet",
                self.session_id
            )));
        }
        renderer.render(&self.profile)
    }

    fn require_current(&self, bank: &QuestionBank) -> Result<&'static Question> {
        if self.is_completed() {
            return Err(Error::Conflict(format!(
                "session {} is already completed",
                self.session_id
            )));
        }
        bank.get(self.question_index).ok_or_else(|| {
            Error::Internal(format!(
                "question index {} out of range for session {}",
                self.question_index, self.session_id
            ))
        })
    }

    fn advance(&mut self, bank: &QuestionBank) {
        self.question_index += 1;
        if self.question_index >= bank.len() {
            self.status = SessionStatus::Completed;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Trait;

    fn setup() -> (QuestionBank, ScoringEngine) {
        (QuestionBank::standard(), ScoringEngine::default())
    }

    #[test]
    fn test_new_session_starts_at_first_question() {
        let (bank, _) = setup();
        let session = Session::new();
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(session.current_question(&bank), bank.get(0));
        assert_eq!(session.progress(&bank).current, 0);
    }

    #[test]
    fn test_answer_scores_and_advances() {
        let (bank, engine) = setup();
        let mut session = Session::new();

        let analysis = session
            .record_answer(&bank, &engine, "  I was curious about everything.  ")
            .unwrap();

        assert_eq!(analysis.matches.len(), 1);
        assert!(session.profile.traits.get(Trait::Openness) > 0.0);
        assert_eq!(session.profile.coverage(Domain::Childhood), 1);
        assert_eq!(session.answers[0].transcript, "I was curious about everything.");
        assert_eq!(session.question_index, 1);
    }

    #[test]
    fn test_blank_answer_rejected_without_advancing() {
        let (bank, engine) = setup();
        let mut session = Session::new();
        let err = session.record_answer(&bank, &engine, "   ").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(session.question_index, 0);
    }

    #[test]
    fn test_skip_does_not_score() {
        let (bank, _) = setup();
        let mut session = Session::new();
        session.skip_question(&bank).unwrap();

        assert_eq!(session.skipped, vec!["childhood-earliest-memory".to_string()]);
        assert_eq!(session.profile, NarrativeProfile::new());
        assert_eq!(session.progress(&bank).skipped, 1);
    }

    #[test]
    fn test_completes_after_last_question() {
        let (bank, engine) = setup();
        let mut session = Session::new();
        for i in 0..bank.len() {
            if i % 2 == 0 {
                session.record_answer(&bank, &engine, "I love my family").unwrap();
            } else {
                session.skip_question(&bank).unwrap();
            }
        }

        assert!(session.is_completed());
        assert!(session.current_question(&bank).is_none());
        assert_eq!(session.progress(&bank).current, bank.len());
        assert_eq!(session.profile.covered_domains().len(), 6);

        let err = session.record_answer(&bank, &engine, "more").unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(matches!(session.skip_question(&bank), Err(Error::Conflict(_))));
    }

    #[test]
    fn test_report_requires_an_answer() {
        let (bank, engine) = setup();
        let renderer = ReportRenderer::new().unwrap();
        let mut session = Session::new();

        assert!(matches!(session.report(&renderer), Err(Error::Conflict(_))));

        session.record_answer(&bank, &engine, "We planned everything").unwrap();
        let report = session.report(&renderer).unwrap();
        assert_eq!(report.dominant_trait, Trait::Conscientiousness);
    }

    #[test]
    fn test_status_strings() {
        for status in [SessionStatus::InProgress, SessionStatus::Completed] {
            assert_eq!(SessionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SessionStatus::parse("bogus"), None);
    }
}
