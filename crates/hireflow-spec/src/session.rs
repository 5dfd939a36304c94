use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::answers::{AnswerMap, AnswerValue, ResponseDocument};
use crate::spec::Assessment;
use crate::store::{AssessmentStore, StoreError};
use crate::validate::{first_invalid, validate, ValidationMap};
use crate::visibility::{resolve_visibility, VisibilityMap};

/// Lifecycle of a filling session. Loading the document is the store
/// call that precedes construction; a session always starts ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Ready,
    Submitting,
    Submitted,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is {0:?}; this transition is only allowed while ready")]
    NotReady(SessionStatus),
    #[error("submission failed: {0}")]
    Submit(#[from] StoreError),
}

/// Result of a submit attempt that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every visible question validated and the response reached the
    /// submission collaborator.
    Submitted,
    /// At least one visible question is invalid. The named question is
    /// the first in document order and should receive focus.
    Rejected { first_invalid: String },
}

/// Orchestrator for one respondent filling one assessment. Holds the
/// answer map and touched set, re-runs both evaluators synchronously on
/// every change, and drives the submit protocol. Transitions are
/// serialized by the ready-state guard; no two submits can overlap.
#[derive(Debug, Clone)]
pub struct RuntimeSession {
    assessment: Assessment,
    answers: AnswerMap,
    touched: BTreeSet<String>,
    status: SessionStatus,
    visibility: VisibilityMap,
    validation: ValidationMap,
}

impl RuntimeSession {
    /// Starts a session over a loaded document with empty answer and
    /// touched state.
    pub fn start(assessment: Assessment) -> Self {
        let answers = AnswerMap::new();
        let touched = BTreeSet::new();
        let visibility = resolve_visibility(&assessment, &answers);
        let validation = validate(&assessment, &visibility, &answers, &touched);
        RuntimeSession {
            assessment,
            answers,
            touched,
            status: SessionStatus::Ready,
            visibility,
            validation,
        }
    }

    /// Loads the persisted document for a job and starts a session over
    /// it. `None` means no assessment has been authored for the job.
    pub fn load(store: &dyn AssessmentStore, job_id: &str) -> Result<Option<Self>, StoreError> {
        Ok(store.load_assessment(job_id)?.map(Self::start))
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn touched(&self) -> &BTreeSet<String> {
        &self.touched
    }

    pub fn visibility(&self) -> &VisibilityMap {
        &self.visibility
    }

    pub fn validation(&self) -> &ValidationMap {
        &self.validation
    }

    pub fn is_visible(&self, question_id: &str) -> bool {
        self.visibility.get(question_id).copied().unwrap_or(false)
    }

    pub fn is_invalid(&self, question_id: &str) -> bool {
        self.validation.get(question_id).copied().unwrap_or(false)
    }

    /// Records an answer and synchronously recomputes visibility and
    /// validation.
    pub fn set_answer(
        &mut self,
        question_id: &str,
        value: AnswerValue,
    ) -> Result<(), SessionError> {
        self.ensure_ready()?;
        self.answers.insert(question_id.to_string(), value);
        self.recompute();
        Ok(())
    }

    /// Marks a question as touched, typically on loss of focus.
    pub fn touch(&mut self, question_id: &str) -> Result<(), SessionError> {
        self.ensure_ready()?;
        self.touched.insert(question_id.to_string());
        self.recompute();
        Ok(())
    }

    /// Runs the submit protocol: bulk-touch every visible question,
    /// re-validate, and either report the first invalid question or hand
    /// the response document to the collaborator. A collaborator failure
    /// returns the session to ready with answers and touched state
    /// preserved so the user can retry.
    pub fn submit(
        &mut self,
        store: &dyn AssessmentStore,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, SessionError> {
        self.ensure_ready()?;

        let visible: Vec<String> = self
            .visibility
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(id, _)| id.clone())
            .collect();
        self.touched.extend(visible);
        self.recompute();

        if let Some(first) = first_invalid(&self.assessment, &self.validation) {
            return Ok(SubmitOutcome::Rejected {
                first_invalid: first.to_string(),
            });
        }

        self.status = SessionStatus::Submitting;
        let response = ResponseDocument {
            values: self.answers.clone(),
            submitted_at: now,
        };
        match store.submit_response(&self.assessment.job_id, &response) {
            Ok(()) => {
                self.status = SessionStatus::Submitted;
                Ok(SubmitOutcome::Submitted)
            }
            Err(error) => {
                self.status = SessionStatus::Ready;
                Err(SessionError::Submit(error))
            }
        }
    }

    fn ensure_ready(&self) -> Result<(), SessionError> {
        if self.status == SessionStatus::Ready {
            Ok(())
        } else {
            Err(SessionError::NotReady(self.status))
        }
    }

    fn recompute(&mut self) {
        self.visibility = resolve_visibility(&self.assessment, &self.answers);
        self.validation = validate(
            &self.assessment,
            &self.visibility,
            &self.answers,
            &self.touched,
        );
    }
}
