#![allow(dead_code)]

use std::cell::RefCell;

use hireflow_spec::{Assessment, AssessmentStore, ResponseDocument, StoreError};

/// Store double that records every call and can be told to fail once.
#[derive(Default)]
pub struct RecordingStore {
    pub assessment: RefCell<Option<Assessment>>,
    pub saved: RefCell<Vec<Assessment>>,
    pub responses: RefCell<Vec<(String, ResponseDocument)>>,
    fail_next: RefCell<bool>,
}

impl RecordingStore {
    pub fn with_assessment(assessment: Assessment) -> Self {
        let store = RecordingStore::default();
        *store.assessment.borrow_mut() = Some(assessment);
        store
    }

    pub fn fail_once(&self) {
        *self.fail_next.borrow_mut() = true;
    }

    fn take_failure(&self) -> Result<(), StoreError> {
        if *self.fail_next.borrow() {
            *self.fail_next.borrow_mut() = false;
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        Ok(())
    }
}

impl AssessmentStore for RecordingStore {
    fn load_assessment(&self, job_id: &str) -> Result<Option<Assessment>, StoreError> {
        Ok(self
            .assessment
            .borrow()
            .clone()
            .filter(|assessment| assessment.job_id == job_id))
    }

    fn save_assessment(&self, _job_id: &str, assessment: &Assessment) -> Result<(), StoreError> {
        self.take_failure()?;
        self.saved.borrow_mut().push(assessment.clone());
        Ok(())
    }

    fn submit_response(&self, job_id: &str, response: &ResponseDocument) -> Result<(), StoreError> {
        self.take_failure()?;
        self.responses
            .borrow_mut()
            .push((job_id.to_string(), response.clone()));
        Ok(())
    }
}

pub fn sample_assessment() -> Assessment {
    serde_json::from_str(include_str!("../fixtures/sample_assessment.json"))
        .expect("fixture should deserialize")
}
