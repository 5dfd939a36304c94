use std::fs;
use std::path::PathBuf;

use hireflow_spec::{Assessment, AssessmentStore, ResponseDocument, StoreError};

/// JSON-file-backed implementation of the persistence collaborators.
/// Assessment documents live at `assessments/<jobId>.json`; submitted
/// responses are appended under `responses/<jobId>/`.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonFileStore { root: root.into() }
    }

    pub fn assessment_path(&self, job_id: &str) -> PathBuf {
        self.root
            .join("assessments")
            .join(format!("{}.json", sanitize_file_name(job_id)))
    }

    fn responses_dir(&self, job_id: &str) -> PathBuf {
        self.root.join("responses").join(sanitize_file_name(job_id))
    }
}

impl AssessmentStore for JsonFileStore {
    fn load_assessment(&self, job_id: &str) -> Result<Option<Assessment>, StoreError> {
        let path = self.assessment_path(job_id);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save_assessment(&self, job_id: &str, assessment: &Assessment) -> Result<(), StoreError> {
        let path = self.assessment_path(job_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(assessment)?)?;
        Ok(())
    }

    fn submit_response(&self, job_id: &str, response: &ResponseDocument) -> Result<(), StoreError> {
        let dir = self.responses_dir(job_id);
        fs::create_dir_all(&dir)?;
        let name = format!("response-{}.json", response.submitted_at.timestamp_millis());
        fs::write(dir.join(name), serde_json::to_string_pretty(response)?)?;
        Ok(())
    }
}

fn sanitize_file_name(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "job".into()
    } else {
        cleaned
    }
}
