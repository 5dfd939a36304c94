use std::{fs, io, path::Path};

use chrono::{DateTime, Utc};

use hireflow_spec::{apply, Assessment, BuilderError, EditIntent};

/// Applies an edit script in order. The first structural error aborts
/// the whole script; no partially-edited document is returned.
pub fn apply_script(
    assessment: &Assessment,
    intents: &[EditIntent],
    now: DateTime<Utc>,
) -> Result<Assessment, BuilderError> {
    let mut current = assessment.clone();
    for intent in intents {
        current = apply(&current, intent, now)?;
    }
    Ok(current)
}

pub fn read_document(path: &Path) -> io::Result<Assessment> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(io::Error::other)
}

pub fn write_document(path: &Path, assessment: &Assessment) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(assessment).map_err(io::Error::other)?;
    fs::write(path, contents)
}

pub fn read_edit_script(path: &Path) -> io::Result<Vec<EditIntent>> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(io::Error::other)
}
