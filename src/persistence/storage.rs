use crate::domain::Task;
use crate::persistence::files::atomic_write;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Current schema version of the persisted blob
pub const STORAGE_VERSION: u32 = 1;

fn default_version() -> u32 {
    STORAGE_VERSION
}

/// On-disk layout: a single named blob holding the whole collection plus a
/// schema version tag. Unknown or missing fields default on load.
#[derive(Debug, Serialize, Deserialize)]
struct StoredState {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    tasks: Vec<Task>,
}

/// Load the task collection from the blob. A missing file is an empty
/// collection; a corrupt blob is an error the caller decides how to handle.
pub fn load_tasks<P: AsRef<Path>>(path: P) -> Result<Vec<Task>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read task storage: {}", path.display()))?;
    let state: StoredState = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse task storage: {}", path.display()))?;
    Ok(state.tasks)
}

/// Persist the task collection to the blob atomically
pub fn save_tasks<P: AsRef<Path>>(path: P, tasks: &[Task]) -> Result<()> {
    let state = StoredState {
        version: STORAGE_VERSION,
        tasks: tasks.to_vec(),
    };
    let json = serde_json::to_string_pretty(&state).context("Failed to serialize tasks")?;
    atomic_write(path, &json)
}

/// Write the collection verbatim as a pretty-printed JSON array, suitable
/// for re-import
pub fn export_to_file<P: AsRef<Path>>(path: P, tasks: &[Task]) -> Result<()> {
    let json = serde_json::to_string_pretty(tasks).context("Failed to serialize tasks")?;
    atomic_write(path, &json)
}

/// Why an import file was rejected. Existing data is untouched on rejection.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Read(#[source] std::io::Error),
    #[error("import file is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("import file must contain a top-level JSON array of tasks")]
    NotAnArray,
    #[error("import file contains an entry that is not a task object: {0}")]
    InvalidEntry(#[source] serde_json::Error),
}

/// Parse an exported JSON array back into tasks. The top-level shape must be
/// an array; everything inside it defaults leniently.
pub fn parse_import(content: &str) -> Result<Vec<Task>, ImportError> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(ImportError::Parse)?;
    if !value.is_array() {
        return Err(ImportError::NotAnArray);
    }
    serde_json::from_value(value).map_err(ImportError::InvalidEntry)
}

/// Read and parse an import file
pub fn import_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Task>, ImportError> {
    let content = std::fs::read_to_string(path).map_err(ImportError::Read)?;
    parse_import(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Subtask;
    use pretty_assertions::assert_eq;

    fn sample_tasks() -> Vec<Task> {
        vec![Task::new(
            "Trip",
            "Travel",
            "plan a trip",
            vec![Subtask::new("Book flight")],
        )]
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = load_tasks(dir.path().join("tasks.json")).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");

        let tasks = sample_tasks();
        save_tasks(&path, &tasks).unwrap();

        let loaded = load_tasks(&path).unwrap();
        assert_eq!(loaded, tasks);
    }

    #[test]
    fn test_load_blob_without_version_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, r#"{"tasks":[{"title":"old"}]}"#).unwrap();

        let loaded = load_tasks(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "old");
    }

    #[test]
    fn test_load_corrupt_blob_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "{{{not json").unwrap();

        assert!(load_tasks(&path).is_err());
    }

    #[test]
    fn test_export_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        let tasks = sample_tasks();
        export_to_file(&path, &tasks).unwrap();

        let imported = import_from_file(&path).unwrap();
        assert_eq!(imported, tasks);
    }

    #[test]
    fn test_import_rejects_non_array() {
        assert!(matches!(
            parse_import(r#"{"tasks":[]}"#),
            Err(ImportError::NotAnArray)
        ));
        assert!(matches!(parse_import("not json"), Err(ImportError::Parse(_))));
    }

    #[test]
    fn test_import_empty_array_is_valid() {
        let tasks = parse_import("[]").unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_import_tolerates_sparse_entries() {
        // Entries missing most fields still import; they default
        let tasks = parse_import(r#"[{"title":"bare"}]"#).unwrap();
        assert_eq!(tasks[0].title, "bare");
        assert!(tasks[0].subtasks.is_empty());
    }
}
