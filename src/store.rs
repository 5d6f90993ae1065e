use crate::domain::{Subtask, Task};
use crate::persistence::{load_tasks, save_tasks, tasks_file};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info};

/// The task repository: owns the canonical collection and persists it after
/// every mutation.
///
/// The store enforces no invariants of its own - callers validate before
/// mutating (non-empty titles, at least one subtask at creation). Unknown ids
/// are silent no-ops. Persistence failures are logged and swallowed; the
/// in-memory collection stays the source of truth for the session.
pub struct TaskStore {
    tasks: Vec<Task>,
    path: PathBuf,
}

impl TaskStore {
    /// Load the store from a specific blob path. A corrupt blob is logged
    /// and treated as empty rather than aborting startup.
    pub fn load(path: PathBuf) -> Result<Self> {
        let tasks = match load_tasks(&path) {
            Ok(tasks) => tasks,
            Err(e) => {
                error!(path = %path.display(), "task storage unreadable, starting empty: {e:#}");
                Vec::new()
            }
        };
        info!(count = tasks.len(), path = %path.display(), "loaded task storage");
        Ok(Self { tasks, path })
    }

    /// Load the store from the default location (~/.taskdeck/tasks.json)
    pub fn open_default() -> Result<Self> {
        Self::load(tasks_file()?)
    }

    /// Read-only view of the collection
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Append a task to the ordered collection
    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
        self.persist();
    }

    /// Full replacement of the task with the matching id; no-op if not found
    pub fn update_task(&mut self, id: &str, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) {
            *slot = task;
            self.persist();
        }
    }

    /// Remove a task and all its subtasks; no-op if not found
    pub fn delete_task(&mut self, id: &str) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() != before {
            self.persist();
        }
    }

    /// Flip `completed` on the matching subtask; no-op if either id is unknown
    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            if let Some(subtask) = task.subtasks.iter_mut().find(|s| s.id == subtask_id) {
                subtask.completed = !subtask.completed;
                self.persist();
            }
        }
    }

    /// Full replacement of the matching subtask; no-op if not found
    pub fn update_subtask(&mut self, task_id: &str, subtask_id: &str, subtask: Subtask) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            if let Some(slot) = task.subtasks.iter_mut().find(|s| s.id == subtask_id) {
                *slot = subtask;
                self.persist();
            }
        }
    }

    /// Remove the matching subtask; no-op if not found
    pub fn delete_subtask(&mut self, task_id: &str, subtask_id: &str) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            let before = task.subtasks.len();
            task.subtasks.retain(|s| s.id != subtask_id);
            if task.subtasks.len() != before {
                self.persist();
            }
        }
    }

    /// Empty the collection unconditionally
    pub fn clear_all_tasks(&mut self) {
        self.tasks.clear();
        self.persist();
    }

    /// Replace (not merge) the entire collection
    pub fn import_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.persist();
    }

    /// Read-only snapshot of the current collection
    pub fn export_tasks(&self) -> &[Task] {
        &self.tasks
    }

    fn persist(&self) {
        if let Err(e) = save_tasks(&self.path, &self.tasks) {
            // In-memory state stays correct even when the disk write fails
            error!(path = %self.path.display(), "failed to persist tasks: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_store() -> (tempfile::TempDir, TaskStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::load(dir.path().join("tasks.json")).unwrap();
        (dir, store)
    }

    fn trip_task() -> Task {
        Task::new("Trip", "Trip", "plan a trip", vec![Subtask::new("Book flight")])
    }

    #[test]
    fn test_add_and_toggle_scenario() {
        let (_dir, mut store) = test_store();

        let task = trip_task();
        let task_id = task.id.clone();
        let subtask_id = task.subtasks[0].id.clone();
        store.add_task(task);

        store.toggle_subtask(&task_id, &subtask_id);

        let task = store.task(&task_id).unwrap();
        assert_eq!(task.title, "Trip");
        assert_eq!(task.category, "Trip");
        assert!(task.subtask(&subtask_id).unwrap().completed);
    }

    #[test]
    fn test_toggle_twice_restores_original() {
        let (_dir, mut store) = test_store();
        let task = trip_task();
        let (task_id, subtask_id) = (task.id.clone(), task.subtasks[0].id.clone());
        store.add_task(task);

        store.toggle_subtask(&task_id, &subtask_id);
        store.toggle_subtask(&task_id, &subtask_id);

        assert!(!store.task(&task_id).unwrap().subtask(&subtask_id).unwrap().completed);
    }

    #[test]
    fn test_delete_task_cascades() {
        let (_dir, mut store) = test_store();
        let task = trip_task();
        let (task_id, subtask_id) = (task.id.clone(), task.subtasks[0].id.clone());
        store.add_task(task);

        store.delete_task(&task_id);

        assert!(store.tasks().is_empty());
        // No orphan subtask remains anywhere in the collection
        assert!(store
            .tasks()
            .iter()
            .flat_map(|t| &t.subtasks)
            .all(|s| s.id != subtask_id));
    }

    #[test]
    fn test_update_task_is_full_replacement() {
        let (_dir, mut store) = test_store();
        let task = trip_task();
        let task_id = task.id.clone();
        store.add_task(task.clone());

        let mut replacement = task;
        replacement.title = "Vacation".to_string();
        replacement.memo = Some("notes".to_string());
        replacement.subtasks.clear();
        store.update_task(&task_id, replacement);

        let stored = store.task(&task_id).unwrap();
        assert_eq!(stored.title, "Vacation");
        assert!(stored.subtasks.is_empty());
    }

    #[test]
    fn test_update_subtask_overwrites_all_fields() {
        let (_dir, mut store) = test_store();
        let mut task = trip_task();
        task.subtasks[0].memo = Some("old memo".to_string());
        let (task_id, subtask_id) = (task.id.clone(), task.subtasks[0].id.clone());
        store.add_task(task);

        let mut replacement = Subtask::new("Book hotel");
        replacement.id = subtask_id.clone();
        store.update_subtask(&task_id, &subtask_id, replacement);

        let stored = store.task(&task_id).unwrap().subtask(&subtask_id).unwrap();
        assert_eq!(stored.title, "Book hotel");
        // Fields the caller did not set are overwritten too
        assert!(stored.memo.is_none());
    }

    #[test]
    fn test_unknown_ids_are_silent_noops() {
        let (_dir, mut store) = test_store();
        let task = trip_task();
        let task_id = task.id.clone();
        store.add_task(task.clone());

        store.update_task("nope", trip_task());
        store.delete_task("nope");
        store.toggle_subtask(&task_id, "nope");
        store.toggle_subtask("nope", &task.subtasks[0].id);
        store.update_subtask("nope", "nope", Subtask::new("x"));
        store.delete_subtask(&task_id, "nope");

        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.task(&task_id).unwrap(), &task);
    }

    #[test]
    fn test_delete_subtask() {
        let (_dir, mut store) = test_store();
        let task = trip_task();
        let (task_id, subtask_id) = (task.id.clone(), task.subtasks[0].id.clone());
        store.add_task(task);

        store.delete_subtask(&task_id, &subtask_id);
        assert!(store.task(&task_id).unwrap().subtasks.is_empty());
    }

    #[test]
    fn test_clear_all_tasks() {
        let (_dir, mut store) = test_store();
        store.add_task(trip_task());
        store.add_task(trip_task());

        store.clear_all_tasks();
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_import_replaces_not_merges() {
        let (_dir, mut store) = test_store();
        store.add_task(trip_task());

        let incoming = vec![Task::new("Only", "Misc", "Only", vec![])];
        store.import_tasks(incoming.clone());

        assert_eq!(store.tasks(), incoming.as_slice());
    }

    #[test]
    fn test_import_of_export_is_identity() {
        let (_dir, mut store) = test_store();
        store.add_task(trip_task());
        store.add_task(Task::new("Solo", "Misc", "Solo", vec![]));

        let exported = store.export_tasks().to_vec();
        store.import_tasks(exported.clone());

        assert_eq!(store.tasks(), exported.as_slice());
    }

    #[test]
    fn test_mutations_persist_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");

        let task = trip_task();
        let task_id = task.id.clone();
        {
            let mut store = TaskStore::load(path.clone()).unwrap();
            store.add_task(task);
        }

        let store = TaskStore::load(path).unwrap();
        assert!(store.task(&task_id).is_some());
    }

    #[test]
    fn test_corrupt_blob_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "{{{not json").unwrap();

        let store = TaskStore::load(path).unwrap();
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        // Point the blob inside a path that cannot be created
        let bogus = dir.path().join("missing-dir").join("tasks.json");
        let mut store = TaskStore {
            tasks: Vec::new(),
            path: bogus,
        };

        store.add_task(trip_task());
        // Write failed (logged), but the collection still holds the task
        assert_eq!(store.tasks().len(), 1);
    }
}
