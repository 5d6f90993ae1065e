use crate::store::TaskStore;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use tracing::debug;

/// Time-of-day applied when a dropped item had no previous time
pub fn default_drop_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

/// The entity being moved, with its pre-drag datetime for rollback/telemetry
#[derive(Debug, Clone, PartialEq)]
pub struct DragItem {
    pub task_id: String,
    /// `None` when a whole task is being dragged
    pub subtask_id: Option<String>,
    pub original: Option<DateTime<Local>>,
}

/// Reschedule engine: `Idle`, or `Dragging` one item. Dropping or cancelling
/// always returns to `Idle`.
#[derive(Debug, Default)]
pub struct DragEngine {
    dragging: Option<DragItem>,
}

impl DragEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    pub fn current(&self) -> Option<&DragItem> {
        self.dragging.as_ref()
    }

    /// Begin dragging a task. Returns false - and leaves any active drag
    /// untouched - when a drag is already in flight or the id is unknown.
    pub fn start_task(&mut self, store: &TaskStore, task_id: &str) -> bool {
        if self.dragging.is_some() {
            return false;
        }
        match store.task(task_id) {
            Some(task) => {
                self.dragging = Some(DragItem {
                    task_id: task.id.clone(),
                    subtask_id: None,
                    original: task.schedule_time(),
                });
                true
            }
            None => false,
        }
    }

    /// Begin dragging a subtask; same single-drag rule as `start_task`
    pub fn start_subtask(&mut self, store: &TaskStore, task_id: &str, subtask_id: &str) -> bool {
        if self.dragging.is_some() {
            return false;
        }
        let Some(subtask) = store.task(task_id).and_then(|t| t.subtask(subtask_id)) else {
            return false;
        };
        self.dragging = Some(DragItem {
            task_id: task_id.to_string(),
            subtask_id: Some(subtask.id.clone()),
            original: subtask.datetime,
        });
        true
    }

    /// Drop the dragged item on a calendar day: commit the target date
    /// combined with the original time-of-day (or the default drop time) via
    /// a full-replacement update, then return to idle. Returns true when a
    /// commit happened.
    pub fn drop_on_date(&mut self, store: &mut TaskStore, date: NaiveDate) -> bool {
        let Some(item) = self.dragging.take() else {
            return false;
        };

        let time = item
            .original
            .map(|dt| dt.time())
            .unwrap_or_else(default_drop_time);
        let Some(new_datetime) = Local.from_local_datetime(&date.and_time(time)).earliest() else {
            // Nonexistent local time (DST gap): leave the item unchanged
            debug!(%date, "drop target resolves to a nonexistent local time");
            return false;
        };

        match &item.subtask_id {
            None => {
                let Some(task) = store.task(&item.task_id) else {
                    return false;
                };
                let mut updated = task.clone();
                updated.datetime = Some(new_datetime);
                store.update_task(&item.task_id, updated);
            }
            Some(subtask_id) => {
                let Some(subtask) = store
                    .task(&item.task_id)
                    .and_then(|t| t.subtask(subtask_id))
                else {
                    return false;
                };
                let mut updated = subtask.clone();
                updated.datetime = Some(new_datetime);
                store.update_subtask(&item.task_id, subtask_id, updated);
            }
        }
        true
    }

    /// Drop over no valid target, or cancel: back to idle, nothing mutated
    pub fn cancel(&mut self) {
        self.dragging = None;
    }
}
