use crate::domain::Task;
use chrono::{DateTime, Duration, Local};
use std::collections::HashSet;

/// How often the event loop asks the poller to scan
pub const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// A subtask is announced once it is this close to its datetime
pub fn notify_window() -> Duration {
    Duration::minutes(10)
}

/// One fired reminder, ready to be shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub subtask_id: String,
    pub title: String,
    /// Whole minutes until the subtask's datetime
    pub minutes_left: i64,
}

/// Scans all subtasks for ones entering the notification window and fires a
/// one-shot alert per subtask.
///
/// The notified set is in-memory only: restarting the process re-arms every
/// reminder, and editing a datetime does not. Ids that leave the collection
/// are dropped from the set on every scan to bound its size.
#[derive(Debug)]
pub struct ReminderPoller {
    notified: HashSet<String>,
    window: Duration,
}

impl Default for ReminderPoller {
    fn default() -> Self {
        Self {
            notified: HashSet::new(),
            window: notify_window(),
        }
    }
}

impl ReminderPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poller with a non-default notification window (config override)
    pub fn with_window(minutes: i64) -> Self {
        Self {
            notified: HashSet::new(),
            window: Duration::minutes(minutes),
        }
    }

    /// Scan the collection at `now`, returning reminders that fire on this
    /// tick. Subtasks without a datetime, completed ones, and already
    /// notified ones are skipped.
    pub fn poll(&mut self, tasks: &[Task], now: DateTime<Local>) -> Vec<Reminder> {
        self.gc(tasks);

        let mut fired = Vec::new();
        for task in tasks {
            for subtask in &task.subtasks {
                let Some(datetime) = subtask.datetime else {
                    continue;
                };
                if subtask.completed || self.notified.contains(&subtask.id) {
                    continue;
                }

                let delta = datetime.signed_duration_since(now);
                if delta >= Duration::zero() && delta <= self.window {
                    fired.push(Reminder {
                        subtask_id: subtask.id.clone(),
                        title: subtask.title.clone(),
                        minutes_left: delta.num_minutes(),
                    });
                    self.notified.insert(subtask.id.clone());
                }
            }
        }
        fired
    }

    /// Drop notified ids that no longer exist in the collection
    fn gc(&mut self, tasks: &[Task]) {
        if self.notified.is_empty() {
            return;
        }
        let live: HashSet<&str> = tasks
            .iter()
            .flat_map(|t| &t.subtasks)
            .map(|s| s.id.as_str())
            .collect();
        self.notified.retain(|id| live.contains(id.as_str()));
    }

    #[cfg(test)]
    fn notified_count(&self) -> usize {
        self.notified.len()
    }
}
