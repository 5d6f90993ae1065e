use crate::config::AppConfig;
use crate::decompose::{spawn_decompose, DecomposeClient, DecomposeOutcome};
use crate::dnd::DragEngine;
use crate::domain::{bucketed_items, items_for_date, Bucket, ScheduleItem, Subtask, Task};
use crate::notifications;
use crate::reminder::{ReminderPoller, POLL_INTERVAL};
use crate::store::TaskStore;
use chrono::{Local, NaiveDate};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration as StdDuration, Instant};
use tracing::warn;

/// Which main view is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    List,
    Calendar,
}

/// Calendar granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarMode {
    Week,
    Month,
}

/// UI mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    AddingTask,
    ConfirmDelete,
}

/// Field focus inside the add-task form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Category,
    OriginalText,
    EstimatedTime,
    SubtaskEntry,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Category,
            FormField::Category => FormField::OriginalText,
            FormField::OriginalText => FormField::EstimatedTime,
            FormField::EstimatedTime => FormField::SubtaskEntry,
            FormField::SubtaskEntry => FormField::Title,
        }
    }
}

/// A candidate subtask sitting in the add-task form
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubtask {
    pub title: String,
    /// Category snapshotted from the form at the moment decomposition
    /// results were applied; manual entries inherit at read time instead
    pub category: Option<String>,
}

/// State of the add-task form
#[derive(Debug, Clone)]
pub struct TaskFormState {
    pub title: String,
    pub category: String,
    pub original_text: String,
    pub estimated_time: String,
    pub subtask_entry: String,
    pub subtasks: Vec<FormSubtask>,
    pub field: FormField,
    pub decomposing: bool,
    pub error: Option<String>,
}

impl TaskFormState {
    fn new() -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            original_text: String::new(),
            estimated_time: String::new(),
            subtask_entry: String::new(),
            subtasks: Vec::new(),
            field: FormField::Title,
            decomposing: false,
            error: None,
        }
    }
}

/// Pending delete confirmation
#[derive(Debug, Clone)]
pub struct DeleteTarget {
    pub task_id: String,
    pub subtask_id: Option<String>,
    pub title: String,
}

/// Short-lived status line message
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub created: Instant,
}

const TOAST_TTL: StdDuration = StdDuration::from_secs(5);

/// Main application state
pub struct AppState {
    pub store: TaskStore,
    pub drag: DragEngine,
    pub reminders: ReminderPoller,
    pub config: AppConfig,

    pub ui_mode: UiMode,
    pub view_mode: ViewMode,
    pub calendar_mode: CalendarMode,

    /// Day the calendar is centered on
    pub reference_date: NaiveDate,
    /// Calendar cell under the cursor (also the drop target while dragging)
    pub cursor_date: NaiveDate,
    /// Selected item within the cursor day's cell
    pub calendar_item_index: usize,
    /// Selected row in the list view
    pub selected_index: usize,

    pub form: Option<TaskFormState>,
    pub delete_target: Option<DeleteTarget>,
    pub toasts: Vec<Toast>,

    decompose_tx: Sender<DecomposeOutcome>,
    decompose_rx: Receiver<DecomposeOutcome>,
    /// Responses carrying an older generation are stale and dropped
    decompose_generation: u64,

    last_reminder_poll: Option<Instant>,
}

impl AppState {
    pub fn new(store: TaskStore, config: AppConfig) -> Self {
        let (decompose_tx, decompose_rx) = channel();
        let today = Local::now().date_naive();
        let reminders = match config.reminder_window_minutes {
            Some(minutes) => ReminderPoller::with_window(minutes),
            None => ReminderPoller::new(),
        };

        Self {
            store,
            drag: DragEngine::new(),
            reminders,
            config,
            ui_mode: UiMode::Normal,
            view_mode: ViewMode::List,
            calendar_mode: CalendarMode::Week,
            reference_date: today,
            cursor_date: today,
            calendar_item_index: 0,
            selected_index: 0,
            form: None,
            delete_target: None,
            toasts: Vec::new(),
            decompose_tx,
            decompose_rx,
            decompose_generation: 0,
            last_reminder_poll: None,
        }
    }

    // ---- derived views -------------------------------------------------

    /// Bucketed sections for the list view, relative to the current day
    pub fn list_sections(&self) -> Vec<(Bucket, Vec<ScheduleItem>)> {
        bucketed_items(self.store.tasks(), Local::now().date_naive())
    }

    /// The list view's rows in render order, for selection bookkeeping
    pub fn flat_list(&self) -> Vec<ScheduleItem> {
        self.list_sections()
            .into_iter()
            .flat_map(|(_, items)| items)
            .collect()
    }

    /// Items in the calendar cell under the cursor
    pub fn cursor_items(&self) -> Vec<ScheduleItem> {
        items_for_date(self.store.tasks(), self.cursor_date)
    }

    pub fn selected_item(&self) -> Option<ScheduleItem> {
        match self.view_mode {
            ViewMode::List => self.flat_list().into_iter().nth(self.selected_index),
            ViewMode::Calendar => self.cursor_items().into_iter().nth(self.calendar_item_index),
        }
    }

    // ---- navigation ----------------------------------------------------

    pub fn move_selection_up(&mut self) {
        match self.view_mode {
            ViewMode::List => self.selected_index = self.selected_index.saturating_sub(1),
            ViewMode::Calendar => {
                self.calendar_item_index = self.calendar_item_index.saturating_sub(1)
            }
        }
    }

    pub fn move_selection_down(&mut self) {
        match self.view_mode {
            ViewMode::List => {
                let max = self.flat_list().len().saturating_sub(1);
                self.selected_index = (self.selected_index + 1).min(max);
            }
            ViewMode::Calendar => {
                let max = self.cursor_items().len().saturating_sub(1);
                self.calendar_item_index = (self.calendar_item_index + 1).min(max);
            }
        }
    }

    /// Move the calendar cursor by whole days, following into adjacent
    /// weeks/months
    pub fn move_cursor_days(&mut self, days: i64) {
        self.cursor_date += chrono::Duration::days(days);
        self.reference_date = self.cursor_date;
        self.calendar_item_index = 0;
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::List => ViewMode::Calendar,
            ViewMode::Calendar => ViewMode::List,
        };
    }

    pub fn toggle_calendar_mode(&mut self) {
        self.calendar_mode = match self.calendar_mode {
            CalendarMode::Week => CalendarMode::Month,
            CalendarMode::Month => CalendarMode::Week,
        };
    }

    pub fn jump_to_today(&mut self) {
        let today = Local::now().date_naive();
        self.reference_date = today;
        self.cursor_date = today;
        self.calendar_item_index = 0;
    }

    // ---- mutations -----------------------------------------------------

    /// Toggle completion on the selected row (subtask rows only; a bare task
    /// row has no completion state)
    pub fn toggle_selected(&mut self) {
        if let Some(item) = self.selected_item() {
            if let Some(subtask_id) = &item.subtask_id {
                self.store.toggle_subtask(&item.task_id, subtask_id);
                let progress = self.store.task(&item.task_id).map(|task| {
                    let pct = (task.completion_rate() * 100.0).round() as u32;
                    (task.title.clone(), pct)
                });
                if let Some((title, pct)) = progress {
                    self.push_toast(format!("'{}' {}% complete", title, pct));
                }
            }
        }
    }

    /// Ask for confirmation before deleting the selected row
    pub fn request_delete_selected(&mut self) {
        if let Some(item) = self.selected_item() {
            self.delete_target = Some(DeleteTarget {
                task_id: item.task_id.clone(),
                subtask_id: item.subtask_id.clone(),
                title: item.title.clone(),
            });
            self.ui_mode = UiMode::ConfirmDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        if let Some(target) = self.delete_target.take() {
            match &target.subtask_id {
                Some(subtask_id) => self.store.delete_subtask(&target.task_id, subtask_id),
                None => self.store.delete_task(&target.task_id),
            }
            self.push_toast(format!("Deleted '{}'", target.title));
        }
        self.ui_mode = UiMode::Normal;
        self.clamp_selection();
    }

    pub fn cancel_delete(&mut self) {
        self.delete_target = None;
        self.ui_mode = UiMode::Normal;
    }

    fn clamp_selection(&mut self) {
        let list_max = self.flat_list().len().saturating_sub(1);
        self.selected_index = self.selected_index.min(list_max);
        let cell_max = self.cursor_items().len().saturating_sub(1);
        self.calendar_item_index = self.calendar_item_index.min(cell_max);
    }

    // ---- drag and drop -------------------------------------------------

    /// Grab the selected item for rescheduling. Switches to the calendar so
    /// the cursor can pick a target day.
    pub fn grab_selected(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let started = match &item.subtask_id {
            Some(subtask_id) => self.drag.start_subtask(&self.store, &item.task_id, subtask_id),
            None => self.drag.start_task(&self.store, &item.task_id),
        };
        if started {
            self.view_mode = ViewMode::Calendar;
            if let Some(dt) = item.datetime {
                self.cursor_date = dt.date_naive();
                self.reference_date = self.cursor_date;
            }
            self.push_toast(format!("Moving '{}' - pick a day, Enter drops", item.title));
        }
    }

    /// Drop the grabbed item on the cursor day
    pub fn drop_on_cursor(&mut self) {
        let date = self.cursor_date;
        if self.drag.drop_on_date(&mut self.store, date) {
            self.push_toast(format!("Rescheduled to {}", date.format("%Y-%m-%d")));
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    // ---- add-task form -------------------------------------------------

    pub fn open_add_form(&mut self) {
        self.form = Some(TaskFormState::new());
        self.ui_mode = UiMode::AddingTask;
    }

    /// Close the form. Bumping the generation makes any in-flight
    /// decomposition response stale.
    pub fn close_form(&mut self) {
        self.form = None;
        self.ui_mode = UiMode::Normal;
        self.decompose_generation += 1;
    }

    /// Add the typed subtask entry to the form's candidate list
    pub fn form_add_manual_subtask(&mut self) {
        if let Some(form) = &mut self.form {
            let title = form.subtask_entry.trim().to_string();
            if !title.is_empty() {
                form.subtasks.push(FormSubtask {
                    title,
                    category: None,
                });
                form.subtask_entry.clear();
            }
        }
    }

    /// Kick off decomposition of the form's free text on a worker thread
    pub fn form_request_decompose(&mut self) {
        let Some(form) = &mut self.form else {
            return;
        };
        let input = form.original_text.trim().to_string();
        if input.is_empty() {
            form.error = Some("Enter some text to decompose first".to_string());
            return;
        }

        let client = match DecomposeClient::new(
            self.config.endpoint.clone(),
            self.config.model.clone(),
            self.config.resolved_api_key(),
        ) {
            Ok(client) => client,
            Err(e) => {
                form.error = Some(e.to_string());
                return;
            }
        };

        form.decomposing = true;
        form.error = None;
        self.decompose_generation += 1;
        spawn_decompose(
            client,
            input,
            self.decompose_generation,
            self.decompose_tx.clone(),
        );
    }

    /// Drain finished decompositions. A response whose generation no longer
    /// matches (form closed or resubmitted) is discarded, never applied.
    pub fn poll_decompositions(&mut self) {
        while let Ok(outcome) = self.decompose_rx.try_recv() {
            if outcome.generation != self.decompose_generation {
                warn!(
                    generation = outcome.generation,
                    current = self.decompose_generation,
                    "discarding stale decomposition response"
                );
                continue;
            }
            let Some(form) = &mut self.form else {
                continue;
            };
            form.decomposing = false;
            match outcome.result {
                Ok(titles) => {
                    // Snapshot the form's category at the moment of
                    // application; replaces the whole candidate list
                    let category = (!form.category.trim().is_empty())
                        .then(|| form.category.trim().to_string());
                    form.subtasks = titles
                        .into_iter()
                        .map(|title| FormSubtask {
                            title,
                            category: category.clone(),
                        })
                        .collect();
                }
                Err(e) => {
                    form.error = Some(e.to_string());
                }
            }
        }
    }

    /// Validate and commit the form as a fully formed task. Validation lives
    /// here at the UI boundary; the store trusts its callers.
    pub fn submit_form(&mut self) {
        let Some(form) = &mut self.form else {
            return;
        };
        if form.title.trim().is_empty() {
            form.error = Some("Title must not be empty".to_string());
            return;
        }
        if form.subtasks.is_empty() && form.subtask_entry.trim().is_empty() {
            form.error = Some("Add at least one subtask".to_string());
            return;
        }

        // A half-typed entry counts as one more subtask
        let entry = form.subtask_entry.trim().to_string();
        if !entry.is_empty() {
            form.subtasks.push(FormSubtask {
                title: entry,
                category: None,
            });
            form.subtask_entry.clear();
        }

        let title = form.title.trim().to_string();
        let category = form.category.trim().to_string();
        let original_text = {
            let text = form.original_text.trim();
            if text.is_empty() {
                title.clone()
            } else {
                text.to_string()
            }
        };

        let subtasks: Vec<Subtask> = form
            .subtasks
            .drain(..)
            .map(|candidate| {
                let mut sub = Subtask::new(candidate.title);
                sub.category = candidate.category;
                sub
            })
            .collect();

        let mut task = Task::new(title.clone(), category, original_text, subtasks);
        if !form.estimated_time.trim().is_empty() {
            task.estimated_time = Some(form.estimated_time.trim().to_string());
        }

        self.store.add_task(task);
        self.push_toast(format!("Added '{}'", title));
        self.close_form();
    }

    // ---- periodic work -------------------------------------------------

    /// Called every event-loop tick: runs the reminder scan on its interval
    /// and expires old toasts
    pub fn tick(&mut self) {
        let due = match self.last_reminder_poll {
            None => true,
            Some(last) => last.elapsed() >= POLL_INTERVAL,
        };
        if due {
            self.last_reminder_poll = Some(Instant::now());
            let fired = self.reminders.poll(self.store.tasks(), Local::now());
            for reminder in fired {
                notifications::notify_reminder(&reminder.title, reminder.minutes_left);
                self.push_toast(format!(
                    "'{}' is coming up in {} min",
                    reminder.title, reminder.minutes_left
                ));
            }
        }

        self.toasts.retain(|t| t.created.elapsed() < TOAST_TTL);
    }

    pub fn push_toast(&mut self, message: String) {
        self.toasts.push(Toast {
            message,
            created: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::DecomposeError;
    use pretty_assertions::assert_eq;

    fn test_app() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::load(dir.path().join("tasks.json")).unwrap();
        let app = AppState::new(store, AppConfig::default());
        (dir, app)
    }

    fn send_outcome(app: &AppState, generation: u64, result: Result<Vec<String>, DecomposeError>) {
        app.decompose_tx
            .send(DecomposeOutcome { generation, result })
            .unwrap();
    }

    #[test]
    fn test_submit_requires_title_and_subtasks() {
        let (_dir, mut app) = test_app();
        app.open_add_form();

        app.submit_form();
        assert!(app.form.as_ref().unwrap().error.is_some());

        app.form.as_mut().unwrap().title = "Trip".to_string();
        app.submit_form();
        assert!(app.form.as_ref().unwrap().error.is_some());
        assert!(app.store.tasks().is_empty());
    }

    #[test]
    fn test_submit_builds_fully_formed_task() {
        let (_dir, mut app) = test_app();
        app.open_add_form();
        {
            let form = app.form.as_mut().unwrap();
            form.title = "Trip".to_string();
            form.category = "Travel".to_string();
            form.subtask_entry = "Book flight".to_string();
        }
        app.submit_form();

        assert!(app.form.is_none());
        let tasks = app.store.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Trip");
        assert_eq!(tasks[0].original_text, "Trip");
        assert_eq!(tasks[0].subtasks.len(), 1);
        assert_eq!(tasks[0].subtasks[0].title, "Book flight");
        assert!(!tasks[0].subtasks[0].completed);
    }

    #[test]
    fn test_decomposition_fills_form_with_snapshot_category() {
        let (_dir, mut app) = test_app();
        app.open_add_form();
        {
            let form = app.form.as_mut().unwrap();
            form.category = "Trip".to_string();
            form.original_text = "plan trip".to_string();
            form.decomposing = true;
        }
        app.decompose_generation = 3;

        send_outcome(&app, 3, Ok(vec!["A".to_string(), "B".to_string()]));
        app.poll_decompositions();

        let form = app.form.as_ref().unwrap();
        assert!(!form.decomposing);
        assert_eq!(form.subtasks.len(), 2);
        assert_eq!(form.subtasks[0].title, "A");
        assert_eq!(form.subtasks[1].title, "B");
        assert_eq!(form.subtasks[0].category.as_deref(), Some("Trip"));
        assert_eq!(form.subtasks[1].category.as_deref(), Some("Trip"));
    }

    #[test]
    fn test_stale_decomposition_is_discarded() {
        let (_dir, mut app) = test_app();
        app.open_add_form();
        app.decompose_generation = 5;

        send_outcome(&app, 4, Ok(vec!["stale".to_string()]));
        app.poll_decompositions();

        assert!(app.form.as_ref().unwrap().subtasks.is_empty());
    }

    #[test]
    fn test_decomposition_failure_sets_single_error() {
        let (_dir, mut app) = test_app();
        app.open_add_form();
        {
            let form = app.form.as_mut().unwrap();
            form.subtasks.push(FormSubtask {
                title: "existing".to_string(),
                category: None,
            });
            form.decomposing = true;
        }
        app.decompose_generation = 1;

        send_outcome(&app, 1, Err(DecomposeError::EmptyResponse));
        app.poll_decompositions();

        let form = app.form.as_ref().unwrap();
        assert!(form.error.is_some());
        // Existing candidates untouched on failure
        assert_eq!(form.subtasks.len(), 1);
        assert_eq!(form.subtasks[0].title, "existing");
    }

    #[test]
    fn test_closing_form_invalidates_inflight_decomposition() {
        let (_dir, mut app) = test_app();
        app.open_add_form();
        let generation = {
            app.form.as_mut().unwrap().original_text = "plan".to_string();
            app.decompose_generation + 1
        };
        app.decompose_generation = generation;
        app.close_form();

        send_outcome(&app, generation, Ok(vec!["late".to_string()]));
        app.poll_decompositions();

        // Form is gone and nothing was applied anywhere
        assert!(app.form.is_none());
        assert!(app.store.tasks().is_empty());
    }

    #[test]
    fn test_toggle_selected_flips_subtask() {
        let (_dir, mut app) = test_app();
        let task = Task::new("Trip", "Trip", "Trip", vec![Subtask::new("Book flight")]);
        let (task_id, subtask_id) = (task.id.clone(), task.subtasks[0].id.clone());
        app.store.add_task(task);

        app.selected_index = 0;
        app.toggle_selected();
        assert!(app
            .store
            .task(&task_id)
            .unwrap()
            .subtask(&subtask_id)
            .unwrap()
            .completed);
    }

    #[test]
    fn test_confirm_delete_removes_item() {
        let (_dir, mut app) = test_app();
        let task = Task::new("Trip", "Trip", "Trip", vec![Subtask::new("Book flight")]);
        app.store.add_task(task);

        app.request_delete_selected();
        assert_eq!(app.ui_mode, UiMode::ConfirmDelete);
        app.confirm_delete();

        // The only subtask is gone; the parent task remains
        assert_eq!(app.store.tasks().len(), 1);
        assert!(app.store.tasks()[0].subtasks.is_empty());
        assert_eq!(app.ui_mode, UiMode::Normal);
    }

    #[test]
    fn test_cancel_delete_keeps_item() {
        let (_dir, mut app) = test_app();
        app.store
            .add_task(Task::new("Trip", "Trip", "Trip", vec![]));

        app.request_delete_selected();
        app.cancel_delete();
        assert_eq!(app.store.tasks().len(), 1);
    }

    #[test]
    fn test_reminder_tick_emits_toast() {
        let (_dir, mut app) = test_app();
        let mut sub = Subtask::new("Stand-up");
        sub.datetime = Some(Local::now() + chrono::Duration::minutes(5));
        app.store.add_task(Task::new("Work", "Work", "Work", vec![sub]));

        app.tick();
        assert!(app
            .toasts
            .iter()
            .any(|t| t.message.contains("Stand-up")));

        // Second tick inside the interval does not re-fire
        let count = app.toasts.len();
        app.tick();
        assert_eq!(app.toasts.len(), count);
    }

    #[test]
    fn test_grab_and_drop_reschedules() {
        let (_dir, mut app) = test_app();
        let mut sub = Subtask::new("Meeting");
        sub.datetime = Some(Local::now());
        let task = Task::new("Work", "Work", "Work", vec![sub]);
        let (task_id, subtask_id) = (task.id.clone(), task.subtasks[0].id.clone());
        app.store.add_task(task);

        app.grab_selected();
        assert!(app.drag.is_dragging());
        assert_eq!(app.view_mode, ViewMode::Calendar);

        app.move_cursor_days(2);
        let target = app.cursor_date;
        app.drop_on_cursor();

        assert!(!app.drag.is_dragging());
        let dt = app
            .store
            .task(&task_id)
            .unwrap()
            .subtask(&subtask_id)
            .unwrap()
            .datetime
            .unwrap();
        assert_eq!(dt.date_naive(), target);
    }
}
