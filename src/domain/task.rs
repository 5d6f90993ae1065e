use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Mint a fresh opaque id. Ids are unique across the whole collection,
/// not just within a parent task.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Deserialize an ISO-8601 timestamp, treating missing, null or unparsable
/// values as `None` instead of failing the whole load.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Local>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_datetime))
}

/// Parse an ISO-8601 timestamp string, accepting a trailing offset/`Z`
/// (export format) or a bare local datetime.
pub fn parse_datetime(s: &str) -> Option<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Local.from_local_datetime(&naive).single();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Local.from_local_datetime(&naive).single();
    }
    None
}

/// A schedulable unit of work belonging to exactly one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    /// Opaque unique identifier, immutable after creation
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Scheduled instant; `None` means unscheduled
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub datetime: Option<DateTime<Local>>,
    /// Free-form duration string (e.g. "1.5h"); displayed, never parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    /// Overrides the parent task's category when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            datetime: None,
            estimated_time: None,
            category: None,
            memo: None,
            completed: false,
        }
    }

    /// Effective category: own when set, otherwise inherited from the parent.
    /// Inheritance is resolved at read time, never copied at write time.
    pub fn category_or<'a>(&'a self, parent: &'a Task) -> &'a str {
        self.category.as_deref().unwrap_or(&parent.category)
    }
}

/// Top-level user-created unit of work, also the category container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Display string for grouping/coloring; not a foreign key
    #[serde(default)]
    pub category: String,
    /// Day-granularity timestamp kept for schema compatibility with older
    /// exports; `datetime` is authoritative for scheduling when present
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Local>>,
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub datetime: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    /// The free text the user supplied for decomposition (or the title)
    #[serde(default)]
    pub original_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Insertion order is display order unless a view re-sorts by datetime
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        original_text: impl Into<String>,
        subtasks: Vec<Subtask>,
    ) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            category: category.into(),
            date: None,
            datetime: None,
            estimated_time: None,
            original_text: original_text.into(),
            memo: None,
            subtasks,
        }
    }

    /// The instant this task is scheduled at, with `datetime` taking
    /// precedence over the legacy `date` field.
    pub fn schedule_time(&self) -> Option<DateTime<Local>> {
        self.datetime.or(self.date)
    }

    pub fn subtask(&self, subtask_id: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == subtask_id)
    }

    /// Fraction of subtasks completed, in 0.0..=1.0 (0.0 when none exist)
    pub fn completion_rate(&self) -> f64 {
        if self.subtasks.is_empty() {
            return 0.0;
        }
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        done as f64 / self.subtasks.len() as f64
    }
}
