use super::task::Task;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};
use ratatui::style::Color;

/// Date-relative group used by the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Today,
    Tomorrow,
    ThisWeek,
    Future,
    NoDate,
}

impl Bucket {
    /// Display order for the list view
    pub const ALL: [Bucket; 5] = [
        Bucket::Today,
        Bucket::Tomorrow,
        Bucket::ThisWeek,
        Bucket::Future,
        Bucket::NoDate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Today => "Today",
            Bucket::Tomorrow => "Tomorrow",
            Bucket::ThisWeek => "This Week",
            Bucket::Future => "Future",
            Bucket::NoDate => "No Date",
        }
    }
}

/// Classify a calendar day relative to `today`. The This Week boundary is
/// exclusive: a day exactly seven days out is Future.
pub fn bucket_for(day: NaiveDate, today: NaiveDate) -> Bucket {
    if day == today {
        Bucket::Today
    } else if day == today + Duration::days(1) {
        Bucket::Tomorrow
    } else if day < today + Duration::days(7) {
        Bucket::ThisWeek
    } else {
        Bucket::Future
    }
}

/// A flattened schedulable row: a subtask, or a task standing in for itself
/// when it has no subtasks
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleItem {
    pub task_id: String,
    /// `None` when the row is a task acting as its own item
    pub subtask_id: Option<String>,
    pub title: String,
    pub datetime: Option<DateTime<Local>>,
    pub estimated_time: Option<String>,
    pub category: String,
    pub completed: bool,
    /// Parent task title, for subtask rows
    pub parent_title: Option<String>,
}

impl ScheduleItem {
    pub fn is_subtask(&self) -> bool {
        self.subtask_id.is_some()
    }
}

/// Flatten the collection into schedulable items. Each subtask becomes one
/// item; a task with zero subtasks becomes an item itself.
pub fn schedule_items(tasks: &[Task]) -> Vec<ScheduleItem> {
    let mut items = Vec::new();

    for task in tasks {
        if task.subtasks.is_empty() {
            items.push(ScheduleItem {
                task_id: task.id.clone(),
                subtask_id: None,
                title: task.title.clone(),
                datetime: task.schedule_time(),
                estimated_time: task.estimated_time.clone(),
                category: task.category.clone(),
                // A bare task carries no completion state
                completed: false,
                parent_title: None,
            });
        } else {
            for subtask in &task.subtasks {
                items.push(ScheduleItem {
                    task_id: task.id.clone(),
                    subtask_id: Some(subtask.id.clone()),
                    title: subtask.title.clone(),
                    datetime: subtask.datetime,
                    estimated_time: subtask.estimated_time.clone(),
                    category: subtask.category_or(task).to_string(),
                    completed: subtask.completed,
                    parent_title: Some(task.title.clone()),
                });
            }
        }
    }

    items
}

/// Sort items ascending by datetime; items without one sort last and keep
/// their relative insertion order (the sort is stable).
fn sort_by_datetime(items: &mut [ScheduleItem]) {
    items.sort_by_key(|item| (item.datetime.is_none(), item.datetime));
}

/// Project the collection into the five list-view sections. Every bucket is
/// present, in display order, possibly empty.
pub fn bucketed_items(tasks: &[Task], today: NaiveDate) -> Vec<(Bucket, Vec<ScheduleItem>)> {
    let mut sections: Vec<(Bucket, Vec<ScheduleItem>)> =
        Bucket::ALL.iter().map(|b| (*b, Vec::new())).collect();

    for item in schedule_items(tasks) {
        let bucket = match item.datetime {
            Some(dt) => bucket_for(dt.date_naive(), today),
            None => Bucket::NoDate,
        };
        if let Some((_, slot)) = sections.iter_mut().find(|(b, _)| *b == bucket) {
            slot.push(item);
        }
    }

    for (_, items) in &mut sections {
        sort_by_datetime(items);
    }

    sections
}

/// Items scheduled on the given calendar day, ascending by time
pub fn items_for_date(tasks: &[Task], date: NaiveDate) -> Vec<ScheduleItem> {
    let mut items: Vec<ScheduleItem> = schedule_items(tasks)
        .into_iter()
        .filter(|item| item.datetime.map(|dt| dt.date_naive()) == Some(date))
        .collect();
    sort_by_datetime(&mut items);
    items
}

/// The seven days of the week containing `reference`, starting from the
/// Sunday on or before it
pub fn week_dates(reference: NaiveDate) -> Vec<NaiveDate> {
    let start = reference - Duration::days(reference.weekday().num_days_from_sunday() as i64);
    (0..7).map(|i| start + Duration::days(i)).collect()
}

/// A rectangular grid of complete Sunday-Saturday weeks covering the month of
/// `reference`, including the adjacent-month days needed to square it off
pub fn month_grid(reference: NaiveDate) -> Vec<NaiveDate> {
    let first = reference.with_day(1).unwrap_or(reference);
    let last = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .map(|next| next - Duration::days(1))
    .unwrap_or(first);

    let start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);
    let end = last + Duration::days((6 - last.weekday().num_days_from_sunday()) as i64);

    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        current += Duration::days(1);
    }
    dates
}

/// Fixed category palette. Ten entries so a handful of categories rarely
/// collide.
const CATEGORY_PALETTE: [Color; 10] = [
    Color::Blue,
    Color::Green,
    Color::Magenta,
    Color::Yellow,
    Color::Red,
    Color::LightBlue,
    Color::LightMagenta,
    Color::LightRed,
    Color::Cyan,
    Color::LightCyan,
];

/// Neutral color for completed items, regardless of category
const DONE_COLOR: Color = Color::DarkGray;

/// Stable string hash over UTF-16 code units with i32 wrapping, so colors
/// match across sessions and across re-exports of the same data.
fn category_hash(category: &str) -> i32 {
    let mut hash: i32 = 0;
    for unit in category.encode_utf16() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(unit as i32);
    }
    hash
}

/// Deterministic color for a category string
pub fn category_color(category: &str) -> Color {
    let index = category_hash(category).unsigned_abs() as usize % CATEGORY_PALETTE.len();
    CATEGORY_PALETTE[index]
}

/// Color for an item badge: done items always render in the neutral color
pub fn item_color(category: &str, completed: bool) -> Color {
    if completed {
        DONE_COLOR
    } else {
        category_color(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::Subtask;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn scheduled(title: &str, dt: Option<DateTime<Local>>) -> Subtask {
        let mut sub = Subtask::new(title);
        sub.datetime = dt;
        sub
    }

    #[test]
    fn test_bucket_boundaries() {
        let today = day(2025, 3, 10);
        assert_eq!(bucket_for(day(2025, 3, 10), today), Bucket::Today);
        assert_eq!(bucket_for(day(2025, 3, 11), today), Bucket::Tomorrow);
        assert_eq!(bucket_for(day(2025, 3, 16), today), Bucket::ThisWeek);
        // Exactly seven days out is Future, not This Week
        assert_eq!(bucket_for(day(2025, 3, 17), today), Bucket::Future);
        // Past days fall into This Week's "strictly before" arm
        assert_eq!(bucket_for(day(2025, 3, 9), today), Bucket::ThisWeek);
    }

    #[test]
    fn test_start_of_today_is_today() {
        let today = day(2025, 3, 10);
        let midnight = at(2025, 3, 10, 0, 0);
        let task = Task::new("T", "C", "T", vec![scheduled("first thing", Some(midnight))]);
        let sections = bucketed_items(&[task], today);
        assert_eq!(sections[0].0, Bucket::Today);
        assert_eq!(sections[0].1.len(), 1);
    }

    #[test]
    fn test_task_without_subtasks_is_its_own_item() {
        let mut task = Task::new("Solo", "Misc", "Solo", vec![]);
        task.datetime = Some(at(2025, 3, 10, 9, 0));

        let items = schedule_items(&[task]);
        assert_eq!(items.len(), 1);
        assert!(items[0].subtask_id.is_none());
        assert!(!items[0].completed);
    }

    #[test]
    fn test_task_with_subtasks_contributes_only_subtasks() {
        let task = Task::new("Parent", "Misc", "Parent", vec![Subtask::new("child")]);
        let items = schedule_items(&[task]);
        assert_eq!(items.len(), 1);
        assert!(items[0].subtask_id.is_some());
        assert_eq!(items[0].parent_title.as_deref(), Some("Parent"));
    }

    #[test]
    fn test_bucket_sort_dated_first_then_stable() {
        let today = day(2025, 3, 10);
        let task = Task::new(
            "T",
            "C",
            "T",
            vec![
                scheduled("undated a", None),
                scheduled("late", Some(at(2025, 3, 10, 18, 0))),
                scheduled("undated b", None),
                scheduled("early", Some(at(2025, 3, 10, 8, 0))),
            ],
        );

        let sections = bucketed_items(&[task], today);
        let today_items = &sections[0].1;
        assert_eq!(today_items[0].title, "early");
        assert_eq!(today_items[1].title, "late");

        let no_date = &sections[4].1;
        assert_eq!(no_date[0].title, "undated a");
        assert_eq!(no_date[1].title, "undated b");
    }

    #[test]
    fn test_week_dates_starts_on_sunday() {
        // 2025-03-12 is a Wednesday
        let dates = week_dates(day(2025, 3, 12));
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], day(2025, 3, 9));
        assert_eq!(dates[6], day(2025, 3, 15));
    }

    #[test]
    fn test_week_dates_sunday_reference() {
        let dates = week_dates(day(2025, 3, 9));
        assert_eq!(dates[0], day(2025, 3, 9));
    }

    #[test]
    fn test_month_grid_shape() {
        for (y, m, days_in_month) in [
            (2025, 2, 28),
            (2024, 2, 29),
            (2025, 3, 31),
            (2025, 12, 31),
            (2026, 1, 31),
        ] {
            let grid = month_grid(day(y, m, 15));
            assert_eq!(grid.len() % 7, 0, "{}-{} grid not rectangular", y, m);

            // Every day of the month exactly once
            for dnum in 1..=days_in_month {
                assert_eq!(
                    grid.iter()
                        .filter(|d| d.year() == y && d.month() == m && d.day() == dnum)
                        .count(),
                    1,
                    "{}-{}-{} missing or duplicated",
                    y,
                    m,
                    dnum
                );
            }

            // Grid is contiguous and Sunday-aligned
            assert_eq!(grid[0].weekday().num_days_from_sunday(), 0);
            for pair in grid.windows(2) {
                assert_eq!(pair[1], pair[0] + Duration::days(1));
            }
        }
    }

    #[test]
    fn test_items_for_date_sorted_by_time() {
        let task = Task::new(
            "T",
            "C",
            "T",
            vec![
                scheduled("pm", Some(at(2025, 3, 10, 15, 0))),
                scheduled("am", Some(at(2025, 3, 10, 9, 0))),
                scheduled("other day", Some(at(2025, 3, 11, 9, 0))),
            ],
        );

        let items = items_for_date(&[task], day(2025, 3, 10));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "am");
        assert_eq!(items[1].title, "pm");
    }

    #[test]
    fn test_category_color_is_stable() {
        assert_eq!(category_color("Work"), category_color("Work"));
        assert_eq!(category_color("買い物"), category_color("買い物"));
    }

    #[test]
    fn test_completed_items_use_done_color() {
        assert_eq!(item_color("Work", true), DONE_COLOR);
        assert_eq!(item_color("Work", false), category_color("Work"));
    }
}
