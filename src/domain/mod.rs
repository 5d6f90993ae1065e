pub mod task;
pub mod views;

pub use task::{new_id, parse_datetime, Subtask, Task};
pub use views::{
    bucket_for, bucketed_items, category_color, item_color, items_for_date, month_grid,
    schedule_items, week_dates, Bucket, ScheduleItem,
};
