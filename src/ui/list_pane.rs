use crate::app::AppState;
use crate::domain::ScheduleItem;
use crate::ui::styles::{
    border_style, category_style, default_style, done_style, section_style, selected_style,
    time_style, title_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

fn format_datetime(item: &ScheduleItem) -> String {
    match item.datetime {
        Some(dt) => dt.format("%m/%d %H:%M").to_string(),
        None => "--/-- --:--".to_string(),
    }
}

fn item_line(item: &ScheduleItem, selected: bool) -> Line<'static> {
    let checkbox = if item.is_subtask() {
        if item.completed {
            "[x] "
        } else {
            "[ ] "
        }
    } else {
        "    "
    };

    let title_style = if selected {
        selected_style()
    } else if item.completed {
        done_style()
    } else {
        default_style()
    };

    let mut spans = vec![
        Span::raw("  "),
        Span::raw(checkbox),
        Span::styled(format_datetime(item), time_style()),
        Span::raw("  "),
        Span::styled(item.title.clone(), title_style),
        Span::raw("  "),
        Span::styled(
            format!("({})", item.category),
            category_style(&item.category, item.completed),
        ),
    ];

    if let Some(parent) = &item.parent_title {
        spans.push(Span::styled(
            format!("  < {}", parent),
            border_style(),
        ));
    }
    if let Some(estimate) = &item.estimated_time {
        spans.push(Span::styled(format!("  ~{}", estimate), time_style()));
    }

    Line::from(spans)
}

/// Render the date-bucketed task list
pub fn render_list_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let mut rows: Vec<ListItem> = Vec::new();
    let mut flat_index = 0usize;

    for (bucket, items) in app.list_sections() {
        if items.is_empty() {
            continue;
        }
        rows.push(ListItem::new(Line::from(Span::styled(
            format!(" {} ", bucket.label()),
            section_style(),
        ))));

        for item in &items {
            let selected = flat_index == app.selected_index;
            rows.push(ListItem::new(item_line(item, selected)));
            flat_index += 1;
        }
        rows.push(ListItem::new(Line::raw("")));
    }

    if rows.is_empty() {
        rows.push(ListItem::new(Line::raw(
            "  No tasks yet - press 'a' to add one",
        )));
    }

    let list = List::new(rows).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(" Tasks ", title_style())),
    );

    f.render_widget(list, area);
}
