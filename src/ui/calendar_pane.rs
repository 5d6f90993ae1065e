use crate::app::{AppState, CalendarMode};
use crate::domain::{items_for_date, month_grid, week_dates, ScheduleItem};
use crate::ui::styles::{
    adjacent_month_style, border_style, category_style, cursor_cell_style, default_style,
    done_style, dragging_style, selected_style, title_style, today_cell_style,
};
use chrono::{Datelike, Local, NaiveDate};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Render the calendar view in the current week/month mode
pub fn render_calendar_pane(f: &mut Frame, app: &AppState, area: Rect) {
    match app.calendar_mode {
        CalendarMode::Week => render_week(f, app, area),
        CalendarMode::Month => render_month(f, app, area),
    }
}

fn cell_border_style(app: &AppState, date: NaiveDate) -> ratatui::style::Style {
    if date == app.cursor_date {
        if app.drag.is_dragging() {
            dragging_style()
        } else {
            cursor_cell_style()
        }
    } else if date == Local::now().date_naive() {
        today_cell_style()
    } else {
        border_style()
    }
}

fn item_lines(app: &AppState, date: NaiveDate, items: &[ScheduleItem], max: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (idx, item) in items.iter().take(max).enumerate() {
        let time = item
            .datetime
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_default();

        let style = if date == app.cursor_date && idx == app.calendar_item_index {
            selected_style()
        } else if item.completed {
            done_style()
        } else {
            category_style(&item.category, item.completed)
        };

        lines.push(Line::from(vec![
            Span::styled(time, default_style()),
            Span::raw(" "),
            Span::styled(item.title.clone(), style),
        ]));
    }
    if items.len() > max {
        lines.push(Line::from(Span::styled(
            format!("+{} more", items.len() - max),
            border_style(),
        )));
    }
    lines
}

fn render_week(f: &mut Frame, app: &AppState, area: Rect) {
    let dates = week_dates(app.reference_date);

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(
            format!(
                " Week of {} ",
                dates.first().map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
            ),
            title_style(),
        ));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(inner);

    for (i, date) in dates.iter().enumerate() {
        let items = items_for_date(app.store.tasks(), *date);
        let max = columns[i].height.saturating_sub(2) as usize;
        let lines = item_lines(app, *date, &items, max.max(1));

        let cell = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(cell_border_style(app, *date))
                .title(format!(
                    "{} {}",
                    WEEKDAY_LABELS[i],
                    date.format("%m/%d")
                )),
        );
        f.render_widget(cell, columns[i]);
    }
}

fn render_month(f: &mut Frame, app: &AppState, area: Rect) {
    let dates = month_grid(app.reference_date);
    let weeks = dates.len() / 7;

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(
            format!(" {} ", app.reference_date.format("%B %Y")),
            title_style(),
        ));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let header_and_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            std::iter::once(Constraint::Length(1))
                .chain((0..weeks).map(|_| Constraint::Ratio(1, weeks as u32)))
                .collect::<Vec<_>>(),
        )
        .split(inner);

    // Weekday header row
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(header_and_rows[0]);
    for (i, label) in WEEKDAY_LABELS.iter().enumerate() {
        f.render_widget(
            Paragraph::new(Span::styled(*label, border_style())),
            header_cols[i],
        );
    }

    for week in 0..weeks {
        let row_cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 7); 7])
            .split(header_and_rows[week + 1]);

        for col in 0..7 {
            let date = dates[week * 7 + col];
            let items = items_for_date(app.store.tasks(), date);

            let day_style = if date.month() == app.reference_date.month() {
                default_style()
            } else {
                adjacent_month_style()
            };

            let mut lines = vec![Line::from(Span::styled(
                format!("{:>2}", date.day()),
                day_style,
            ))];
            let max = row_cols[col].height.saturating_sub(3) as usize;
            lines.extend(item_lines(app, date, &items, max.max(1)));

            let cell = Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(cell_border_style(app, date)),
            );
            f.render_widget(cell, row_cols[col]);
        }
    }
}
