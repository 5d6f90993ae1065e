pub mod calendar_pane;
pub mod form;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod modal;
pub mod styles;

use crate::app::{AppState, ViewMode};
use crate::ui::styles::{dragging_style, toast_style};
use calendar_pane::render_calendar_pane;
use form::render_form;
use keybindings::render_keybindings;
use layout::create_layout;
use list_pane::render_list_pane;
use modal::render_confirm_delete;
use ratatui::{
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, app, layout.keybindings_area);

    match app.view_mode {
        ViewMode::List => render_list_pane(f, app, layout.main_area),
        ViewMode::Calendar => render_calendar_pane(f, app, layout.main_area),
    }

    render_status_line(f, app, layout.status_area);

    // Modals on top
    if app.form.is_some() {
        render_form(f, app);
    }
    if app.delete_target.is_some() {
        render_confirm_delete(f, app, size);
    }
}

fn dragged_title(app: &AppState) -> Option<String> {
    let item = app.drag.current()?;
    let task = app.store.task(&item.task_id)?;
    match &item.subtask_id {
        Some(subtask_id) => task.subtask(subtask_id).map(|s| s.title.clone()),
        None => Some(task.title.clone()),
    }
}

fn render_status_line(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let line = if let Some(title) = dragged_title(app) {
        Line::from(Span::styled(
            format!(" Moving '{}'", title),
            dragging_style(),
        ))
    } else if let Some(toast) = app.toasts.last() {
        Line::from(Span::styled(format!(" {}", toast.message), toast_style()))
    } else {
        Line::raw("")
    };
    f.render_widget(Paragraph::new(line), area);
}
