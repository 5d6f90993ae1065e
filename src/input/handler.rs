use crate::app::{AppState, FormField, UiMode, ViewMode};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::AddingTask => handle_form_mode(app, key),
        UiMode::ConfirmDelete => handle_confirm_delete_mode(app, key),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    // An in-flight drag captures the keys that steer and finish it
    if app.drag.is_dragging() {
        match key.code {
            KeyCode::Left => app.move_cursor_days(-1),
            KeyCode::Right => app.move_cursor_days(1),
            KeyCode::Up => app.move_cursor_days(-7),
            KeyCode::Down => app.move_cursor_days(7),
            KeyCode::Enter => app.drop_on_cursor(),
            KeyCode::Esc => app.cancel_drag(),
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => return Ok(true),

        // View switching
        KeyCode::Tab | KeyCode::Char('v') => app.toggle_view(),
        KeyCode::Char('m') => {
            if app.view_mode == ViewMode::Calendar {
                app.toggle_calendar_mode();
            }
        }
        KeyCode::Char('t') => app.jump_to_today(),

        // Selection
        KeyCode::Up | KeyCode::Char('k') => app.move_selection_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection_down(),
        KeyCode::Left => {
            if app.view_mode == ViewMode::Calendar {
                app.move_cursor_days(-1);
            }
        }
        KeyCode::Right => {
            if app.view_mode == ViewMode::Calendar {
                app.move_cursor_days(1);
            }
        }
        KeyCode::PageUp => {
            if app.view_mode == ViewMode::Calendar {
                app.move_cursor_days(-7);
            }
        }
        KeyCode::PageDown => {
            if app.view_mode == ViewMode::Calendar {
                app.move_cursor_days(7);
            }
        }

        // Actions
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('d') => app.request_delete_selected(),
        KeyCode::Char('g') => app.grab_selected(),

        _ => {}
    }
    Ok(false)
}

/// Handle keys in the add-task form
fn handle_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.close_form();
            return Ok(false);
        }
        KeyCode::Tab => {
            if let Some(form) = &mut app.form {
                form.field = form.field.next();
            }
            return Ok(false);
        }
        _ => {}
    }

    // Ctrl shortcuts: decompose and submit
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('d') => app.form_request_decompose(),
            KeyCode::Char('s') => app.submit_form(),
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Enter => {
            let on_entry = app.form.as_ref().map(|f| f.field) == Some(FormField::SubtaskEntry);
            if on_entry {
                app.form_add_manual_subtask();
            } else if let Some(form) = &mut app.form {
                form.field = form.field.next();
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = &mut app.form {
                active_field(form).push(c);
                form.error = None;
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = &mut app.form {
                active_field(form).pop();
            }
        }
        _ => {}
    }
    Ok(false)
}

fn active_field(form: &mut crate::app::TaskFormState) -> &mut String {
    match form.field {
        FormField::Title => &mut form.title,
        FormField::Category => &mut form.category,
        FormField::OriginalText => &mut form.original_text,
        FormField::EstimatedTime => &mut form.estimated_time,
        FormField::SubtaskEntry => &mut form.subtask_entry,
    }
}

/// Handle keys in the delete-confirmation modal
fn handle_confirm_delete_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => app.confirm_delete(),
        KeyCode::Char('n') | KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
    Ok(false)
}
