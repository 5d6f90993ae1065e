use crate::app::AppState;
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the delete confirmation modal
pub fn render_confirm_delete(f: &mut Frame, app: &AppState, area: Rect) {
    if let Some(target) = &app.delete_target {
        let modal_area = create_modal_area(area, 9);

        // Clear the area behind the modal
        f.render_widget(Clear, modal_area);

        let what = if target.subtask_id.is_some() {
            "subtask"
        } else {
            "task and all its subtasks"
        };

        let mut lines = Vec::new();
        lines.push(Line::raw(""));
        lines.push(Line::raw(format!("  Delete {} '{}'?", what, target.title)));
        lines.push(Line::raw(""));
        lines.push(Line::raw("  This cannot be undone."));
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("  [y]", modal_title_style()),
            Span::raw(" Delete  "),
            Span::styled("[n]", modal_title_style()),
            Span::raw(" Keep  "),
        ]));

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(" Confirm Delete ", modal_title_style()))
                    .style(modal_bg_style()),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, modal_area);
    }
}
