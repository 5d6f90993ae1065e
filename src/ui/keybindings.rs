use crate::app::{AppState, ViewMode};
use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, app: &AppState, area: Rect) {
    let hints = if app.drag.is_dragging() {
        Line::from(vec![
            Span::raw(" ←/→ day   "),
            Span::raw("↑/↓ week   "),
            Span::raw("Enter drop   "),
            Span::raw("Esc cancel"),
        ])
    } else {
        let mut spans = vec![
            Span::raw(" ↑/↓ select   "),
            Span::raw("Space toggle   "),
            Span::raw("a add   "),
            Span::raw("d delete   "),
            Span::raw("g move   "),
            Span::raw("Tab view   "),
        ];
        if app.view_mode == ViewMode::Calendar {
            spans.push(Span::raw("←/→ day   "));
            spans.push(Span::raw("m week/month   "));
            spans.push(Span::raw("t today   "));
        }
        spans.push(Span::raw("q quit"));
        Line::from(spans)
    };

    let paragraph = Paragraph::new(hints).style(hint_style());
    f.render_widget(paragraph, area);
}
