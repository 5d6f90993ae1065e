use crate::app::{AppState, FormField, TaskFormState};
use crate::ui::layout::create_modal_area;
use crate::ui::styles::{
    default_style, error_style, hint_style, modal_bg_style, modal_title_style, selected_style,
    time_style,
};
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn field_line(label: &str, value: &str, active: bool) -> Line<'static> {
    let value_style = if active { selected_style() } else { default_style() };
    let shown = if active {
        format!("{}_", value)
    } else {
        value.to_string()
    };
    Line::from(vec![
        Span::styled(format!(" {:<14}", label), hint_style()),
        Span::styled(shown, value_style),
    ])
}

fn form_lines(form: &TaskFormState) -> Vec<Line<'static>> {
    let mut lines = vec![
        field_line("Title", &form.title, form.field == FormField::Title),
        field_line("Category", &form.category, form.field == FormField::Category),
        field_line(
            "Describe",
            &form.original_text,
            form.field == FormField::OriginalText,
        ),
        field_line(
            "Estimate",
            &form.estimated_time,
            form.field == FormField::EstimatedTime,
        ),
        Line::raw(""),
        Line::from(Span::styled(" Subtasks", modal_title_style())),
    ];

    if form.subtasks.is_empty() {
        lines.push(Line::from(Span::styled(
            "   (none yet - type below or Ctrl+D to decompose)",
            hint_style(),
        )));
    }
    for candidate in &form.subtasks {
        let mut spans = vec![
            Span::raw("   - "),
            Span::styled(candidate.title.clone(), default_style()),
        ];
        if let Some(category) = &candidate.category {
            spans.push(Span::styled(format!("  ({})", category), time_style()));
        }
        lines.push(Line::from(spans));
    }

    lines.push(field_line(
        "New subtask",
        &form.subtask_entry,
        form.field == FormField::SubtaskEntry,
    ));
    lines.push(Line::raw(""));

    if form.decomposing {
        lines.push(Line::from(Span::styled(
            " Decomposing...",
            time_style(),
        )));
    }
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            error_style(),
        )));
    }

    lines.push(Line::from(Span::styled(
        " Tab next field   Enter add subtask   Ctrl+D decompose   Ctrl+S save   Esc cancel",
        hint_style(),
    )));
    lines
}

/// Render the add-task form as a centered modal
pub fn render_form(f: &mut Frame, app: &AppState) {
    let Some(form) = &app.form else {
        return;
    };

    let height = (form_lines(form).len() as u16).saturating_add(2).min(f.size().height);
    let area = create_modal_area(f.size(), height.max(12));
    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(form_lines(form))
        .style(modal_bg_style())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" New Task ", modal_title_style())),
        );
    f.render_widget(paragraph, area);
}
