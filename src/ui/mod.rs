use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::domain::{FieldKey, Rule};
use crate::form::{FormState, Validator};

/// Everything a single frame needs; the runtime rebuilds it per pass and the
/// view never reaches back into the engine.
pub struct UiContext<'a> {
    pub title: &'a str,
    pub rows: &'a [FormRow],
    pub selected: usize,
    pub progress: u8,
    pub status_message: &'a str,
    pub dirty: bool,
    pub error_count: usize,
    pub help: Option<&'a str>,
}

/// One rendered line of the form body: either a section header or a field.
#[derive(Debug, Clone)]
pub struct FormRow {
    pub key: Option<FieldKey>,
    pub label: String,
    pub value: String,
    pub required: bool,
    pub error: Option<String>,
    pub note: Option<String>,
    pub hint: Option<String>,
    pub depth: usize,
}

impl FormRow {
    fn header(label: String, depth: usize) -> Self {
        FormRow {
            key: None,
            label,
            value: String::new(),
            required: false,
            error: None,
            note: None,
            hint: None,
            depth,
        }
    }
}

/// UI presentation buckets for the progress percentage. The engine only
/// guarantees the integer; the banding is a rendering choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    Low,
    Medium,
    High,
}

impl ProgressBand {
    pub fn of(percent: u8) -> Self {
        match percent {
            0..=33 => ProgressBand::Low,
            34..=66 => ProgressBand::Medium,
            _ => ProgressBand::High,
        }
    }

    fn color(self) -> Color {
        match self {
            ProgressBand::Low => Color::Red,
            ProgressBand::Medium => Color::Yellow,
            ProgressBand::High => Color::Green,
        }
    }
}

/// Flattens the live tree into display rows: top-level fields first, then
/// each recorder group with its time-frames. Hidden fields never produce a
/// row.
pub fn build_rows(form: &FormState, validator: &Validator) -> Vec<FormRow> {
    let mut rows = Vec::new();
    rows.push(FormRow::header(form.spec().title.clone(), 0));
    for field in &form.top {
        push_field_row(&mut rows, form, validator, &field.key, 1);
    }
    for (group_index, group) in form.groups.iter().enumerate() {
        rows.push(FormRow::header(
            format!("{} #{}", form.spec().group.title, group_index + 1),
            0,
        ));
        for field in &group.fields {
            push_field_row(&mut rows, form, validator, &field.key, 1);
        }
        for (item_index, item) in group.items.iter().enumerate() {
            rows.push(FormRow::header(
                format!("{} #{}", form.spec().group.item.title, item_index + 1),
                1,
            ));
            for field in &item.fields {
                push_field_row(&mut rows, form, validator, &field.key, 2);
            }
        }
    }
    rows
}

fn push_field_row(
    rows: &mut Vec<FormRow>,
    form: &FormState,
    validator: &Validator,
    key: &FieldKey,
    depth: usize,
) {
    let Some(field) = form.field(key) else {
        return;
    };
    if !field.visible {
        return;
    }
    let note = retention_note(field.raw_value().trim(), &field.spec.rules, validator);
    rows.push(FormRow {
        key: Some(key.clone()),
        label: field.spec.label.clone(),
        value: field.raw_value(),
        required: validator.required_now(form, key),
        error: field.error.as_ref().map(|issue| issue.message.clone()),
        note,
        hint: field.spec.hint.clone(),
        depth,
    });
}

fn retention_note(value: &str, rules: &[Rule], validator: &Validator) -> Option<String> {
    let window = rules.iter().find_map(|rule| match rule {
        Rule::WithinPastDays(days) => Some(*days),
        _ => None,
    })?;
    let date = chrono::NaiveDate::parse_from_str(value, crate::form::DATE_FORMAT).ok()?;
    let remaining = validator.retention_days_remaining(date, window);
    if remaining >= 0 {
        Some(format!("~{remaining} days of footage retention left"))
    } else {
        Some("retention window has passed".to_string())
    }
}

pub fn draw(frame: &mut Frame<'_>, ctx: UiContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(7),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_progress(frame, chunks[0], &ctx);
    render_body(frame, chunks[1], &ctx);
    render_footer(frame, chunks[2], &ctx);
}

fn render_progress(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let band = ProgressBand::of(ctx.progress);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(ctx.title))
        .gauge_style(Style::default().fg(band.color()))
        .percent(u16::from(ctx.progress))
        .label(format!("{}% of required fields complete", ctx.progress));
    frame.render_widget(gauge, area);
}

fn render_body(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    if ctx.rows.is_empty() {
        let placeholder =
            Paragraph::new("Form has no fields").block(Block::default().borders(Borders::ALL));
        frame.render_widget(placeholder, area);
        return;
    }

    let label_column = ctx
        .rows
        .iter()
        .filter(|row| row.key.is_some())
        .map(|row| row.label.width() + row.depth * 2)
        .max()
        .unwrap_or(0);

    let items: Vec<ListItem<'static>> = ctx
        .rows
        .iter()
        .map(|row| ListItem::new(row_lines(row, label_column)))
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(ctx.selected.min(ctx.rows.len() - 1)));

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Fields"))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn row_lines(row: &FormRow, label_column: usize) -> Vec<Line<'static>> {
    let indent = "  ".repeat(row.depth);
    if row.key.is_none() {
        return vec![Line::from(Span::styled(
            format!("{indent}{}", row.label),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))];
    }

    let marker = if row.required { "*" } else { " " };
    let label = format!("{indent}{}{marker}", row.label);
    let padding = label_column.saturating_sub(label.width()) + 2;
    let mut spans = vec![
        Span::raw(label),
        Span::raw(" ".repeat(padding)),
        Span::raw(row.value.clone()),
    ];
    if let Some(note) = &row.note {
        spans.push(Span::styled(
            format!("  ({note})"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let mut lines = vec![Line::from(spans)];
    if let Some(error) = &row.error {
        lines.push(Line::from(Span::styled(
            format!("{indent}  ✗ {error}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let mut status = ctx.status_message.to_string();
    if ctx.dirty {
        status.push_str(" • unsaved changes");
    }
    if ctx.error_count > 0 {
        status.push_str(&format!(" • {} error(s)", ctx.error_count));
    }
    if let Some(hint) = ctx
        .rows
        .get(ctx.selected)
        .and_then(|row| row.hint.as_deref())
    {
        status.push_str(" • ");
        status.push_str(hint);
    }
    if status.trim().is_empty() {
        status = "Ready".to_string();
    }
    let status_widget = Paragraph::new(status)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status_widget, chunks[0]);

    let help_width = chunks[1].width.saturating_sub(2).max(1) as usize;
    let help_text = ctx
        .help
        .map(|help| {
            textwrap::wrap(help, help_width)
                .into_iter()
                .map(|line| line.into_owned())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_else(|| " ".to_string());
    let help_widget = Paragraph::new(help_text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Keys"));
    frame.render_widget(help_widget, chunks[1]);
}
