use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Tabs, Widget, Wrap};
use rust_i18n::t;

use crate::store::schema::AnalysisMode;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

pub struct FormField<'a> {
    pub label: String,
    pub input: &'a LineInput,
    pub focused: bool,
}

/// Mode tabs plus the input fields. Also drawn, dimmed, while loading.
pub struct AnalysisForm<'a> {
    pub mode: AnalysisMode,
    pub fields: Vec<FormField<'a>>,
    pub error: Option<&'a str>,
    /// Spinner glyph while a request is in flight.
    pub loading: Option<&'a str>,
    pub theme: &'a Theme,
}

impl Widget for AnalysisForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let editable = self.loading.is_none();

        let block = Block::bordered()
            .title(format!(" {} ", t!("form.title")))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut constraints = vec![Constraint::Length(2)];
        constraints.extend(self.fields.iter().map(|_| Constraint::Length(3)));
        constraints.push(Constraint::Min(0));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let titles: Vec<Line> = AnalysisMode::ALL
            .iter()
            .map(|m| Line::from(format!(" {} ", m.label())))
            .collect();
        Tabs::new(titles)
            .select(self.mode.index())
            .style(Style::default().fg(colors.muted()))
            .highlight_style(
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
            .render(rows[0], buf);

        for (i, field) in self.fields.iter().enumerate() {
            render_field(field, editable, self.theme, rows[i + 1], buf);
        }

        let message_area = rows[rows.len() - 1];
        if let Some(spinner) = self.loading {
            let line = Line::from(vec![
                Span::styled(format!(" {spinner} "), Style::default().fg(colors.accent())),
                Span::styled(t!("form.loading").to_string(), Style::default().fg(colors.fg())),
            ]);
            Paragraph::new(vec![Line::from(""), line]).render(message_area, buf);
        } else if let Some(error) = self.error {
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!(" {} ", t!("form.error_banner")),
                    Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(format!(" {error}"), Style::default().fg(colors.error()))),
            ])
            .wrap(Wrap { trim: false })
            .render(message_area, buf);
        }
    }
}

fn render_field(field: &FormField, editable: bool, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let colors = &theme.colors;
    let active = editable && field.focused;
    let border = if active {
        colors.border_focused()
    } else {
        colors.border()
    };
    let block = Block::bordered()
        .title(format!(" {} ", field.label))
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    block.render(area, buf);

    let text_style = if editable {
        Style::default().fg(colors.fg())
    } else {
        Style::default().fg(colors.muted())
    };
    let line = if active {
        let (before, cursor, after) = field.input.render_parts();
        let cursor_style = Style::default().fg(colors.cursor_fg()).bg(colors.cursor_bg());
        Line::from(vec![
            Span::styled(before.to_string(), text_style),
            Span::styled(cursor.map_or(" ".to_string(), String::from), cursor_style),
            Span::styled(after.to_string(), text_style),
        ])
    } else {
        Line::from(Span::styled(field.input.value().to_string(), text_style))
    };
    Paragraph::new(line).render(inner, buf);
}
