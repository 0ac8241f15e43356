use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};
use rust_i18n::t;

use crate::store::schema::HistoryRecord;
use crate::text::truncate_chars;
use crate::ui::layout::centered_rect;
use crate::ui::theme::Theme;

const SUBJECT_WIDTH: usize = 40;

pub fn relative_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match (now - created_at).num_days() {
        d if d <= 0 => t!("history.today").to_string(),
        1 => t!("history.yesterday").to_string(),
        d => t!("history.days_ago", count = d).to_string(),
    }
}

/// Popup list of saved analyses.
pub struct HistoryPanel<'a> {
    pub records: &'a [HistoryRecord],
    pub selected: usize,
    pub confirm_delete: bool,
    pub now: DateTime<Utc>,
    pub theme: &'a Theme,
}

impl Widget for HistoryPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let popup = centered_rect(70, 70, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(format!(" {} ({}) ", t!("history.title"), self.records.len()))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(popup);
        block.render(popup, buf);

        if self.records.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                t!("history.empty").to_string(),
                Style::default().fg(colors.muted()),
            )))
            .render(inner, buf);
            return;
        }

        // Keep the selection on screen.
        let visible = inner.height as usize;
        let first = self.selected.saturating_sub(visible.saturating_sub(1));

        let lines: Vec<Line> = self
            .records
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .map(|(i, record)| {
                let subject = match &record.secondary_input {
                    Some(second) => format!("{} ⇄ {second}", record.primary_input),
                    None => record.primary_input.clone(),
                };
                let is_selected = i == self.selected;
                let marker = if is_selected { "▶" } else { " " };
                let base = if is_selected {
                    Style::default().fg(colors.fg()).bg(colors.accent_dim())
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(vec![
                    Span::styled(format!("{marker} "), base),
                    Span::styled(
                        format!("{:<14}", record.mode.label()),
                        base.fg(colors.accent()).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!(" {} ", truncate_chars(&subject, SUBJECT_WIDTH)), base),
                    Span::styled(
                        relative_age(record.created_at, self.now),
                        base.fg(colors.muted()),
                    ),
                ])
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);

        if self.confirm_delete {
            let dialog_width = 36u16.min(popup.width);
            let dialog_height = 5u16.min(popup.height);
            let dialog_area = Rect::new(
                popup.x + popup.width.saturating_sub(dialog_width) / 2,
                popup.y + popup.height.saturating_sub(dialog_height) / 2,
                dialog_width,
                dialog_height,
            );
            Clear.render(dialog_area, buf);
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}  ", t!("history.confirm_delete")),
                    Style::default().fg(colors.fg()),
                )),
            ])
            .block(
                Block::bordered()
                    .title(format!(" {} ", t!("history.confirm_title")))
                    .border_style(Style::default().fg(colors.error()))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(dialog_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::store::schema::AnalysisMode;

    #[test]
    fn relative_age_buckets() {
        rust_i18n::set_locale("en");
        let now = Utc::now();
        assert_eq!(relative_age(now, now), "today");
        assert_eq!(relative_age(now - Duration::hours(30), now), "yesterday");
        assert_eq!(relative_age(now - Duration::days(5), now), "5 days ago");
        // Clock skew never produces a negative age.
        assert_eq!(relative_age(now + Duration::days(1), now), "today");
    }

    #[test]
    fn renders_subjects_and_confirm_dialog() {
        rust_i18n::set_locale("en");
        let theme = Theme::default();
        let records = vec![HistoryRecord::new(
            "alice".into(),
            Some("bob".into()),
            AnalysisMode::Comparison,
            "payload".into(),
        )];
        let panel = HistoryPanel {
            records: &records,
            selected: 0,
            confirm_delete: true,
            now: Utc::now(),
            theme: &theme,
        };
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        panel.render(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("alice"));
        assert!(text.contains("(y/n)"));
    }
}
