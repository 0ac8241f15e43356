use ratatui::buffer::Buffer;
use ratatui::layout::{Direction, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::report::{ChartData, Report};
use crate::store::schema::AnalysisMode;
use crate::ui::layout::{LayoutTier, report_split};
use crate::ui::theme::Theme;

pub struct ReportView<'a> {
    pub report: &'a Report,
    pub mode: AnalysisMode,
    pub scroll: u16,
    pub tier: LayoutTier,
    pub theme: &'a Theme,
}

impl Widget for ReportView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (text_area, chart_area) = match &self.report.chart {
            Some(chart) => {
                let (text, chart_rect) = report_split(area, self.tier, chart.points.len());
                (text, Some((chart_rect, chart)))
            }
            None => (area, None),
        };

        self.render_narrative(text_area, buf);
        if let Some((rect, chart)) = chart_area {
            ScoreChart {
                chart,
                theme: self.theme,
            }
            .render(rect, buf);
        }
    }
}

impl ReportView<'_> {
    fn render_narrative(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(" {} ", self.mode.label()),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));

        let lines: Vec<Line> = self
            .report
            .narrative
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), narrative_style(l, self.theme))))
            .collect();

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}

/// Headings (markdown `#` lines or `**bold**` lines) stand out.
fn narrative_style(line: &str, theme: &Theme) -> Style {
    let colors = &theme.colors;
    let trimmed = line.trim();
    if trimmed.starts_with('#') || (trimmed.starts_with("**") && trimmed.ends_with("**") && trimmed.len() > 4) {
        Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.fg())
    }
}

/// Horizontal bars, one per scored trait.
pub struct ScoreChart<'a> {
    pub chart: &'a ChartData,
    pub theme: &'a Theme,
}

impl Widget for ScoreChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = self
            .chart
            .title
            .clone()
            .unwrap_or_else(|| t!("report.chart_title").to_string());

        let bars: Vec<Bar> = self
            .chart
            .points
            .iter()
            .map(|p| {
                Bar::default()
                    .value(p.value.round() as u64)
                    .label(Line::from(p.label.clone()))
                    .text_value(format!("{:.0}", p.value))
                    .style(Style::default().fg(colors.bar_filled()))
                    .value_style(Style::default().fg(colors.bg()).bg(colors.bar_filled()))
            })
            .collect();

        let max = self.chart.max_value().max(100.0).round() as u64;
        BarChart::default()
            .block(
                Block::bordered()
                    .title(format!(" {title} "))
                    .border_style(Style::default().fg(colors.border())),
            )
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(1)
            .max(max)
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }
}
