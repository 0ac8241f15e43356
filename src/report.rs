//! Free-text analysis reports and their embedded chart block.
//!
//! A report is plain text that may carry one `[CHART_DATA] … [/CHART_DATA]`
//! block of JSON. [`Report::decode`] splits it once into narrative and chart
//! data; nothing downstream looks at the tags again.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, Result};

pub const CHART_OPEN_TAG: &str = "[CHART_DATA]";
pub const CHART_CLOSE_TAG: &str = "[/CHART_DATA]";

static CHART_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[CHART_DATA\]([\s\S]*?)\[/CHART_DATA\]").expect("chart block pattern")
});

/// Remove the first chart block, leaving surrounding text untouched.
pub fn strip_chart_data(text: &str) -> String {
    CHART_BLOCK.replace(text, "").into_owned()
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChartPoint {
    #[serde(alias = "name", alias = "trait")]
    pub label: String,
    #[serde(alias = "score")]
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartData {
    pub title: Option<String>,
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }
}

/// Shapes the model has been seen to emit inside the block.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChartPayload {
    Titled {
        #[serde(default)]
        title: Option<String>,
        #[serde(alias = "points", alias = "traits")]
        data: Vec<ChartPoint>,
    },
    Points(Vec<ChartPoint>),
    Map(BTreeMap<String, f64>),
}

impl ChartData {
    fn parse(json: &str) -> Option<Self> {
        let payload: ChartPayload = match serde_json::from_str(json.trim()) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "chart block is not valid chart JSON, ignoring it");
                return None;
            }
        };
        let (title, points) = match payload {
            ChartPayload::Titled { title, data } => (title, data),
            ChartPayload::Points(points) => (None, points),
            ChartPayload::Map(map) => (
                None,
                map.into_iter()
                    .map(|(label, value)| ChartPoint { label, value })
                    .collect(),
            ),
        };
        let points: Vec<ChartPoint> = points
            .into_iter()
            .filter(|p| p.value.is_finite() && p.value >= 0.0)
            .collect();
        if points.is_empty() {
            return None;
        }
        Some(Self { title, points })
    }
}

/// A decoded analysis report.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// Report text with the chart block removed. This is what gets shown,
    /// copied and downloaded.
    pub narrative: String,
    pub chart: Option<ChartData>,
}

impl Report {
    /// Decode raw oracle text. Blank text is a schema failure; a malformed
    /// chart block is dropped with a warning and does not fail the report.
    pub fn decode(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(AppError::OracleSchema("empty report".to_string()));
        }
        let chart = CHART_BLOCK
            .captures(raw)
            .and_then(|c| c.get(1))
            .and_then(|m| ChartData::parse(m.as_str()));
        let narrative = strip_chart_data(raw);
        if narrative.trim().is_empty() {
            return Err(AppError::OracleSchema(
                "report contains only chart data".to_string(),
            ));
        }
        Ok(Self { narrative, chart })
    }

    /// Text used by copy and download.
    pub fn export_text(&self) -> &str {
        &self.narrative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_block_and_keeps_surroundings() {
        let raw = r#"Report text [CHART_DATA]{"x":1}[/CHART_DATA] tail"#;
        assert_eq!(strip_chart_data(raw), "Report text  tail");
    }

    #[test]
    fn strips_only_first_block_non_greedily() {
        let raw = "a [CHART_DATA]1[/CHART_DATA] b [CHART_DATA]2[/CHART_DATA] c";
        assert_eq!(strip_chart_data(raw), "a  b [CHART_DATA]2[/CHART_DATA] c");
    }

    #[test]
    fn strip_spans_newlines() {
        let raw = "head\n[CHART_DATA]\n{\"a\": 1,\n \"b\": 2}\n[/CHART_DATA]\nfoot";
        assert_eq!(strip_chart_data(raw), "head\n\nfoot");
    }

    #[test]
    fn text_without_block_is_unchanged() {
        assert_eq!(strip_chart_data("plain report"), "plain report");
        assert_eq!(strip_chart_data("[CHART_DATA] unterminated"), "[CHART_DATA] unterminated");
    }

    #[test]
    fn decode_map_chart() {
        let raw = r#"Report text [CHART_DATA]{"x":1}[/CHART_DATA] tail"#;
        let report = Report::decode(raw).unwrap();
        assert_eq!(report.export_text(), "Report text  tail");
        let chart = report.chart.unwrap();
        assert_eq!(chart.points, vec![ChartPoint { label: "x".into(), value: 1.0 }]);
    }

    #[test]
    fn decode_titled_chart() {
        let raw = r#"نص [CHART_DATA]{"title": "السمات", "data": [{"label": "الانفتاح", "value": 80}, {"name": "الانبساط", "value": 55.5}]}[/CHART_DATA]"#;
        let report = Report::decode(raw).unwrap();
        let chart = report.chart.unwrap();
        assert_eq!(chart.title.as_deref(), Some("السمات"));
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.points[1].label, "الانبساط");
        assert!((chart.max_value() - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn decode_point_list_chart() {
        let raw = r#"body [CHART_DATA][{"label": "a", "value": 3}, {"label": "b", "value": -1}][/CHART_DATA]"#;
        let chart = Report::decode(raw).unwrap().chart.unwrap();
        assert_eq!(chart.points.len(), 1, "negative values are dropped");
    }

    #[test]
    fn malformed_chart_is_dropped_not_fatal() {
        let raw = "body [CHART_DATA]{not json[/CHART_DATA] end";
        let report = Report::decode(raw).unwrap();
        assert!(report.chart.is_none());
        assert_eq!(report.narrative, "body  end");
    }

    #[test]
    fn blank_or_chart_only_reports_are_schema_errors() {
        assert!(matches!(Report::decode("  \n"), Err(AppError::OracleSchema(_))));
        assert!(matches!(
            Report::decode("[CHART_DATA]{\"x\":1}[/CHART_DATA]"),
            Err(AppError::OracleSchema(_))
        ));
    }
}
