use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_i18n::t;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisMode {
    #[default]
    Psychological,
    Behavioral,
    Comparison,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 3] = [
        AnalysisMode::Psychological,
        AnalysisMode::Behavioral,
        AnalysisMode::Comparison,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisMode::Psychological => "psychological",
            AnalysisMode::Behavioral => "behavioral",
            AnalysisMode::Comparison => "comparison",
        }
    }

    pub fn requires_secondary(self) -> bool {
        matches!(self, AnalysisMode::Comparison)
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> String {
        match self {
            AnalysisMode::Psychological => t!("modes.psychological"),
            AnalysisMode::Behavioral => t!("modes.behavioral"),
            AnalysisMode::Comparison => t!("modes.comparison"),
        }
        .to_string()
    }

    /// File-name stem for downloaded reports.
    pub fn export_stem(self) -> String {
        match self {
            AnalysisMode::Psychological => t!("export.psychological"),
            AnalysisMode::Behavioral => t!("export.behavioral"),
            AnalysisMode::Comparison => t!("export.comparison"),
        }
        .to_string()
    }
}

/// One completed analysis. Immutable after creation; only ever deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub primary_input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_input: Option<String>,
    pub mode: AnalysisMode,
    /// Raw oracle text, chart block included. Decoded again on replay.
    pub result_payload: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(
        primary_input: String,
        secondary_input: Option<String>,
        mode: AnalysisMode,
        result_payload: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            primary_input,
            secondary_input,
            mode,
            result_payload,
            created_at: Utc::now(),
        }
    }
}

/// Summary of one finished quiz session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionStat {
    pub taken_at: DateTime<Utc>,
    pub correct_count: u32,
    pub total_count: u32,
    pub average_duration_seconds: f64,
}

impl SessionStat {
    pub fn accuracy_percent(&self) -> u32 {
        percent(self.correct_count as u64, self.total_count as u64)
    }
}

/// Lifetime quiz counters plus the most recent session summaries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    #[serde(default)]
    pub total_correct: u64,
    #[serde(default)]
    pub total_questions: u64,
    #[serde(default)]
    pub total_time_ms: u64,
    #[serde(default)]
    pub missed_by_category: BTreeMap<String, u64>,
    #[serde(default)]
    pub session_history: Vec<SessionStat>,
}

impl AggregateStats {
    pub fn accuracy_percent(&self) -> u32 {
        percent(self.total_correct, self.total_questions)
    }

    pub fn average_time_seconds(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.total_time_ms as f64 / self.total_questions as f64 / 1000.0
    }
}

/// `round(100 * part / whole)`, or 0 for an empty whole.
pub fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}
