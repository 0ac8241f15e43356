use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, warn};

use crate::store::schema::{AggregateStats, SessionStat, percent};
use crate::store::{KeyValueStore, STATS_KEY};

pub const MAX_SESSION_HISTORY: usize = 10;

/// Counters for the quiz session currently in progress.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionCounters {
    pub correct_count: u32,
    pub total_count: u32,
    pub total_time_ms: u64,
    pub missed_by_category: BTreeMap<String, u32>,
}

impl SessionCounters {
    pub fn accuracy_percent(&self) -> u32 {
        percent(self.correct_count as u64, self.total_count as u64)
    }

    pub fn average_time_seconds(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.total_time_ms as f64 / self.total_count as f64 / 1000.0
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

/// Accumulates graded outcomes in memory and folds them into the persisted
/// [`AggregateStats`] on [`flush`](StatsAggregator::flush).
pub struct StatsAggregator {
    storage: Box<dyn KeyValueStore>,
    session: SessionCounters,
    aggregate: AggregateStats,
}

impl StatsAggregator {
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let aggregate = match storage.read(STATS_KEY) {
            Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                warn!(error = %e, key = STATS_KEY, "stats blob unreadable, starting fresh");
                AggregateStats::default()
            }),
            Ok(None) => AggregateStats::default(),
            Err(e) => {
                warn!(error = %e, key = STATS_KEY, "stats storage unavailable");
                AggregateStats::default()
            }
        };
        Self {
            storage,
            session: SessionCounters::default(),
            aggregate,
        }
    }

    pub fn record_outcome(&mut self, category: &str, is_correct: bool, duration_ms: u64) {
        let s = &mut self.session;
        s.total_count += 1;
        s.total_time_ms += duration_ms;
        if is_correct {
            s.correct_count += 1;
        } else {
            *s.missed_by_category.entry(category.to_string()).or_insert(0) += 1;
        }
    }

    /// Merge the current session into the aggregate and persist it.
    ///
    /// Returns the appended [`SessionStat`], or `None` when the session is
    /// empty (nothing is written in that case). Session counters are left as
    /// they are; call [`reset_session`](Self::reset_session) afterwards.
    pub fn flush(&mut self) -> Option<SessionStat> {
        if self.session.is_empty() {
            return None;
        }
        let s = &self.session;

        let stat = SessionStat {
            taken_at: Utc::now(),
            correct_count: s.correct_count,
            total_count: s.total_count,
            average_duration_seconds: s.total_time_ms as f64 / s.total_count as f64 / 1000.0,
        };

        let agg = &mut self.aggregate;
        agg.total_correct += s.correct_count as u64;
        agg.total_questions += s.total_count as u64;
        agg.total_time_ms += s.total_time_ms;
        for (category, missed) in &s.missed_by_category {
            *agg.missed_by_category.entry(category.clone()).or_insert(0) += *missed as u64;
        }
        agg.session_history.push(stat.clone());
        if agg.session_history.len() > MAX_SESSION_HISTORY {
            let overflow = agg.session_history.len() - MAX_SESSION_HISTORY;
            agg.session_history.drain(..overflow);
        }

        debug!(
            correct = stat.correct_count,
            total = stat.total_count,
            "quiz session merged into aggregate"
        );
        self.persist();
        Some(stat)
    }

    pub fn reset_session(&mut self) {
        self.session = SessionCounters::default();
    }

    /// Drop all lifetime statistics and persist the empty aggregate.
    pub fn reset_all(&mut self) {
        self.session = SessionCounters::default();
        self.aggregate = AggregateStats::default();
        self.persist();
    }

    pub fn session(&self) -> &SessionCounters {
        &self.session
    }

    pub fn aggregate(&self) -> &AggregateStats {
        &self.aggregate
    }

    fn persist(&self) {
        match serde_json::to_string_pretty(&self.aggregate) {
            Ok(json) => {
                if let Err(e) = self.storage.write(STATS_KEY, &json) {
                    warn!(error = %e, "quiz stats not persisted");
                }
            }
            Err(e) => warn!(error = %e, "quiz stats serialization failed"),
        }
    }
}
