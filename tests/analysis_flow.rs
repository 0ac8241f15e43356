mod common;

use std::fs;

use basira::error::AppError;
use basira::orchestrator::{AnalysisRequest, Orchestrator, PromptSettings};
use basira::store::history::{HistoryStore, MAX_HISTORY};
use basira::store::json_store::JsonStore;
use basira::store::schema::AnalysisMode;
use basira::view::ViewState;
use tempfile::TempDir;

use common::ScriptedOracle;

fn settings() -> PromptSettings {
    PromptSettings {
        model: "test-model".into(),
        language: "English".into(),
    }
}

fn open(dir: &TempDir) -> Orchestrator {
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    Orchestrator::new(HistoryStore::load(Box::new(store)), settings())
}

#[test]
fn history_survives_restart() {
    let dir = TempDir::new().unwrap();
    let raw = "Narrative\n[CHART_DATA]{\"Openness\": 70}[/CHART_DATA]";
    {
        let mut orch = open(&dir);
        let oracle = ScriptedOracle::ok(&[raw]);
        let req = AnalysisRequest::new(AnalysisMode::Behavioral, "https://fb.com/x", "", "");
        orch.submit(&oracle, req).unwrap();
    }

    let path = dir.path().join("analysis_history.json");
    assert!(path.exists());
    assert!(!dir.path().join("analysis_history.json.tmp").exists());

    let mut orch = open(&dir);
    assert_eq!(orch.history().len(), 1);
    let record = orch.history().list()[0].clone();
    assert_eq!(record.mode, AnalysisMode::Behavioral);
    assert_eq!(record.result_payload, raw);

    orch.select_history(&record.id).unwrap();
    let report = orch.view().report().unwrap();
    assert_eq!(report.narrative, "Narrative\n");
    assert_eq!(report.chart.as_ref().unwrap().points[0].label, "Openness");
}

#[test]
fn history_is_capped_across_restarts() {
    let dir = TempDir::new().unwrap();
    let replies: Vec<String> = (0..MAX_HISTORY + 3).map(|i| format!("report {i}")).collect();
    let reply_refs: Vec<&str> = replies.iter().map(String::as_str).collect();
    let oracle = ScriptedOracle::ok(&reply_refs);

    let mut orch = open(&dir);
    for i in 0..MAX_HISTORY + 3 {
        let req = AnalysisRequest::new(AnalysisMode::Psychological, &format!("u{i}"), "", "");
        orch.submit(&oracle, req).unwrap();
        orch.reset().unwrap();
    }

    let orch = open(&dir);
    assert_eq!(orch.history().len(), MAX_HISTORY);
    assert_eq!(orch.history().list()[0].primary_input, format!("u{}", MAX_HISTORY + 2));
    assert_eq!(orch.history().list()[MAX_HISTORY - 1].primary_input, "u3");
}

#[test]
fn corrupt_history_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("analysis_history.json"), "{ not json").unwrap();
    let orch = open(&dir);
    assert!(orch.history().is_empty());
    assert_eq!(orch.view(), &ViewState::Idle);
}

#[test]
fn comparison_needs_both_subjects() {
    let dir = TempDir::new().unwrap();
    let mut orch = open(&dir);
    let oracle = ScriptedOracle::ok(&["unused"]);
    let req = AnalysisRequest::new(AnalysisMode::Comparison, "https://fb.com/a", "", "");
    assert!(matches!(orch.submit(&oracle, req), Err(AppError::Validation(_))));
    assert_eq!(orch.view(), &ViewState::Idle);
    assert_eq!(oracle.call_count(), 0);
}

#[test]
fn oracle_failure_then_retry_succeeds() {
    let dir = TempDir::new().unwrap();
    let mut orch = open(&dir);
    let oracle = ScriptedOracle::new(vec![
        Err(AppError::OracleTransport("429 rate limited".into())),
        Ok("Both profiles are reserved.".into()),
    ]);
    let req = || AnalysisRequest::new(AnalysisMode::Comparison, "a", "b", "siblings");

    orch.submit(&oracle, req()).unwrap();
    assert!(!orch.view().error().unwrap().is_empty());
    assert!(orch.export_text().is_none());
    assert!(orch.history().is_empty());

    orch.submit(&oracle, req()).unwrap();
    assert_eq!(orch.export_text(), Some("Both profiles are reserved."));
    assert_eq!(orch.history().len(), 1);

    let calls = oracle.calls.lock().unwrap();
    assert!(calls[1].prompt.contains("siblings"));
    assert_eq!(calls[0], calls[1]);
}
