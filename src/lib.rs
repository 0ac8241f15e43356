//! Shared library for the `basira` analyzer TUI and the `arudi` prosody CLI.

rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod export;
pub mod logging;
pub mod meters;
pub mod oracle;
pub mod orchestrator;
pub mod prompt;
pub mod report;
pub mod store;
pub mod text;
pub mod ui;
pub mod view;
