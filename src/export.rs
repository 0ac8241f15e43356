//! Saving and copying a shown report.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::error::{AppError, Result};
use crate::store::schema::AnalysisMode;

/// `{stem}_{YYYY-MM-DD}.txt`, stem localized per mode.
pub fn export_file_name(mode: AnalysisMode, date: NaiveDate) -> String {
    format!("{}_{}.txt", mode.export_stem(), date.format("%Y-%m-%d"))
}

/// Write `text` into `dir`, creating it if needed. A same-day download of
/// the same mode overwrites the earlier file.
pub fn download(dir: &Path, mode: AnalysisMode, text: &str, date: NaiveDate) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(mode, date));
    fs::write(&path, text.as_bytes())?;
    info!(path = %path.display(), "report downloaded");
    Ok(path)
}

pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| AppError::Clipboard(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn file_name_uses_iso_date() {
        rust_i18n::set_locale("en");
        assert_eq!(
            export_file_name(AnalysisMode::Comparison, date()),
            "comparison_report_2026-03-09.txt"
        );
    }

    #[test]
    fn download_writes_utf8_text() {
        rust_i18n::set_locale("en");
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested");
        let text = "تقرير نفسي\nsecond line";
        let path = download(&target, AnalysisMode::Psychological, text, date()).unwrap();

        assert_eq!(path.file_name().unwrap(), "psychological_report_2026-03-09.txt");
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }
}
