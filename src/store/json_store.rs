use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::store::KeyValueStore;

/// One pretty-printed JSON file per storage key under `base_dir`.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.file_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| AppError::Storage(format!("read {}: {e}", path.display())))
    }

    /// Write via a temp file and rename, so a crash mid-write never leaves a
    /// truncated blob behind.
    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.file_path(key);
        let tmp_path = path.with_extension("json.tmp");

        let staged = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, &path)
        })();

        staged.map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            AppError::Storage(format!("write {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_key_reads_as_none() {
        let (_dir, store) = make_test_store();
        assert!(store.read("analysis_history").unwrap().is_none());
    }

    #[test]
    fn write_then_read() {
        let (_dir, store) = make_test_store();
        store.write("analysis_history", "[]").unwrap();
        assert_eq!(store.read("analysis_history").unwrap().as_deref(), Some("[]"));
        assert!(store.file_path("analysis_history").exists());
    }

    #[test]
    fn write_leaves_no_tmp_files() {
        let (dir, store) = make_test_store();
        store.write("arudi_assessment_stats", "{}").unwrap();
        store.write("arudi_assessment_stats", "{\"total_correct\":1}").unwrap();

        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn write_into_missing_dir_is_storage_error() {
        let (dir, _store) = make_test_store();
        let bad_store = JsonStore {
            base_dir: dir.path().join("nonexistent_subdir"),
        };
        let err = bad_store.write("analysis_history", "[]").unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(err.to_string().contains("analysis_history.json"));
    }
}
