use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::oracle::prosody::{ProsodyModels, QuizLevel};

pub const SUPPORTED_LOCALES: &[&str] = &["ar", "en"];
const FALLBACK_KEY_ENV: &str = "API_KEY";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_oracle_base_url")]
    pub oracle_base_url: String,
    #[serde(default = "default_analysis_model")]
    pub analysis_model: String,
    #[serde(default = "default_prosody_model")]
    pub prosody_model: String,
    #[serde(default = "default_poem_model")]
    pub poem_model: String,
    #[serde(default = "default_oracle_timeout_secs")]
    pub oracle_timeout_secs: u64,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_quiz_level")]
    pub quiz_level: String,
}

fn default_locale() -> String {
    "ar".to_string()
}
fn default_theme() -> String {
    "desert-night".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_oracle_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_analysis_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_prosody_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_poem_model() -> String {
    "gemini-2.5-pro".to_string()
}
fn default_oracle_timeout_secs() -> u64 {
    120
}
fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("basira")
}
fn default_data_dir() -> String {
    app_data_dir().to_string_lossy().to_string()
}
fn default_download_dir() -> String {
    dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .to_string_lossy()
        .to_string()
}
fn default_log_dir() -> String {
    app_data_dir().join("logs").to_string_lossy().to_string()
}
fn default_quiz_level() -> String {
    QuizLevel::default().as_str().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            theme: default_theme(),
            api_key_env: default_api_key_env(),
            oracle_base_url: default_oracle_base_url(),
            analysis_model: default_analysis_model(),
            prosody_model: default_prosody_model(),
            poem_model: default_poem_model(),
            oracle_timeout_secs: default_oracle_timeout_secs(),
            data_dir: default_data_dir(),
            download_dir: default_download_dir(),
            log_dir: default_log_dir(),
            quiz_level: default_quiz_level(),
        }
    }
}

impl Config {
    /// Load from the config file, falling back to defaults, then validate.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// A missing file yields defaults; an unreadable or malformed one is an
    /// error naming the path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            Config::default()
        };
        config.validate();
        Ok(config)
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("basira")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Reset out-of-range values to their defaults.
    /// Call after deserialization; hand-edited files are not trusted.
    pub fn validate(&mut self) {
        if !SUPPORTED_LOCALES.contains(&self.locale.as_str()) {
            self.locale = default_locale();
        }
        if self.oracle_timeout_secs == 0 {
            self.oracle_timeout_secs = default_oracle_timeout_secs();
        }
        if QuizLevel::from_name(&self.quiz_level).is_none() {
            self.quiz_level = default_quiz_level();
        }
        if self.api_key_env.trim().is_empty() {
            self.api_key_env = default_api_key_env();
        }
        for (value, default) in [
            (&mut self.analysis_model, default_analysis_model as fn() -> String),
            (&mut self.prosody_model, default_prosody_model),
            (&mut self.poem_model, default_poem_model),
            (&mut self.oracle_base_url, default_oracle_base_url),
        ] {
            if value.trim().is_empty() {
                *value = default();
            }
        }
    }

    /// Oracle key from `api_key_env`, then `API_KEY`.
    pub fn api_key(&self) -> crate::error::Result<String> {
        [self.api_key_env.as_str(), FALLBACK_KEY_ENV]
            .iter()
            .filter_map(|name| env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or_else(|| {
                AppError::Config(format!(
                    "no API key found in ${} or ${FALLBACK_KEY_ENV}",
                    self.api_key_env
                ))
            })
    }

    pub fn quiz_level(&self) -> QuizLevel {
        QuizLevel::from_name(&self.quiz_level).unwrap_or_default()
    }

    pub fn prosody_models(&self) -> ProsodyModels {
        ProsodyModels {
            analysis: self.prosody_model.clone(),
            poem: self.poem_model.clone(),
        }
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn download_path(&self) -> PathBuf {
        PathBuf::from(&self.download_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(&self.log_dir)
    }
}
