//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILBRIEF_CONFIG` (environment variable)
//! 2. `~/.config/mailbrief/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailbrief\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Batch input/output and pacing.
    pub batch: BatchConfig,
    /// Summarization backend.
    pub summarizer: SummarizerConfig,
    /// Text recognition for image attachments.
    pub ocr: OcrConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Batch input/output and pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory scanned for `*.eml` files.
    pub input_dir: PathBuf,
    /// Directory receiving one `<id>.json` per processed email.
    pub output_dir: PathBuf,
    /// Minimum time between the starts of two consecutive messages.
    pub min_interval_ms: u64,
}

/// Summarization backend (any OpenAI-compatible chat-completions API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// API base URL, without the trailing `/chat/completions`.
    pub api_base: String,
    /// Model name sent with every request.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// HTTP request timeout.
    pub timeout_secs: u64,
    /// Minimum time between two calls on the same client.
    pub min_call_interval_ms: u64,
    /// Body characters included in the prompt.
    pub body_char_limit: usize,
}

/// Text recognition for image attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// When false, images are decoded and described but not recognized.
    pub enabled: bool,
    /// Tesseract executable (name on `$PATH` or absolute path).
    pub tesseract_cmd: PathBuf,
    /// Tesseract languages, e.g. `"eng"` or `"eng+fra"`.
    pub languages: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("emails"),
            output_dir: PathBuf::from("output"),
            min_interval_ms: 1000,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.3,
            max_tokens: 200,
            timeout_secs: 60,
            min_call_interval_ms: 1000,
            body_char_limit: 2000,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tesseract_cmd: PathBuf::from("tesseract"),
            languages: "eng".to_string(),
        }
    }
}

impl BatchConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl SummarizerConfig {
    pub fn min_call_interval(&self) -> Duration {
        Duration::from_millis(self.min_call_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Where the active configuration came from.
///
/// Returned by [`load_config`] so the outcome can be logged once the
/// subscriber is installed.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// No config file exists; built-in defaults apply.
    Defaults,
    Loaded(PathBuf),
    /// The file exists but could not be read or parsed; defaults apply.
    Invalid { path: PathBuf, error: String },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            Self::Defaults => tracing::debug!("No config file, using defaults"),
            Self::Loaded(path) => tracing::info!(path = %path.display(), "Loaded config"),
            Self::Invalid { path, error } => tracing::warn!(
                path = %path.display(),
                error = %error,
                "Invalid config file, using defaults"
            ),
        }
    }
}

/// Load configuration, searching standard locations.
///
/// Falls back to the defaults if no file is found or on a read or parse
/// error; the returned [`ConfigSource`] says which happened.
pub fn load_config() -> (Config, ConfigSource) {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => (Config::default(), ConfigSource::Defaults),
    }
}

/// Load configuration from an explicit file.
pub fn load_config_from(path: &Path) -> (Config, ConfigSource) {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|contents| toml::from_str::<Config>(&contents).map_err(|e| e.to_string()));

    match parsed {
        Ok(cfg) => (cfg, ConfigSource::Loaded(path.to_path_buf())),
        Err(error) => (
            Config::default(),
            ConfigSource::Invalid {
                path: path.to_path_buf(),
                error,
            },
        ),
    }
}

/// Save configuration to the standard location and return the path written.
pub fn save_config(config: &Config) -> anyhow::Result<PathBuf> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(path)
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILBRIEF_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mailbrief").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailbrief")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join(LOG_FILE_NAME)
}

/// File name of the append-only log inside the cache directory.
pub const LOG_FILE_NAME: &str = "mailbrief.log";
