//! Application configuration. Telegram credentials, paths, grammar providers.
//!
//! Read from `TG_DICTATE_*` environment variables (and `.env`), plus an optional
//! file named by `TG_DICTATE_CONFIG`.

use crate::usecases::recipient_resolver::DEFAULT_FUZZY_THRESHOLD;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_SESSION_PATH: &str = "./data/tg-dictate.session";
pub const DEFAULT_CORRECTION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
    /// Login phone number. Prompted for when unset.
    pub phone: Option<String>,
    pub data_dir: Option<String>,
    pub session_path: Option<String>,
    /// Contacts JSON file. Defaults to `<data_dir>/contacts.json`.
    pub contacts_path: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Grammar correction
    // ─────────────────────────────────────────────────────────────────────────
    /// Groq (or any OpenAI-compatible) API key. Also read from GROQ_API_KEY.
    #[serde(default)]
    pub groq_api_key: Option<String>,

    /// Chat completions endpoint. Defaults to Groq.
    #[serde(default)]
    pub groq_api_url: Option<String>,

    #[serde(default)]
    pub groq_model: Option<String>,

    /// Gemini API key. Also read from GEMINI_API_KEY.
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    #[serde(default)]
    pub gemini_model: Option<String>,

    /// Per-request timeout for grammar providers (default 30).
    #[serde(default)]
    pub correction_timeout_secs: Option<u64>,

    /// Drop "tell Imran" / "hi Imran," from the corrected text.
    #[serde(default)]
    pub strip_addressing: Option<bool>,

    /// Minimum Jaro-Winkler score (0..1) for a misheard name to match a contact.
    #[serde(default)]
    pub fuzzy_threshold: Option<f64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Dictation / delivery
    // ─────────────────────────────────────────────────────────────────────────
    /// File or FIFO with transcript lines. Stdin when unset.
    #[serde(default)]
    pub transcript_path: Option<String>,

    /// Log messages instead of sending them; Telegram is not contacted.
    #[serde(default)]
    pub dry_run: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("TG_DICTATE").try_parsing(true));
        if let Ok(path) = std::env::var("TG_DICTATE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR))
    }

    pub fn session_path_or_default(&self) -> PathBuf {
        PathBuf::from(self.session_path.as_deref().unwrap_or(DEFAULT_SESSION_PATH))
    }

    pub fn contacts_path_or_default(&self) -> PathBuf {
        self.contacts_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.data_dir_or_default().join("contacts.json"))
    }

    pub fn api_hash_or_default(&self) -> String {
        self.api_hash.clone().unwrap_or_default()
    }

    /// Returns the Groq key from config or GROQ_API_KEY env. Blank keys count as unset.
    pub fn groq_api_key(&self) -> Option<String> {
        non_blank(
            self.groq_api_key
                .clone()
                .or_else(|| std::env::var("GROQ_API_KEY").ok()),
        )
    }

    /// Returns the Gemini key from config or GEMINI_API_KEY env. Blank keys count as unset.
    pub fn gemini_api_key(&self) -> Option<String> {
        non_blank(
            self.gemini_api_key
                .clone()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok()),
        )
    }

    pub fn correction_timeout(&self) -> Duration {
        Duration::from_secs(
            self.correction_timeout_secs
                .unwrap_or(DEFAULT_CORRECTION_TIMEOUT_SECS),
        )
    }

    pub fn strip_addressing_or_default(&self) -> bool {
        self.strip_addressing.unwrap_or(false)
    }

    /// Configured fuzzy threshold, clamped to `0.0..=1.0`.
    pub fn fuzzy_threshold_or_default(&self) -> f64 {
        self.fuzzy_threshold
            .filter(|t| t.is_finite())
            .map(|t| t.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_FUZZY_THRESHOLD)
    }

    pub fn dry_run_or_default(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
