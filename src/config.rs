use std::path::PathBuf;

use serde::Serialize;

/// Application-level constants
pub const APP_NAME: &str = "Generic Saver";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;

/// Directory name under the user's home directory.
const DATA_DIR_NAME: &str = "GenericSaver";

/// Application data directory: `~/GenericSaver/`, or `./GenericSaver/` when
/// the home directory cannot be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

/// Default location of the catalogue and clinical reference database.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("generic_saver.db")
}

/// Tracing filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,generic_saver_lib=debug"
}

/// Runtime settings, defaults overridable through `GENERIC_SAVER_*` variables.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub ollama_url: String,
    pub model: String,
    pub llm_timeout_secs: u64,
    /// Minimum stock for a catalogue entry to be offered as an alternative.
    pub min_stock: i64,
    pub alternatives_limit: usize,
    pub fuzzy_min_score: u8,
    /// Fuzzy score needed before an extracted name is replaced.
    pub fuzzy_accept_score: u8,
    /// Price assumed for medicines with no catalogue data.
    pub default_price: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            min_stock: 10,
            alternatives_limit: 3,
            fuzzy_min_score: 60,
            fuzzy_accept_score: 85,
            default_price: 25.0,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(path) = value("GENERIC_SAVER_DB") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(url) = value("GENERIC_SAVER_OLLAMA_URL") {
            config.ollama_url = url;
        }
        if let Some(model) = value("GENERIC_SAVER_MODEL") {
            config.model = model;
        }
        if let Some(raw) = value("GENERIC_SAVER_LLM_TIMEOUT") {
            match raw.parse() {
                Ok(secs) => config.llm_timeout_secs = secs,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid GENERIC_SAVER_LLM_TIMEOUT"),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn app_data_dir_named_after_app() {
        assert!(app_data_dir().ends_with("GenericSaver"));
        assert!(default_database_path().starts_with(app_data_dir()));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.min_stock, 10);
        assert_eq!(config.alternatives_limit, 3);
        assert_eq!(config.fuzzy_min_score, 60);
        assert_eq!(config.fuzzy_accept_score, 85);
        assert_eq!(config.default_price, 25.0);
        assert_eq!(config.ollama_url, DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("GENERIC_SAVER_DB", "/tmp/catalog.db"),
            ("GENERIC_SAVER_OLLAMA_URL", "http://gpu-box:11434"),
            ("GENERIC_SAVER_MODEL", "medllama2"),
            ("GENERIC_SAVER_LLM_TIMEOUT", "45"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.database_path, PathBuf::from("/tmp/catalog.db"));
        assert_eq!(config.ollama_url, "http://gpu-box:11434");
        assert_eq!(config.model, "medllama2");
        assert_eq!(config.llm_timeout_secs, 45);
    }

    #[test]
    fn invalid_or_blank_values_keep_defaults() {
        let config = AppConfig::from_lookup(|k| match k {
            "GENERIC_SAVER_LLM_TIMEOUT" => Some("soon".into()),
            "GENERIC_SAVER_MODEL" => Some("   ".into()),
            _ => None,
        });
        assert_eq!(config.llm_timeout_secs, DEFAULT_LLM_TIMEOUT_SECS);
        assert_eq!(config.model, DEFAULT_MODEL);
    }
}
