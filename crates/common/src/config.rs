//! Bot configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default file name of the company cache inside the data directory.
pub const COMPANY_CACHE_FILE: &str = "company_esg_data.json";

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Directory holding the company cache and table snapshots.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File name of the company cache inside `data_dir`.
    #[serde(default = "default_cache_file_name")]
    pub cache_file_name: String,

    /// Suppliers scoring strictly below this are reported as low-score.
    #[serde(default = "default_supplier_threshold")]
    pub supplier_threshold: i64,

    /// Countries compared when the user names fewer than two.
    #[serde(default = "default_countries")]
    pub default_countries: Vec<String>,
}

impl BotConfig {
    /// Full path of the company cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(&self.cache_file_name)
    }
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("data").join("esg_data")
}
fn default_cache_file_name() -> String {
    COMPANY_CACHE_FILE.into()
}
fn default_supplier_threshold() -> i64 {
    50
}
fn default_countries() -> Vec<String> {
    vec!["france".into(), "allemagne".into()]
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_file_name: default_cache_file_name(),
            supplier_threshold: default_supplier_threshold(),
            default_countries: default_countries(),
        }
    }
}
