//! Configuration loader: merges env vars, .env file, and config.toml.

use std::path::{Path, PathBuf};

use common::config::BotConfig;
use common::Error;

fn parse_threshold(raw: &str, env_name: &str) -> Result<i64, Error> {
    let parsed = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer in [0,100]")))?;
    if !(0..=100).contains(&parsed) {
        return Err(Error::Config(format!(
            "{env_name} must be an integer in [0,100]"
        )));
    }
    Ok(parsed)
}

fn parse_countries(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}

fn validate_config(config: &BotConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.data_dir.as_os_str().is_empty() {
        issues.push("data_dir must not be empty".into());
    }
    if config.cache_file_name.trim().is_empty() {
        issues.push("cache_file_name must not be empty".into());
    }
    if !(0..=100).contains(&config.supplier_threshold) {
        issues.push("supplier_threshold must be in [0,100]".into());
    }
    if config.default_countries.len() != 2 {
        issues.push("default_countries must contain exactly two countries".into());
    }
    if config.default_countries.iter().any(|c| c.trim().is_empty()) {
        issues.push("default_countries must not contain blank names".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load bot configuration from environment and optional config file.
pub fn load_config() -> Result<BotConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults, or config.toml if it exists.
    let mut config = read_config_file(Path::new("config.toml"))?;

    // 3. Override with environment variables (highest priority).
    if let Ok(dir) = std::env::var("ESG_DATA_DIR") {
        if !dir.trim().is_empty() {
            config.data_dir = PathBuf::from(dir.trim());
        }
    }
    if let Ok(name) = std::env::var("ESG_CACHE_FILE") {
        if !name.trim().is_empty() {
            config.cache_file_name = name.trim().to_string();
        }
    }
    if let Ok(raw) = std::env::var("ESG_SUPPLIER_THRESHOLD") {
        config.supplier_threshold = parse_threshold(&raw, "ESG_SUPPLIER_THRESHOLD")?;
    }
    if let Ok(raw) = std::env::var("ESG_DEFAULT_COUNTRIES") {
        config.default_countries = parse_countries(&raw);
    }

    // 4. Validate.
    validate_config(&config)?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<BotConfig, Error> {
    if !path.exists() {
        return Ok(BotConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}
