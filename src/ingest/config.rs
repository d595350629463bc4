// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "NEWS_CONFIG_PATH";

const DEFAULT_INTERVAL_SECS: u64 = 600;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Ingest configuration: scheduler period, fetch timeout, and the static
/// subject → feed URLs map. Built once at startup and passed by reference —
/// no process-scoped global.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub subjects: BTreeMap<String, Vec<String>>,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            subjects: BTreeMap::new(),
        }
    }
}

/// Load configuration from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<IngestConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading ingest config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
}

/// Load configuration using env var + fallbacks:
/// 1) $NEWS_CONFIG_PATH
/// 2) config/subjects.toml
/// 3) config/subjects.json
/// Falls back to defaults (empty subject map) when none exist.
pub fn load_config_default() -> Result<IngestConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        } else {
            return Err(anyhow!("NEWS_CONFIG_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/subjects.toml");
    if toml_p.exists() {
        return load_config_from(&toml_p);
    }
    let json_p = PathBuf::from("config/subjects.json");
    if json_p.exists() {
        return load_config_from(&json_p);
    }
    Ok(IngestConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<IngestConfig> {
    let try_toml = hint_ext == "toml" || s.contains("subjects");
    if try_toml {
        if let Ok(v) = toml::from_str::<IngestConfig>(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = serde_json::from_str::<IngestConfig>(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = toml::from_str::<IngestConfig>(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported ingest config format"))
}
