use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Result};

use crate::types::Language;

/// Server configuration.
/// Values come from the process environment first, then `.env`, then defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub web_bind: String,
    pub web_port: u16,
    /// Holds `mizan.db`.
    pub data_dir: String,
    /// Shared HS256 secret used to verify bearer tokens.
    pub jwt_secret: String,
    /// Simulated processing time of the mock OCR provider.
    pub ocr_delay_ms: u64,
    pub default_language: Language,
    /// Insert the built-in law articles when the law table is empty.
    pub seed_laws: bool,
}

fn parse_dotenv(path: &Path) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(contents) = std::fs::read_to_string(path) else {
        return map;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            let v = v.trim().trim_matches('"');
            map.insert(k.trim().to_string(), v.to_string());
        }
    }
    map
}

fn get(key: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

fn get_str(key: &str, dotenv: &HashMap<String, String>, default: &str) -> String {
    get(key, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_bool(key: &str, dotenv: &HashMap<String, String>, default: bool) -> bool {
    match get(key, dotenv).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        Some(_) => default,
        None => default,
    }
}

fn get_u64(key: &str, dotenv: &HashMap<String, String>, default: u64) -> u64 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_u16(key: &str, dotenv: &HashMap<String, String>, default: u16) -> u16 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_sources(&parse_dotenv(Path::new(".env")))
    }

    /// Build from the environment plus an explicit dotenv map.
    pub fn from_sources(dotenv: &HashMap<String, String>) -> Result<Self> {
        let jwt_secret = get_str("JWT_SECRET", dotenv, "");
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must be set");
        }

        let language = get_str("DEFAULT_LANGUAGE", dotenv, "en");
        let default_language = Language::parse(&language).unwrap_or_else(|| {
            tracing::warn!("unknown DEFAULT_LANGUAGE {language:?}, using en");
            Language::En
        });

        Ok(Self {
            web_bind: get_str("WEB_BIND", dotenv, "0.0.0.0"),
            web_port: get_u16("WEB_PORT", dotenv, 3131),
            data_dir: get_str("DATA_DIR", dotenv, "store"),
            jwt_secret,
            ocr_delay_ms: get_u64("OCR_DELAY_MS", dotenv, 1500),
            default_language,
            seed_laws: get_bool("SEED_LAWS", dotenv, true),
        })
    }

    pub fn db_path(&self) -> String {
        format!("{}/mizan.db", self.data_dir)
    }
}
