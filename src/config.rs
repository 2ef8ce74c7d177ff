//! TOML configuration for the `ragc` client.
//!
//! ```toml
//! [server]
//! base_url = "http://127.0.0.1:8000"
//! timeout_secs = 30
//!
//! [session]
//! state_path = "./data/ragc-state.json"
//!
//! [ingest]
//! max_pages = 50
//! max_depth = 2
//!
//! [answer]
//! top_k = 6
//!
//! [log]
//! level = "warn"
//! ```
//!
//! Only `[server].base_url` is required. Everything else has a default.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub base_url: String,
    /// No client-side timeout when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("./data/ragc-state.json")
}

/// Optional crawl limits forwarded with every `/ingest` request.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct IngestConfig {
    #[serde(default)]
    pub max_pages: Option<u32>,
    #[serde(default)]
    pub max_depth: Option<u32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AnswerConfig {
    #[serde(default)]
    pub top_k: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

impl Config {
    /// Config used when no file exists and the base URL comes from the command line.
    pub fn minimal() -> Self {
        Self {
            server: ServerConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: None,
            },
            session: SessionConfig::default(),
            ingest: IngestConfig::default(),
            answer: AnswerConfig::default(),
            log: LogConfig::default(),
        }
    }

    /// Checks the invariants that `serde` cannot express.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.server.base_url)
            .with_context(|| format!("server.base_url is not a URL: {}", self.server.base_url))?;
        match url.scheme() {
            "http" | "https" => {}
            other => bail!(
                "server.base_url must use http or https, got '{}'",
                other
            ),
        }

        if self.server.timeout_secs == Some(0) {
            bail!("server.timeout_secs must be > 0");
        }
        if self.ingest.max_pages == Some(0) {
            bail!("ingest.max_pages must be > 0");
        }
        if self.ingest.max_depth == Some(0) {
            bail!("ingest.max_depth must be > 0");
        }
        if self.answer.top_k == Some(0) {
            bail!("answer.top_k must be > 0");
        }

        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_file_uses_defaults() {
        let cfg = parse_config("[server]\nbase_url = \"http://localhost:8000\"\n").unwrap();
        assert_eq!(cfg.server.base_url, "http://localhost:8000");
        assert_eq!(cfg.server.timeout_secs, None);
        assert_eq!(cfg.session.state_path, PathBuf::from("./data/ragc-state.json"));
        assert_eq!(cfg.ingest.max_pages, None);
        assert_eq!(cfg.answer.top_k, None);
        assert_eq!(cfg.log.level, "warn");
    }

    #[test]
    fn test_full_file() {
        let cfg = parse_config(
            r#"[server]
base_url = "https://rag.example.com"
timeout_secs = 10

[session]
state_path = "/tmp/state.json"

[ingest]
max_pages = 20
max_depth = 1

[answer]
top_k = 4

[log]
level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(cfg.server.timeout_secs, Some(10));
        assert_eq!(cfg.session.state_path, PathBuf::from("/tmp/state.json"));
        assert_eq!(cfg.ingest.max_pages, Some(20));
        assert_eq!(cfg.ingest.max_depth, Some(1));
        assert_eq!(cfg.answer.top_k, Some(4));
        assert_eq!(cfg.log.level, "debug");
    }

    #[test]
    fn test_missing_server_section_rejected() {
        assert!(parse_config("[log]\nlevel = \"info\"\n").is_err());
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let err = parse_config("[server]\nbase_url = \"ftp://example.com\"\n").unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let base = "[server]\nbase_url = \"http://localhost\"\n";
        assert!(parse_config(&format!("{}[answer]\ntop_k = 0\n", base)).is_err());
        assert!(parse_config(&format!("{}[ingest]\nmax_pages = 0\n", base)).is_err());
        assert!(parse_config(&format!("{}[ingest]\nmax_depth = 0\n", base)).is_err());
    }

    #[test]
    fn test_minimal_is_valid() {
        Config::minimal().validate().unwrap();
    }
}
