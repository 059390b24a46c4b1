use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::clients::osascript::DEFAULT_OSASCRIPT;
use crate::infra::runtime::limits::MAX_CONCURRENT_LIMIT;
use crate::tools::contacts::QueryPolicy;

pub const CONFIG_PATH_VAR: &str = "IMESSAGE_MCP_CONFIG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: String, // "stdio" or "server"
    pub port: u16,
    pub osascript: String,
    pub script_timeout: Duration,
    pub max_concurrent_scripts: usize,
    pub query_policy: QueryPolicy,
}

/// Optional TOML overlay; every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub mode: Option<String>,
    pub port: Option<u16>,
    pub osascript: Option<String>,
    pub script_timeout_secs: Option<u64>,
    pub max_concurrent_scripts: Option<usize>,
    pub query_policy: Option<QueryPolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: "stdio".into(),
            port: 8080,
            osascript: DEFAULT_OSASCRIPT.into(),
            script_timeout: Duration::from_secs(30),
            max_concurrent_scripts: 4,
            query_policy: QueryPolicy::Strict,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

impl Config {
    /// Defaults, then the file named by `IMESSAGE_MCP_CONFIG` (if any), then
    /// environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            if !path.trim().is_empty() {
                cfg.apply_file(&FileConfig::from_path(Path::new(&path))?);
            }
        }
        cfg.apply_env();
        Ok(cfg)
    }

    /// Defaults plus environment only. Malformed values fall back to defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    pub fn apply_file(&mut self, file: &FileConfig) {
        if let Some(mode) = &file.mode {
            self.mode = mode.clone();
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(bin) = &file.osascript {
            self.osascript = bin.clone();
        }
        if let Some(secs) = file.script_timeout_secs {
            self.script_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = file.max_concurrent_scripts {
            self.max_concurrent_scripts = n;
        }
        if let Some(policy) = file.query_policy {
            self.query_policy = policy;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(mode) = std::env::var("MODE") {
            self.mode = mode;
        }
        if let Some(port) = env_parse::<u16>("PORT") {
            self.port = port;
        }
        if let Ok(bin) = std::env::var("OSASCRIPT_BIN") {
            if !bin.trim().is_empty() {
                self.osascript = bin;
            }
        }
        if let Some(secs) = env_parse::<u64>("SCRIPT_TIMEOUT_SECS") {
            self.script_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = env_parse::<usize>("MAX_CONCURRENT_SCRIPTS") {
            self.max_concurrent_scripts = n;
        }
        if let Some(policy) = env_parse::<QueryPolicy>("SEARCH_QUERY_POLICY") {
            self.query_policy = policy;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !matches!(self.mode.as_str(), "server" | "stdio") {
            return Err(format!("Invalid MODE: {}. Must be 'server' or 'stdio'", self.mode));
        }
        if self.mode == "server" && self.port == 0 {
            return Err("PORT cannot be 0".into());
        }
        if self.script_timeout.is_zero() {
            return Err("SCRIPT_TIMEOUT_SECS must be at least 1".into());
        }
        if self.max_concurrent_scripts == 0 {
            return Err("MAX_CONCURRENT_SCRIPTS must be at least 1".into());
        }
        if self.max_concurrent_scripts > MAX_CONCURRENT_LIMIT {
            return Err(format!(
                "MAX_CONCURRENT_SCRIPTS cannot exceed {MAX_CONCURRENT_LIMIT}"
            ));
        }
        if self.osascript.trim().is_empty() {
            return Err("OSASCRIPT_BIN cannot be empty".into());
        }
        Ok(())
    }
}

impl FileConfig {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        Self::from_toml(&raw).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
