//! TOML configuration.
//!
//! Every section is optional; a file containing only `[retrieval]` is valid
//! and inherits defaults for the rest.
//!
//! ```toml
//! [session]
//! default_collection = "default"
//!
//! [uploads]
//! dir = "data/uploads"
//! per_collection = true
//!
//! [chunking]
//! max_tokens = 700
//!
//! [retrieval]
//! top_k = 4
//! min_score = 0.0
//!
//! [logging]
//! default = "warn"
//!
//! [logging.modules]
//! docqa_core = "info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Path used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/docqa.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_collection")]
    pub default_collection: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_collection: default_collection(),
        }
    }
}

fn default_collection() -> String {
    "default".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadsConfig {
    #[serde(default = "default_uploads_dir")]
    pub dir: PathBuf,
    /// Write uploads to `<dir>/<collection>/` rather than `<dir>/`.
    #[serde(default = "default_true")]
    pub per_collection: bool,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
            per_collection: true,
        }
    }
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("data/uploads")
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_max_tokens() -> usize {
    700
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub min_score: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_score: 0.0,
        }
    }
}

fn default_top_k() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,
    /// Per-target overrides, e.g. `docqa_core = "debug"`.
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: BTreeMap::new(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl LoggingConfig {
    /// The `EnvFilter` directive string for this section.
    pub fn directives(&self) -> String {
        let mut parts = vec![self.default.clone()];
        for (module, level) in &self.modules {
            parts.push(format!("{}={}", module, level));
        }
        parts.join(",")
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path`, or defaults when `path` is the default location and no file
/// exists there. An explicitly given path must exist.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => load_config(p),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                load_config(default)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.session.default_collection.trim().is_empty() {
        anyhow::bail!("session.default_collection must not be blank");
    }

    if config.chunking.max_tokens == 0 {
        anyhow::bail!("chunking.max_tokens must be > 0");
    }

    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    if !(0.0..=1.0).contains(&config.retrieval.min_score) {
        anyhow::bail!("retrieval.min_score must be in [0.0, 1.0]");
    }

    Ok(())
}
