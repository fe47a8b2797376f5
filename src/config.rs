//! TOML configuration.
//!
//! ```toml
//! [data]
//! path = "public/khwater"
//!
//! [search]
//! content_weight = 1.0
//! title_weight = 2.0
//! ayah_weight = 1.5
//!
//! [server]
//! bind = "127.0.0.1:7340"
//! ```
//!
//! Only `[data]` is required.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use khwater_core::search::ScoreWeights;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// A split-layout directory or a single corpus JSON file.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_content_weight")]
    pub content_weight: f64,
    #[serde(default = "default_title_weight")]
    pub title_weight: f64,
    #[serde(default = "default_ayah_weight")]
    pub ayah_weight: f64,
}

fn default_content_weight() -> f64 {
    1.0
}
fn default_title_weight() -> f64 {
    2.0
}
fn default_ayah_weight() -> f64 {
    1.5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            content_weight: default_content_weight(),
            title_weight: default_title_weight(),
            ayah_weight: default_ayah_weight(),
        }
    }
}

impl SearchConfig {
    pub fn weights(&self) -> ScoreWeights {
        ScoreWeights {
            content: self.content_weight,
            title: self.title_weight,
            ayah: self.ayah_weight,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Config {
    /// Default settings reading corpus data from `path`.
    pub fn minimal(path: impl Into<PathBuf>) -> Self {
        Self {
            data: DataConfig { path: path.into() },
            search: SearchConfig::default(),
            server: ServerConfig::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.data.path.as_os_str().is_empty() {
            anyhow::bail!("data.path must not be empty");
        }

        let weights = [
            ("search.content_weight", self.search.content_weight),
            ("search.title_weight", self.search.title_weight),
            ("search.ayah_weight", self.search.ayah_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{} must be a finite number >= 0 (got {})", name, value);
            }
        }
        // Every match must score above zero or it would be dropped.
        if self.search.content_weight <= 0.0 {
            anyhow::bail!("search.content_weight must be > 0");
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
