use crate::error::{MingleError, MingleResult};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path to the tagged-photo CSV (`class,filename,timestamp,xmin,ymin,xmax,ymax`).
    pub records_path: Option<PathBuf>,
    /// Path to the manito CSV (`from,to,description`).
    pub manito_path: Option<PathBuf>,
    /// Default number of people shown in the race chart.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            records_path: None,
            manito_path: None,
            top_n: default_top_n(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// RNG seed for the spring layout. Same seed, same positions.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Number of force-directed iterations.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            iterations: default_iterations(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_top_n() -> usize {
    3
}

fn default_seed() -> u64 {
    42
}

fn default_iterations() -> usize {
    150
}

pub fn load_config(path: Option<&Path>) -> MingleResult<AppConfig> {
    let mut builder = Config::builder()
        .add_source(File::with_name("mingle").required(false))
        .add_source(Environment::with_prefix("MINGLE").separator("__"));

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .build()
        .map_err(|err| MingleError::ConfigError(err.to_string()))?;

    let parsed: AppConfig = config
        .try_deserialize()
        .map_err(|err| MingleError::ConfigError(err.to_string()))?;

    if parsed.layout.iterations == 0 {
        return Err(MingleError::ConfigError(
            "layout.iterations must be at least 1".to_string(),
        ));
    }

    Ok(parsed)
}
