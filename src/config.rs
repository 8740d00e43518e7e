//! Service configuration.
//!
//! Loaded from a TOML file (default `argo_ingest.toml`). Every section is
//! optional and falls back to the defaults below. The database connection
//! string may instead come from `DATABASE_URL`, read through `.env` in
//! development.

use serde::Deserialize;
use std::path::Path;

use crate::geolocation::{
    CoordinateNormalizer, FillSentinelSet, DEFAULT_LATITUDE_FILLS, DEFAULT_LONGITUDE_FILLS,
};
use crate::logging::LogLevel;
use crate::model::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "./argo_ingest.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub basin_grid: BasinGridConfig,
    pub normalizer: NormalizerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BasinGridConfig {
    /// CSV export of the basin mask (`longitude,latitude,basin_tag`).
    pub path: String,
}

impl Default for BasinGridConfig {
    fn default() -> Self {
        Self { path: "data/basinmask_01.csv".to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub longitude_fills: Vec<f64>,
    pub latitude_fills: Vec<f64>,
    /// Drop position and basin advisories instead of logging them.
    pub suppress_warnings: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            longitude_fills: DEFAULT_LONGITUDE_FILLS.to_vec(),
            latitude_fills: DEFAULT_LATITUDE_FILLS.to_vec(),
            suppress_warnings: true,
        }
    }
}

impl NormalizerConfig {
    pub fn build(&self) -> CoordinateNormalizer {
        CoordinateNormalizer::new(
            FillSentinelSet::new(&self.longitude_fills),
            FillSentinelSet::new(&self.latitude_fills),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), file: None, timestamps: true }
    }
}

impl LoggingConfig {
    /// Configured level; unknown strings fall back to Info.
    pub fn min_level(&self) -> LogLevel {
        self.level.parse().unwrap_or(LogLevel::Info)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

impl ServiceConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Connection string from the config file, else `DATABASE_URL`.
    pub fn database_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = self.database.url.as_ref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.clone());
        }
        dotenv::dotenv().ok();
        std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
    }
}
