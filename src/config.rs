use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants;
use crate::error::{DailyError, Result};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Input and output locations. Every field defaults to the fixed layout
/// under `raw/`, so a missing config file is not an error.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_path: PathBuf,
    pub fips_path: PathBuf,
    pub sources: SourcePaths,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcePaths {
    pub san_francisco: PathBuf,
    pub santa_clara: PathBuf,
    pub texas: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(constants::OUTPUT_PATH),
            fips_path: PathBuf::from(constants::FIPS_PATH),
            sources: SourcePaths::default(),
        }
    }
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            san_francisco: PathBuf::from(constants::SAN_FRANCISCO_PATH),
            santa_clara: PathBuf::from(constants::SANTA_CLARA_PATH),
            texas: PathBuf::from(constants::TEXAS_PATH),
        }
    }
}

impl Config {
    /// Loads `path` if given, else `config.toml` when present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default_path.exists() {
                    debug!("No {} found, using default paths", DEFAULT_CONFIG_PATH);
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            DailyError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Input path for a source name
    pub fn source_path(&self, source_name: &str) -> Option<&Path> {
        match source_name {
            constants::SAN_FRANCISCO_SOURCE => Some(self.sources.san_francisco.as_path()),
            constants::SANTA_CLARA_SOURCE => Some(self.sources.santa_clara.as_path()),
            constants::TEXAS_SOURCE => Some(self.sources.texas.as_path()),
            _ => None,
        }
    }
}
