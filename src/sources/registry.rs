use tracing::info;

use crate::config::Config;
use crate::constants::{self, SANTA_CLARA_SOURCE, SAN_FRANCISCO_SOURCE, TEXAS_SOURCE};
use crate::error::{DailyError, Result};
use crate::region::RegionCodeTable;
use crate::sources::{SanFranciscoSource, SantaClaraSource, TexasSource};
use crate::types::TestingSource;

/// Opens the configured sources in output order.
///
/// Output order is fixed (San Francisco, Santa Clara, Texas) regardless of
/// the order names are requested in.
pub struct SourceRegistry {
    selected: Vec<&'static str>,
}

impl SourceRegistry {
    /// Registry with every supported source
    pub fn new() -> Self {
        Self {
            selected: constants::get_supported_sources(),
        }
    }

    /// Registry limited to `names`. Unknown names are a configuration error.
    pub fn with_sources<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let supported = constants::get_supported_sources();
        for name in names {
            if !supported.contains(&name.as_ref()) {
                return Err(DailyError::Config(format!(
                    "Unknown source '{}'. Available: {}",
                    name.as_ref(),
                    supported.join(", ")
                )));
            }
        }
        let selected = supported
            .into_iter()
            .filter(|s| names.iter().any(|n| n.as_ref() == *s))
            .collect();
        Ok(Self { selected })
    }

    pub fn list_sources(&self) -> &[&'static str] {
        &self.selected
    }

    /// Reads every selected source's input. Any load failure aborts.
    pub fn open_all(
        &self,
        config: &Config,
        regions: &RegionCodeTable,
    ) -> Result<Vec<Box<dyn TestingSource>>> {
        self.selected
            .iter()
            .map(|name| Self::open(name, config, regions))
            .collect()
    }

    fn open(
        name: &str,
        config: &Config,
        regions: &RegionCodeTable,
    ) -> Result<Box<dyn TestingSource>> {
        let path = config
            .source_path(name)
            .ok_or_else(|| DailyError::Config(format!("No input path for source '{name}'")))?;
        info!(source = name, path = %path.display(), "Opening source");

        let source: Box<dyn TestingSource> = match name {
            SAN_FRANCISCO_SOURCE => Box::new(SanFranciscoSource::open(path, regions)?),
            SANTA_CLARA_SOURCE => Box::new(SantaClaraSource::open(path, regions)?),
            TEXAS_SOURCE => Box::new(TexasSource::open(path, regions)?),
            other => return Err(DailyError::Config(format!("Unknown source '{other}'"))),
        };
        Ok(source)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
