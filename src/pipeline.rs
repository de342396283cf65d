use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::output::DailyWriter;
use crate::region::RegionCodeTable;
use crate::sources::SourceRegistry;
use crate::types::TestingSource;

/// Records written for one source
#[derive(Debug, Clone)]
pub struct SourceSummary {
    pub source_name: String,
    pub records: usize,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub sources: Vec<SourceSummary>,
    pub total_records: usize,
    pub output_file: PathBuf,
}

pub struct Pipeline;

impl Pipeline {
    /// Load the reference table, open every selected source, write daily.csv
    #[instrument(skip_all, fields(output = %config.output_path.display()))]
    pub fn run(config: &Config, registry: &SourceRegistry) -> Result<PipelineResult> {
        info!("Loading region codes from {}", config.fips_path.display());
        let regions = RegionCodeTable::load(&config.fips_path)?;

        // Every source is read up front so lookup failures surface before any output
        let sources = registry.open_all(config, &regions)?;
        Self::write_daily(sources, &config.output_path)
    }

    /// Concatenates the sources' records, in the given order, into `output_path`.
    ///
    /// Rows go to a sibling `.partial` file that is renamed into place only
    /// once every source finished; on failure it is removed and no output
    /// file is left behind.
    pub fn write_daily(
        sources: Vec<Box<dyn TestingSource>>,
        output_path: &Path,
    ) -> Result<PipelineResult> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let partial_path = partial_path(output_path);
        let summaries = match Self::write_all(sources, &partial_path) {
            Ok(summaries) => summaries,
            Err(e) => {
                error!("Run failed, discarding partial output: {}", e);
                let _ = fs::remove_file(&partial_path);
                return Err(e);
            }
        };
        fs::rename(&partial_path, output_path)?;

        let total_records = summaries.iter().map(|s| s.records).sum();
        info!("💾 Wrote {} records to {}", total_records, output_path.display());

        Ok(PipelineResult {
            sources: summaries,
            total_records,
            output_file: output_path.to_path_buf(),
        })
    }

    fn write_all(sources: Vec<Box<dyn TestingSource>>, path: &Path) -> Result<Vec<SourceSummary>> {
        let file = File::create(path)?;
        let mut writer = DailyWriter::new(BufWriter::new(file))?;
        let mut summaries = Vec::new();

        for source in sources {
            let source_name = source.source_name();
            let span = info_span!("source", source = source_name);
            let _enter = span.enter();

            let mut records = 0;
            for record in source.into_records() {
                writer.write(&record?)?;
                records += 1;
            }
            info!("✅ Normalized {} records", records);
            summaries.push(SourceSummary {
                source_name: source_name.to_string(),
                records,
            });
        }

        writer.finish()?;
        Ok(summaries)
    }
}

fn partial_path(output_path: &Path) -> PathBuf {
    let mut name = output_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    output_path.with_file_name(name)
}
