//! daily.csv serialization.
//!
//! Quoting follows the value's type rather than its text: `state`, `fips`
//! and header names are always quoted (so "06075" keeps its leading zero on
//! re-read), counters are bare digits, and untracked counters are written as
//! an empty quoted field. Rows end in CRLF.

use std::io::Write;

use crate::constants::FIELDNAMES;
use crate::error::{DailyError, Result};
use crate::types::OutputRecord;

pub struct DailyWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> DailyWriter<W> {
    /// Wraps `inner` and writes the header row
    pub fn new(inner: W) -> Result<Self> {
        // Fields are quoted by hand below, so the csv writer must not add its own
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::CRLF)
            .from_writer(inner);
        writer.write_record(FIELDNAMES.iter().map(|name| quoted(name)))?;
        Ok(Self { writer })
    }

    pub fn write(&mut self, record: &OutputRecord) -> Result<()> {
        let fields = [
            record.date_number().to_string(),
            quoted(&record.state),
            quoted(&record.fips),
            counter(record.positive),
            counter(record.negative),
            counter(record.pending),
            counter(record.total),
            counter(record.total_test_results),
            counter(record.negative_increase),
            counter(record.positive_increase),
            counter(record.total_test_results_increase),
        ];
        self.writer.write_record(&fields)?;
        Ok(())
    }

    /// Flushes buffered rows and returns the underlying writer
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| DailyError::Io(e.into_error()))
    }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn counter(value: Option<i64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => quoted(""),
    }
}
