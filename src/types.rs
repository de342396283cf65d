use crate::error::Result;
use chrono::{Datelike, NaiveDate};

/// One normalized row of daily.csv: a single region on a single date.
///
/// Counters a source does not track stay `None` and are written as empty
/// fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub date: NaiveDate,
    pub state: String,
    pub fips: String,
    pub positive: Option<i64>,
    pub negative: Option<i64>,
    pub pending: Option<i64>,
    pub total: Option<i64>,
    pub total_test_results: Option<i64>,
    pub negative_increase: Option<i64>,
    pub positive_increase: Option<i64>,
    pub total_test_results_increase: Option<i64>,
}

impl OutputRecord {
    /// A record with only the region and date filled in
    pub fn new(date: NaiveDate, state: &str, fips: &str) -> Self {
        Self {
            date,
            state: state.to_string(),
            fips: fips.to_string(),
            positive: None,
            negative: None,
            pending: None,
            total: None,
            total_test_results: None,
            negative_increase: None,
            positive_increase: None,
            total_test_results_increase: None,
        }
    }

    /// The date encoded as YYYYMMDD, the way it appears in the output
    pub fn date_number(&self) -> u32 {
        self.date.year() as u32 * 10_000 + self.date.month() * 100 + self.date.day()
    }
}

/// Forward-only stream of records produced by a source. Consumed once.
pub type RecordStream = Box<dyn Iterator<Item = Result<OutputRecord>>>;

/// Core trait that every testing data source implements
pub trait TestingSource {
    /// Unique identifier for this source
    fn source_name(&self) -> &'static str;

    /// Turn the loaded input into its normalized record stream
    fn into_records(self: Box<Self>) -> RecordStream;
}

/// Rejects a date that does not come strictly after the previous one.
///
/// Shared by the sources that keep per-region running totals.
#[derive(Debug, Default)]
pub struct DateOrder {
    previous: Option<NaiveDate>,
}

impl DateOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, source_name: &'static str, fips: &str, date: NaiveDate) -> Result<()> {
        if let Some(previous) = self.previous {
            if date <= previous {
                return Err(crate::error::DailyError::NonMonotonicDate {
                    source_name,
                    fips: fips.to_string(),
                    previous,
                    date,
                });
            }
        }
        self.previous = Some(date);
        Ok(())
    }
}
