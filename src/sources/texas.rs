//! Texas DSHS cumulative tests by county.
//!
//! The workbook is a matrix: a title row, a header row of
//! "Tests Through <Month> <Day>" columns, then one row per county holding
//! cumulative test counts. Each county row is reshaped into a date-ordered
//! series and increments are derived from consecutive cumulative values.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::constants::{
    COUNTY_SUFFIX, TEXAS_ABBR, TEXAS_COUNTY_COLUMN, TEXAS_HEADER_ROW, TEXAS_REPORTING_YEAR,
    TEXAS_SHEET, TEXAS_SOURCE, TEXAS_STATE_FIPS, TEXAS_STATE_NAME,
};
use crate::dates::parse_tests_through_header;
use crate::error::{DailyError, Result};
use crate::region::RegionCodeTable;
use crate::sheet::{HeaderIndex, Sheet};
use crate::types::{DateOrder, OutputRecord, RecordStream, TestingSource};

/// Cumulative test counts for one county, sorted by date
#[derive(Debug, Clone)]
struct CountySeries {
    fips: String,
    values: Vec<(NaiveDate, i64)>,
}

pub struct TexasSource {
    state: String,
    counties: Vec<CountySeries>,
}

impl TexasSource {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, regions: &RegionCodeTable) -> Result<Self> {
        let sheet = Sheet::open(path, TEXAS_SHEET)?;
        Self::from_sheet(&sheet, regions)
    }

    /// Resolves every Texas county in `regions` to its sheet row.
    ///
    /// Fails before producing anything if a county has no row.
    pub fn from_sheet(sheet: &Sheet, regions: &RegionCodeTable) -> Result<Self> {
        let header = HeaderIndex::new(sheet.header(TEXAS_HEADER_ROW));
        let county_col = header.require(TEXAS_COUNTY_COLUMN)?;
        let date_columns = parse_date_columns(&header, county_col)?;

        let rows = county_rows(sheet, county_col);

        let mut counties = Vec::new();
        for (fips, county) in regions.counties_in_state(TEXAS_STATE_NAME) {
            let name = match county.name.strip_suffix(COUNTY_SUFFIX) {
                Some(stripped) => stripped,
                None => {
                    warn!(fips, name = %county.name, "County name lacks the expected suffix");
                    county.name.as_str()
                }
            };

            let row = *rows.get(name).ok_or_else(|| DailyError::MissingRegion {
                source_name: TEXAS_SOURCE,
                fips: fips.to_string(),
                name: name.to_string(),
            })?;

            counties.push(CountySeries {
                fips: fips.to_string(),
                values: county_values(sheet, row, county_col, &date_columns, name)?,
            });
        }

        info!(
            "Resolved {} Texas counties across {} report dates",
            counties.len(),
            date_columns.iter().flatten().count()
        );

        Ok(Self {
            state: regions
                .state_abbreviation_or(TEXAS_STATE_FIPS, TEXAS_ABBR)
                .to_string(),
            counties,
        })
    }
}

/// Report date for each column.
///
/// Columns whose header is blank or not a report date map to `None`; they are
/// only an error once a county has a value under them.
fn parse_date_columns(header: &HeaderIndex, county_col: usize) -> Result<Vec<Option<NaiveDate>>> {
    let mut columns = Vec::with_capacity(header.columns().len());
    for (col, text) in header.columns().iter().enumerate() {
        if col == county_col || text.is_empty() {
            columns.push(None);
            continue;
        }
        match parse_tests_through_header(text, TEXAS_REPORTING_YEAR) {
            Ok(date) => columns.push(Some(date)),
            Err(DailyError::InvalidHeader(_)) => {
                debug!(column = col, header = %text, "Column is not a report date");
                columns.push(None);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(columns)
}

/// Sheet row index for each county name. Later rows win on duplicate names.
fn county_rows(sheet: &Sheet, county_col: usize) -> HashMap<String, usize> {
    let mut rows = HashMap::new();
    for row in (TEXAS_HEADER_ROW + 1)..sheet.nrows() {
        let name = sheet.cell(row, county_col).as_text();
        if name.is_empty() {
            continue;
        }
        rows.insert(name, row);
    }
    rows
}

/// Collects (date, cumulative) pairs for one county row, sorted by date.
///
/// Cells that are not integers hold annotations and are skipped.
fn county_values(
    sheet: &Sheet,
    row: usize,
    county_col: usize,
    date_columns: &[Option<NaiveDate>],
    name: &str,
) -> Result<Vec<(NaiveDate, i64)>> {
    let mut values = Vec::new();
    for (col, cell) in sheet.row(row).iter().enumerate() {
        if col == county_col || cell.is_empty() {
            continue;
        }
        let date = date_columns.get(col).copied().flatten().ok_or_else(|| {
            DailyError::InvalidHeader(sheet.cell(TEXAS_HEADER_ROW, col).as_text())
        })?;
        match cell.as_integer() {
            Some(value) => values.push((date, value)),
            None => {
                debug!(county = name, %date, value = %cell.as_text(), "Skipping non-numeric cell")
            }
        }
    }
    values.sort();
    Ok(values)
}

impl TestingSource for TexasSource {
    fn source_name(&self) -> &'static str {
        TEXAS_SOURCE
    }

    fn into_records(self: Box<Self>) -> RecordStream {
        Box::new(TexasRecords {
            state: self.state,
            counties: self.counties.into_iter(),
            current: None,
            failed: false,
        })
    }
}

/// Position within one county's series
struct CountyCursor {
    fips: String,
    values: std::vec::IntoIter<(NaiveDate, i64)>,
    previous: i64,
    order: DateOrder,
}

struct TexasRecords {
    state: String,
    counties: std::vec::IntoIter<CountySeries>,
    current: Option<CountyCursor>,
    failed: bool,
}

impl TexasRecords {
    fn emit(
        state: &str,
        cursor: &mut CountyCursor,
        date: NaiveDate,
        value: i64,
    ) -> Result<OutputRecord> {
        cursor.order.check(TEXAS_SOURCE, &cursor.fips, date)?;

        let increase = value - cursor.previous;
        cursor.previous = value;

        let mut record = OutputRecord::new(date, state, &cursor.fips);
        record.total = Some(value);
        record.total_test_results = Some(value);
        record.total_test_results_increase = Some(increase);
        Ok(record)
    }
}

impl Iterator for TexasRecords {
    type Item = Result<OutputRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(cursor) = self.current.as_mut() {
                if let Some((date, value)) = cursor.values.next() {
                    let result = Self::emit(&self.state, cursor, date, value);
                    self.failed = result.is_err();
                    return Some(result);
                }
            }
            let series = self.counties.next()?;
            self.current = Some(CountyCursor {
                fips: series.fips,
                values: series.values.into_iter(),
                previous: 0,
                order: DateOrder::new(),
            });
        }
    }
}
