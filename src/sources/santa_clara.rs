use chrono::NaiveDate;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::constants::{
    CALIFORNIA_ABBR, SANTA_CLARA_FIPS, SANTA_CLARA_SHEET, SANTA_CLARA_SOURCE, SC_DATE_COLUMN,
    SC_NEGATIVE_COLUMN, SC_PENDING_COLUMN, SC_POSITIVE_COLUMN,
};
use crate::dates::from_excel_serial;
use crate::error::{DailyError, Result};
use crate::region::RegionCodeTable;
use crate::sheet::{Cell, HeaderIndex, Sheet};
use crate::sources::RunningTotals;
use crate::types::{DateOrder, OutputRecord, RecordStream, TestingSource};

/// Column positions of the fields this source reads
#[derive(Debug, Clone, Copy)]
struct Columns {
    negative: usize,
    positive: usize,
    pending: usize,
    date: usize,
}

/// Santa Clara County: a hand-maintained workbook with one row per report,
/// each carrying that day's negative, positive and pending result counts
pub struct SantaClaraSource {
    state: String,
    sheet: Sheet,
    columns: Columns,
}

impl SantaClaraSource {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, regions: &RegionCodeTable) -> Result<Self> {
        let sheet = Sheet::open(path, SANTA_CLARA_SHEET)?;
        Self::from_sheet(sheet, regions)
    }

    /// Header is the first row, data starts on the second
    pub fn from_sheet(sheet: Sheet, regions: &RegionCodeTable) -> Result<Self> {
        let header = HeaderIndex::new(sheet.header(0));
        let columns = Columns {
            negative: header.require(SC_NEGATIVE_COLUMN)?,
            positive: header.require(SC_POSITIVE_COLUMN)?,
            pending: header.require(SC_PENDING_COLUMN)?,
            date: header.require(SC_DATE_COLUMN)?,
        };
        info!("Loaded {} Santa Clara report rows", sheet.nrows().saturating_sub(1));

        Ok(Self {
            state: regions
                .state_abbreviation_for_county(SANTA_CLARA_FIPS, CALIFORNIA_ABBR)
                .to_string(),
            sheet,
            columns,
        })
    }
}

impl TestingSource for SantaClaraSource {
    fn source_name(&self) -> &'static str {
        SANTA_CLARA_SOURCE
    }

    fn into_records(self: Box<Self>) -> RecordStream {
        Box::new(SantaClaraRecords {
            state: self.state,
            sheet: self.sheet,
            columns: self.columns,
            next_row: 1,
            totals: RunningTotals::default(),
            order: DateOrder::new(),
            failed: false,
        })
    }
}

/// Count in a cell; blank cells count as zero
fn count(cell: &Cell, field: &str) -> Result<i64> {
    if cell.is_empty() {
        return Ok(0);
    }
    cell.as_integer().ok_or_else(|| DailyError::InvalidNumber {
        field: field.to_string(),
        value: cell.as_text(),
    })
}

fn report_date(cell: &Cell, row: usize) -> Result<NaiveDate> {
    let serial = match cell {
        Cell::Empty => None,
        Cell::Number(n) => Some(*n),
        Cell::Text(s) if s.trim().is_empty() => None,
        Cell::Text(s) => Some(s.trim().parse::<f64>().map_err(|_| DailyError::InvalidNumber {
            field: SC_DATE_COLUMN.to_string(),
            value: s.clone(),
        })?),
    };
    let serial = serial.ok_or_else(|| {
        DailyError::MissingField(format!("{SC_DATE_COLUMN} (row {})", row + 1))
    })?;
    from_excel_serial(serial)
}

struct SantaClaraRecords {
    state: String,
    sheet: Sheet,
    columns: Columns,
    next_row: usize,
    totals: RunningTotals,
    order: DateOrder,
    failed: bool,
}

impl SantaClaraRecords {
    fn normalize(&mut self, row: usize) -> Result<OutputRecord> {
        let cols = self.columns;
        let negative_increase = count(self.sheet.cell(row, cols.negative), SC_NEGATIVE_COLUMN)?;
        let positive_increase = count(self.sheet.cell(row, cols.positive), SC_POSITIVE_COLUMN)?;
        let pending = count(self.sheet.cell(row, cols.pending), SC_PENDING_COLUMN)?;
        // Test results here means results back, pos + neg
        let total_test_results_increase = negative_increase + positive_increase;

        let date = report_date(self.sheet.cell(row, cols.date), row)?;
        self.order.check(SANTA_CLARA_SOURCE, SANTA_CLARA_FIPS, date)?;

        let mut record = OutputRecord::new(date, &self.state, SANTA_CLARA_FIPS);
        self.totals.apply(
            &mut record,
            positive_increase,
            negative_increase,
            total_test_results_increase,
            pending,
        );
        debug!(date = %date, row, total = ?record.total, "Normalized Santa Clara row");
        Ok(record)
    }
}

impl Iterator for SantaClaraRecords {
    type Item = Result<OutputRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        // Skip trailing or spacer rows with nothing in them
        while self.next_row < self.sheet.nrows()
            && self.sheet.row(self.next_row).iter().all(Cell::is_empty)
        {
            self.next_row += 1;
        }
        if self.next_row >= self.sheet.nrows() {
            return None;
        }
        let row = self.next_row;
        self.next_row += 1;

        let result = self.normalize(row);
        self.failed = result.is_err();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<Cell> {
        vec![
            Cell::text(SC_DATE_COLUMN),
            Cell::text(SC_NEGATIVE_COLUMN),
            Cell::text(SC_POSITIVE_COLUMN),
            Cell::text(SC_PENDING_COLUMN),
        ]
    }

    fn row(serial: f64, neg: Cell, pos: Cell, pending: Cell) -> Vec<Cell> {
        vec![Cell::Number(serial), neg, pos, pending]
    }

    fn records(rows: Vec<Vec<Cell>>) -> Vec<Result<OutputRecord>> {
        let source =
            SantaClaraSource::from_sheet(Sheet::from_rows(rows), &RegionCodeTable::default())
                .unwrap();
        Box::new(source).into_records().collect()
    }

    #[test]
    fn test_rows_accumulate_with_pending() {
        let results = records(vec![
            header(),
            row(43952.0, Cell::Number(10.0), Cell::Number(2.0), Cell::Number(5.0)),
            row(43953.0, Cell::Number(20.0), Cell::Number(3.0), Cell::Number(1.0)),
        ]);
        let rows: Vec<OutputRecord> = results.into_iter().map(|r| r.unwrap()).collect();

        assert_eq!(rows[0].date_number(), 20200501);
        assert_eq!(rows[1].date_number(), 20200502);
        assert_eq!(rows[1].negative, Some(30));
        assert_eq!(rows[1].positive, Some(5));
        assert_eq!(rows[1].total_test_results, Some(35));
        // pending is per row, total carries earlier pending
        assert_eq!(rows[1].pending, Some(1));
        assert_eq!(rows[1].total, Some(12 + 5 + 23 + 1));
        assert_eq!(rows[1].total_test_results_increase, Some(23));
        assert!(rows.iter().all(|r| r.fips == "06085" && r.state == "CA"));
    }

    #[test]
    fn test_blank_pending_counts_as_zero() {
        let results = records(vec![
            header(),
            row(43952.0, Cell::Number(10.0), Cell::Number(2.0), Cell::Empty),
            row(43953.0, Cell::Number(4.0), Cell::Empty, Cell::text("")),
        ]);
        let rows: Vec<OutputRecord> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(rows[0].pending, Some(0));
        assert_eq!(rows[1].pending, Some(0));
        assert_eq!(rows[1].positive_increase, Some(0));
        assert_eq!(rows[1].total, Some(16));
    }

    #[test]
    fn test_increases_sum_to_final_total() {
        let results = records(vec![
            header(),
            row(43952.0, Cell::Number(1.0), Cell::Number(1.0), Cell::Empty),
            row(43953.0, Cell::Number(7.0), Cell::Number(2.0), Cell::Empty),
            row(43954.0, Cell::Number(3.0), Cell::Number(0.0), Cell::Empty),
        ]);
        let rows: Vec<OutputRecord> = results.into_iter().map(|r| r.unwrap()).collect();
        let sum: i64 = rows.iter().filter_map(|r| r.total_test_results_increase).sum();
        assert_eq!(rows.last().unwrap().total_test_results, Some(sum));
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let results = records(vec![
            header(),
            row(43952.0, Cell::Number(1.0), Cell::Number(1.0), Cell::Empty),
            vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty],
            row(43953.0, Cell::Number(1.0), Cell::Number(1.0), Cell::Empty),
        ]);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_out_of_order_dates_are_fatal() {
        let results = records(vec![
            header(),
            row(43953.0, Cell::Number(1.0), Cell::Number(1.0), Cell::Empty),
            row(43952.0, Cell::Number(1.0), Cell::Number(1.0), Cell::Empty),
        ]);
        assert!(matches!(results.last(), Some(Err(DailyError::NonMonotonicDate { .. }))));
    }

    #[test]
    fn test_missing_date_is_an_error() {
        let results = records(vec![
            header(),
            vec![Cell::Empty, Cell::Number(1.0), Cell::Number(1.0), Cell::Empty],
        ]);
        assert!(matches!(results[0], Err(DailyError::MissingField(_))));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let sheet = Sheet::from_rows(vec![vec![
            Cell::text(SC_DATE_COLUMN),
            Cell::text(SC_NEGATIVE_COLUMN),
        ]]);
        let result = SantaClaraSource::from_sheet(sheet, &RegionCodeTable::default());
        assert!(matches!(result, Err(DailyError::MissingField(_))));
    }
}
