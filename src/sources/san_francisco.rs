use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::constants::{CALIFORNIA_ABBR, SAN_FRANCISCO_FIPS, SAN_FRANCISCO_SOURCE};
use crate::dates::parse_slash_date;
use crate::error::Result;
use crate::region::RegionCodeTable;
use crate::sources::RunningTotals;
use crate::types::{DateOrder, OutputRecord, RecordStream, TestingSource};

/// One row of the San Francisco daily results export.
/// Empty counters deserialize as `None` and count as zero.
#[derive(Debug, Clone, Deserialize)]
struct DailyResultRow {
    result_date: String,
    neg: Option<i64>,
    pos: Option<i64>,
    tests: Option<i64>,
}

/// San Francisco County: a CSV of per-day negative, positive and test counts
pub struct SanFranciscoSource {
    state: String,
    rows: Vec<DailyResultRow>,
}

impl SanFranciscoSource {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, regions: &RegionCodeTable) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, regions)
    }

    pub fn from_reader<R: Read>(reader: R, regions: &RegionCodeTable) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<DailyResultRow>, csv::Error>>()?;

        // The export is not reliably ordered; YYYY/MM/DD sorts correctly as text
        rows.sort_by(|a, b| a.result_date.cmp(&b.result_date));
        info!("Loaded {} San Francisco result rows", rows.len());

        Ok(Self {
            state: regions
                .state_abbreviation_for_county(SAN_FRANCISCO_FIPS, CALIFORNIA_ABBR)
                .to_string(),
            rows,
        })
    }
}

impl TestingSource for SanFranciscoSource {
    fn source_name(&self) -> &'static str {
        SAN_FRANCISCO_SOURCE
    }

    fn into_records(self: Box<Self>) -> RecordStream {
        Box::new(SanFranciscoRecords {
            state: self.state,
            rows: self.rows.into_iter(),
            totals: RunningTotals::default(),
            order: DateOrder::new(),
            failed: false,
        })
    }
}

struct SanFranciscoRecords {
    state: String,
    rows: std::vec::IntoIter<DailyResultRow>,
    totals: RunningTotals,
    order: DateOrder,
    failed: bool,
}

impl SanFranciscoRecords {
    fn normalize(&mut self, row: DailyResultRow) -> Result<OutputRecord> {
        let date = parse_slash_date(&row.result_date)?;
        self.order.check(SAN_FRANCISCO_SOURCE, SAN_FRANCISCO_FIPS, date)?;

        let negative_increase = row.neg.unwrap_or(0);
        let positive_increase = row.pos.unwrap_or(0);
        // Test volume is reported directly rather than derived from pos + neg
        let total_test_results_increase = row.tests.unwrap_or(0);
        // Pending is not part of this export
        let pending = 0;

        let mut record = OutputRecord::new(date, &self.state, SAN_FRANCISCO_FIPS);
        self.totals.apply(
            &mut record,
            positive_increase,
            negative_increase,
            total_test_results_increase,
            pending,
        );
        debug!(date = %date, total = ?record.total, "Normalized San Francisco row");
        Ok(record)
    }
}

impl Iterator for SanFranciscoRecords {
    type Item = Result<OutputRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let row = self.rows.next()?;
        let result = self.normalize(row);
        self.failed = result.is_err();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DailyError;

    fn records(csv: &str) -> Vec<Result<OutputRecord>> {
        let source =
            SanFranciscoSource::from_reader(csv.as_bytes(), &RegionCodeTable::default()).unwrap();
        Box::new(source).into_records().collect()
    }

    fn ok_records(csv: &str) -> Vec<OutputRecord> {
        records(csv).into_iter().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_running_totals_match_daily_counts() {
        let rows = ok_records(
            "result_date,pos,neg,tests\n\
             2020/05/01,5,10,15\n\
             2020/05/02,3,8,11\n\
             2020/05/03,2,4,6\n",
        );

        let dates: Vec<u32> = rows.iter().map(|r| r.date_number()).collect();
        assert_eq!(dates, vec![20200501, 20200502, 20200503]);

        let positive: Vec<i64> = rows.iter().filter_map(|r| r.positive).collect();
        let negative: Vec<i64> = rows.iter().filter_map(|r| r.negative).collect();
        assert_eq!(positive, vec![5, 8, 10]);
        assert_eq!(negative, vec![10, 18, 22]);

        let positive_increase: Vec<i64> = rows.iter().filter_map(|r| r.positive_increase).collect();
        let negative_increase: Vec<i64> = rows.iter().filter_map(|r| r.negative_increase).collect();
        assert_eq!(positive_increase, vec![5, 3, 2]);
        assert_eq!(negative_increase, vec![10, 8, 4]);

        assert!(rows.iter().all(|r| r.pending == Some(0)));
        assert!(rows.iter().all(|r| r.fips == "06075" && r.state == "CA"));
    }

    #[test]
    fn test_increases_sum_to_final_total() {
        let rows = ok_records(
            "result_date,pos,neg,tests\n\
             2020/04/01,1,9,10\n\
             2020/04/02,,20,25\n\
             2020/04/03,4,,\n",
        );
        let sum: i64 = rows.iter().filter_map(|r| r.total_test_results_increase).sum();
        let last = rows.last().unwrap();
        assert_eq!(last.total_test_results, Some(sum));
        assert_eq!(last.total, Some(35));
        assert_eq!(rows[1].positive_increase, Some(0));
    }

    #[test]
    fn test_rows_are_sorted_by_date_before_processing() {
        let rows = ok_records(
            "result_date,pos,neg,tests\n\
             2020/05/02,3,8,11\n\
             2020/05/01,5,10,15\n",
        );
        assert_eq!(rows[0].date_number(), 20200501);
        assert_eq!(rows[1].positive, Some(8));
    }

    #[test]
    fn test_duplicate_date_is_fatal() {
        let results = records(
            "result_date,pos,neg,tests\n\
             2020/05/01,5,10,15\n\
             2020/05/01,1,1,2\n\
             2020/05/02,1,1,2\n",
        );
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(DailyError::NonMonotonicDate { .. })));
    }

    #[test]
    fn test_state_comes_from_reference_table() {
        let regions = RegionCodeTable::from_json_str(
            r#"{"states": {"06": {"name": "California", "abbreviation": "Calif"}}}"#,
        )
        .unwrap();
        let csv = "result_date,pos,neg,tests\n2020/05/01,1,1,2\n";
        let source = SanFranciscoSource::from_reader(csv.as_bytes(), &regions).unwrap();
        let first = Box::new(source).into_records().next().unwrap().unwrap();
        assert_eq!(first.state, "Calif");
    }

    #[test]
    fn test_non_integer_count_is_rejected() {
        let result = SanFranciscoSource::from_reader(
            "result_date,pos,neg,tests\n2020/05/01,five,1,2\n".as_bytes(),
            &RegionCodeTable::default(),
        );
        assert!(matches!(result, Err(DailyError::Csv(_))));
    }
}
