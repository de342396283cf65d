/// Source name constants to keep CLI names, registry entries and log fields consistent

// Source names (used in CLI and logs)
pub const SAN_FRANCISCO_SOURCE: &str = "san_francisco";
pub const SANTA_CLARA_SOURCE: &str = "santa_clara";
pub const TEXAS_SOURCE: &str = "texas";

// Default input locations, relative to the working directory
pub const SAN_FRANCISCO_PATH: &str = "raw/CA/06075/rows.csv?accessType=DOWNLOAD";
pub const SANTA_CLARA_PATH: &str = "raw/CA/06085/manual.xls";
pub const TEXAS_PATH: &str = "raw/TX/TexasCOVID-19CumulativeTestsOverTimebyCounty.xlsx";
pub const FIPS_PATH: &str = "raw/fips.json";
pub const OUTPUT_PATH: &str = "daily.csv";

// Region identifiers for the single-county sources
pub const SAN_FRANCISCO_FIPS: &str = "06075";
pub const SANTA_CLARA_FIPS: &str = "06085";
pub const CALIFORNIA_ABBR: &str = "CA";
pub const TEXAS_STATE_NAME: &str = "Texas";
pub const TEXAS_ABBR: &str = "TX";
pub const TEXAS_STATE_FIPS: u32 = 48;

// Santa Clara workbook layout
pub const SANTA_CLARA_SHEET: &str = "Sheet1";
pub const SC_NEGATIVE_COLUMN: &str = "Negative Results";
pub const SC_POSITIVE_COLUMN: &str = "Positive Results";
pub const SC_PENDING_COLUMN: &str = "Pending Results";
pub const SC_DATE_COLUMN: &str = "Date Results Were Received";

// Texas workbook layout
pub const TEXAS_SHEET: &str = "Total Tests Received";
pub const TEXAS_HEADER_ROW: usize = 1;
pub const TEXAS_COUNTY_COLUMN: &str = "County";
pub const TEXAS_REPORTING_YEAR: i32 = 2020;
pub const COUNTY_SUFFIX: &str = " County";

/// Output columns, in file order
pub const FIELDNAMES: [&str; 11] = [
    "date",
    "state",
    "fips",
    "positive",
    "negative",
    "pending",
    "total",
    "totalTestResults",
    "negativeIncrease",
    "positiveIncrease",
    "totalTestResultsIncrease",
];

/// Get all supported source names, in output order
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![SAN_FRANCISCO_SOURCE, SANTA_CLARA_SOURCE, TEXAS_SOURCE]
}
