use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DailyError {
    #[error("{source_name}: date {date} for fips {fips} does not follow {previous}")]
    NonMonotonicDate {
        source_name: &'static str,
        fips: String,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("{source_name}: region {name} ({fips}) is missing from the input")]
    MissingRegion {
        source_name: &'static str,
        fips: String,
        name: String,
    },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid number in {field}: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unrecognized column header: {0:?}")]
    InvalidHeader(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DailyError>;
