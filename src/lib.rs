pub mod config;
pub mod constants;
pub mod dates;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod region;
pub mod sheet;
pub mod sources;
pub mod types;
