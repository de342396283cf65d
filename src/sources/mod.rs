// Registry that opens the configured sources in output order
pub mod registry;

// Individual source implementations
pub mod san_francisco;
pub mod santa_clara;
pub mod texas;

pub use registry::SourceRegistry;
pub use san_francisco::SanFranciscoSource;
pub use santa_clara::SantaClaraSource;
pub use texas::TexasSource;

use crate::types::OutputRecord;

/// Running cumulative counters for a single-region source.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct RunningTotals {
    positive: i64,
    negative: i64,
    total: i64,
    total_test_results: i64,
}

impl RunningTotals {
    /// Adds one period's counts and writes both increments and cumulative
    /// values into `record`.
    pub(crate) fn apply(
        &mut self,
        record: &mut OutputRecord,
        positive_increase: i64,
        negative_increase: i64,
        total_test_results_increase: i64,
        pending: i64,
    ) {
        self.positive += positive_increase;
        self.negative += negative_increase;
        self.total_test_results += total_test_results_increase;
        self.total += total_test_results_increase + pending;

        record.positive = Some(self.positive);
        record.negative = Some(self.negative);
        record.pending = Some(pending);
        record.total = Some(self.total);
        record.total_test_results = Some(self.total_test_results);
        record.negative_increase = Some(negative_increase);
        record.positive_increase = Some(positive_increase);
        record.total_test_results_increase = Some(total_test_results_increase);
    }
}
