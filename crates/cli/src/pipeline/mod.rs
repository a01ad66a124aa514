//! Report feed and run statistics.

mod feed;
mod stats;

pub use feed::{read_reports, synthetic_reports};
pub use stats::RunStats;
