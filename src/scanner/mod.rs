//! Ranking of the symbol universe.

pub mod aggregator;
pub mod filter;

pub use aggregator::{aggregate, rank_pairs, ScanError, ScanOptions, ScanReport, Scanner};
pub use filter::{ScannerFilter, SortKey, SortOrder, TrendFilter};
