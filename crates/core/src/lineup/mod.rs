//! Operator lineups and their aggregation from export files.

mod aggregator;
mod types;

pub use aggregator::{aggregate, LineupAggregator};
pub use types::*;

use thiserror::Error;

/// Errors that abort aggregation.
#[derive(Debug, Error)]
pub enum LineupError {
    #[error("Export '{key}' is not a JSON array of records")]
    NotAnArray { key: String },
}
