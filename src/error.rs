use std::path::PathBuf;

/// Errors surfaced by the record source, the aggregator and the report builder
#[derive(Debug, thiserror::Error)]
pub enum SalesError {
    /// The input table cannot be located or read
    #[error("cannot read sales input {path:?}: {source}")]
    MissingInput {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// A row could not be parsed into a sale record
    #[error("malformed record at row {row}: {message}")]
    MalformedRecord { row: u64, message: String },
    /// A row parsed fine but breaks the quantity/price invariants
    #[error("invalid record at row {row}: {reason}")]
    InvalidRecord { row: u64, reason: String },
    /// Aggregation was requested over zero records
    #[error("no records to aggregate")]
    EmptyDataset,
}

impl SalesError {
    pub fn invalid(row: u64, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            row,
            reason: reason.into(),
        }
    }

    pub fn is_empty_dataset(&self) -> bool {
        matches!(self, Self::EmptyDataset)
    }
}
