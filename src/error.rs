use thiserror::Error;

/// Errors produced by the analytics core and the document store.
///
/// Handlers translate these into HTTP status codes; the core itself never
/// panics across the API boundary.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The parsed spreadsheet contained no data rows.
    #[error("dataset is empty")]
    EmptyDataset,

    /// A requested axis is not part of the dataset's column set.
    #[error("invalid axis: column '{0}' not found")]
    InvalidAxis(String),

    /// The chart type string is not one of the supported kinds.
    #[error("unsupported chart type: '{0}'")]
    UnsupportedChartKind(String),

    /// The uploaded file could not be read as a spreadsheet.
    #[error("sheet error: {0}")]
    Sheet(String),

    /// Document store IO failure.
    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document store (de)serialization failure.
    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record or user document does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl AnalyticsError {
    /// True for errors caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::EmptyDataset
                | AnalyticsError::InvalidAxis(_)
                | AnalyticsError::UnsupportedChartKind(_)
                | AnalyticsError::Sheet(_)
                | AnalyticsError::NotFound(_)
        )
    }
}
