use crate::record_store::Collection;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A Record Store query failed. The whole computation is abandoned.
    #[error("Fetch of '{collection}' failed: {source}")]
    Fetch {
        collection: Collection,
        #[source]
        source: Box<AnalyticsError>,
    },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnalyticsError {
    /// Tag a store error with the collection whose fetch produced it.
    pub fn fetch(collection: Collection, source: AnalyticsError) -> Self {
        match source {
            // Already tagged by an inner layer; keep the original collection.
            tagged @ AnalyticsError::Fetch { .. } => tagged,
            other => AnalyticsError::Fetch {
                collection,
                source: Box::new(other),
            },
        }
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
