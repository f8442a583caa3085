//! Grant record retrieval.
//!
//! [`GrantSource`] abstracts where records come from:
//! - [`OpenFemaClient`]: paginated HTTP against the OpenFEMA v2 dataset
//! - [`SnapshotSource`]: records already in memory (e.g. a previous export)

mod client;
pub mod odata;
mod source;

pub use client::OpenFemaClient;
pub use source::SnapshotSource;

use async_trait::async_trait;
use serde::Serialize;

use crate::types::{GrantRecord, SearchParams};

/// Fetch failures surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP client setup failed: {0}")]
    Client(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected API payload: {0}")]
    Payload(String),
}

impl FetchError {
    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            FetchError::InvalidUrl(_) | FetchError::Client(_) | FetchError::Payload(_) => false,
        }
    }
}

/// Everything one fetch produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchReport {
    /// `$filter` sent upstream
    pub filter: String,
    /// Last page URL requested, for pasting into a browser
    pub last_url: String,
    /// Upstream `metadata.count` (0 when not reported)
    pub total_count: u64,
    /// Rows received before any client-side filtering
    pub rows_received: usize,
    /// Rows that were not decodable records
    pub rows_skipped: usize,
    /// Pages requested
    pub pages: usize,
    /// Decoded records passing the category check
    pub records: Vec<GrantRecord>,
}

/// Trait abstracting where grant records come from.
#[async_trait]
pub trait GrantSource: Send + Sync + 'static {
    /// Retrieve every record matching the upstream part of `params`
    /// (incident type, categories, states, date window).
    async fn fetch(&self, params: &SearchParams) -> Result<FetchReport, FetchError>;

    /// Human-readable name for logging.
    fn source_name(&self) -> &str;
}
