//! Wildfire Water-Utility Grants Finder
//!
//! Looks up FEMA Public Assistance grants obligated for fire incidents and
//! picks out the water and wastewater utilities among the applicants.
//!
//! ## Pipeline
//!
//! - **Fetcher**: paginated OpenFEMA queries behind the [`GrantSource`] trait
//! - **Classifier**: keyword allow-list / deny-list over applicant and title
//! - **Aggregator**: per-applicant totals, largest first
//! - **Exporter**: project and summary CSV files
//!
//! The [`api`] module serves a single search page on top of the pipeline.

pub mod aggregate;
pub mod api;
pub mod classifier;
pub mod config;
pub mod export;
pub mod fetcher;
pub mod pipeline;
pub mod types;

pub use config::FinderConfig;

pub use types::{
    GrantRecord, IncidentMatch, Money, SearchError, SearchParams, SearchRequest, UtilitySummary,
};

pub use classifier::{filter_water_utilities, KeywordSet};

pub use fetcher::{FetchError, FetchReport, GrantSource, OpenFemaClient, SnapshotSource};

pub use export::ExportError;

pub use pipeline::{run_search, SearchOutcome};
