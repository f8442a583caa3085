//! OpenFEMA HTTP client: paginated reads with bounded retry.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{odata, FetchError, FetchReport, GrantSource};
use crate::config::defaults::ERROR_BODY_PREVIEW_CHARS;
use crate::config::ApiConfig;
use crate::types::{GrantRecord, SearchParams, UPSTREAM_SELECT_FIELDS};

/// HTTP client for the Public Assistance Grant Award Activities dataset.
#[derive(Clone)]
pub struct OpenFemaClient {
    http: reqwest::Client,
    base_url: Url,
    page_size: usize,
    max_retries: u32,
    retry_base_delay: Duration,
    retry_max_delay: Duration,
    max_records: Option<usize>,
}

impl OpenFemaClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            page_size: config.page_size.max(1),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            retry_max_delay: Duration::from_millis(config.retry_max_delay_ms),
            max_records: config.max_records,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// URL of the page starting at `skip`.
    pub fn page_url(&self, filter: &str, skip: usize) -> Url {
        let select = UPSTREAM_SELECT_FIELDS.join(",");
        let top = self.page_size.to_string();
        let skip = skip.to_string();
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("$filter", filter)
            .append_pair("$top", &top)
            .append_pair("$skip", &skip)
            .append_pair("$format", "json")
            .append_pair("$count", "true")
            .append_pair("$select", &select);
        url
    }

    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1), capped.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_base_delay
            .saturating_mul(factor)
            .min(self.retry_max_delay)
    }

    async fn get_once(&self, url: &Url) -> Result<Value, FetchError> {
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status,
                body: text.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            });
        }
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Payload(e.to_string()))
    }

    /// GET one page, retrying transient failures with exponential backoff.
    async fn get_page(&self, url: &Url) -> Result<Value, FetchError> {
        let mut attempt = 0u32;
        loop {
            match self.get_once(url).await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_delay(attempt);
                    warn!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "OpenFEMA request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Split a page payload into its row array and `metadata.count`.
///
/// The rows live under the first array-valued member, whose name is the
/// dataset name.
pub(crate) fn extract_rows(payload: Value) -> Result<(Vec<Value>, Option<u64>), FetchError> {
    let Value::Object(mut map) = payload else {
        return Err(FetchError::Payload("page is not a JSON object".to_string()));
    };
    let count = map
        .get("metadata")
        .and_then(|m| m.get("count"))
        .and_then(Value::as_u64);
    let data_key = map
        .iter()
        .find(|(_, v)| v.is_array())
        .map(|(k, _)| k.clone());
    let rows = match data_key.and_then(|k| map.remove(&k)) {
        Some(Value::Array(rows)) => rows,
        _ => Vec::new(),
    };
    Ok((rows, count))
}

/// Decode rows one by one; rows that are not records are skipped.
pub(crate) fn decode_rows(rows: Vec<Value>) -> (Vec<GrantRecord>, usize) {
    let mut skipped = 0;
    let records = rows
        .into_iter()
        .filter_map(|row| {
            if !row.is_object() {
                skipped += 1;
                warn!("Skipping non-object row in OpenFEMA page");
                return None;
            }
            match serde_json::from_value::<GrantRecord>(row) {
                Ok(r) => Some(r),
                Err(e) => {
                    skipped += 1;
                    warn!(error = %e, "Skipping undecodable OpenFEMA row");
                    None
                }
            }
        })
        .collect();
    (records, skipped)
}

#[async_trait]
impl GrantSource for OpenFemaClient {
    async fn fetch(&self, params: &SearchParams) -> Result<FetchReport, FetchError> {
        let filter = odata::build_filter(params);
        info!(filter = %filter, "Querying OpenFEMA");

        let mut report = FetchReport {
            filter,
            ..FetchReport::default()
        };
        let mut total_count: Option<u64> = None;
        let mut skip = 0usize;

        loop {
            let url = self.page_url(&report.filter, skip);
            report.last_url = url.to_string();
            report.pages += 1;

            let (rows, count) = extract_rows(self.get_page(&url).await?)?;
            if total_count.is_none() {
                total_count = Some(count.unwrap_or(0));
            }
            let page_len = rows.len();
            debug!(page = report.pages, skip, rows = page_len, "OpenFEMA page received");
            if page_len == 0 {
                break;
            }

            report.rows_received += page_len;
            let (records, skipped) = decode_rows(rows);
            report.rows_skipped += skipped;
            report
                .records
                .extend(records.into_iter().filter(|r| params.accepts_category(&r.category())));

            if page_len < self.page_size {
                break;
            }
            if let Some(max) = self.max_records {
                if report.rows_received >= max {
                    warn!(max_records = max, "Stopping pagination at configured max_records");
                    break;
                }
            }
            skip += self.page_size;
        }

        report.total_count = total_count.unwrap_or(0);
        let dropped = report.rows_received - report.rows_skipped - report.records.len();
        info!(
            total_count = report.total_count,
            rows = report.rows_received,
            records = report.records.len(),
            dropped_by_category = dropped,
            pages = report.pages,
            "OpenFEMA fetch complete"
        );
        Ok(report)
    }

    fn source_name(&self) -> &str {
        "OpenFEMA"
    }
}
