// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Wildberries feedbacks API.
//!
//! Pagination uses take/skip with a short delay between pages to stay
//! inside the partner API rate limits. The API signals failures both as
//! non-200 statuses and as 200 responses carrying an `error` flag.

use std::time::Duration;

use async_trait::async_trait;
use otklik_core::traits::MarketplaceAdapter;
use otklik_core::types::{FeedbackItem, FetchResult, Platform};
use otklik_core::OtklikError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

const API_BASE_URL: &str = "https://feedbacks-api.wildberries.ru";
const PAGE_SIZE: usize = 100;
const RATE_DELAY: Duration = Duration::from_millis(400);

/// Client for one Wildberries seller token.
#[derive(Debug, Clone)]
pub struct WildberriesClient {
    client: reqwest::Client,
    base_url: String,
    rate_delay: Duration,
}

impl WildberriesClient {
    pub fn new(api_token: &str) -> Result<Self, OtklikError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(api_token)
                .map_err(|e| OtklikError::Config(format!("invalid Wildberries token: {e}")))?,
        );
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| OtklikError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            rate_delay: RATE_DELAY,
        })
    }

    /// Overrides the base URL and drops the page delay (for wiremock tests).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self.rate_delay = Duration::ZERO;
        self
    }

    async fn fetch_page(&self, take: usize, skip: usize) -> Result<Value, OtklikError> {
        let url = format!("{}/api/v1/feedbacks", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("isAnswered", "0".to_string()),
                ("take", take.to_string()),
                ("skip", skip.to_string()),
                ("order", "dateDesc".to_string()),
            ])
            .send()
            .await
            .map_err(|e| OtklikError::Transport {
                message: format!("WB feedbacks request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| OtklikError::Transport {
            message: format!("failed to read WB response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        if status != reqwest::StatusCode::OK {
            return Err(OtklikError::Transport {
                message: format!("WB API error {status}: {}", truncate(&body, 200)),
                source: None,
            });
        }
        let payload: Value =
            serde_json::from_str(&body).map_err(|e| OtklikError::Transport {
                message: format!("WB API invalid JSON: {e}"),
                source: Some(Box::new(e)),
            })?;
        if payload.get("error").and_then(Value::as_bool).unwrap_or(false) {
            return Err(OtklikError::Transport {
                message: format!("WB API error payload: {payload}"),
                source: None,
            });
        }
        Ok(payload)
    }
}

#[async_trait]
impl MarketplaceAdapter for WildberriesClient {
    fn platform(&self) -> Platform {
        Platform::Wildberries
    }

    async fn fetch_unanswered(&self) -> Result<FetchResult, OtklikError> {
        let mut items = Vec::new();
        let mut last_raw_page = None;
        let mut skip = 0;
        loop {
            let payload = self.fetch_page(PAGE_SIZE, skip).await?;
            let feedbacks: Vec<Value> = payload
                .get("data")
                .and_then(|d| d.get("feedbacks"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            last_raw_page = Some(payload);
            if feedbacks.is_empty() {
                break;
            }
            skip += feedbacks.len();
            for item in &feedbacks {
                items.push(normalize(item));
            }
            tokio::time::sleep(self.rate_delay).await;
        }
        debug!(count = items.len(), "fetched unanswered WB feedbacks");
        Ok(FetchResult {
            items,
            last_raw_page,
        })
    }

    async fn send_response(
        &self,
        external_id: &str,
        text: &str,
    ) -> Result<Value, OtklikError> {
        let url = format!("{}/api/v1/feedbacks/answer", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "id": external_id, "text": text }))
            .send()
            .await
            .map_err(|e| OtklikError::Transport {
                message: format!("WB answer request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(serde_json::json!({ "status": "no_content" }));
        }
        let body = response.text().await.map_err(|e| OtklikError::Transport {
            message: format!("failed to read WB response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        if status != reqwest::StatusCode::OK {
            return Err(OtklikError::Transport {
                message: format!("WB API error {status}: {}", truncate(&body, 200)),
                source: None,
            });
        }
        let payload: Value =
            serde_json::from_str(&body).map_err(|e| OtklikError::Transport {
                message: format!("WB API invalid JSON: {e}"),
                source: Some(Box::new(e)),
            })?;
        if payload.get("error").and_then(Value::as_bool).unwrap_or(false) {
            return Err(OtklikError::Transport {
                message: format!("WB API error payload: {payload}"),
                source: None,
            });
        }
        Ok(payload)
    }
}

/// Normalize one raw WB feedback entry.
///
/// The `id` field is sometimes numeric; identifiers are stored as text.
fn normalize(item: &Value) -> FeedbackItem {
    let product = item.get("productDetails");
    let product_name = product
        .and_then(|p| p.get("productName"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let product_external_id = product
        .and_then(|p| p.get("nmId"))
        .map(value_to_string)
        .filter(|s| !s.is_empty());
    FeedbackItem {
        external_id: item.get("id").map(value_to_string).unwrap_or_default(),
        created_at: item
            .get("createdDate")
            .and_then(Value::as_str)
            .map(str::to_string),
        rating: item.get("productValuation").and_then(Value::as_i64),
        text: text_field(item, "text"),
        pros: text_field(item, "pros"),
        cons: text_field(item, "cons"),
        product_name,
        product_external_id,
        raw: item.clone(),
    }
}

fn text_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
