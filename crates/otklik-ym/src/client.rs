// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Yandex Market partner API.
//!
//! All feedback endpoints are scoped to a business id, which is not part
//! of the credential; it is discovered once via `/v2/campaigns` and cached
//! on the account by the sync pipeline. The API reports failures three
//! ways: non-2xx statuses, a top-level `status` other than `OK`, and
//! `error`/`errors` payload fields.

use std::time::Duration;

use async_trait::async_trait;
use otklik_core::traits::MarketplaceAdapter;
use otklik_core::types::{FeedbackItem, FetchResult, Platform};
use otklik_core::OtklikError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

const API_BASE_URL: &str = "https://api.partner.market.yandex.ru";
const PAGE_LIMIT: usize = 50;

/// Client for one Yandex Market API key.
#[derive(Debug, Clone)]
pub struct YandexMarketClient {
    client: reqwest::Client,
    base_url: String,
    business_id: Option<i64>,
}

impl YandexMarketClient {
    pub fn new(api_key: &str) -> Result<Self, OtklikError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(api_key)
                .map_err(|e| OtklikError::Config(format!("invalid Yandex Market key: {e}")))?,
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
            business_id: None,
        })
    }

    /// Binds the business id the feedback endpoints are scoped to.
    pub fn with_business_id(mut self, business_id: i64) -> Self {
        self.business_id = Some(business_id);
        self
    }

    /// Overrides the base URL (for wiremock tests).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn business_id(&self) -> Result<i64, OtklikError> {
        self.business_id.ok_or_else(|| {
            OtklikError::Config("Yandex Market client has no business id bound".to_string())
        })
    }

    /// Discover the business id behind this API key from its first campaign.
    pub async fn detect_business_id(&self) -> Result<i64, OtklikError> {
        let payload = self.request_get("/v2/campaigns").await?;
        let campaigns = payload
            .get("campaigns")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let first = campaigns.first().ok_or_else(|| OtklikError::Transport {
            message: "YM API: no campaigns available for this key".to_string(),
            source: None,
        })?;
        first
            .get("business")
            .and_then(|b| b.get("id"))
            .and_then(Value::as_i64)
            .ok_or_else(|| OtklikError::Transport {
                message: "YM API: failed to detect business.id from /v2/campaigns".to_string(),
                source: None,
            })
    }

    async fn request_get(&self, path: &str) -> Result<Value, OtklikError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| OtklikError::Transport {
                message: format!("YM request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        check_response(response).await
    }

    async fn request_post(
        &self,
        path: &str,
        params: &[(&str, String)],
        body: &Value,
    ) -> Result<Value, OtklikError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(params)
            .json(body)
            .send()
            .await
            .map_err(|e| OtklikError::Transport {
                message: format!("YM request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        check_response(response).await
    }
}

async fn check_response(response: reqwest::Response) -> Result<Value, OtklikError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| OtklikError::Transport {
        message: format!("failed to read YM response body: {e}"),
        source: Some(Box::new(e)),
    })?;
    if !status.is_success() {
        return Err(OtklikError::Transport {
            message: format!("YM API HTTP {status}: {body}"),
            source: None,
        });
    }
    let payload: Value = serde_json::from_str(&body).map_err(|e| OtklikError::Transport {
        message: format!("YM API invalid JSON: {e}"),
        source: Some(Box::new(e)),
    })?;
    if let Some(api_status) = payload.get("status").and_then(Value::as_str) {
        if api_status != "OK" {
            return Err(OtklikError::Transport {
                message: format!("YM API error payload: {payload}"),
                source: None,
            });
        }
    }
    if payload.get("error").is_some_and(is_error_value)
        || payload.get("errors").is_some_and(is_error_value)
    {
        return Err(OtklikError::Transport {
            message: format!("YM API error payload: {payload}"),
            source: None,
        });
    }
    Ok(payload)
}

/// Empty arrays/objects in `error`/`errors` fields do not count as errors.
fn is_error_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Number(_) => true,
    }
}

#[async_trait]
impl MarketplaceAdapter for YandexMarketClient {
    fn platform(&self) -> Platform {
        Platform::YandexMarket
    }

    async fn fetch_unanswered(&self) -> Result<FetchResult, OtklikError> {
        let business_id = self.business_id()?;
        let path = format!("/v2/businesses/{business_id}/goods-feedback");
        let body = serde_json::json!({ "reactionStatus": "NEED_REACTION" });

        let mut items = Vec::new();
        let mut last_raw_page = None;
        let mut page_token: Option<String> = None;
        loop {
            let mut params = vec![("limit", PAGE_LIMIT.to_string())];
            if let Some(token) = &page_token {
                params.push(("page_token", token.clone()));
            }
            let payload = self.request_post(&path, &params, &body).await?;
            let result = payload.get("result").cloned().unwrap_or(Value::Null);
            let feedbacks = result
                .get("feedbacks")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if !feedbacks.is_empty() {
                for item in &feedbacks {
                    items.push(normalize(item));
                }
                last_raw_page = Some(payload);
            }
            page_token = result
                .get("paging")
                .and_then(|p| p.get("nextPageToken"))
                .and_then(Value::as_str)
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }
        debug!(count = items.len(), "fetched unanswered YM feedbacks");
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
        let business_id = self.business_id()?;
        let feedback_id: i64 = external_id.parse().map_err(|_| {
            OtklikError::Internal(format!("YM feedback id is not numeric: {external_id}"))
        })?;
        let path = format!("/v2/businesses/{business_id}/goods-feedback/comments/update");
        let body = serde_json::json!({
            "feedbackId": feedback_id,
            "comment": { "text": text }
        });
        self.request_post(&path, &[], &body).await
    }
}

fn normalize(item: &Value) -> FeedbackItem {
    let description = item.get("description");
    let offer_id = item
        .get("identifiers")
        .and_then(|i| i.get("offerId"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let text_of = |key: &str| -> String {
        description
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    FeedbackItem {
        external_id: item
            .get("feedbackId")
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default(),
        created_at: item
            .get("createdAt")
            .and_then(Value::as_str)
            .map(str::to_string),
        rating: item
            .get("statistics")
            .and_then(|s| s.get("rating"))
            .and_then(Value::as_i64),
        text: text_of("comment"),
        pros: text_of("advantages"),
        cons: text_of("disadvantages"),
        product_name: offer_id.clone(),
        product_external_id: (!offer_id.is_empty()).then_some(offer_id),
        raw: item.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> YandexMarketClient {
        YandexMarketClient::new("ym-key")
            .unwrap()
            .with_base_url(base_url.to_string())
            .with_business_id(4242)
    }

    fn feedback_entry(id: i64, rating: i64) -> serde_json::Value {
        serde_json::json!({
            "feedbackId": id,
            "createdAt": "2026-08-01T10:00:00Z",
            "statistics": {"rating": rating},
            "description": {
                "comment": "Нормально",
                "advantages": "Цена",
                "disadvantages": "Упаковка"
            },
            "identifiers": {"offerId": "SKU-7"}
        })
    }

    #[tokio::test]
    async fn fetch_follows_page_tokens() {
        let server = MockServer::start().await;
        let first_page = serde_json::json!({
            "status": "OK",
            "result": {
                "feedbacks": [feedback_entry(1, 5)],
                "paging": {"nextPageToken": "tok-2"}
            }
        });
        let second_page = serde_json::json!({
            "status": "OK",
            "result": {
                "feedbacks": [feedback_entry(2, 3)],
                "paging": {}
            }
        });

        Mock::given(method("POST"))
            .and(path("/v2/businesses/4242/goods-feedback"))
            .and(header("Api-Key", "ym-key"))
            .and(query_param("limit", "50"))
            .and(query_param("page_token", "tok-2"))
            .and(body_json(serde_json::json!({"reactionStatus": "NEED_REACTION"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(&second_page))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/businesses/4242/goods-feedback"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&first_page))
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).fetch_unanswered().await.unwrap();
        assert_eq!(result.items.len(), 2);
        let first = &result.items[0];
        assert_eq!(first.external_id, "1");
        assert_eq!(first.rating, Some(5));
        assert_eq!(first.text, "Нормально");
        assert_eq!(first.pros, "Цена");
        assert_eq!(first.cons, "Упаковка");
        assert_eq!(first.product_name, "SKU-7");
        assert_eq!(first.product_external_id.as_deref(), Some("SKU-7"));
        assert!(result.last_raw_page.is_some());
    }

    #[tokio::test]
    async fn fetch_rejects_non_ok_status_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/businesses/4242/goods-feedback"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ERROR",
                "errors": [{"code": "FORBIDDEN"}]
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .fetch_unanswered()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("error payload"), "got: {err}");
    }

    #[tokio::test]
    async fn fetch_without_business_id_is_a_config_error() {
        let client = YandexMarketClient::new("ym-key").unwrap();
        let err = client.fetch_unanswered().await.unwrap_err();
        assert!(matches!(err, OtklikError::Config(_)));
    }

    #[tokio::test]
    async fn detect_business_id_reads_first_campaign() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/campaigns"))
            .and(header("Api-Key", "ym-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "campaigns": [
                    {"id": 1, "business": {"id": 987}},
                    {"id": 2, "business": {"id": 654}}
                ]
            })))
            .mount(&server)
            .await;

        let id = test_client(&server.uri()).detect_business_id().await.unwrap();
        assert_eq!(id, 987);
    }

    #[tokio::test]
    async fn detect_business_id_fails_without_campaigns() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/campaigns"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"campaigns": []})),
            )
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .detect_business_id()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no campaigns"), "got: {err}");
    }

    #[tokio::test]
    async fn send_posts_comment_update() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/businesses/4242/goods-feedback/comments/update"))
            .and(body_json(serde_json::json!({
                "feedbackId": 555,
                "comment": {"text": "Спасибо!"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "result": {"id": 1}
            })))
            .mount(&server)
            .await;

        let ack = test_client(&server.uri())
            .send_response("555", "Спасибо!")
            .await
            .unwrap();
        assert_eq!(ack["status"], "OK");
    }

    #[tokio::test]
    async fn send_rejects_non_numeric_id() {
        let err = test_client("http://localhost:1")
            .send_response("fb-abc", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, OtklikError::Internal(_)));
    }
}
