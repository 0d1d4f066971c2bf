// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted row types.
//!
//! Timestamps are ISO-8601 strings as written by SQLite's `strftime`;
//! marketplace-supplied timestamps are stored verbatim.

use std::str::FromStr;

use otklik_core::types::{FeedbackStatus, Platform};
use serde::{Deserialize, Serialize};

/// One credential binding to a marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub platform: Platform,
    pub name: String,
    pub api_token: String,
    /// Lazily-discovered business identifier (Yandex Market only).
    pub business_id: Option<i64>,
    pub is_active: bool,
    pub auto_reply_enabled: bool,
    pub created_at: String,
}

/// One stored customer review/question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub account_id: i64,
    pub external_id: String,
    /// Marketplace-supplied creation timestamp.
    pub created_at: Option<String>,
    pub rating: Option<i64>,
    pub text: String,
    pub pros: String,
    pub cons: String,
    pub product_name: String,
    pub product_external_id: Option<String>,
    pub status: FeedbackStatus,
    pub raw_json: String,
    pub ai_response: Option<String>,
    pub ai_model: Option<String>,
    pub ai_prompt: Option<String>,
    pub ai_created_at: Option<String>,
    pub draft_response: Option<String>,
    pub sent_response: Option<String>,
    pub sent_raw: Option<String>,
    pub sent_at: Option<String>,
    pub last_seen_at: String,
}

/// Denormalized catalog cache row, read-only from the pipeline's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub account_id: i64,
    pub external_id: String,
    pub vendor_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    /// JSON array of name/value characteristic pairs.
    pub characteristics: Option<String>,
    pub raw_json: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One curated review/answer pair used as few-shot grounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingExample {
    pub id: i64,
    pub external_id: String,
    pub feedback_created_at: Option<String>,
    pub rating: Option<i64>,
    pub user_name: String,
    pub text: String,
    pub pros: String,
    pub cons: String,
    pub product_name: String,
    pub product_description: String,
    pub product_benefits: String,
    pub answer_text: String,
    pub created_at: String,
}

/// Input for upserting a grounding example, keyed by `external_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleInput {
    pub external_id: String,
    #[serde(default)]
    pub feedback_created_at: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub pros: String,
    #[serde(default)]
    pub cons: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub product_benefits: String,
    pub answer_text: String,
}

/// Parse a stored platform tag, surfacing a column-level conversion error.
pub(crate) fn parse_platform(idx: usize, raw: String) -> Result<Platform, rusqlite::Error> {
    Platform::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a stored status tag, surfacing a column-level conversion error.
pub(crate) fn parse_status(idx: usize, raw: String) -> Result<FeedbackStatus, rusqlite::Error> {
    FeedbackStatus::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
