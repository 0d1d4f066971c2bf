// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Otklik workspace.
//!
//! Marketplace payloads are normalized into [`FeedbackItem`] and
//! [`ProductItem`] at the adapter boundary; everything downstream works
//! with these records and the closed status/mode enums.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported marketplace platforms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Platform {
    /// Wildberries (feedbacks API).
    #[strum(serialize = "wb")]
    #[serde(rename = "wb")]
    Wildberries,
    /// Yandex Market (goods-feedback API).
    #[strum(serialize = "ym")]
    #[serde(rename = "ym")]
    YandexMarket,
}

impl Platform {
    /// Human-readable label injected into prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Wildberries => "Wildberries",
            Platform::YandexMarket => "Яндекс Маркет",
        }
    }
}

/// Lifecycle status of a stored feedback row.
///
/// `New` is initial. `ManualNeeded`, `AiSkippedNoKey`, and `AiError` are
/// holding states awaiting operator intervention. `Sent` is terminal.
/// Re-ingestion of a known item never resets this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum FeedbackStatus {
    #[strum(serialize = "new")]
    #[serde(rename = "new")]
    New,
    #[strum(serialize = "ai_generated")]
    #[serde(rename = "ai_generated")]
    AiGenerated,
    #[strum(serialize = "sent")]
    #[serde(rename = "sent")]
    Sent,
    #[strum(serialize = "manual_needed")]
    #[serde(rename = "manual_needed")]
    ManualNeeded,
    #[strum(serialize = "ai_skipped_no_key")]
    #[serde(rename = "ai_skipped_no_key")]
    AiSkippedNoKey,
    #[strum(serialize = "ai_error")]
    #[serde(rename = "ai_error")]
    AiError,
}

/// Reason a feedback item was parked in a holding state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum SkipReason {
    /// Rating outside the auto-reply range; operator must answer.
    #[strum(serialize = "manual_needed")]
    ManualNeeded,
    /// No generation credential configured.
    #[strum(serialize = "ai_skipped_no_key")]
    AiSkippedNoKey,
    /// The generation call failed.
    #[strum(serialize = "ai_error")]
    AiError,
}

impl SkipReason {
    /// The status a skipped row lands in.
    pub fn status(self) -> FeedbackStatus {
        match self {
            SkipReason::ManualNeeded => FeedbackStatus::ManualNeeded,
            SkipReason::AiSkippedNoKey => FeedbackStatus::AiSkippedNoKey,
            SkipReason::AiError => FeedbackStatus::AiError,
        }
    }
}

/// Handling mode for one feedback item, decided by the reply policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// Do not draft; park as `manual_needed`.
    Skip,
    /// Draft a reply but leave dispatch to the operator.
    ManualConfirm,
    /// Draft and dispatch automatically.
    AutoSend,
}

/// One customer review/question normalized from a marketplace payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    /// Marketplace-native identifier.
    pub external_id: String,
    /// Marketplace-supplied creation timestamp, verbatim.
    pub created_at: Option<String>,
    /// Numeric rating; `None` when the marketplace did not report one.
    pub rating: Option<i64>,
    pub text: String,
    pub pros: String,
    pub cons: String,
    pub product_name: String,
    /// Marketplace-native product identifier, when reported.
    pub product_external_id: Option<String>,
    /// Raw source payload, preserved for audit.
    pub raw: serde_json::Value,
}

/// One catalog product normalized from a marketplace payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductItem {
    pub external_id: String,
    pub vendor_code: String,
    pub name: String,
    pub description: String,
    pub brand: String,
    /// Characteristic name/value pairs as reported by the marketplace.
    pub characteristics: serde_json::Value,
    pub raw: serde_json::Value,
}

/// Result of one unanswered-feedback fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Normalized items, all pages flattened.
    pub items: Vec<FeedbackItem>,
    /// The last raw page returned by the API, kept for audit logging.
    pub last_raw_page: Option<serde_json::Value>,
}
