// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marketplace adapter trait for review platform integrations (Wildberries, Yandex Market).

use async_trait::async_trait;

use crate::error::OtklikError;
use crate::types::{FetchResult, Platform};

/// Adapter for one marketplace account binding.
///
/// Implementations own pagination, authentication headers, and payload
/// normalization. The sync pipeline treats `fetch_unanswered` as a single
/// call returning the full page set.
#[async_trait]
pub trait MarketplaceAdapter: Send + Sync {
    /// The platform this adapter talks to.
    fn platform(&self) -> Platform;

    /// Fetches all currently-unanswered feedback items.
    ///
    /// Fails with [`OtklikError::Transport`] on a non-success response or
    /// an unparseable body; the pipeline treats that as a whole-account
    /// failure for the current cycle.
    async fn fetch_unanswered(&self) -> Result<FetchResult, OtklikError>;

    /// Dispatches a reply to the marketplace.
    ///
    /// Returns the raw acknowledgment payload. Fails with
    /// [`OtklikError::Transport`]; the pipeline treats that as an
    /// item-level failure (the draft is kept).
    async fn send_response(
        &self,
        external_id: &str,
        text: &str,
    ) -> Result<serde_json::Value, OtklikError>;
}
