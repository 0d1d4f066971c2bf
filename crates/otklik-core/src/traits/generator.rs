// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response generator trait for generative-text backends.

use async_trait::async_trait;

use crate::error::OtklikError;

/// Adapter for the generative-text backend that drafts replies.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Model identifier recorded alongside each draft.
    fn model(&self) -> &str;

    /// Generates a reply for the rendered prompt.
    ///
    /// Fails with [`OtklikError::Generation`] on backend failure; the
    /// pipeline records the item as `ai_error` and continues.
    async fn generate(&self, prompt: &str) -> Result<String, OtklikError>;
}
