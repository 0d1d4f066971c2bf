// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-initiated dispatch of an edited draft.

use otklik_core::traits::MarketplaceAdapter;
use otklik_core::OtklikError;
use otklik_storage::FeedbackStore;
use tracing::info;

/// Send `text` as the reply to a stored feedback.
///
/// Re-validates the account before touching the wire: the row may have
/// been ingested under an account that was deactivated since, and the
/// caller may hand us an adapter for the wrong platform.
pub async fn manual_send(
    store: &FeedbackStore,
    adapter: &dyn MarketplaceAdapter,
    feedback_id: i64,
    text: &str,
) -> Result<(), OtklikError> {
    let feedback = store
        .get_feedback(feedback_id)
        .await?
        .ok_or(OtklikError::NotFound {
            entity: "feedback",
            id: feedback_id,
        })?;
    let account = store
        .get_account(feedback.account_id)
        .await?
        .ok_or(OtklikError::NotFound {
            entity: "account",
            id: feedback.account_id,
        })?;
    if !account.is_active {
        return Err(OtklikError::Internal(format!(
            "account {} is inactive, refusing to send",
            account.id
        )));
    }
    if account.platform != adapter.platform() {
        return Err(OtklikError::Internal(format!(
            "adapter platform {} does not match account platform {}",
            adapter.platform(),
            account.platform
        )));
    }

    let ack = adapter.send_response(&feedback.external_id, text).await?;
    store.update_draft(feedback_id, text).await?;
    store.mark_sent(feedback_id, text, &ack).await?;
    info!(feedback = %feedback.external_id, "reply sent manually");
    Ok(())
}
