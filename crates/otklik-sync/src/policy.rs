// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rating-based reply policy.

use otklik_core::types::ReplyMode;

/// Decide how to handle a feedback from its rating alone.
///
/// No rating means the item cannot be classified and goes to the
/// operator. Ratings below 1 (malformed payloads) do the same.
pub fn decide_mode(rating: Option<i64>) -> ReplyMode {
    match rating {
        None => ReplyMode::Skip,
        Some(value) if value >= 4 => ReplyMode::AutoSend,
        Some(value) if value >= 1 => ReplyMode::ManualConfirm,
        Some(_) => ReplyMode::Skip,
    }
}

/// Downgrade auto-send when the account has auto-reply disabled.
///
/// The draft is still generated; only dispatch is suppressed.
pub fn apply_auto_reply(mode: ReplyMode, auto_reply_enabled: bool) -> ReplyMode {
    if mode == ReplyMode::AutoSend && !auto_reply_enabled {
        ReplyMode::ManualConfirm
    } else {
        mode
    }
}
