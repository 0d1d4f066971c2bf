// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The polling loop.

use std::time::Duration;

use tracing::info;

use crate::pipeline::{run_pass, SyncContext};

/// Run polling passes forever.
///
/// The loop is the sole retry mechanism: rows left in `new` re-process
/// fully next pass, rows in `ai_generated` wait for the operator.
/// `run_pass` already isolates account failures, so nothing here can
/// terminate the loop short of task cancellation.
pub async fn run_forever(ctx: &SyncContext, poll_interval: Duration) {
    loop {
        let synced = run_pass(ctx).await;
        info!(synced, sleep_secs = poll_interval.as_secs(), "pass complete");
        tokio::time::sleep(poll_interval).await;
    }
}
