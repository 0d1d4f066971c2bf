// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Otklik sync pipeline.
//!
//! One pass walks every active account: fetch unanswered feedback,
//! ingest idempotently, classify by rating, draft replies against the
//! configured generator, and auto-dispatch where policy and the account
//! flag allow it.

pub mod bootstrap;
pub mod dispatch;
pub mod pipeline;
pub mod policy;
pub mod prompt;
pub mod runner;

pub use bootstrap::bootstrap_accounts;
pub use dispatch::manual_send;
pub use pipeline::{run_pass, sync_account, SyncContext};
pub use runner::run_forever;
