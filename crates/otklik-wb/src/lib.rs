// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wildberries feedbacks API adapter.

pub mod client;

pub use client::WildberriesClient;
