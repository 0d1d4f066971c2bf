// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed persistence for the Otklik pipeline.
//!
//! A single [`FeedbackStore`] per process wraps a tokio-rusqlite
//! connection; every write goes through its background writer thread.
//! Schema lives in embedded refinery migrations under `migrations/`.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

pub use database::Database;
pub use models::{Account, ExampleInput, Feedback, GroundingExample, Product};
pub use store::FeedbackStore;
