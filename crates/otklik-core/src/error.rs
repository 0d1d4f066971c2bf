// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Otklik reply pipeline.

use thiserror::Error;

/// The primary error type used across the Otklik workspace.
///
/// The variants form a closed taxonomy: item-level faults (`Generation`)
/// are absorbed into feedback statuses by the sync pipeline, account-level
/// faults (`Transport` during fetch) abort one account's cycle, and
/// `Storage` faults abort the current operation.
#[derive(Debug, Error)]
pub enum OtklikError {
    /// Configuration errors (invalid TOML, missing required fields, bad account specs).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database open, query failure, migration failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Marketplace transport errors (non-success HTTP status, unparseable body,
    /// error payloads reported by the marketplace API).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generative-text backend errors (API failure, malformed response).
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An operation addressed a row that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
