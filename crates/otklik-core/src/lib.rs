// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Otklik reply pipeline.
//!
//! This crate provides the error type, the normalized domain types, and the
//! adapter traits implemented by the marketplace and generator crates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::OtklikError;
pub use traits::{MarketplaceAdapter, ResponseGenerator};
pub use types::{
    FeedbackItem, FeedbackStatus, FetchResult, Platform, ProductItem, ReplyMode, SkipReason,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_has_all_variants() {
        let _config = OtklikError::Config("test".into());
        let _storage = OtklikError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _transport = OtklikError::Transport {
            message: "test".into(),
            source: None,
        };
        let _generation = OtklikError::Generation {
            message: "test".into(),
            source: None,
        };
        let _not_found = OtklikError::NotFound {
            entity: "feedback",
            id: 1,
        };
        let _internal = OtklikError::Internal("test".into());
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = OtklikError::NotFound {
            entity: "feedback",
            id: 42,
        };
        assert_eq!(err.to_string(), "feedback not found: 42");
    }
}
