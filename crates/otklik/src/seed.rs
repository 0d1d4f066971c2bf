// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grounding-example seeding from a JSON file.

use std::path::Path;

use otklik_core::OtklikError;
use otklik_storage::{ExampleInput, FeedbackStore};
use tracing::info;

/// Upsert every example in the JSON array at `path`.
///
/// Each entry needs `external_id` and `answer_text`; everything else
/// defaults to empty. Entries with an empty `external_id` are rejected
/// before any row is written.
pub async fn seed_examples(store: &FeedbackStore, path: &Path) -> Result<usize, OtklikError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        OtklikError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let examples: Vec<ExampleInput> = serde_json::from_str(&raw).map_err(|e| {
        OtklikError::Config(format!("invalid seed file {}: {e}", path.display()))
    })?;
    for example in &examples {
        if example.external_id.is_empty() {
            return Err(OtklikError::Config(format!(
                "seed file {}: entry without external_id",
                path.display()
            )));
        }
    }

    let mut count = 0;
    for example in &examples {
        store.upsert_example(example).await?;
        count += 1;
    }
    info!(count, path = %path.display(), "seeded grounding examples");
    Ok(count)
}
