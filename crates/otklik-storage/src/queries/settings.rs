// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value settings table.

use otklik_core::OtklikError;
use rusqlite::params;

use crate::database::Database;

/// The settings key holding the active prompt template.
pub const PROMPT_TEMPLATE_KEY: &str = "prompt_template";

pub async fn get_setting(db: &Database, key: &str) -> Result<Option<String>, OtklikError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            let result = conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            );
            match result {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn set_setting(db: &Database, key: &str, value: &str) -> Result<(), OtklikError> {
    let key = key.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT (key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Make sure the stored prompt template matches the configured one.
///
/// The configured template wins over a stale stored copy, so template
/// edits in config take effect on the next start. Returns the active
/// template.
pub async fn ensure_prompt_template(
    db: &Database,
    configured: &str,
) -> Result<String, OtklikError> {
    let stored = get_setting(db, PROMPT_TEMPLATE_KEY).await?;
    match stored {
        Some(value) if value == configured => Ok(value),
        _ => {
            set_setting(db, PROMPT_TEMPLATE_KEY, configured).await?;
            Ok(configured.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn set_and_get_round_trips() {
        let (db, _dir) = setup().await;
        assert!(get_setting(&db, "missing").await.unwrap().is_none());
        set_setting(&db, "k", "v1").await.unwrap();
        set_setting(&db, "k", "v2").await.unwrap();
        assert_eq!(get_setting(&db, "k").await.unwrap().as_deref(), Some("v2"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn configured_template_overrides_stored_copy() {
        let (db, _dir) = setup().await;
        let first = ensure_prompt_template(&db, "шаблон v1").await.unwrap();
        assert_eq!(first, "шаблон v1");

        let second = ensure_prompt_template(&db, "шаблон v2").await.unwrap();
        assert_eq!(second, "шаблон v2");
        assert_eq!(
            get_setting(&db, PROMPT_TEMPLATE_KEY).await.unwrap().as_deref(),
            Some("шаблон v2")
        );
        db.close().await.unwrap();
    }
}
