// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback persistence and the status state machine.
//!
//! Ingestion is idempotent on `(account_id, external_id)`: a re-seen
//! feedback only refreshes `last_seen_at`, never its content or status.
//! `sent` is terminal; no update here may move a row out of it except
//! `mark_sent` itself re-recording a send.

use otklik_core::types::{FeedbackItem, SkipReason};
use otklik_core::OtklikError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{parse_status, Feedback};

const COLUMNS: &str = "id, account_id, external_id, created_at, rating, text, pros, cons, \
                       product_name, product_external_id, status, raw_json, ai_response, \
                       ai_model, ai_prompt, ai_created_at, draft_response, sent_response, \
                       sent_raw, sent_at, last_seen_at";

const PREFIXED_COLUMNS: &str =
    "f.id, f.account_id, f.external_id, f.created_at, f.rating, f.text, f.pros, f.cons, \
     f.product_name, f.product_external_id, f.status, f.raw_json, f.ai_response, \
     f.ai_model, f.ai_prompt, f.ai_created_at, f.draft_response, f.sent_response, \
     f.sent_raw, f.sent_at, f.last_seen_at";

fn feedback_from_row(row: &rusqlite::Row<'_>) -> Result<Feedback, rusqlite::Error> {
    Ok(Feedback {
        id: row.get(0)?,
        account_id: row.get(1)?,
        external_id: row.get(2)?,
        created_at: row.get(3)?,
        rating: row.get(4)?,
        text: row.get(5)?,
        pros: row.get(6)?,
        cons: row.get(7)?,
        product_name: row.get(8)?,
        product_external_id: row.get(9)?,
        status: parse_status(10, row.get(10)?)?,
        raw_json: row.get(11)?,
        ai_response: row.get(12)?,
        ai_model: row.get(13)?,
        ai_prompt: row.get(14)?,
        ai_created_at: row.get(15)?,
        draft_response: row.get(16)?,
        sent_response: row.get(17)?,
        sent_raw: row.get(18)?,
        sent_at: row.get(19)?,
        last_seen_at: row.get(20)?,
    })
}

/// Ingest one fetched feedback, idempotently.
///
/// First sighting inserts the full snapshot with status `new`. Any later
/// sighting of the same `(account_id, external_id)` only touches
/// `last_seen_at`. Returns the stored row either way.
pub async fn upsert(
    db: &Database,
    account_id: i64,
    item: &FeedbackItem,
) -> Result<Feedback, OtklikError> {
    let raw_json = serde_json::to_string(&item.raw)
        .map_err(|e| OtklikError::Internal(format!("failed to serialize raw feedback: {e}")))?;
    let item = item.clone();
    db.connection()
        .call(move |conn| -> Result<Feedback, rusqlite::Error> {
            conn.execute(
                "INSERT INTO feedbacks (account_id, external_id, created_at, rating, text,
                                        pros, cons, product_name, product_external_id, raw_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT (account_id, external_id)
                 DO UPDATE SET last_seen_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    account_id,
                    item.external_id,
                    item.created_at,
                    item.rating,
                    item.text,
                    item.pros,
                    item.cons,
                    item.product_name,
                    item.product_external_id,
                    raw_json,
                ],
            )?;
            conn.query_row(
                &format!(
                    "SELECT {COLUMNS} FROM feedbacks
                     WHERE account_id = ?1 AND external_id = ?2"
                ),
                params![account_id, item.external_id],
                feedback_from_row,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a feedback by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Feedback>, OtklikError> {
    db.connection()
        .call(move |conn| -> Result<Option<Feedback>, rusqlite::Error> {
            let result = conn.query_row(
                &format!("SELECT {COLUMNS} FROM feedbacks WHERE id = ?1"),
                params![id],
                feedback_from_row,
            );
            match result {
                Ok(feedback) => Ok(Some(feedback)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List unprocessed feedbacks for one account, oldest first.
pub async fn list_new(db: &Database, account_id: i64) -> Result<Vec<Feedback>, OtklikError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Feedback>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM feedbacks
                 WHERE account_id = ?1 AND status = 'new'
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![account_id], feedback_from_row)?;
            let mut feedbacks = Vec::new();
            for row in rows {
                feedbacks.push(row?);
            }
            Ok(feedbacks)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a generated draft and advance the row to `ai_generated`.
pub async fn record_draft(
    db: &Database,
    id: i64,
    response: &str,
    model: &str,
    prompt: &str,
) -> Result<(), OtklikError> {
    let response = response.to_string();
    let model = model.to_string();
    let prompt = prompt.to_string();
    let updated = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE feedbacks
                 SET ai_response = ?1,
                     ai_model = ?2,
                     ai_prompt = ?3,
                     ai_created_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     draft_response = ?1,
                     status = 'ai_generated'
                 WHERE id = ?4",
                params![response, model, prompt, id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(OtklikError::NotFound {
            entity: "feedback",
            id,
        });
    }
    Ok(())
}

/// Replace the editable draft text without touching status.
pub async fn update_draft(db: &Database, id: i64, draft: &str) -> Result<(), OtklikError> {
    let draft = draft.to_string();
    let updated = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE feedbacks SET draft_response = ?1 WHERE id = ?2",
                params![draft, id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(OtklikError::NotFound {
            entity: "feedback",
            id,
        });
    }
    Ok(())
}

/// Move a feedback into the skip status matching `reason`.
///
/// Rows already `sent` are left untouched; skipping them is a no-op, not
/// an error. A missing row is `NotFound`.
pub async fn mark_skipped(db: &Database, id: i64, reason: SkipReason) -> Result<(), OtklikError> {
    let status = reason.status().to_string();
    let exists = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let updated = conn.execute(
                "UPDATE feedbacks SET status = ?1 WHERE id = ?2 AND status != 'sent'",
                params![status, id],
            )?;
            if updated > 0 {
                return Ok(true);
            }
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM feedbacks WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if !exists {
        return Err(OtklikError::NotFound {
            entity: "feedback",
            id,
        });
    }
    Ok(())
}

/// Record a dispatched reply and move the row to the terminal `sent` status.
pub async fn mark_sent(
    db: &Database,
    id: i64,
    response: &str,
    raw: &serde_json::Value,
) -> Result<(), OtklikError> {
    let response = response.to_string();
    let raw = serde_json::to_string(raw)
        .map_err(|e| OtklikError::Internal(format!("failed to serialize send receipt: {e}")))?;
    let updated = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE feedbacks
                 SET status = 'sent',
                     sent_response = ?1,
                     sent_raw = ?2,
                     sent_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?3",
                params![response, raw, id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(OtklikError::NotFound {
            entity: "feedback",
            id,
        });
    }
    Ok(())
}

/// List feedbacks still awaiting a reply across active accounts, newest
/// first. `account_id` narrows to one account.
pub async fn list_pending(
    db: &Database,
    account_id: Option<i64>,
    limit: i64,
) -> Result<Vec<Feedback>, OtklikError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Feedback>, rusqlite::Error> {
            let mut feedbacks = Vec::new();
            match account_id {
                Some(account_id) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {PREFIXED_COLUMNS} FROM feedbacks f
                         JOIN accounts a ON a.id = f.account_id
                         WHERE f.status != 'sent' AND a.is_active = 1 AND f.account_id = ?1
                         ORDER BY f.created_at DESC, f.id DESC
                         LIMIT ?2"
                    ))?;
                    let rows = stmt.query_map(params![account_id, limit], feedback_from_row)?;
                    for row in rows {
                        feedbacks.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {PREFIXED_COLUMNS} FROM feedbacks f
                         JOIN accounts a ON a.id = f.account_id
                         WHERE f.status != 'sent' AND a.is_active = 1
                         ORDER BY f.created_at DESC, f.id DESC
                         LIMIT ?1"
                    ))?;
                    let rows = stmt.query_map(params![limit], feedback_from_row)?;
                    for row in rows {
                        feedbacks.push(row?);
                    }
                }
            }
            Ok(feedbacks)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List already-answered feedbacks, most recently sent first.
pub async fn list_sent(
    db: &Database,
    account_id: Option<i64>,
    limit: i64,
) -> Result<Vec<Feedback>, OtklikError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Feedback>, rusqlite::Error> {
            let mut feedbacks = Vec::new();
            match account_id {
                Some(account_id) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {COLUMNS} FROM feedbacks
                         WHERE status = 'sent' AND account_id = ?1
                         ORDER BY sent_at DESC, id DESC
                         LIMIT ?2"
                    ))?;
                    let rows = stmt.query_map(params![account_id, limit], feedback_from_row)?;
                    for row in rows {
                        feedbacks.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {COLUMNS} FROM feedbacks
                         WHERE status = 'sent'
                         ORDER BY sent_at DESC, id DESC
                         LIMIT ?1"
                    ))?;
                    let rows = stmt.query_map(params![limit], feedback_from_row)?;
                    for row in rows {
                        feedbacks.push(row?);
                    }
                }
            }
            Ok(feedbacks)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use otklik_core::types::{FeedbackStatus, Platform};
    use tempfile::tempdir;

    use crate::queries::accounts;

    async fn setup() -> (Database, i64, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        let account_id = accounts::create(&db, Platform::Wildberries, "main", "tok", None)
            .await
            .unwrap();
        (db, account_id, dir)
    }

    fn item(external_id: &str, rating: Option<i64>, text: &str) -> FeedbackItem {
        FeedbackItem {
            external_id: external_id.to_string(),
            created_at: Some("2026-08-01T10:00:00Z".to_string()),
            rating,
            text: text.to_string(),
            pros: String::new(),
            cons: String::new(),
            product_name: "Чайник".to_string(),
            product_external_id: Some("100500".to_string()),
            raw: serde_json::json!({"id": external_id}),
        }
    }

    #[tokio::test]
    async fn first_upsert_inserts_with_status_new() {
        let (db, account_id, _dir) = setup().await;
        let row = upsert(&db, account_id, &item("fb-1", Some(5), "Отлично"))
            .await
            .unwrap();
        assert_eq!(row.status, FeedbackStatus::New);
        assert_eq!(row.external_id, "fb-1");
        assert_eq!(row.rating, Some(5));
        assert_eq!(row.text, "Отлично");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reupsert_keeps_first_snapshot_and_refreshes_last_seen() {
        let (db, account_id, _dir) = setup().await;
        let first = upsert(&db, account_id, &item("fb-1", Some(5), "Отлично"))
            .await
            .unwrap();

        // Age the sighting marker so the refresh is observable.
        db.connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "UPDATE feedbacks SET last_seen_at = '2000-01-01T00:00:00.000Z'
                     WHERE id = ?1",
                    params![first.id],
                )
            })
            .await
            .unwrap();

        // Same external id, mutated content: the snapshot must not change.
        let second = upsert(&db, account_id, &item("fb-1", Some(1), "Передумал"))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.rating, Some(5));
        assert_eq!(second.text, "Отлично");
        assert_ne!(second.last_seen_at, "2000-01-01T00:00:00.000Z");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_external_id_on_two_accounts_stays_separate() {
        let (db, account_id, _dir) = setup().await;
        let other = accounts::create(&db, Platform::YandexMarket, "ym", "tok2", None)
            .await
            .unwrap();
        let a = upsert(&db, account_id, &item("fb-1", Some(5), "a"))
            .await
            .unwrap();
        let b = upsert(&db, other, &item("fb-1", Some(4), "b")).await.unwrap();
        assert_ne!(a.id, b.id);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reupsert_never_resets_a_processed_status() {
        let (db, account_id, _dir) = setup().await;
        let row = upsert(&db, account_id, &item("fb-1", Some(2), "Плохо"))
            .await
            .unwrap();
        mark_skipped(&db, row.id, SkipReason::ManualNeeded)
            .await
            .unwrap();

        let again = upsert(&db, account_id, &item("fb-1", Some(2), "Плохо"))
            .await
            .unwrap();
        assert_eq!(again.status, FeedbackStatus::ManualNeeded);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_new_orders_oldest_first_and_excludes_processed() {
        let (db, account_id, _dir) = setup().await;
        let mut newer = item("fb-new", Some(5), "recent");
        newer.created_at = Some("2026-08-02T00:00:00Z".to_string());
        let mut older = item("fb-old", Some(5), "old");
        older.created_at = Some("2026-08-01T00:00:00Z".to_string());

        upsert(&db, account_id, &newer).await.unwrap();
        upsert(&db, account_id, &older).await.unwrap();
        let skipped = upsert(&db, account_id, &item("fb-skip", None, ""))
            .await
            .unwrap();
        mark_skipped(&db, skipped.id, SkipReason::ManualNeeded)
            .await
            .unwrap();

        let pending = list_new(&db, account_id).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].external_id, "fb-old");
        assert_eq!(pending[1].external_id, "fb-new");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn record_draft_stores_generation_and_advances_status() {
        let (db, account_id, _dir) = setup().await;
        let row = upsert(&db, account_id, &item("fb-1", Some(5), "Отлично"))
            .await
            .unwrap();
        record_draft(&db, row.id, "Спасибо за отзыв!", "gpt-4o-mini", "PROMPT")
            .await
            .unwrap();

        let row = get(&db, row.id).await.unwrap().unwrap();
        assert_eq!(row.status, FeedbackStatus::AiGenerated);
        assert_eq!(row.ai_response.as_deref(), Some("Спасибо за отзыв!"));
        assert_eq!(row.draft_response.as_deref(), Some("Спасибо за отзыв!"));
        assert_eq!(row.ai_model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(row.ai_prompt.as_deref(), Some("PROMPT"));
        assert!(row.ai_created_at.is_some());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn mark_sent_is_terminal_against_skips() {
        let (db, account_id, _dir) = setup().await;
        let row = upsert(&db, account_id, &item("fb-1", Some(5), "Отлично"))
            .await
            .unwrap();
        mark_sent(&db, row.id, "Спасибо!", &serde_json::json!({"ok": true}))
            .await
            .unwrap();

        // Late skip attempt is ignored, not an error.
        mark_skipped(&db, row.id, SkipReason::AiError).await.unwrap();

        let row = get(&db, row.id).await.unwrap().unwrap();
        assert_eq!(row.status, FeedbackStatus::Sent);
        assert_eq!(row.sent_response.as_deref(), Some("Спасибо!"));
        assert!(row.sent_at.is_some());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn status_updates_on_missing_row_return_not_found() {
        let (db, _account_id, _dir) = setup().await;
        let err = mark_skipped(&db, 777, SkipReason::AiError).await.unwrap_err();
        assert!(matches!(
            err,
            OtklikError::NotFound {
                entity: "feedback",
                id: 777
            }
        ));
        let err = record_draft(&db, 777, "x", "m", "p").await.unwrap_err();
        assert!(matches!(err, OtklikError::NotFound { .. }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn pending_and_sent_listings() {
        let (db, account_id, _dir) = setup().await;
        let inactive = accounts::create(&db, Platform::Wildberries, "old", "t", None)
            .await
            .unwrap();
        accounts::deactivate(&db, inactive).await.unwrap();

        let kept = upsert(&db, account_id, &item("fb-keep", Some(3), "so-so"))
            .await
            .unwrap();
        let hidden = upsert(&db, inactive, &item("fb-hidden", Some(3), "x"))
            .await
            .unwrap();
        let done = upsert(&db, account_id, &item("fb-done", Some(5), "great"))
            .await
            .unwrap();
        mark_sent(&db, done.id, "Спасибо!", &serde_json::json!({}))
            .await
            .unwrap();

        let pending = list_pending(&db, None, 50).await.unwrap();
        let ids: Vec<i64> = pending.iter().map(|f| f.id).collect();
        assert!(ids.contains(&kept.id));
        assert!(!ids.contains(&hidden.id), "inactive account rows are hidden");
        assert!(!ids.contains(&done.id));

        let scoped = list_pending(&db, Some(account_id), 50).await.unwrap();
        assert_eq!(scoped.len(), 1);

        let sent = list_sent(&db, None, 10).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, done.id);
        db.close().await.unwrap();
    }
}
