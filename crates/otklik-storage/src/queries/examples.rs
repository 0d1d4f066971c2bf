// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Curated grounding examples and their relevance ranking.

use otklik_core::OtklikError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{ExampleInput, GroundingExample};

const COLUMNS: &str = "id, external_id, feedback_created_at, rating, user_name, text, \
                       pros, cons, product_name, product_description, product_benefits, \
                       answer_text, created_at";

fn example_from_row(row: &rusqlite::Row<'_>) -> Result<GroundingExample, rusqlite::Error> {
    Ok(GroundingExample {
        id: row.get(0)?,
        external_id: row.get(1)?,
        feedback_created_at: row.get(2)?,
        rating: row.get(3)?,
        user_name: row.get(4)?,
        text: row.get(5)?,
        pros: row.get(6)?,
        cons: row.get(7)?,
        product_name: row.get(8)?,
        product_description: row.get(9)?,
        product_benefits: row.get(10)?,
        answer_text: row.get(11)?,
        created_at: row.get(12)?,
    })
}

/// Insert or replace a grounding example, keyed by `external_id`.
pub async fn upsert(db: &Database, input: &ExampleInput) -> Result<i64, OtklikError> {
    let input = input.clone();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO rag_examples (external_id, feedback_created_at, rating,
                                           user_name, text, pros, cons, product_name,
                                           product_description, product_benefits, answer_text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT (external_id)
                 DO UPDATE SET feedback_created_at = excluded.feedback_created_at,
                               rating = excluded.rating,
                               user_name = excluded.user_name,
                               text = excluded.text,
                               pros = excluded.pros,
                               cons = excluded.cons,
                               product_name = excluded.product_name,
                               product_description = excluded.product_description,
                               product_benefits = excluded.product_benefits,
                               answer_text = excluded.answer_text",
                params![
                    input.external_id,
                    input.feedback_created_at,
                    input.rating,
                    input.user_name,
                    input.text,
                    input.pros,
                    input.cons,
                    input.product_name,
                    input.product_description,
                    input.product_benefits,
                    input.answer_text,
                ],
            )?;
            conn.query_row(
                "SELECT id FROM rag_examples WHERE external_id = ?1",
                params![input.external_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Rank examples for prompt grounding.
///
/// Exact product-name match dominates, then exact rating match, then
/// feedback recency, then id as the final tie-break. A `None` rating
/// never matches, so such lookups degrade to product + recency.
pub async fn rank(
    db: &Database,
    product_name: &str,
    rating: Option<i64>,
    limit: i64,
) -> Result<Vec<GroundingExample>, OtklikError> {
    let product_name = product_name.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<GroundingExample>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM rag_examples
                 ORDER BY CASE WHEN product_name = ?1 THEN 1 ELSE 0 END DESC,
                          CASE WHEN rating = ?2 THEN 1 ELSE 0 END DESC,
                          feedback_created_at DESC,
                          id DESC
                 LIMIT ?3"
            ))?;
            let rows = stmt.query_map(params![product_name, rating, limit], example_from_row)?;
            let mut examples = Vec::new();
            for row in rows {
                examples.push(row?);
            }
            Ok(examples)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get one example by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<GroundingExample>, OtklikError> {
    db.connection()
        .call(move |conn| -> Result<Option<GroundingExample>, rusqlite::Error> {
            let result = conn.query_row(
                &format!("SELECT {COLUMNS} FROM rag_examples WHERE id = ?1"),
                params![id],
                example_from_row,
            );
            match result {
                Ok(example) => Ok(Some(example)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all examples, newest feedback first.
pub async fn list(db: &Database) -> Result<Vec<GroundingExample>, OtklikError> {
    db.connection()
        .call(move |conn| -> Result<Vec<GroundingExample>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM rag_examples
                 ORDER BY feedback_created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], example_from_row)?;
            let mut examples = Vec::new();
            for row in rows {
                examples.push(row?);
            }
            Ok(examples)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete one example by id.
pub async fn delete(db: &Database, id: i64) -> Result<(), OtklikError> {
    let deleted = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute("DELETE FROM rag_examples WHERE id = ?1", params![id])
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if deleted == 0 {
        return Err(OtklikError::NotFound {
            entity: "rag_example",
            id,
        });
    }
    Ok(())
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

    fn example(
        external_id: &str,
        product_name: &str,
        rating: Option<i64>,
        feedback_created_at: &str,
    ) -> ExampleInput {
        ExampleInput {
            external_id: external_id.to_string(),
            feedback_created_at: Some(feedback_created_at.to_string()),
            rating,
            product_name: product_name.to_string(),
            answer_text: "Спасибо за отзыв!".to_string(),
            ..ExampleInput::default()
        }
    }

    #[tokio::test]
    async fn upsert_is_keyed_by_external_id() {
        let (db, _dir) = setup().await;
        let first = upsert(&db, &example("ex-1", "Чайник", Some(5), "2026-01-01"))
            .await
            .unwrap();
        let second = upsert(&db, &example("ex-1", "Утюг", Some(4), "2026-01-02"))
            .await
            .unwrap();
        assert_eq!(first, second);

        let all = list(&db).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].product_name, "Утюг");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ranking_prefers_product_then_rating_then_recency() {
        let (db, _dir) = setup().await;
        // Older, but matches the product exactly.
        upsert(&db, &example("product-match", "Чайник", Some(1), "2026-01-01"))
            .await
            .unwrap();
        // Matches only the rating.
        upsert(&db, &example("rating-match", "Утюг", Some(5), "2026-05-01"))
            .await
            .unwrap();
        // Matches nothing, but is the most recent.
        upsert(&db, &example("recent-only", "Пылесос", Some(2), "2026-08-01"))
            .await
            .unwrap();

        let ranked = rank(&db, "Чайник", Some(5), 10).await.unwrap();
        let order: Vec<&str> = ranked.iter().map(|e| e.external_id.as_str()).collect();
        assert_eq!(order, vec!["product-match", "rating-match", "recent-only"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ranking_without_rating_falls_back_to_recency() {
        let (db, _dir) = setup().await;
        upsert(&db, &example("older", "Утюг", Some(5), "2026-01-01"))
            .await
            .unwrap();
        upsert(&db, &example("newer", "Пылесос", Some(1), "2026-06-01"))
            .await
            .unwrap();

        // No product match and NULL rating: pure recency order.
        let ranked = rank(&db, "Чайник", None, 10).await.unwrap();
        let order: Vec<&str> = ranked.iter().map(|e| e.external_id.as_str()).collect();
        assert_eq!(order, vec!["newer", "older"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ranking_respects_limit() {
        let (db, _dir) = setup().await;
        for i in 0..5 {
            upsert(
                &db,
                &example(&format!("ex-{i}"), "Чайник", Some(5), "2026-01-01"),
            )
            .await
            .unwrap();
        }
        let ranked = rank(&db, "Чайник", Some(5), 3).await.unwrap();
        assert_eq!(ranked.len(), 3);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_removes_and_reports_missing() {
        let (db, _dir) = setup().await;
        let id = upsert(&db, &example("ex-1", "Чайник", Some(5), "2026-01-01"))
            .await
            .unwrap();
        assert!(get(&db, id).await.unwrap().is_some());
        delete(&db, id).await.unwrap();
        assert!(get(&db, id).await.unwrap().is_none());
        assert!(list(&db).await.unwrap().is_empty());

        let err = delete(&db, id).await.unwrap_err();
        assert!(matches!(err, OtklikError::NotFound { .. }));
        db.close().await.unwrap();
    }
}
