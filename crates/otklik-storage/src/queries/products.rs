// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog product cache.
//!
//! Unlike feedbacks, product re-ingestion replaces the snapshot: the
//! catalog is a cache of current marketplace state, not an event log.

use otklik_core::types::ProductItem;
use otklik_core::OtklikError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Product;

const COLUMNS: &str = "id, account_id, external_id, vendor_code, name, description, \
                       brand, characteristics, raw_json, created_at, updated_at";

fn product_from_row(row: &rusqlite::Row<'_>) -> Result<Product, rusqlite::Error> {
    Ok(Product {
        id: row.get(0)?,
        account_id: row.get(1)?,
        external_id: row.get(2)?,
        vendor_code: row.get(3)?,
        name: row.get(4)?,
        description: row.get(5)?,
        brand: row.get(6)?,
        characteristics: row.get(7)?,
        raw_json: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Insert or fully refresh a product snapshot.
pub async fn upsert(
    db: &Database,
    account_id: i64,
    item: &ProductItem,
) -> Result<i64, OtklikError> {
    let characteristics = serde_json::to_string(&item.characteristics)
        .map_err(|e| OtklikError::Internal(format!("failed to serialize characteristics: {e}")))?;
    let raw_json = serde_json::to_string(&item.raw)
        .map_err(|e| OtklikError::Internal(format!("failed to serialize raw product: {e}")))?;
    let item = item.clone();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO products (account_id, external_id, vendor_code, name,
                                       description, brand, characteristics, raw_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (account_id, external_id)
                 DO UPDATE SET vendor_code = excluded.vendor_code,
                               name = excluded.name,
                               description = excluded.description,
                               brand = excluded.brand,
                               characteristics = excluded.characteristics,
                               raw_json = excluded.raw_json,
                               updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    account_id,
                    item.external_id,
                    item.vendor_code,
                    item.name,
                    item.description,
                    item.brand,
                    characteristics,
                    raw_json,
                ],
            )?;
            conn.query_row(
                "SELECT id FROM products WHERE account_id = ?1 AND external_id = ?2",
                params![account_id, item.external_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a product by its marketplace-native identifier.
pub async fn get_by_external_id(
    db: &Database,
    account_id: i64,
    external_id: &str,
) -> Result<Option<Product>, OtklikError> {
    let external_id = external_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Product>, rusqlite::Error> {
            let result = conn.query_row(
                &format!(
                    "SELECT {COLUMNS} FROM products
                     WHERE account_id = ?1 AND external_id = ?2"
                ),
                params![account_id, external_id],
                product_from_row,
            );
            match result {
                Ok(product) => Ok(Some(product)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a product by exact display name. Ambiguity resolves to the
/// most recently updated row.
pub async fn get_by_name(
    db: &Database,
    account_id: i64,
    name: &str,
) -> Result<Option<Product>, OtklikError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Product>, rusqlite::Error> {
            let result = conn.query_row(
                &format!(
                    "SELECT {COLUMNS} FROM products
                     WHERE account_id = ?1 AND name = ?2
                     ORDER BY updated_at DESC, id DESC
                     LIMIT 1"
                ),
                params![account_id, name],
                product_from_row,
            );
            match result {
                Ok(product) => Ok(Some(product)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all cached products for an account.
pub async fn list(db: &Database, account_id: i64) -> Result<Vec<Product>, OtklikError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Product>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM products
                 WHERE account_id = ?1
                 ORDER BY name ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![account_id], product_from_row)?;
            let mut products = Vec::new();
            for row in rows {
                products.push(row?);
            }
            Ok(products)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
