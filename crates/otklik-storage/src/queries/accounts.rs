// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account CRUD operations.
//!
//! Accounts are never hard-deleted; deactivation clears `is_active` so
//! feedback foreign keys stay valid.

use otklik_core::types::Platform;
use otklik_core::OtklikError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{parse_platform, Account};

const COLUMNS: &str = "id, platform, name, api_token, business_id, is_active, \
                       auto_reply_enabled, created_at";

fn account_from_row(row: &rusqlite::Row<'_>) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        platform: parse_platform(1, row.get(1)?)?,
        name: row.get(2)?,
        api_token: row.get(3)?,
        business_id: row.get(4)?,
        is_active: row.get(5)?,
        auto_reply_enabled: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Create a new account. Returns the generated id.
pub async fn create(
    db: &Database,
    platform: Platform,
    name: &str,
    api_token: &str,
    business_id: Option<i64>,
) -> Result<i64, OtklikError> {
    let platform = platform.to_string();
    let name = name.to_string();
    let api_token = api_token.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO accounts (platform, name, api_token, business_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![platform, name, api_token, business_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an account by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Account>, OtklikError> {
    db.connection()
        .call(move |conn| -> Result<Option<Account>, rusqlite::Error> {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM accounts WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], account_from_row);
            match result {
                Ok(account) => Ok(Some(account)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List active accounts, optionally filtered by platform, in a stable order.
pub async fn list_active(
    db: &Database,
    platform: Option<Platform>,
) -> Result<Vec<Account>, OtklikError> {
    let platform = platform.map(|p| p.to_string());
    db.connection()
        .call(move |conn| -> Result<Vec<Account>, rusqlite::Error> {
            let mut accounts = Vec::new();
            match &platform {
                Some(tag) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {COLUMNS} FROM accounts
                         WHERE is_active = 1 AND platform = ?1
                         ORDER BY platform ASC, name ASC, id ASC"
                    ))?;
                    let rows = stmt.query_map(params![tag], account_from_row)?;
                    for row in rows {
                        accounts.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {COLUMNS} FROM accounts
                         WHERE is_active = 1
                         ORDER BY platform ASC, name ASC, id ASC"
                    ))?;
                    let rows = stmt.query_map([], account_from_row)?;
                    for row in rows {
                        accounts.push(row?);
                    }
                }
            }
            Ok(accounts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count accounts (active or not) for a platform. Used by the bootstrap path.
pub async fn count_for_platform(db: &Database, platform: Platform) -> Result<i64, OtklikError> {
    let platform = platform.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM accounts WHERE platform = ?1",
                params![platform],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Soft-delete an account by clearing its active flag.
pub async fn deactivate(db: &Database, id: i64) -> Result<(), OtklikError> {
    update_flag(db, id, "is_active", false).await
}

/// Toggle per-account auto-reply.
pub async fn set_auto_reply(db: &Database, id: i64, enabled: bool) -> Result<(), OtklikError> {
    update_flag(db, id, "auto_reply_enabled", enabled).await
}

async fn update_flag(
    db: &Database,
    id: i64,
    column: &'static str,
    value: bool,
) -> Result<(), OtklikError> {
    let updated = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                &format!("UPDATE accounts SET {column} = ?1 WHERE id = ?2"),
                params![value, id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(OtklikError::NotFound {
            entity: "account",
            id,
        });
    }
    Ok(())
}

/// Cache a discovered business identifier on the account.
pub async fn set_business_id(db: &Database, id: i64, business_id: i64) -> Result<(), OtklikError> {
    let updated = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE accounts SET business_id = ?1 WHERE id = ?2",
                params![business_id, id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(OtklikError::NotFound {
            entity: "account",
            id,
        });
    }
    Ok(())
}
