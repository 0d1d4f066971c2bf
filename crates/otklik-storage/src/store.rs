// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The high-level store facade the pipeline and CLI work against.

use otklik_core::types::{FeedbackItem, Platform, ProductItem, SkipReason};
use otklik_core::OtklikError;

use crate::database::Database;
use crate::models::{Account, ExampleInput, Feedback, GroundingExample, Product};
use crate::queries;

/// Facade over the SQLite-backed feedback store.
///
/// One instance owns the single writer connection for the process.
pub struct FeedbackStore {
    db: Database,
}

impl FeedbackStore {
    /// Open (or create) the store at `path` in WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, OtklikError> {
        Self::open_with(path, true).await
    }

    /// Open with an explicit journal-mode choice, from `storage.wal_mode`.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, OtklikError> {
        let db = Database::open(path, wal_mode).await?;
        Ok(Self { db })
    }

    /// Checkpoint and release before shutdown.
    pub async fn close(&self) -> Result<(), OtklikError> {
        self.db.close().await
    }

    // Accounts.

    pub async fn create_account(
        &self,
        platform: Platform,
        name: &str,
        api_token: &str,
        business_id: Option<i64>,
    ) -> Result<i64, OtklikError> {
        queries::accounts::create(&self.db, platform, name, api_token, business_id).await
    }

    pub async fn get_account(&self, id: i64) -> Result<Option<Account>, OtklikError> {
        queries::accounts::get(&self.db, id).await
    }

    pub async fn list_active_accounts(
        &self,
        platform: Option<Platform>,
    ) -> Result<Vec<Account>, OtklikError> {
        queries::accounts::list_active(&self.db, platform).await
    }

    pub async fn count_accounts_for_platform(
        &self,
        platform: Platform,
    ) -> Result<i64, OtklikError> {
        queries::accounts::count_for_platform(&self.db, platform).await
    }

    pub async fn deactivate_account(&self, id: i64) -> Result<(), OtklikError> {
        queries::accounts::deactivate(&self.db, id).await
    }

    pub async fn set_account_auto_reply(&self, id: i64, enabled: bool) -> Result<(), OtklikError> {
        queries::accounts::set_auto_reply(&self.db, id, enabled).await
    }

    pub async fn set_account_business_id(
        &self,
        id: i64,
        business_id: i64,
    ) -> Result<(), OtklikError> {
        queries::accounts::set_business_id(&self.db, id, business_id).await
    }

    // Feedbacks.

    pub async fn upsert_feedback(
        &self,
        account_id: i64,
        item: &FeedbackItem,
    ) -> Result<Feedback, OtklikError> {
        queries::feedbacks::upsert(&self.db, account_id, item).await
    }

    pub async fn get_feedback(&self, id: i64) -> Result<Option<Feedback>, OtklikError> {
        queries::feedbacks::get(&self.db, id).await
    }

    pub async fn list_new_feedbacks(&self, account_id: i64) -> Result<Vec<Feedback>, OtklikError> {
        queries::feedbacks::list_new(&self.db, account_id).await
    }

    pub async fn record_draft(
        &self,
        id: i64,
        response: &str,
        model: &str,
        prompt: &str,
    ) -> Result<(), OtklikError> {
        queries::feedbacks::record_draft(&self.db, id, response, model, prompt).await
    }

    pub async fn update_draft(&self, id: i64, draft: &str) -> Result<(), OtklikError> {
        queries::feedbacks::update_draft(&self.db, id, draft).await
    }

    pub async fn mark_skipped(&self, id: i64, reason: SkipReason) -> Result<(), OtklikError> {
        queries::feedbacks::mark_skipped(&self.db, id, reason).await
    }

    pub async fn mark_sent(
        &self,
        id: i64,
        response: &str,
        raw: &serde_json::Value,
    ) -> Result<(), OtklikError> {
        queries::feedbacks::mark_sent(&self.db, id, response, raw).await
    }

    pub async fn list_pending_feedbacks(
        &self,
        account_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Feedback>, OtklikError> {
        queries::feedbacks::list_pending(&self.db, account_id, limit).await
    }

    pub async fn list_sent_feedbacks(
        &self,
        account_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Feedback>, OtklikError> {
        queries::feedbacks::list_sent(&self.db, account_id, limit).await
    }

    // Products.

    pub async fn upsert_product(
        &self,
        account_id: i64,
        item: &ProductItem,
    ) -> Result<i64, OtklikError> {
        queries::products::upsert(&self.db, account_id, item).await
    }

    pub async fn list_products(&self, account_id: i64) -> Result<Vec<Product>, OtklikError> {
        queries::products::list(&self.db, account_id).await
    }

    /// Resolve the cached product backing a feedback, preferring the
    /// marketplace-native id and falling back to an exact name match.
    pub async fn find_product_context(
        &self,
        account_id: i64,
        product_external_id: Option<&str>,
        product_name: &str,
    ) -> Result<Option<Product>, OtklikError> {
        if let Some(external_id) = product_external_id {
            if !external_id.is_empty() {
                if let Some(product) =
                    queries::products::get_by_external_id(&self.db, account_id, external_id)
                        .await?
                {
                    return Ok(Some(product));
                }
            }
        }
        if product_name.is_empty() {
            return Ok(None);
        }
        queries::products::get_by_name(&self.db, account_id, product_name).await
    }

    // Grounding examples.

    pub async fn upsert_example(&self, input: &ExampleInput) -> Result<i64, OtklikError> {
        queries::examples::upsert(&self.db, input).await
    }

    pub async fn rank_examples(
        &self,
        product_name: &str,
        rating: Option<i64>,
        limit: i64,
    ) -> Result<Vec<GroundingExample>, OtklikError> {
        queries::examples::rank(&self.db, product_name, rating, limit).await
    }

    pub async fn get_example(&self, id: i64) -> Result<Option<GroundingExample>, OtklikError> {
        queries::examples::get(&self.db, id).await
    }

    pub async fn list_examples(&self) -> Result<Vec<GroundingExample>, OtklikError> {
        queries::examples::list(&self.db).await
    }

    pub async fn delete_example(&self, id: i64) -> Result<(), OtklikError> {
        queries::examples::delete(&self.db, id).await
    }

    // Settings.

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, OtklikError> {
        queries::settings::get_setting(&self.db, key).await
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), OtklikError> {
        queries::settings::set_setting(&self.db, key, value).await
    }

    pub async fn ensure_prompt_template(&self, configured: &str) -> Result<String, OtklikError> {
        queries::settings::ensure_prompt_template(&self.db, configured).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> (FeedbackStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("store.db");
        let store = FeedbackStore::open(db_path.to_str().unwrap()).await.unwrap();
        (store, dir)
    }

    fn product(external_id: &str, name: &str) -> ProductItem {
        ProductItem {
            external_id: external_id.to_string(),
            vendor_code: String::new(),
            name: name.to_string(),
            description: "desc".to_string(),
            brand: String::new(),
            characteristics: serde_json::json!([]),
            raw: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn product_context_prefers_external_id_over_name() {
        let (store, _dir) = setup().await;
        let account_id = store
            .create_account(Platform::Wildberries, "main", "tok", None)
            .await
            .unwrap();
        store
            .upsert_product(account_id, &product("by-id", "Чайник"))
            .await
            .unwrap();
        store
            .upsert_product(account_id, &product("by-name", "Утюг"))
            .await
            .unwrap();

        let hit = store
            .find_product_context(account_id, Some("by-id"), "Утюг")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.external_id, "by-id");

        let fallback = store
            .find_product_context(account_id, Some("unknown"), "Утюг")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fallback.external_id, "by-name");

        let none = store
            .find_product_context(account_id, None, "")
            .await
            .unwrap();
        assert!(none.is_none());
        store.close().await.unwrap();
    }
}
