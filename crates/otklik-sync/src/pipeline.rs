// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-account sync cycle and the all-accounts pass.
//!
//! Failure isolation levels, from widest to narrowest:
//! - a pass never fails: each account is synced behind its own catch,
//! - an account cycle fails as a whole only on fetch/storage errors,
//! - generation and auto-send failures are item-level; the cycle
//!   continues with the next feedback.

use std::path::PathBuf;
use std::sync::Arc;

use otklik_core::traits::{MarketplaceAdapter, ResponseGenerator};
use otklik_core::types::{Platform, ReplyMode, SkipReason};
use otklik_core::OtklikError;
use otklik_storage::{Account, Feedback, FeedbackStore};
use otklik_wb::WildberriesClient;
use otklik_ym::YandexMarketClient;
use tracing::{info, warn};

use crate::policy;
use crate::prompt::{format_product_benefits, render_prompt, PromptPayload};

/// Everything one polling pass needs.
pub struct SyncContext {
    pub store: FeedbackStore,
    /// `None` when no generation credential is configured; draftable
    /// items are then parked as `ai_skipped_no_key`.
    pub generator: Option<Arc<dyn ResponseGenerator>>,
    /// Template from config; reconciled into settings each pass.
    pub configured_template: String,
    pub example_limit: i64,
    pub save_raw_pages: bool,
    pub raw_page_dir: PathBuf,
}

/// One pass over all active accounts. Account errors are logged and do
/// not stop the pass. Returns the number of accounts synced cleanly.
pub async fn run_pass(ctx: &SyncContext) -> usize {
    let template = match ctx.store.ensure_prompt_template(&ctx.configured_template).await {
        Ok(template) => template,
        Err(e) => {
            warn!(error = %e, "failed to reconcile prompt template, using configured value");
            ctx.configured_template.clone()
        }
    };

    let accounts = match ctx.store.list_active_accounts(None).await {
        Ok(accounts) => accounts,
        Err(e) => {
            warn!(error = %e, "failed to list accounts, skipping pass");
            return 0;
        }
    };

    let mut synced = 0;
    for account in &accounts {
        match sync_one_account(ctx, &template, account).await {
            Ok(fetched) => {
                info!(
                    account = %account.name,
                    platform = %account.platform,
                    fetched,
                    "account synced"
                );
                synced += 1;
            }
            Err(e) => {
                warn!(
                    account = %account.name,
                    platform = %account.platform,
                    error = %e,
                    "account sync failed"
                );
            }
        }
    }
    synced
}

async fn sync_one_account(
    ctx: &SyncContext,
    template: &str,
    account: &Account,
) -> Result<usize, OtklikError> {
    match account.platform {
        Platform::Wildberries => {
            let adapter = WildberriesClient::new(&account.api_token)?;
            sync_account(ctx, template, account, &adapter).await
        }
        Platform::YandexMarket => {
            let client = YandexMarketClient::new(&account.api_token)?;
            let business_id = match account.business_id {
                Some(id) => id,
                None => {
                    let id = client.detect_business_id().await?;
                    ctx.store.set_account_business_id(account.id, id).await?;
                    info!(account = %account.name, business_id = id, "discovered business id");
                    id
                }
            };
            let adapter = client.with_business_id(business_id);
            sync_account(ctx, template, account, &adapter).await
        }
    }
}

/// One account cycle: fetch, ingest, classify, draft, dispatch.
///
/// Returns the number of items fetched from the marketplace.
pub async fn sync_account(
    ctx: &SyncContext,
    template: &str,
    account: &Account,
    adapter: &dyn MarketplaceAdapter,
) -> Result<usize, OtklikError> {
    let fetched = adapter.fetch_unanswered().await?;
    for item in &fetched.items {
        ctx.store.upsert_feedback(account.id, item).await?;
    }
    if ctx.save_raw_pages && !fetched.items.is_empty() {
        if let Some(page) = &fetched.last_raw_page {
            write_raw_page(ctx, account, page);
        }
    }
    process_new(ctx, template, account, adapter).await?;
    Ok(fetched.items.len())
}

/// Audit copy of the last raw API page. Best effort: a full disk must not
/// stall the reply pipeline.
fn write_raw_page(ctx: &SyncContext, account: &Account, page: &serde_json::Value) {
    let path = ctx
        .raw_page_dir
        .join(format!("{}_last_page_{}.json", account.platform, account.id));
    let pretty = match serde_json::to_string_pretty(page) {
        Ok(pretty) => pretty,
        Err(e) => {
            warn!(error = %e, "failed to serialize raw page");
            return;
        }
    };
    if let Err(e) = std::fs::write(&path, pretty) {
        warn!(path = %path.display(), error = %e, "failed to write raw page audit file");
    }
}

async fn process_new(
    ctx: &SyncContext,
    template: &str,
    account: &Account,
    adapter: &dyn MarketplaceAdapter,
) -> Result<(), OtklikError> {
    let rows = ctx.store.list_new_feedbacks(account.id).await?;
    for row in rows {
        let mode = policy::decide_mode(row.rating);
        if mode == ReplyMode::Skip {
            ctx.store
                .mark_skipped(row.id, SkipReason::ManualNeeded)
                .await?;
            continue;
        }
        let mode = policy::apply_auto_reply(mode, account.auto_reply_enabled);

        let Some(generator) = &ctx.generator else {
            ctx.store
                .mark_skipped(row.id, SkipReason::AiSkippedNoKey)
                .await?;
            continue;
        };

        let prompt = build_item_prompt(ctx, template, account, &row).await?;
        let answer = match generator.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(
                    feedback = %row.external_id,
                    error = %e,
                    "draft generation failed"
                );
                ctx.store.mark_skipped(row.id, SkipReason::AiError).await?;
                continue;
            }
        };
        ctx.store
            .record_draft(row.id, &answer, generator.model(), &prompt)
            .await?;

        if mode == ReplyMode::AutoSend {
            match adapter.send_response(&row.external_id, &answer).await {
                Ok(ack) => {
                    ctx.store.mark_sent(row.id, &answer, &ack).await?;
                    info!(feedback = %row.external_id, "reply auto-sent");
                }
                Err(e) => {
                    // Row stays ai_generated with its draft; the operator
                    // can dispatch it manually.
                    warn!(
                        feedback = %row.external_id,
                        error = %e,
                        "auto-send failed, draft kept"
                    );
                }
            }
        }
    }
    Ok(())
}

async fn build_item_prompt(
    ctx: &SyncContext,
    template: &str,
    account: &Account,
    row: &Feedback,
) -> Result<String, OtklikError> {
    let product = ctx
        .store
        .find_product_context(
            account.id,
            row.product_external_id.as_deref(),
            &row.product_name,
        )
        .await?;

    let mut payload = PromptPayload::for_platform(account.platform);
    payload.text = row.text.clone();
    payload.rating = row.rating;
    payload.pros = row.pros.clone();
    payload.cons = row.cons.clone();
    payload.product_name = row.product_name.clone();
    if let Some(product) = &product {
        payload.product_title = product.name.clone().unwrap_or_default();
        payload.product_description = product.description.clone().unwrap_or_default();
        payload.product_benefits = format_product_benefits(product.characteristics.as_deref());
    }

    let examples = ctx
        .store
        .rank_examples(&row.product_name, row.rating, ctx.example_limit)
        .await?;
    Ok(render_prompt(template, &payload, &examples))
}
