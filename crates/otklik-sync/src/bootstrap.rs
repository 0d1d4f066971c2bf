// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-run account bootstrap from configured tokens.

use otklik_config::{parse_account_specs, OtklikConfig};
use otklik_core::types::Platform;
use otklik_core::OtklikError;
use otklik_storage::FeedbackStore;
use tracing::info;

/// Create accounts from config for every platform that has tokens
/// configured and no accounts yet.
///
/// Once any account exists for a platform, that platform is skipped
/// entirely: accounts are managed in the store from then on, and config
/// edits must not resurrect deleted ones. Returns the number created.
pub async fn bootstrap_accounts(
    store: &FeedbackStore,
    config: &OtklikConfig,
) -> Result<usize, OtklikError> {
    let mut created = 0;
    let sections = [
        (Platform::Wildberries, &config.wildberries),
        (Platform::YandexMarket, &config.yandex_market),
    ];
    for (platform, section) in sections {
        let specs = parse_account_specs(section);
        if specs.is_empty() {
            continue;
        }
        if store.count_accounts_for_platform(platform).await? > 0 {
            continue;
        }
        for spec in &specs {
            store
                .create_account(platform, &spec.name, &spec.token, None)
                .await?;
            info!(platform = %platform, account = %spec.name, "bootstrapped account");
            created += 1;
        }
    }
    Ok(created)
}
