// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account spec parsing for the bootstrap path.
//!
//! Specs come from the `accounts` list (`"name:token"` or a bare token) or,
//! when that list is empty, from the legacy single `token` field.

use crate::model::MarketplaceAccountsConfig;

/// One credential binding parsed from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSpec {
    /// Display name for the synthesized account.
    pub name: String,
    /// Secret API token.
    pub token: String,
}

/// Parse the account specs for one platform.
///
/// Entries without a `name:` part get positional names (`account_1`, ...).
/// Entries with an empty token are dropped. The legacy single token, when
/// used, is named `default`.
pub fn parse_account_specs(config: &MarketplaceAccountsConfig) -> Vec<AccountSpec> {
    let mut specs = Vec::new();
    if !config.accounts.is_empty() {
        for (idx, raw) in config.accounts.iter().enumerate() {
            let part = raw.trim();
            if part.is_empty() {
                continue;
            }
            let (name, token) = match part.split_once(':') {
                Some((name, token)) => (name.trim().to_string(), token.trim().to_string()),
                None => (format!("account_{}", idx + 1), part.to_string()),
            };
            if token.is_empty() {
                continue;
            }
            specs.push(AccountSpec { name, token });
        }
    } else if let Some(token) = config.token.as_deref() {
        let token = token.trim();
        if !token.is_empty() {
            specs.push(AccountSpec {
                name: "default".to_string(),
                token: token.to_string(),
            });
        }
    }
    specs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>, accounts: &[&str]) -> MarketplaceAccountsConfig {
        MarketplaceAccountsConfig {
            token: token.map(str::to_string),
            accounts: accounts.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn named_and_bare_tokens_parse() {
        let specs = parse_account_specs(&config(None, &["main:tok-1", "tok-2"]));
        assert_eq!(
            specs,
            vec![
                AccountSpec {
                    name: "main".into(),
                    token: "tok-1".into()
                },
                AccountSpec {
                    name: "account_2".into(),
                    token: "tok-2".into()
                },
            ]
        );
    }

    #[test]
    fn legacy_token_used_when_list_empty() {
        let specs = parse_account_specs(&config(Some("legacy-tok"), &[]));
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "default");
        assert_eq!(specs[0].token, "legacy-tok");
    }

    #[test]
    fn list_takes_precedence_over_legacy_token() {
        let specs = parse_account_specs(&config(Some("legacy-tok"), &["main:tok-1"]));
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].token, "tok-1");
    }

    #[test]
    fn empty_tokens_are_dropped() {
        let specs = parse_account_specs(&config(Some("   "), &["named:", "  "]));
        assert!(specs.is_empty());
    }
}
