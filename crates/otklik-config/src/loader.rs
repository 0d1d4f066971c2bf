// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./otklik.toml` > `~/.config/otklik/otklik.toml`
//! > `/etc/otklik/otklik.toml` with environment variable overrides via the
//! `OTKLIK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::OtklikConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/otklik/otklik.toml` (system-wide)
/// 3. `~/.config/otklik/otklik.toml` (user XDG config)
/// 4. `./otklik.toml` (local directory)
/// 5. `OTKLIK_*` environment variables
pub fn load_config() -> Result<OtklikConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OtklikConfig::default()))
        .merge(Toml::file("/etc/otklik/otklik.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("otklik/otklik.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("otklik.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<OtklikConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OtklikConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `OTKLIK_SYNC_POLL_INTERVAL_SECS` must
/// map to `sync.poll_interval_secs`, not `sync.poll.interval.secs`.
fn env_provider() -> Env {
    Env::prefixed("OTKLIK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: OTKLIK_OPENAI_API_KEY -> "openai_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("sync_", "sync.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("openai_", "openai.", 1)
            .replacen("prompt_", "prompt.", 1)
            .replacen("wildberries_", "wildberries.", 1)
            .replacen("yandex_market_", "yandex_market.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.sync.poll_interval_secs, 60);
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [sync]
            poll_interval_secs = 15

            [openai]
            api_key = "sk-test"
            model = "gpt-4o"

            [wildberries]
            accounts = ["main:wb-token-1", "outlet:wb-token-2"]
            "#,
        )
        .unwrap();
        assert_eq!(config.sync.poll_interval_secs, 15);
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.wildberries.accounts.len(), 2);
    }

    #[test]
    fn invalid_section_is_an_error() {
        let result = load_config_from_str("[nonsense]\nkey = 1\n");
        assert!(result.is_err());
    }
}
