// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Otklik.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Every field has a compiled default so an empty
//! config file is valid.

use serde::{Deserialize, Serialize};

/// Top-level Otklik configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OtklikConfig {
    /// Polling loop settings.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// OpenAI generation settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Prompt template settings.
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Wildberries account bootstrap settings.
    #[serde(default)]
    pub wildberries: MarketplaceAccountsConfig,

    /// Yandex Market account bootstrap settings.
    #[serde(default)]
    pub yandex_market: MarketplaceAccountsConfig,
}

/// Polling loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Seconds to sleep between polling passes. The next pass is the sole
    /// retry mechanism for rows still in a recoverable state.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Write the last raw API page per account to an audit file each cycle.
    #[serde(default = "default_save_raw_pages")]
    pub save_raw_pages: bool,

    /// Directory for raw-page audit files.
    #[serde(default = "default_raw_page_dir")]
    pub raw_page_dir: String,

    /// Maximum grounding examples included in a prompt.
    #[serde(default = "default_example_limit")]
    pub example_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            save_raw_pages: default_save_raw_pages(),
            raw_page_dir: default_raw_page_dir(),
            example_limit: default_example_limit(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_save_raw_pages() -> bool {
    true
}

fn default_raw_page_dir() -> String {
    ".".to_string()
}

fn default_example_limit() -> usize {
    6
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("otklik").join("otklik.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("otklik.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// OpenAI generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// OpenAI API key. `None` parks every draftable item as
    /// `ai_skipped_no_key` instead of calling the backend.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for reply generation.
    #[serde(default = "default_openai_model")]
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
        }
    }
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Prompt template configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    /// Template with `{placeholder}` substitution. Persisted under the
    /// `prompt_template` settings key and overwritten when this default
    /// changes.
    #[serde(default = "default_prompt_template")]
    pub template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: default_prompt_template(),
        }
    }
}

fn default_prompt_template() -> String {
    concat!(
        "Ты — специалист поддержки маркетплейса {marketplace}. ",
        "Ответь вежливо и кратко. ",
        "Отвечай строго на русском. ",
        "Верни только текст ответа клиенту без вступлений и пояснений. ",
        "Текст клиента: {text}. Оценка: {rating}. ",
        "Плюсы: {pros}. Минусы: {cons}. Товар: {product_name}. ",
        "Название товара: {product_title}. Описание: {product_description}. ",
        "Преимущества: {product_benefits}."
    )
    .to_string()
}

/// Account bootstrap configuration for one marketplace platform.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MarketplaceAccountsConfig {
    /// Legacy single-token binding, used when `accounts` is empty.
    #[serde(default)]
    pub token: Option<String>,

    /// Account specs, each `"name:token"` or a bare token.
    #[serde(default)]
    pub accounts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = OtklikConfig::default();
        assert_eq!(config.sync.poll_interval_secs, 60);
        assert_eq!(config.sync.example_limit, 6);
        assert!(config.sync.save_raw_pages);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert!(config.openai.api_key.is_none());
        assert!(config.prompt.template.contains("{text}"));
        assert!(config.wildberries.accounts.is_empty());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = OtklikConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: OtklikConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.sync.poll_interval_secs, config.sync.poll_interval_secs);
        assert_eq!(parsed.storage.wal_mode, config.storage.wal_mode);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<OtklikConfig, _> = toml::from_str("[sync]\nbogus = 1\n");
        assert!(result.is_err(), "unknown key should be rejected");
    }
}
