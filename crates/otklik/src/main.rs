// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Otklik - marketplace review auto-reply service.
//!
//! Binary entry point: config loading, logging setup, and the CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod seed;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use otklik_config::OtklikConfig;
use otklik_core::traits::ResponseGenerator;
use otklik_core::OtklikError;
use otklik_openai::OpenAiGenerator;
use otklik_storage::FeedbackStore;
use otklik_sync::{bootstrap_accounts, run_forever, run_pass, SyncContext};
use tracing_subscriber::EnvFilter;

/// Otklik - marketplace review auto-reply service.
#[derive(Parser, Debug)]
#[command(name = "otklik", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the polling loop until interrupted.
    Run,
    /// Run a single sync pass and exit.
    Sync,
    /// Upsert grounding examples from a JSON file.
    Seed {
        /// Path to a JSON array of example objects.
        #[arg(long)]
        path: PathBuf,
    },
    /// List configured accounts.
    Accounts,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match otklik_config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("otklik: failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, config).await {
        eprintln!("otklik: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: OtklikConfig) -> Result<(), OtklikError> {
    let store =
        FeedbackStore::open_with(&config.storage.database_path, config.storage.wal_mode).await?;
    bootstrap_accounts(&store, &config).await?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let ctx = build_context(store, &config)?;
            run_forever(&ctx, Duration::from_secs(config.sync.poll_interval_secs)).await;
            Ok(())
        }
        Commands::Sync => {
            let ctx = build_context(store, &config)?;
            let synced = run_pass(&ctx).await;
            println!("synced {synced} account(s)");
            ctx.store.close().await
        }
        Commands::Seed { path } => {
            let count = seed::seed_examples(&store, &path).await?;
            println!("upserted {count} example(s)");
            store.close().await
        }
        Commands::Accounts => {
            let accounts = store.list_active_accounts(None).await?;
            if accounts.is_empty() {
                println!("no active accounts");
            }
            for account in accounts {
                println!(
                    "{:>4}  {:<3} {:<20} auto_reply={} business_id={}",
                    account.id,
                    account.platform,
                    account.name,
                    account.auto_reply_enabled,
                    account
                        .business_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            store.close().await
        }
    }
}

fn build_context(store: FeedbackStore, config: &OtklikConfig) -> Result<SyncContext, OtklikError> {
    let generator: Option<Arc<dyn ResponseGenerator>> = match &config.openai.api_key {
        Some(api_key) => Some(Arc::new(OpenAiGenerator::new(api_key, &config.openai.model)?)),
        None => None,
    };
    Ok(SyncContext {
        store,
        generator,
        configured_template: config.prompt.template.clone(),
        example_limit: config.sync.example_limit as i64,
        save_raw_pages: config.sync.save_raw_pages,
        raw_page_dir: PathBuf::from(&config.sync.raw_page_dir),
    })
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports epoch advancement; the system allocator
        // would fail here.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn default_config_is_loadable() {
        let config = otklik_config::load_config_from_str("").expect("empty config is valid");
        assert_eq!(config.sync.poll_interval_secs, 60);
    }
}
