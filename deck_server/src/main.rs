//! Deck Server - flashcard deck storage & API
//!
//! Serves decks from a directory of JSON files, optionally mirrored into a
//! key-value store.

use clap::Parser;
use deck_server::config::{default_data_dir, default_sqlite_path};
use deck_server::{Config, DeckCache, KvBackend, KvKind};
use std::path::PathBuf;

/// Flashcard deck server - stores decks as JSON files with an optional key-value cache
#[derive(Parser, Debug)]
#[command(name = "deck_server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding one JSON file per deck
    #[arg(short, long, env = "DECKS_DATA_DIR", default_value_os_t = default_data_dir())]
    data_dir: PathBuf,

    /// Port for the HTTP API
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Key-value store mirroring the decks
    #[arg(long, env = "DECKS_KV", value_enum, default_value_t = KvKind::None)]
    kv: KvKind,

    /// SQLite file for `--kv sqlite`
    #[arg(long, default_value_os_t = default_sqlite_path())]
    kv_sqlite_path: PathBuf,

    /// REST endpoint for `--kv rest`
    #[arg(long, env = "KV_REST_API_URL")]
    kv_rest_url: Option<String>,

    /// Bearer token for `--kv rest`
    #[arg(long, env = "KV_REST_API_TOKEN", hide_env_values = true)]
    kv_rest_token: Option<String>,

    /// Do not write cache updates to the deck files (production behaviour)
    #[arg(long, default_value_t = false)]
    no_write_through: bool,

    /// Shared secret for the /api/gpts endpoints
    #[arg(long, env = "GPT_API_KEY", hide_env_values = true)]
    gpt_api_key: Option<String>,

    /// Serve a static client from this directory for non-API paths
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Seed the key-value store from the deck files and exit
    #[arg(long, default_value_t = false)]
    seed_only: bool,
}

impl Args {
    fn into_config(self) -> Result<Config, deck_server::error::ConfigError> {
        let kv = KvBackend::from_parts(
            self.kv,
            self.kv_sqlite_path,
            self.kv_rest_url,
            self.kv_rest_token,
        )?;

        Config::new(
            self.data_dir,
            self.bind,
            self.port,
            kv,
            !self.no_write_through,
            self.gpt_api_key,
            self.static_dir,
        )
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let seed_only = args.seed_only;

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Starting deck_server...");
    log::info!("Deck directory: {}", config.data_dir.display());

    if seed_only {
        run_seed(&config).await;
        return;
    }

    if let Err(e) = deck_server::serve(config).await {
        log::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}

/// Copy the deck files into an empty key-value store, then exit
async fn run_seed(config: &Config) {
    if !config.kv.is_configured() {
        log::error!("--seed-only needs a key-value store (--kv memory|sqlite|rest)");
        std::process::exit(1);
    }

    let cache = match DeckCache::from_config(config) {
        Ok(cache) => cache,
        Err(e) => {
            log::error!("Failed to open key-value store: {}", e);
            std::process::exit(1);
        }
    };

    match cache.sync_from_file_system().await {
        Ok(0) => log::info!("Cache already populated (or no decks found), nothing to seed"),
        Ok(count) => log::info!("Seeded {} decks", count),
        Err(e) => {
            log::error!("Failed to seed cache: {}", e);
            std::process::exit(1);
        }
    }
}
