use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use linkbot_core::config::LinkbotConfig;
use linkbot_core::error::Result as CoreResult;
use linkbot_discord::DiscordAdapter;
use linkbot_records::{RecordManager, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets often live in a local .env during development.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "linkbot=info,linkbot_discord=info,linkbot_records=info".into()
            }),
        )
        .init();

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "ignoring unreadable .env file");
        }
    }

    // load config: LINKBOT_CONFIG env > ~/.linkbot/linkbot.toml, plus LINKBOT_* overrides
    let config_path = std::env::var("LINKBOT_CONFIG").ok();
    let config =
        LinkbotConfig::load(config_path.as_deref()).context("loading linkbot configuration")?;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path)
        .with_context(|| format!("creating directory for database {db_path}"))?;
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)
        .with_context(|| format!("opening database at {db_path}"))?;
    db.execute_batch("PRAGMA journal_mode=WAL;")?;
    let store = SqliteStore::new(db)?;
    info!("database schema ready");

    let records = Arc::new(RecordManager::new(store));

    let Some(discord_cfg) = config.discord.as_ref() else {
        anyhow::bail!(
            "no [discord] section configured; set discord.bot_token in the config file \
             or LINKBOT_DISCORD__BOT_TOKEN"
        );
    };
    let adapter = DiscordAdapter::new(discord_cfg, records)?;
    info!(prefix = %discord_cfg.command_prefix, "Discord bot starting");

    tokio::select! {
        _ = adapter.run() => {}
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    Ok(())
}

/// Create the database's parent directory if it does not exist yet.
fn ensure_parent_dir(path: &str) -> CoreResult<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
