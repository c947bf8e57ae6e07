use std::sync::Arc;
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tracing::{error, info, warn};

use linkbot_core::config::DiscordConfig;
use linkbot_records::{RecordManager, RecordStore};

use crate::error::DiscordError;
use crate::handler::{LinkbotHandler, ShardManagerKey};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const BUILD_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Discord channel adapter.
///
/// Wraps a serenity `Client` and drives the event loop until the process
/// exits, rebuilding the client whenever the gateway drops.
pub struct DiscordAdapter<S: RecordStore + 'static> {
    records: Arc<RecordManager<S>>,
    config: DiscordConfig,
}

impl<S: RecordStore + 'static> DiscordAdapter<S> {
    pub fn new(config: &DiscordConfig, records: Arc<RecordManager<S>>) -> Result<Self, DiscordError> {
        if config.bot_token.trim().is_empty() {
            return Err(DiscordError::NoToken);
        }
        Ok(Self {
            records,
            config: config.clone(),
        })
    }

    /// Connect to Discord and keep reconnecting whenever the gateway drops.
    ///
    /// Never returns; runs for the lifetime of the process.
    pub async fn run(self) {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        loop {
            let mut client = self.build_client_retrying(intents).await;
            info!("Discord: gateway connecting");

            if let Err(e) = client.start().await {
                warn!("Discord: gateway error ({e}), reconnecting in 5s");
            } else {
                info!("Discord: gateway stopped cleanly, reconnecting in 5s");
            }

            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }

    async fn build_client_retrying(&self, intents: GatewayIntents) -> Client {
        loop {
            match self.build_client(intents).await {
                Ok(c) => return c,
                Err(e) => {
                    error!("Discord: connect failed ({e}), retrying in 30s");
                    tokio::time::sleep(BUILD_RETRY_DELAY).await;
                }
            }
        }
    }

    /// Build a fresh serenity `Client` with our event handler.
    async fn build_client(&self, intents: GatewayIntents) -> Result<Client, DiscordError> {
        let handler = LinkbotHandler {
            records: Arc::clone(&self.records),
            config: self.config.clone(),
        };

        let client = Client::builder(&self.config.bot_token, intents)
            .event_handler(handler)
            .await?;
        client
            .data
            .write()
            .await
            .insert::<ShardManagerKey>(Arc::clone(&client.shard_manager));
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use linkbot_records::SqliteStore;

    use super::*;

    fn config(token: &str) -> DiscordConfig {
        DiscordConfig {
            bot_token: token.to_string(),
            command_prefix: "$".to_string(),
            dm_allowed: true,
            status: "online".to_string(),
            activity_name: None,
            activity_type: None,
        }
    }

    #[test]
    fn blank_token_is_rejected() {
        let records = Arc::new(RecordManager::new(SqliteStore::open_in_memory().unwrap()));
        assert!(matches!(
            DiscordAdapter::new(&config("  "), Arc::clone(&records)),
            Err(DiscordError::NoToken)
        ));
        assert!(DiscordAdapter::new(&config("token"), records).is_ok());
    }
}
