use std::sync::Arc;
use std::time::Duration;

use serenity::all::ActivityData;
use serenity::async_trait;
use serenity::gateway::ShardManager;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::user::OnlineStatus;
use serenity::prelude::{Context, EventHandler, TypeMapKey};
use tracing::{debug, info, warn};

use linkbot_core::config::DiscordConfig;
use linkbot_records::{RecordManager, RecordStore};

use crate::commands::{self, Command};
use crate::respond::{self, Reply};
use crate::send;

/// Client data key for the shard manager, read by `ping` for heartbeat latency.
pub struct ShardManagerKey;

impl TypeMapKey for ShardManagerKey {
    type Value = Arc<ShardManager>;
}

/// Serenity event handler wired to the record manager.
pub struct LinkbotHandler<S: RecordStore + 'static> {
    pub records: Arc<RecordManager<S>>,
    pub config: DiscordConfig,
}

#[async_trait]
impl<S: RecordStore + 'static> EventHandler for LinkbotHandler<S> {
    async fn ready(&self, ctx: Context, ready: Ready) {
        // serenity 0.12.5 serialises `since` in presence updates in a shape
        // Discord rejects, so only send one when something was configured.
        if let Some((activity, status)) = configured_presence(&self.config) {
            ctx.set_presence(activity, status);
        }

        info!(name = %ready.user.name, prefix = %self.config.command_prefix, "Discord bot connected");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        if msg.guild_id.is_none() && !self.config.dm_allowed {
            return;
        }

        let Some(parsed) = commands::parse(&msg.content, &self.config.command_prefix) else {
            return;
        };

        let reply = match parsed {
            Ok(Command::Ping) => pong(&ctx, &msg).await,
            Ok(command) => {
                info!(
                    command = command.name(),
                    user = %msg.author.name,
                    channel = %msg.channel_id,
                    "running command"
                );
                respond::execute(&*self.records, command)
            }
            Err(usage) => {
                debug!(user = %msg.author.name, usage = %usage.usage, "bad command arguments");
                Reply::from(usage)
            }
        };

        if let Err(e) = send::deliver(&ctx.http, &msg, &reply).await {
            warn!(error = %e, channel = %msg.channel_id, "Discord reply failed");
        }
    }
}

/// Report the gateway heartbeat latency of the shard that received `msg`.
async fn pong(ctx: &Context, msg: &Message) -> Reply {
    let manager = ctx.data.read().await.get::<ShardManagerKey>().cloned();
    let latency = match manager {
        Some(manager) => manager
            .runners
            .lock()
            .await
            .get(&ctx.shard_id)
            .and_then(|runner| runner.latency),
        None => None,
    };
    debug!(channel = %msg.channel_id, ?latency, "ping");
    latency_reply(latency)
}

fn latency_reply(latency: Option<Duration>) -> Reply {
    match latency {
        Some(latency) => Reply::Text(format!(
            "I am just {}ms away from you :cupid:.",
            latency.as_millis()
        )),
        // No heartbeat acknowledged yet on this shard.
        None => Reply::Text("Still warming up, try again in a few seconds.".to_string()),
    }
}

/// Presence to send on ready, or `None` when the config asks for the
/// defaults (online, no activity).
fn configured_presence(config: &DiscordConfig) -> Option<(Option<ActivityData>, OnlineStatus)> {
    let status = parse_online_status(&config.status);
    let activity = build_activity(config);
    if activity.is_none() && status == OnlineStatus::Online {
        return None;
    }
    Some((activity, status))
}

/// Parse a config status string into serenity's `OnlineStatus`.
fn parse_online_status(s: &str) -> OnlineStatus {
    match s.to_lowercase().as_str() {
        "idle" => OnlineStatus::Idle,
        "dnd" | "do_not_disturb" => OnlineStatus::DoNotDisturb,
        "invisible" => OnlineStatus::Invisible,
        _ => OnlineStatus::Online,
    }
}

/// Build an `ActivityData` from the Discord config.
fn build_activity(config: &DiscordConfig) -> Option<ActivityData> {
    let name = config.activity_name.as_deref()?;
    let kind = config.activity_type.as_deref().unwrap_or("playing");
    Some(match kind.to_lowercase().as_str() {
        "listening" => ActivityData::listening(name),
        "watching" => ActivityData::watching(name),
        "competing" => ActivityData::competing(name),
        "custom" => ActivityData::custom(name),
        _ => ActivityData::playing(name),
    })
}
