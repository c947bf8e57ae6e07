use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COMMAND_PREFIX: &str = "$";

/// Top-level config (linkbot.toml + LINKBOT_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkbotConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    pub discord: Option<DiscordConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    /// Prefix that marks a message as a bot command, e.g. `$register ...`.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// When true, commands sent in direct messages are accepted.
    /// Defaults to true.
    #[serde(default = "bool_true")]
    pub dm_allowed: bool,
    /// Presence status: online, idle, dnd, invisible.
    #[serde(default = "default_status")]
    pub status: String,
    pub activity_name: Option<String>,
    /// playing (default), listening, watching, competing, custom.
    pub activity_type: Option<String>,
}

fn bool_true() -> bool {
    true
}

fn default_command_prefix() -> String {
    DEFAULT_COMMAND_PREFIX.to_string()
}

fn default_status() -> String {
    "online".to_string()
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.linkbot/linkbot.db", home)
}

impl LinkbotConfig {
    /// Load config from a TOML file with LINKBOT_* env var overrides.
    ///
    /// Nested keys use a double underscore, so `LINKBOT_DISCORD__BOT_TOKEN`
    /// sets `discord.bot_token`. A missing file is not an error; env alone
    /// can carry the whole config.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::from_figment(
            Figment::new()
                .merge(Toml::file(&path))
                .merge(Env::prefixed("LINKBOT_").split("__")),
        )
    }

    fn from_figment(figment: Figment) -> crate::error::Result<Self> {
        figment
            .extract()
            .map_err(|e| crate::error::LinkbotError::Config(e.to_string()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.linkbot/linkbot.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> LinkbotConfig {
        LinkbotConfig::from_figment(Figment::new().merge(Toml::string(toml))).unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("");
        assert!(config.discord.is_none());
        assert!(config.database.path.ends_with("linkbot.db"));
    }

    #[test]
    fn discord_section_fills_defaults() {
        let config = parse(
            r#"
            [discord]
            bot_token = "abc"
            "#,
        );
        let discord = config.discord.unwrap();
        assert_eq!(discord.bot_token, "abc");
        assert_eq!(discord.command_prefix, "$");
        assert!(discord.dm_allowed);
        assert_eq!(discord.status, "online");
        assert!(discord.activity_name.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = parse(
            r#"
            [database]
            path = "/tmp/links.db"

            [discord]
            bot_token = "abc"
            command_prefix = "~"
            dm_allowed = false
            "#,
        );
        assert_eq!(config.database.path, "/tmp/links.db");
        let discord = config.discord.unwrap();
        assert_eq!(discord.command_prefix, "~");
        assert!(!discord.dm_allowed);
    }

    #[test]
    fn discord_without_token_is_rejected() {
        let result = LinkbotConfig::from_figment(
            Figment::new().merge(Toml::string("[discord]\ncommand_prefix = \"!\"")),
        );
        assert!(result.is_err());
    }
}
