use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_STORE_PATH: &str = "relaybot_config.json";
pub const DEFAULT_CONFIG_PATH: &str = "relaybot.toml";
pub const DEFAULT_MAX_TURNS: usize = 12; // user/assistant pairs kept per channel
pub const DEFAULT_COOLDOWN_SECS: u64 = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_REPLY_CHARS: usize = 1950; // Discord caps at 2000
pub const DEFAULT_INSTRUCTIONS: &str =
    "You are a helpful, concise assistant in a Discord channel. Answer politely.";

/// Top-level config (relaybot.toml + RELAYBOT_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub relay: RelaySettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Owner's Discord user id. Logged at startup; commands are gated on
    /// guild permissions, not on this value.
    pub owner_id: Option<u64>,
    /// Register slash commands on this guild only (instant refresh while
    /// developing). Global registration when unset.
    pub guild_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// System instructions sent alongside every prompt. An empty string
    /// disables them.
    #[serde(default = "default_instructions")]
    pub instructions: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            instructions: default_instructions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            max_turns: DEFAULT_MAX_TURNS,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            max_reply_chars: DEFAULT_MAX_REPLY_CHARS,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_instructions() -> Option<String> {
    Some(DEFAULT_INSTRUCTIONS.to_string())
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}
fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}
fn default_cooldown_secs() -> u64 {
    DEFAULT_COOLDOWN_SECS
}
fn default_max_reply_chars() -> usize {
    DEFAULT_MAX_REPLY_CHARS
}

impl RelayConfig {
    /// Layered config sources, lowest priority first:
    ///   1. relaybot.toml (or the explicit path)
    ///   2. conventional bare variables: DISCORD_TOKEN, OPENAI_API_KEY,
    ///      OWNER_ID, RELAYBOT_MODEL
    ///   3. RELAYBOT_<SECTION>__<KEY> overrides, e.g. RELAYBOT_RELAY__COOLDOWN_SECS
    pub fn figment(config_path: Option<&str>) -> Figment {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);

        Figment::new()
            .merge(Toml::file(path))
            .merge(
                Env::raw()
                    .only(&["DISCORD_TOKEN", "OPENAI_API_KEY", "OWNER_ID", "RELAYBOT_MODEL"])
                    .map(|key| {
                        let key = key.as_str();
                        if key.eq_ignore_ascii_case("DISCORD_TOKEN") {
                            "discord.bot_token".into()
                        } else if key.eq_ignore_ascii_case("OPENAI_API_KEY") {
                            "completion.api_key".into()
                        } else if key.eq_ignore_ascii_case("OWNER_ID") {
                            "discord.owner_id".into()
                        } else {
                            "completion.model".into()
                        }
                    }),
            )
            .merge(Env::prefixed("RELAYBOT_").split("__"))
    }

    /// Load and extract the config. A missing file is fine (env-only setups);
    /// a malformed one is not.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::figment(config_path)
            .extract()
            .map_err(|e| RelayError::Config(e.to_string()))
    }

    /// Reject configs the bot cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.discord.bot_token.trim().is_empty() {
            return Err(RelayError::MissingCredential {
                name: "discord.bot_token",
                env: "DISCORD_TOKEN",
            });
        }
        if self.completion.api_key.trim().is_empty() {
            return Err(RelayError::MissingCredential {
                name: "completion.api_key",
                env: "OPENAI_API_KEY",
            });
        }
        if self.completion.model.trim().is_empty() {
            return Err(RelayError::Config("completion.model must not be empty".into()));
        }
        if self.relay.max_turns == 0 {
            return Err(RelayError::Config("relay.max_turns must be at least 1".into()));
        }
        if self.relay.max_reply_chars == 0 {
            return Err(RelayError::Config(
                "relay.max_reply_chars must be at least 1".into(),
            ));
        }
        if self.completion.timeout_secs == 0 {
            return Err(RelayError::Config(
                "completion.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
