use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tracing::{error, info, warn};

use relaybot_agent::MessagePipeline;
use relaybot_core::config::DiscordConfig;

use crate::error::DiscordError;
use crate::handler::DiscordHandler;

/// Discord channel adapter.
///
/// Wraps a serenity `Client` and drives the event loop until the process exits,
/// reconnecting whenever the gateway drops.
pub struct DiscordAdapter {
    pipeline: Arc<MessagePipeline>,
    config: DiscordConfig,
}

impl DiscordAdapter {
    pub fn new(
        config: &DiscordConfig,
        pipeline: Arc<MessagePipeline>,
    ) -> Result<Self, DiscordError> {
        if config.bot_token.trim().is_empty() {
            return Err(DiscordError::NoToken);
        }
        Ok(Self {
            pipeline,
            config: config.clone(),
        })
    }

    fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MESSAGE_REACTIONS
    }

    /// Connect to Discord and keep reconnecting whenever the gateway drops.
    ///
    /// Runs for the lifetime of the process, reconnecting after gateway errors.
    pub async fn run(self) {
        loop {
            let mut client = loop {
                match self.build_client().await {
                    Ok(c) => break c,
                    Err(e) => {
                        error!("Discord: connect failed ({e}), retrying in 30s");
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            };

            info!("Discord: gateway connecting");
            if let Err(e) = client.start().await {
                warn!("Discord: gateway error ({e}), reconnecting in 5s");
            } else {
                info!("Discord: gateway stopped cleanly, reconnecting in 5s");
            }

            tokio::time::sleep(Duration::from_secs(5)).await;
        }
    }

    /// Build a fresh serenity `Client` with our event handler.
    async fn build_client(&self) -> Result<Client, serenity::Error> {
        let handler = DiscordHandler {
            pipeline: Arc::clone(&self.pipeline),
            config: self.config.clone(),
            bot_id: OnceLock::new(),
        };

        Client::builder(&self.config.bot_token, Self::intents())
            .event_handler(handler)
            .await
    }
}
