use std::sync::{Arc, OnceLock};

use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::{GuildId, UserId};
use serenity::prelude::{Context, EventHandler};
use tracing::{debug, info};

use relaybot_agent::{InboundMessage, MessagePipeline, PipelineOutcome};
use relaybot_core::config::DiscordConfig;

use crate::send::DiscordReply;

/// Serenity event handler wired to the message pipeline.
pub struct DiscordHandler {
    pub pipeline: Arc<MessagePipeline>,
    pub config: DiscordConfig,
    pub bot_id: OnceLock<UserId>,
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.bot_id.set(ready.user.id).ok();
        self.pipeline.set_bot_identity(ready.user.id.to_string());

        info!(
            name = %ready.user.name,
            guilds = ready.guilds.len(),
            owner = ?self.config.owner_id,
            "Discord bot connected"
        );

        let guild_id = self.config.guild_id.filter(|id| *id != 0).map(GuildId::new);
        crate::commands::register_commands(&ctx, guild_id).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if self.bot_id.get() == Some(&msg.author.id) || msg.author.bot {
            return;
        }
        // The allowlist only ever holds guild channels.
        if msg.guild_id.is_none() {
            return;
        }
        let inbound = InboundMessage {
            channel_id: msg.channel_id.to_string(),
            author_id: msg.author.id.to_string(),
            content: msg.content.clone(),
        };
        let surface = DiscordReply::new(Arc::clone(&ctx.http), msg.channel_id, msg.id);

        let outcome = self.pipeline.handle(&inbound, &surface).await;
        if outcome != PipelineOutcome::ChannelNotAllowed {
            debug!(
                channel = %msg.channel_id,
                user = %msg.author.id,
                outcome = outcome.as_str(),
                "message handled"
            );
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            crate::commands::handle_interaction(&self.pipeline, &ctx, &command).await;
        }
    }
}
