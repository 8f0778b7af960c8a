//! Outbound side of one inbound Discord message.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};

use relaybot_agent::{ReplySurface, SendError};

use crate::ack;

/// [`ReplySurface`] bound to the message that triggered the pipeline.
pub struct DiscordReply {
    http: Arc<Http>,
    channel_id: ChannelId,
    message_id: MessageId,
}

impl DiscordReply {
    pub fn new(http: Arc<Http>, channel_id: ChannelId, message_id: MessageId) -> Self {
        Self {
            http,
            channel_id,
            message_id,
        }
    }
}

#[async_trait]
impl ReplySurface for DiscordReply {
    async fn acknowledge_cooldown(&self) {
        ack::react(&self.http, self.channel_id, self.message_id, ack::COOLDOWN).await;
    }

    async fn start_typing(&self) {
        // Best effort: the indicator expires on its own after a few seconds.
        let _ = self.channel_id.broadcast_typing(&self.http).await;
    }

    async fn report_error(&self, text: &str) -> Result<(), SendError> {
        self.channel_id
            .say(&self.http, text)
            .await
            .map(|_| ())
            .map_err(|e| SendError(e.to_string()))
    }

    async fn reply(&self, text: &str) -> Result<(), SendError> {
        let msg = CreateMessage::new()
            .content(text)
            .reference_message((self.channel_id, self.message_id));
        self.channel_id
            .send_message(&self.http, msg)
            .await
            .map(|_| ())
            .map_err(|e| SendError(e.to_string()))
    }
}
