//! Reaction-based acknowledgements on the user's message.
//!
//! Reactions are decoration: failures (missing Add Reactions permission,
//! deleted message) are discarded at the call site and never reach the user.

use serenity::http::Http;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, MessageId};
use tracing::debug;

/// Shown when a message is dropped because its author is cooling down.
pub const COOLDOWN: &str = "\u{23f3}"; // ⏳

/// Add `emoji` to a message, ignoring any failure.
pub async fn react(http: &Http, channel_id: ChannelId, message_id: MessageId, emoji: &str) {
    let reaction = ReactionType::Unicode(emoji.to_string());
    // Best effort: a missing reaction is not worth a retry or a message.
    if let Err(e) = http.create_reaction(channel_id, message_id, &reaction).await {
        debug!(channel = %channel_id, message = %message_id, error = %e, "reaction dropped");
    }
}
