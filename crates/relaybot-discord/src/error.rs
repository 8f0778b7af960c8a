/// Errors raised while talking to Discord.
///
/// Only startup (`NoToken`) is fatal; serenity errors from a single
/// interaction are logged by the caller and dropped.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("Discord bot token is empty (set DISCORD_TOKEN)")]
    NoToken,
}
