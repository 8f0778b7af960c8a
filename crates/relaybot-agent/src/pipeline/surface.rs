use async_trait::async_trait;

/// Outbound side of a single inbound message.
///
/// `acknowledge_cooldown` and `start_typing` are best effort: implementations
/// swallow their own failures and the pipeline never waits on their outcome.
#[async_trait]
pub trait ReplySurface: Send + Sync {
    /// Lightweight signal that the author is cooling down (e.g. a reaction).
    async fn acknowledge_cooldown(&self);

    /// Show that a reply is being generated.
    async fn start_typing(&self);

    /// Tell the channel the completion failed.
    async fn report_error(&self, text: &str) -> Result<(), SendError>;

    /// Send the final reply, referencing the originating message.
    async fn reply(&self, text: &str) -> Result<(), SendError>;
}

#[derive(Debug, thiserror::Error)]
#[error("send failed: {0}")]
pub struct SendError(pub String);
