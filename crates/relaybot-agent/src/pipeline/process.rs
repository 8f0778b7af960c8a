use std::borrow::Cow;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use relaybot_core::config::DEFAULT_MAX_REPLY_CHARS;
use relaybot_core::ConfigStore;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::completion::CompletionService;
use crate::cooldown::RateLimiter;
use crate::history::ConversationStore;
use crate::prompt::build_prompt;
use crate::truncate::truncate_reply;
use crate::turn::Role;

use super::surface::ReplySurface;

const EMPTY_MESSAGE_NOTICE: &str = "I didn't see any text to respond to.";

/// A chat message as seen by the pipeline, stripped of platform types.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
}

/// Terminal state reached by one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Authored by the bot itself.
    OwnMessage,
    ChannelNotAllowed,
    /// Author is inside the cooldown window; acknowledged, nothing recorded.
    CoolingDown,
    /// No text to relay (attachment-only or whitespace); the author is told so.
    EmptyMessage,
    /// The channel left the allowlist while the completion was in flight. The
    /// answer is discarded and the channel's history dropped.
    ChannelDisallowed,
    /// Completion call failed; the user turn stays in history.
    CompletionFailed,
    Replied { truncated: bool },
    /// Reply generated and recorded but Discord refused it.
    ReplyFailed,
}

impl PipelineOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OwnMessage => "own_message",
            Self::ChannelNotAllowed => "channel_not_allowed",
            Self::CoolingDown => "cooling_down",
            Self::EmptyMessage => "empty_message",
            Self::ChannelDisallowed => "channel_disallowed",
            Self::CompletionFailed => "completion_failed",
            Self::Replied { .. } => "replied",
            Self::ReplyFailed => "reply_failed",
        }
    }
}

/// Orchestrates allowlist → cooldown → history → prompt → completion → reply.
///
/// All state is owned here or injected, so tests build isolated pipelines.
/// No lock is held across the completion await: two messages in one channel
/// may interleave, and their history then reflects completion order.
pub struct MessagePipeline {
    store: Arc<ConfigStore>,
    history: ConversationStore,
    limiter: RateLimiter,
    completion: Arc<dyn CompletionService>,
    model: RwLock<String>,
    max_reply_chars: usize,
    bot_id: OnceLock<String>,
}

impl MessagePipeline {
    pub fn new(
        store: Arc<ConfigStore>,
        history: ConversationStore,
        limiter: RateLimiter,
        completion: Arc<dyn CompletionService>,
        model: String,
    ) -> Self {
        Self {
            store,
            history,
            limiter,
            completion,
            model: RwLock::new(model),
            max_reply_chars: DEFAULT_MAX_REPLY_CHARS,
            bot_id: OnceLock::new(),
        }
    }

    pub fn with_max_reply_chars(mut self, max_reply_chars: usize) -> Self {
        self.max_reply_chars = max_reply_chars;
        self
    }

    /// Record the bot's own user id once the gateway reports it. Later calls
    /// are ignored.
    pub fn set_bot_identity(&self, bot_id: impl Into<String>) {
        self.bot_id.set(bot_id.into()).ok();
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn history(&self) -> &ConversationStore {
        &self.history
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub async fn model(&self) -> String {
        self.model.read().await.clone()
    }

    /// Switch the model used for subsequent completions. Returns the previous one.
    pub async fn set_model(&self, model: String) -> String {
        let mut guard = self.model.write().await;
        std::mem::replace(&mut *guard, model)
    }

    pub async fn handle(
        &self,
        msg: &InboundMessage,
        surface: &dyn ReplySurface,
    ) -> PipelineOutcome {
        self.handle_at(msg, surface, Instant::now()).await
    }

    /// [`handle`](Self::handle) with an explicit arrival time for the cooldown check.
    pub async fn handle_at(
        &self,
        msg: &InboundMessage,
        surface: &dyn ReplySurface,
        now: Instant,
    ) -> PipelineOutcome {
        if self.bot_id.get().is_some_and(|id| *id == msg.author_id) {
            return PipelineOutcome::OwnMessage;
        }

        if !self.store.is_allowed(&msg.channel_id) {
            return PipelineOutcome::ChannelNotAllowed;
        }

        if !self.limiter.try_accept(&msg.author_id, now) {
            debug!(
                channel = %msg.channel_id,
                user = %msg.author_id,
                remaining_ms = self.limiter.remaining(&msg.author_id, now).as_millis() as u64,
                "user cooling down"
            );
            surface.acknowledge_cooldown().await;
            return PipelineOutcome::CoolingDown;
        }

        if msg.content.trim().is_empty() {
            if let Err(e) = surface.report_error(EMPTY_MESSAGE_NOTICE).await {
                warn!(channel = %msg.channel_id, error = %e, "failed to send empty-message notice");
            }
            return PipelineOutcome::EmptyMessage;
        }

        let history = self
            .history
            .append(&msg.channel_id, Role::User, msg.content.clone());
        // The window just gained the new message; the prompt gets it separately.
        let prior = &history[..history.len() - 1];
        let prompt = build_prompt(prior, &msg.content);

        let model = self.model().await;
        surface.start_typing().await;

        info!(
            channel = %msg.channel_id,
            user = %msg.author_id,
            model = %model,
            provider = self.completion.name(),
            turns = prior.len(),
            "requesting completion"
        );

        let result = self.completion.complete(&prompt, &model).await;

        // An admin may have disallowed the channel during the await.
        if !self.store.is_allowed(&msg.channel_id) {
            let dropped = self.history.clear(&msg.channel_id);
            info!(
                channel = %msg.channel_id,
                dropped,
                "channel disallowed mid-request, discarding answer"
            );
            return PipelineOutcome::ChannelDisallowed;
        }

        let reply = match result {
            Ok(text) => text,
            Err(e) => {
                warn!(channel = %msg.channel_id, error = %e, "completion failed");
                let notice = format!("\u{26a0}\u{fe0f} Error contacting AI: {e}");
                if let Err(send_err) = surface.report_error(&notice).await {
                    warn!(
                        channel = %msg.channel_id,
                        error = %send_err,
                        "failed to report completion error"
                    );
                }
                return PipelineOutcome::CompletionFailed;
            }
        };

        self.history.append(&msg.channel_id, Role::Assistant, reply.clone());

        let outbound = if reply.trim().is_empty() {
            Cow::Borrowed("(no response)")
        } else {
            truncate_reply(&reply, self.max_reply_chars)
        };
        let truncated = matches!(outbound, Cow::Owned(_));

        match surface.reply(&outbound).await {
            Ok(()) => {
                debug!(channel = %msg.channel_id, len = outbound.len(), truncated, "reply sent");
                PipelineOutcome::Replied { truncated }
            }
            Err(e) => {
                warn!(channel = %msg.channel_id, error = %e, "reply send failed");
                PipelineOutcome::ReplyFailed
            }
        }
    }
}
