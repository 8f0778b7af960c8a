//! Admin command behavior, independent of the interaction plumbing.
//!
//! Each function performs the mutation and returns the text shown to the
//! invoker. Store writes finish before the text is produced, so a confirmation
//! is never sent for a change that did not reach disk.

use std::time::Duration;

use relaybot_agent::MessagePipeline;
use relaybot_core::StoreError;
use tracing::{error, info};

fn save_failed(e: &StoreError) -> String {
    format!("\u{26a0}\u{fe0f} Could not save the config, nothing was changed: {e}")
}

pub fn allow_channel(pipeline: &MessagePipeline, channel_id: &str) -> String {
    match pipeline.store().allow(channel_id) {
        Ok(true) => {
            info!(channel = channel_id, "channel allowlisted");
            format!("\u{2705} <#{channel_id}> is now an AI channel. I will reply to messages here.")
        }
        Ok(false) => format!("<#{channel_id}> is already an AI channel."),
        Err(e) => {
            error!(channel = channel_id, error = %e, "failed to persist allowlist");
            save_failed(&e)
        }
    }
}

pub fn disallow_channel(pipeline: &MessagePipeline, channel_id: &str) -> String {
    match pipeline.store().disallow(channel_id) {
        Ok(removed) => {
            let cleared = pipeline.history().clear(channel_id);
            info!(channel = channel_id, removed, cleared, "channel disallowed");
            format!(
                "\u{2705} <#{channel_id}> is no longer an AI channel. \
                 Its conversation history was cleared."
            )
        }
        Err(e) => {
            error!(channel = channel_id, error = %e, "failed to persist allowlist");
            save_failed(&e)
        }
    }
}

pub fn list_channels(pipeline: &MessagePipeline) -> String {
    format_channel_list(&pipeline.store().channels())
}

pub fn format_channel_list(channels: &[String]) -> String {
    if channels.is_empty() {
        return "No AI channels configured. Use `/allow_channel` in a channel to add it.".to_string();
    }
    let mut text = format!("**AI channels** ({}):\n", channels.len());
    for id in channels {
        text.push_str(&format!("- <#{id}>\n"));
    }
    text
}

pub fn clear_history(pipeline: &MessagePipeline, channel_id: &str) -> String {
    let cleared = pipeline.history().clear(channel_id);
    info!(channel = channel_id, cleared, "history cleared");
    format!("\u{2705} Cleared {cleared} messages from this channel's conversation.")
}

/// Show the active model, or switch to `name` and persist it.
pub async fn set_model(pipeline: &MessagePipeline, name: Option<&str>) -> String {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return format!("Current model: `{}`", pipeline.model().await);
    };

    if let Err(e) = pipeline.store().set_model(name) {
        error!(model = name, error = %e, "failed to persist model");
        return save_failed(&e);
    }
    let previous = pipeline.set_model(name.to_string()).await;
    info!(previous = %previous, new = name, "model switched");
    format!("\u{2705} Model switched: `{previous}` \u{2192} `{name}`")
}

pub fn pong(latency: Duration) -> String {
    format!("Pong! latency: {} ms", latency.as_millis())
}

pub async fn status(pipeline: &MessagePipeline, channel_id: &str) -> String {
    let allowed = if pipeline.store().is_allowed(channel_id) {
        "yes"
    } else {
        "no"
    };
    format!(
        "**Status**\nThis channel is an AI channel: {allowed}\nAI channels: {}\nModel: `{}`\nTurns remembered here: {}",
        pipeline.store().channels().len(),
        pipeline.model().await,
        pipeline.history().len(channel_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use relaybot_agent::completion::{CompletionError, CompletionService};
    use relaybot_agent::{ConversationStore, RateLimiter, Role};
    use relaybot_core::ConfigStore;

    struct Echo;

    #[async_trait]
    impl CompletionService for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        async fn complete(&self, prompt: &str, _model: &str) -> Result<String, CompletionError> {
            Ok(prompt.to_string())
        }
    }

    fn pipeline(dir: &tempfile::TempDir) -> MessagePipeline {
        let store = ConfigStore::open(dir.path().join("relaybot_config.json")).unwrap();
        MessagePipeline::new(
            Arc::new(store),
            ConversationStore::new(12),
            RateLimiter::new(Duration::from_secs(4)),
            Arc::new(Echo),
            "gpt-4o-mini".to_string(),
        )
    }

    #[test]
    fn allow_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(&dir);

        assert!(allow_channel(&p, "123").contains("is now an AI channel"));
        assert!(allow_channel(&p, "123").contains("already"));
        assert!(p.store().is_allowed("123"));
        assert_eq!(list_channels(&p), "**AI channels** (1):\n- <#123>\n");
    }

    #[test]
    fn empty_list_says_none_configured() {
        assert!(format_channel_list(&[]).starts_with("No AI channels configured"));
    }

    #[test]
    fn disallow_clears_history() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(&dir);
        allow_channel(&p, "123");
        p.history().append("123", Role::User, "hi");
        p.history().append("123", Role::Assistant, "hello");

        let text = disallow_channel(&p, "123");
        assert!(text.contains("no longer"));
        assert!(!p.store().is_allowed("123"));
        assert_eq!(p.history().len("123"), 0);

        // Idempotent.
        assert!(disallow_channel(&p, "123").contains("no longer"));
    }

    #[test]
    fn failed_save_reports_and_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(&dir);
        allow_channel(&p, "123");
        p.history().append("123", Role::User, "hi");
        drop(dir);

        assert!(disallow_channel(&p, "123").contains("Could not save"));
        assert!(p.store().is_allowed("123"));
        assert_eq!(p.history().len("123"), 1);
    }

    #[test]
    fn clear_history_keeps_allowlist() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(&dir);
        allow_channel(&p, "123");
        p.history().append("123", Role::User, "hi");

        assert!(clear_history(&p, "123").contains("Cleared 1 messages"));
        assert!(p.store().is_allowed("123"));
    }

    #[tokio::test]
    async fn set_model_switches_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(&dir);

        assert_eq!(set_model(&p, None).await, "Current model: `gpt-4o-mini`");
        let text = set_model(&p, Some("  gpt-4.1 ")).await;
        assert!(text.contains("`gpt-4o-mini` \u{2192} `gpt-4.1`"));
        assert_eq!(p.model().await, "gpt-4.1");
        assert_eq!(p.store().model().as_deref(), Some("gpt-4.1"));
    }

    #[test]
    fn pong_reports_whole_milliseconds() {
        assert_eq!(pong(Duration::from_micros(42_700)), "Pong! latency: 42 ms");
    }

    #[tokio::test]
    async fn status_reports_channel_state() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(&dir);
        allow_channel(&p, "123");

        let text = status(&p, "123").await;
        assert!(text.contains("AI channel: yes"));
        assert!(text.contains("AI channels: 1"));
        assert!(text.contains("`gpt-4o-mini`"));

        assert!(status(&p, "999").await.contains("AI channel: no"));
    }
}
