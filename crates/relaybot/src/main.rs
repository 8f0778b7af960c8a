use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use relaybot_agent::{ConversationStore, MessagePipeline, RateLimiter, ResponsesClient};
use relaybot_core::{ConfigStore, RelayConfig};
use relaybot_discord::DiscordAdapter;

/// Discord bot relaying allowlisted channels to an LLM completion service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to relaybot.toml.
    #[arg(long, env = "RELAYBOT_CONFIG")]
    config: Option<String>,

    /// Path to the allowlist JSON file (overrides relay.store_path).
    #[arg(long)]
    store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "relaybot=info,relaybot_discord=info,relaybot_agent=info,relaybot_core=info,serenity=warn"
                    .into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // Anything failing before the gateway connects is fatal.
    let mut config = RelayConfig::load(cli.config.as_deref()).inspect_err(|e| {
        error!(code = e.code(), "{e}");
    })?;
    if let Some(store) = cli.store {
        config.relay.store_path = store;
    }
    config.validate().inspect_err(|e| {
        error!(code = e.code(), "{e}");
    })?;

    let store = ConfigStore::open(&config.relay.store_path).inspect_err(|e| {
        error!(path = %config.relay.store_path.display(), "config store unusable: {e}");
    })?;
    info!(
        path = %store.path().display(),
        channels = store.channels().len(),
        "allowlist loaded"
    );

    // A model picked through /set_model survives restarts.
    let model = store
        .model()
        .unwrap_or_else(|| config.completion.model.clone());

    let completion = ResponsesClient::new(
        config.completion.api_key.clone(),
        Some(config.completion.base_url.clone()),
    )
    .with_timeout(Duration::from_secs(config.completion.timeout_secs))
    .with_instructions(config.completion.instructions.clone());

    let pipeline = MessagePipeline::new(
        Arc::new(store),
        ConversationStore::new(config.relay.max_turns),
        RateLimiter::new(Duration::from_secs(config.relay.cooldown_secs)),
        Arc::new(completion),
        model.clone(),
    )
    .with_max_reply_chars(config.relay.max_reply_chars);

    info!(
        model = %model,
        base_url = %config.completion.base_url,
        max_turns = config.relay.max_turns,
        cooldown_secs = config.relay.cooldown_secs,
        "relay pipeline ready"
    );

    let adapter = DiscordAdapter::new(&config.discord, Arc::new(pipeline))?;
    adapter.run().await;
    Ok(())
}
