//! Discord slash commands.
//!
//! Admin commands (`/allow_channel`, `/disallow_channel`, `/list_ai_channels`,
//! `/set_model`, `/clear_history`) require Manage Server. Discord hides them
//! from other members through `default_member_permissions`, and the invoker's
//! resolved permissions are checked again here since server admins can
//! override command visibility. `/ai_status` and `/ping` are open to everyone.
//! All replies are ephemeral.

use std::time::Instant;

use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateInteractionResponse,
    CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::model::application::{Command, CommandInteraction, CommandOptionType};
use serenity::model::id::GuildId;
use serenity::model::permissions::Permissions;
use serenity::prelude::Context;
use tracing::{info, warn};

use relaybot_agent::MessagePipeline;

use crate::admin;
use crate::error::DiscordError;

fn admin_command(name: &str, description: &str) -> CreateCommand {
    CreateCommand::new(name)
        .description(description)
        .default_member_permissions(Permissions::MANAGE_GUILD)
}

fn command_definitions() -> Vec<CreateCommand> {
    vec![
        admin_command("allow_channel", "Let the AI reply in this channel"),
        admin_command(
            "disallow_channel",
            "Stop AI replies in this channel and forget its conversation",
        ),
        admin_command("list_ai_channels", "List channels where the AI replies"),
        admin_command("set_model", "Show or switch the AI model").add_option(
            CreateCommandOption::new(CommandOptionType::String, "name", "Model identifier")
                .required(false),
        ),
        admin_command("clear_history", "Forget this channel's conversation"),
        CreateCommand::new("ai_status").description("Show the AI relay status for this channel"),
        CreateCommand::new("ping").description("Check the bot's round-trip latency to Discord"),
    ]
}

/// Register slash commands on `guild_id`, or globally when `None`. Call from `ready()`.
pub async fn register_commands(ctx: &Context, guild_id: Option<GuildId>) {
    let commands = command_definitions();

    match guild_id {
        Some(gid) => match gid.set_commands(&ctx.http, commands).await {
            Ok(cmds) => info!(guild = %gid, count = cmds.len(), "registered guild slash commands"),
            Err(e) => warn!(guild = %gid, error = %e, "failed to register guild commands"),
        },
        None => match Command::set_global_commands(&ctx.http, commands).await {
            Ok(cmds) => info!(count = cmds.len(), "registered global slash commands"),
            Err(e) => warn!(error = %e, "failed to register global slash commands"),
        },
    }
}

/// Dispatch a slash command interaction to the matching handler.
pub async fn handle_interaction(
    pipeline: &MessagePipeline,
    ctx: &Context,
    command: &CommandInteraction,
) {
    if let Err(e) = dispatch(pipeline, ctx, command).await {
        warn!(command = %command.data.name, error = %e, "slash command error");
    }
}

async fn dispatch(
    pipeline: &MessagePipeline,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), DiscordError> {
    let name = command.data.name.as_str();
    let channel_id = command.channel_id.to_string();

    match name {
        "ai_status" => {
            let text = admin::status(pipeline, &channel_id).await;
            return respond_ephemeral(ctx, command, &text).await;
        }
        "ping" => return ping(ctx, command).await,
        _ => {}
    }

    if command.guild_id.is_none() {
        return respond_ephemeral(ctx, command, "This command only works in a server channel.")
            .await;
    }
    if !can_manage_guild(command) {
        info!(command = name, user = %command.user.id, "admin command refused");
        return respond_ephemeral(ctx, command, "You need the Manage Server permission to do that.")
            .await;
    }

    let text = match name {
        "allow_channel" => admin::allow_channel(pipeline, &channel_id),
        "disallow_channel" => admin::disallow_channel(pipeline, &channel_id),
        "list_ai_channels" => admin::list_channels(pipeline),
        "clear_history" => admin::clear_history(pipeline, &channel_id),
        "set_model" => admin::set_model(pipeline, string_option(command, "name")).await,
        _ => "Unknown command.".to_string(),
    };
    respond_ephemeral(ctx, command, &text).await
}

/// Answer first, then edit the answer with how long the round trip took.
async fn ping(ctx: &Context, command: &CommandInteraction) -> Result<(), DiscordError> {
    let started = Instant::now();
    respond_ephemeral(ctx, command, "Pong!").await?;
    let text = admin::pong(started.elapsed());
    command
        .edit_response(&ctx.http, EditInteractionResponse::new().content(text))
        .await?;
    Ok(())
}

fn can_manage_guild(command: &CommandInteraction) -> bool {
    command
        .member
        .as_ref()
        .and_then(|m| m.permissions)
        .is_some_and(|p| p.manage_guild())
}

fn string_option<'a>(command: &'a CommandInteraction, name: &str) -> Option<&'a str> {
    command
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_str())
}

/// Send an ephemeral response (only visible to the invoker).
async fn respond_ephemeral(
    ctx: &Context,
    command: &CommandInteraction,
    content: &str,
) -> Result<(), DiscordError> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

