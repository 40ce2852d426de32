//! Built-in commands and config-defined reply commands.

use super::core::context::Context;
use super::core::registry::CommandRegistry;
use super::core::traits::Handler;
use super::patterns::ArgPattern;
use crate::caps::CmdFlags;
use crate::config::CommandBlock;
use crate::error::{HandlerError, HandlerResult, RegistryError};
use async_trait::async_trait;
use tracing::debug;

/// `help [command]`: the command listing, or long help for one command.
pub struct HelpCommand;

#[async_trait]
impl Handler for HelpCommand {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        let router = &ctx.router;
        let authority = router.authority();

        if ctx.param.is_empty() {
            let messages = router.help().command_list(
                router.registry(),
                &authority,
                &ctx.user,
                router.limits(),
                "Usage: help < ",
                ">",
                "No commands available >",
            );
            return ctx.sender.send_all(messages).await;
        }

        let text = router.registry().find(&ctx.param).and_then(|(alias, entry)| {
            let settings = entry.settings();
            if !authority.can_view(settings.flags, settings.allow_list.as_deref(), &ctx.user) {
                return None;
            }
            router.help().render(&entry, &alias, &ctx.user, true)
        });

        match text {
            Some(text) => ctx.reply(text).await,
            None => ctx.reply(format!("Unable to find help for {}.", ctx.param)).await,
        }
    }
}

/// `commandlist`: every command the user may run.
pub struct CommandListCommand;

#[async_trait]
impl Handler for CommandListCommand {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        let router = &ctx.router;
        let messages = router.help().command_list(
            router.registry(),
            &router.authority(),
            &ctx.user,
            router.limits(),
            "Commands: ",
            "",
            "No commands available",
        );
        ctx.sender.send_all(messages).await
    }
}

/// `chatmessage <text>`: say something, with placeholders expanded.
///
/// Text that the chat service would read as one of its own commands
/// (`/ban`, `.timeout`) is refused.
pub struct ChatMessageCommand;

#[async_trait]
impl Handler for ChatMessageCommand {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        let text = ctx.expand(&ctx.param);
        if text.trim_start().starts_with(['/', '.']) {
            return Err(HandlerError::InvalidArgument(text));
        }
        ctx.reply(text).await
    }
}

/// Fixed reply text from a `[[commands]]` block.
pub struct ReplyCommand {
    text: String,
}

impl ReplyCommand {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Handler for ReplyCommand {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        ctx.reply(ctx.expand(&self.text)).await
    }
}

/// Register `help`, `commandlist`, `about` and `chatmessage`.
pub fn register_builtins(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry
        .command(["help", ".help"])
        .action(HelpCommand)
        .help(
            CmdFlags::EVERYONE,
            "usage: %alias%<command name>, or just %alias%to show a list of all commands available to you.",
            ArgPattern::anything(),
        )
        .register()?;

    registry
        .command(["commandlist"])
        .action(CommandListCommand)
        .help(
            CmdFlags::EVERYONE,
            "usage: %alias%%|%... Displays all the bot commands available to you.",
            ArgPattern::nothing(),
        )
        .register()?;

    // Help-only: the pattern never matches, so any use shows the text.
    registry
        .command(["about"])
        .help(
            CmdFlags::BROADCASTER_ONLY,
            concat!("chatgate version ", env!("CARGO_PKG_VERSION"), "."),
            ArgPattern::fail(),
        )
        .register()?;

    registry
        .command(["chatmessage"])
        .action(ChatMessageCommand)
        .help(
            CmdFlags::BROADCASTER_ONLY,
            "usage: %alias%<what you want to say in chat, supports % variables>",
            ArgPattern::at_least_one(),
        )
        .register()?;

    Ok(())
}

/// Register one [`ReplyCommand`] per config block.
pub fn register_config_commands(
    registry: &mut CommandRegistry,
    blocks: &[CommandBlock],
) -> Result<(), RegistryError> {
    for block in blocks {
        let mut builder = registry
            .command(&block.aliases)
            .action(ReplyCommand::new(block.reply.clone()))
            .help(block.parsed_flags()?, &block.help, block.parsed_pattern()?);
        if let Some(long_help) = &block.long_help {
            builder = builder.long_help(long_help);
        }
        if let Some(list) = &block.allow {
            builder = builder.allow(list);
        }
        let entry = builder.register()?;
        debug!(command = %entry.name(), "Registered reply command from config");
    }
    Ok(())
}
