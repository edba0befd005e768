//! Top-level slash command dispatcher
//!
//! Owns the shared [`CommandContext`] and the handler registry; the gateway
//! event handler forwards every application command interaction here.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::sync::Arc;

use anyhow::Result;
use log::warn;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::Context;

use crate::commands::context::CommandContext;
use crate::commands::handlers::create_all_handlers;
use crate::commands::registry::CommandRegistry;

/// Routes slash commands to their registered handlers.
#[derive(Clone)]
pub struct CommandHandler {
    context: Arc<CommandContext>,
    registry: CommandRegistry,
}

impl CommandHandler {
    pub fn new(context: CommandContext) -> Self {
        let mut registry = CommandRegistry::new();
        for handler in create_all_handlers() {
            registry.register(handler);
        }
        Self {
            context: Arc::new(context),
            registry,
        }
    }

    /// Shared context, also used by the component handler.
    pub fn context(&self) -> Arc<CommandContext> {
        Arc::clone(&self.context)
    }

    /// Dispatch one slash command interaction.
    pub async fn handle_slash_command(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let name = command.data.name.as_str();
        match self.registry.get(name) {
            Some(handler) => {
                handler
                    .handle(self.context(), serenity_ctx, command)
                    .await
            }
            None => {
                warn!("Received unknown slash command: {name}");
                Ok(())
            }
        }
    }
}
