//! Slash command handler trait and infrastructure
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::Context;
use std::sync::Arc;

use super::context::CommandContext;

/// Trait for slash command handlers
///
/// Each handler processes one or more slash commands and is registered with
/// a [`super::registry::CommandRegistry`], which dispatches by command name.
#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    /// Command name(s) this handler processes
    fn command_names(&self) -> &'static [&'static str];

    /// Handle the slash command
    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that the trait is object-safe (can be used with dyn)
    fn _assert_object_safe(_: &dyn SlashCommandHandler) {}
}
