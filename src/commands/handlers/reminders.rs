//! Reminder listing command handler
//!
//! Handles: reminders
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::core::timespan::format_time;

/// Handler for the caller's active reminders
pub struct RemindersHandler;

#[async_trait]
impl SlashCommandHandler for RemindersHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["reminders"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.0;
        debug!("Listing reminders for user {user_id}");

        let reminders = ctx.service.my_reminders(user_id).await;

        if reminders.is_empty() {
            command
                .create_interaction_response(&serenity_ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message
                                .content("⏰ У вас нет активных напоминаний!")
                                .ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        }

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .embed(|embed| {
                                embed.title("⏰ Ваши напоминания").color(0xffa500);
                                for reminder in &reminders {
                                    embed.field(
                                        format!("📁 {}", reminder.category),
                                        format!(
                                            "⏰ Осталось: {}\n📝 {}",
                                            format_time(reminder.remaining_seconds),
                                            reminder.message
                                        ),
                                        false,
                                    );
                                }
                                embed
                            })
                            .ephemeral(true)
                    })
            })
            .await?;

        Ok(())
    }
}
