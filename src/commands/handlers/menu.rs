//! Main menu and help command handlers
//!
//! Handles: start, help
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
use crate::message_components::main_menu_buttons;

/// Handler for the main menu and the help page
pub struct MenuHandler;

#[async_trait]
impl SlashCommandHandler for MenuHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["start", "help"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "start" => self.handle_start(&ctx, serenity_ctx, command).await,
            "help" => self.handle_help(serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl MenuHandler {
    /// Handle /start - welcome embed plus one button per category
    async fn handle_start(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        debug!("Opening main menu for user {}", command.user.id);
        let categories = ctx.service.categories().await;
        let buttons = main_menu_buttons(&categories);

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .embed(|embed| {
                                embed
                                    .title("🤖 Умная система напоминаний")
                                    .description(
                                        "**Добро пожаловать в систему умных напоминаний!**\n\n\
                                         🎯 **Возможности бота:**\n\
                                         • ⏰ Установка таймеров и напоминаний\n\
                                         • 🌾 Напоминания для фарма ресурсов\n\
                                         • 🏁 Автоматические задания клубов\n\
                                         • ⚙️ Гибкая настройка категорий (для админов)\n\n\
                                         **📋 Основные команды:**\n\
                                         `/start` - открыть главное меню\n\
                                         `/reminders` - показать активные напоминания",
                                    )
                                    .color(0x0099ff);
                                for category in &categories {
                                    embed.field(
                                        &category.name,
                                        format!("📊 Подкатегорий: {}", category.subcategory_count),
                                        true,
                                    );
                                }
                                embed.footer(|f| f.text("Выберите категорию ниже"))
                            })
                            .set_components(buttons)
                    })
            })
            .await?;

        Ok(())
    }

    /// Handle /help - static help page
    async fn handle_help(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message.embed(|embed| {
                            embed
                                .title("📖 Помощь по боту напоминаний")
                                .description(
                                    "**🤖 О боте:**\n\
                                     Умная система напоминаний для Discord с гибкими настройками и удобным интерфейсом.\n\n\
                                     **🎯 Основные команды:**\n\
                                     `/start` - Главное меню с категориями\n\
                                     `/reminders` - Активные напоминания\n\
                                     `/help` - Эта справка\n\n\
                                     **⚙️ Для администраторов:**\n\
                                     Доступно управление категориями через кнопку \"Управление\" в главном меню\n\n\
                                     **💡 Особенности:**\n\
                                     • Автоматическая отправка напоминаний в ЛС\n\
                                     • Гибкая настройка времени\n\
                                     • Интуитивный интерфейс с кнопками",
                                )
                                .color(0x9370DB)
                        })
                    })
            })
            .await?;

        Ok(())
    }
}
