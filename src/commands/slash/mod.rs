//! # Slash Commands (/)
//!
//! Slash command definitions and registration.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use log::info;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::Command;
use serenity::model::id::GuildId;
use serenity::prelude::Context;

/// Creates all slash command definitions
pub fn create_slash_commands() -> Vec<CreateApplicationCommand> {
    let mut commands = Vec::new();

    let mut start = CreateApplicationCommand::default();
    start
        .name("start")
        .description("Главное меню с категориями напоминаний");
    commands.push(start);

    let mut reminders = CreateApplicationCommand::default();
    reminders
        .name("reminders")
        .description("Показать ваши активные напоминания");
    commands.push(reminders);

    let mut help = CreateApplicationCommand::default();
    help.name("help").description("Справка по боту напоминаний");
    commands.push(help);

    commands
}

/// Registers all slash commands globally (may take up to an hour to
/// propagate)
pub async fn register_global_commands(ctx: &Context) -> Result<()> {
    let slash_commands = create_slash_commands();

    Command::set_global_application_commands(&ctx.http, |commands| {
        for command in slash_commands {
            commands.add_application_command(command);
        }
        commands
    })
    .await?;

    info!(
        "Global slash commands registered successfully ({} commands)",
        create_slash_commands().len()
    );
    Ok(())
}

/// Registers all slash commands for a specific guild (instant, for testing)
pub async fn register_guild_commands(ctx: &Context, guild_id: GuildId) -> Result<()> {
    let slash_commands = create_slash_commands();

    guild_id
        .set_application_commands(&ctx.http, |commands| {
            for command in slash_commands {
                commands.add_application_command(command);
            }
            commands
        })
        .await?;

    info!(
        "Guild slash commands registered for guild {} ({} commands)",
        guild_id,
        create_slash_commands().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_slash_commands() {
        let commands = create_slash_commands();
        assert_eq!(commands.len(), 3);

        let command_names: Vec<String> = commands
            .iter()
            .map(|cmd| cmd.0.get("name").unwrap().as_str().unwrap().to_string())
            .collect();

        for expected in ["start", "reminders", "help"] {
            assert!(
                command_names.contains(&expected.to_string()),
                "Missing command: {expected}"
            );
        }
    }
}
