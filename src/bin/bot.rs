use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::gateway::{Activity, Ready};
use serenity::model::id::GuildId;
use serenity::prelude::*;

use napominalka::commands::{register_global_commands, register_guild_commands, CommandHandler};
use napominalka::core::Config;
use napominalka::features::categories::{AdminOps, CategoryTree, RoleAllowList};
use napominalka::features::reminders::{DirectMessageDelivery, ReminderScheduler, ReminderService};
use napominalka::message_components::MessageComponentHandler;
use napominalka::storage::{shared, Snapshots};

struct Handler {
    command_handler: Arc<CommandHandler>,
    component_handler: Arc<MessageComponentHandler>,
    guild_id: Option<GuildId>,
}

impl Handler {
    fn new(
        command_handler: CommandHandler,
        component_handler: MessageComponentHandler,
        guild_id: Option<GuildId>,
    ) -> Self {
        Handler {
            command_handler: Arc::new(command_handler),
            component_handler: Arc::new(component_handler),
            guild_id,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        ctx.set_activity(Activity::listening("/start - Умные напоминания"))
            .await;

        // Register slash commands - guild commands for development (instant),
        // global for production
        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            } else {
                info!("✅ Successfully registered slash commands for guild {guild_id} (instant update)");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            } else {
                info!("✅ Successfully registered slash commands globally (may take up to 1 hour to propagate)");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                if let Err(e) = self
                    .command_handler
                    .handle_slash_command(&ctx, &command)
                    .await
                {
                    error!(
                        "Error handling slash command '{}': {}",
                        command.data.name, e
                    );

                    let _ = command
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(serenity::model::application::interaction::InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message.content(
                                        "❌ Произошла ошибка при обработке команды. Попробуйте ещё раз.",
                                    )
                                })
                        })
                        .await;
                }
            }
            Interaction::MessageComponent(component) => {
                if let Err(e) = self
                    .component_handler
                    .handle_component_interaction(&ctx, &component)
                    .await
                {
                    error!(
                        "Error handling component interaction '{}': {}",
                        component.data.custom_id, e
                    );

                    let _ = component
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(serenity::model::application::interaction::InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message.content(
                                        "❌ Произошла ошибка при обработке действия. Попробуйте ещё раз.",
                                    )
                                })
                        })
                        .await;
                }
            }
            Interaction::ModalSubmit(modal) => {
                if let Err(e) = self
                    .component_handler
                    .handle_modal_submit(&ctx, &modal)
                    .await
                {
                    error!(
                        "Error handling modal submit '{}': {}",
                        modal.data.custom_id, e
                    );

                    let _ = modal
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(serenity::model::application::interaction::InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message.content(
                                        "❌ Произошла ошибка при обработке формы. Попробуйте ещё раз.",
                                    )
                                })
                        })
                        .await;
                }
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Napominalka Discord Bot...");

    // Load durable state, seeding default categories on first startup
    let snapshots = Snapshots::new(&config.reminders_file, &config.categories_file);
    let mut state = snapshots.load().await;
    if state.categories.is_empty() {
        state.categories = CategoryTree::with_defaults();
        snapshots.save_categories(&state.categories).await;
        info!("✅ Стандартные категории инициализированы");
    }
    let state = shared(state);

    let service = ReminderService::new(state.clone(), snapshots.clone());
    let admin = AdminOps::new(
        state.clone(),
        snapshots.clone(),
        Arc::new(RoleAllowList::new(config.admin_roles.clone())),
    );

    let command_handler = CommandHandler::new(
        napominalka::commands::CommandContext::new(service, admin),
    );
    let component_handler = MessageComponentHandler::new(command_handler.context());

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let handler = Handler::new(command_handler, component_handler, guild_id);

    let intents = GatewayIntents::GUILDS;

    // Build the Discord client
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    // Start the reminder scheduler
    let scheduler = ReminderScheduler::new(state, snapshots);
    let delivery = DirectMessageDelivery::new(client.cache_and_http.http.clone());
    tokio::spawn(async move {
        scheduler.run(delivery).await;
    });

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
