use anyhow::Result;
use log::{error, info};
use serenity::builder::CreateComponents;
use serenity::model::application::component::{ActionRowComponent, ButtonStyle, InputTextStyle};
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::context::{resolve_actor, CommandContext};
use crate::core::error::DomainError;
use crate::core::timespan::{parse_time_string, parts_of};
use crate::features::categories::Actor;
use crate::features::reminders::service::{CategoryView, SubcategoryView};

/// Buttons may carry at most this many characters as a label.
const BUTTON_LABEL_LIMIT: usize = 80;

// ============================================================================
// Tagged dispatch
// ============================================================================

/// Every button the bot renders, as a typed operation with its target keys.
///
/// The variant round-trips through the component custom-id, so one parser
/// and one exhaustive match replace per-button callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Show the subcategories of a category.
    ShowCategory(String),
    /// A subcategory was picked for reminder creation.
    PickSubcategory { category: String, sub: String },
    /// Open the admin panel (gated).
    AdminPanel,
    /// Manage one category.
    AdminCategory(String),
    /// Open the new-category modal.
    AdminAddCategory,
    /// Open the rename-category modal.
    AdminRenameCategory(String),
    /// Delete a category outright.
    AdminDeleteCategory(String),
    /// List a category's subcategories for management.
    AdminSubcategories(String),
    /// Manage one subcategory.
    AdminSubcategory { category: String, sub: String },
    /// Open the add-subcategory modal.
    AdminAddSubcategory(String),
    /// Open the combined edit modal for a subcategory.
    AdminEditSubcategory { category: String, sub: String },
    /// Open the fixed-timer setup modal.
    AdminConfigureFixed { category: String, sub: String },
    /// Delete a subcategory.
    AdminDeleteSubcategory { category: String, sub: String },
    /// Back to the admin category list.
    BackToAdminCategories,
}

impl MenuAction {
    /// Wire encoding used as the component custom-id.
    pub fn custom_id(&self) -> String {
        match self {
            Self::ShowCategory(key) => format!("cat:{key}"),
            Self::PickSubcategory { category, sub } => format!("sub:{category}:{sub}"),
            Self::AdminPanel => "admin".to_string(),
            Self::AdminCategory(key) => format!("adm_cat:{key}"),
            Self::AdminAddCategory => "adm_cat_add".to_string(),
            Self::AdminRenameCategory(key) => format!("adm_cat_ren:{key}"),
            Self::AdminDeleteCategory(key) => format!("adm_cat_del:{key}"),
            Self::AdminSubcategories(key) => format!("adm_subs:{key}"),
            Self::AdminSubcategory { category, sub } => format!("adm_sub:{category}:{sub}"),
            Self::AdminAddSubcategory(key) => format!("adm_sub_add:{key}"),
            Self::AdminEditSubcategory { category, sub } => {
                format!("adm_sub_edit:{category}:{sub}")
            }
            Self::AdminConfigureFixed { category, sub } => format!("adm_fix:{category}:{sub}"),
            Self::AdminDeleteSubcategory { category, sub } => {
                format!("adm_sub_del:{category}:{sub}")
            }
            Self::BackToAdminCategories => "adm_back".to_string(),
        }
    }

    /// Decode a custom-id back into an action.
    pub fn parse(custom_id: &str) -> Option<Self> {
        match custom_id {
            "admin" => return Some(Self::AdminPanel),
            "adm_cat_add" => return Some(Self::AdminAddCategory),
            "adm_back" => return Some(Self::BackToAdminCategories),
            _ => {}
        }

        let (prefix, rest) = custom_id.split_once(':')?;
        let pair = || {
            rest.split_once(':')
                .map(|(category, sub)| (category.to_string(), sub.to_string()))
        };

        match prefix {
            "cat" => Some(Self::ShowCategory(rest.to_string())),
            "sub" => pair().map(|(category, sub)| Self::PickSubcategory { category, sub }),
            "adm_cat" => Some(Self::AdminCategory(rest.to_string())),
            "adm_cat_ren" => Some(Self::AdminRenameCategory(rest.to_string())),
            "adm_cat_del" => Some(Self::AdminDeleteCategory(rest.to_string())),
            "adm_subs" => Some(Self::AdminSubcategories(rest.to_string())),
            "adm_sub" => pair().map(|(category, sub)| Self::AdminSubcategory { category, sub }),
            "adm_sub_add" => Some(Self::AdminAddSubcategory(rest.to_string())),
            "adm_sub_edit" => {
                pair().map(|(category, sub)| Self::AdminEditSubcategory { category, sub })
            }
            "adm_fix" => pair().map(|(category, sub)| Self::AdminConfigureFixed { category, sub }),
            "adm_sub_del" => {
                pair().map(|(category, sub)| Self::AdminDeleteSubcategory { category, sub })
            }
            _ => None,
        }
    }
}

/// Every modal the bot opens, keyed the same way as [`MenuAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    /// Custom timer entry (days/hours/minutes/message).
    CustomTimer { category: String, sub: String },
    /// New category name.
    NewCategory,
    /// Rename an existing category.
    RenameCategory(String),
    /// New subcategory name + type.
    NewSubcategory(String),
    /// Fixed-timer duration + message setup.
    FixedSetup { category: String, sub: String },
    /// Combined subcategory edit (name, and timer fields when fixed).
    EditSubcategory { category: String, sub: String },
}

impl ModalAction {
    pub fn custom_id(&self) -> String {
        match self {
            Self::CustomTimer { category, sub } => format!("modal_timer:{category}:{sub}"),
            Self::NewCategory => "modal_cat_new".to_string(),
            Self::RenameCategory(key) => format!("modal_cat_ren:{key}"),
            Self::NewSubcategory(key) => format!("modal_sub_new:{key}"),
            Self::FixedSetup { category, sub } => format!("modal_fix:{category}:{sub}"),
            Self::EditSubcategory { category, sub } => format!("modal_sub_edit:{category}:{sub}"),
        }
    }

    pub fn parse(custom_id: &str) -> Option<Self> {
        if custom_id == "modal_cat_new" {
            return Some(Self::NewCategory);
        }
        let (prefix, rest) = custom_id.split_once(':')?;
        let pair = || {
            rest.split_once(':')
                .map(|(category, sub)| (category.to_string(), sub.to_string()))
        };
        match prefix {
            "modal_timer" => pair().map(|(category, sub)| Self::CustomTimer { category, sub }),
            "modal_cat_ren" => Some(Self::RenameCategory(rest.to_string())),
            "modal_sub_new" => Some(Self::NewSubcategory(rest.to_string())),
            "modal_fix" => pair().map(|(category, sub)| Self::FixedSetup { category, sub }),
            "modal_sub_edit" => {
                pair().map(|(category, sub)| Self::EditSubcategory { category, sub })
            }
            _ => None,
        }
    }
}

// ============================================================================
// Component builders
// ============================================================================

fn clip_label(label: &str) -> String {
    if label.chars().count() > BUTTON_LABEL_LIMIT {
        let clipped: String = label.chars().take(BUTTON_LABEL_LIMIT - 3).collect();
        format!("{clipped}...")
    } else {
        label.to_string()
    }
}

/// Main menu: one button per category plus the admin panel button.
pub fn main_menu_buttons(categories: &[CategoryView]) -> CreateComponents {
    let mut components = CreateComponents::default();
    for chunk in categories.chunks(5) {
        components.create_action_row(|row| {
            for category in chunk {
                row.create_button(|button| {
                    button
                        .custom_id(MenuAction::ShowCategory(category.key.clone()).custom_id())
                        .label(clip_label(&category.name))
                        .style(ButtonStyle::Primary)
                });
            }
            row
        });
    }
    components.create_action_row(|row| {
        row.create_button(|button| {
            button
                .custom_id(MenuAction::AdminPanel.custom_id())
                .label("⚙️ Управление")
                .style(ButtonStyle::Secondary)
        })
    });
    components
}

/// One button per subcategory of a category.
fn subcategory_buttons(category_key: &str, subcategories: &[SubcategoryView]) -> CreateComponents {
    let mut components = CreateComponents::default();
    for chunk in subcategories.chunks(5) {
        components.create_action_row(|row| {
            for sub in chunk {
                row.create_button(|button| {
                    button
                        .custom_id(
                            MenuAction::PickSubcategory {
                                category: category_key.to_string(),
                                sub: sub.key.clone(),
                            }
                            .custom_id(),
                        )
                        .label(clip_label(&sub.name))
                        .style(ButtonStyle::Primary)
                });
            }
            row
        });
    }
    components
}

/// Admin panel: one button per category plus the create button.
fn admin_category_buttons(categories: &[CategoryView]) -> CreateComponents {
    let mut components = CreateComponents::default();
    for chunk in categories.chunks(5) {
        components.create_action_row(|row| {
            for category in chunk {
                row.create_button(|button| {
                    button
                        .custom_id(MenuAction::AdminCategory(category.key.clone()).custom_id())
                        .label(clip_label(&category.name))
                        .style(ButtonStyle::Primary)
                });
            }
            row
        });
    }
    components.create_action_row(|row| {
        row.create_button(|button| {
            button
                .custom_id(MenuAction::AdminAddCategory.custom_id())
                .label("➕ Создать категорию")
                .style(ButtonStyle::Success)
        })
    });
    components
}

// ============================================================================
// Handler
// ============================================================================

/// Handler for all message component and modal interactions
pub struct MessageComponentHandler {
    context: Arc<CommandContext>,
}

impl MessageComponentHandler {
    pub fn new(context: Arc<CommandContext>) -> Self {
        Self { context }
    }

    /// Handle all button interactions
    pub async fn handle_component_interaction(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        let custom_id = &interaction.data.custom_id;
        let user_id = interaction.user.id.to_string();

        info!("Processing component interaction: {custom_id} from user: {user_id}");

        let action = match MenuAction::parse(custom_id) {
            Some(action) => action,
            None => {
                return self
                    .respond_text(ctx, interaction, "❌ Неизвестное действие.")
                    .await;
            }
        };

        let actor = resolve_actor(
            ctx,
            interaction.guild_id,
            interaction.member.as_ref(),
            &interaction.user,
        );

        match action {
            MenuAction::ShowCategory(key) => self.show_subcategories(ctx, interaction, &key).await,
            MenuAction::PickSubcategory { category, sub } => {
                self.pick_subcategory(ctx, interaction, &category, &sub).await
            }
            MenuAction::AdminPanel | MenuAction::BackToAdminCategories => {
                if !self.context.admin.is_admin(&actor) {
                    return self
                        .respond_text(
                            ctx,
                            interaction,
                            &format!("❌ {}", DomainError::Unauthorized),
                        )
                        .await;
                }
                self.show_admin_categories(ctx, interaction).await
            }
            MenuAction::AdminCategory(key) => {
                self.show_category_management(ctx, interaction, &key).await
            }
            MenuAction::AdminAddCategory => {
                self.open_new_category_modal(ctx, interaction).await
            }
            MenuAction::AdminRenameCategory(key) => {
                self.open_rename_category_modal(ctx, interaction, &key).await
            }
            MenuAction::AdminDeleteCategory(key) => {
                match self.context.admin.delete_category(&actor, &key).await {
                    Ok(name) => {
                        self.respond_text(
                            ctx,
                            interaction,
                            &format!("✅ **Категория удалена!**\n🗑️ {name}"),
                        )
                        .await
                    }
                    Err(e) => self.respond_domain_error(ctx, interaction, e).await,
                }
            }
            MenuAction::AdminSubcategories(key) => {
                self.show_subcategories_management(ctx, interaction, &key).await
            }
            MenuAction::AdminSubcategory { category, sub } => {
                self.show_subcategory_management(ctx, interaction, &category, &sub)
                    .await
            }
            MenuAction::AdminAddSubcategory(key) => {
                self.open_new_subcategory_modal(ctx, interaction, &key).await
            }
            MenuAction::AdminEditSubcategory { category, sub } => {
                self.open_edit_subcategory_modal(ctx, interaction, &category, &sub)
                    .await
            }
            MenuAction::AdminConfigureFixed { category, sub } => {
                self.open_fixed_setup_modal(ctx, interaction, &category, &sub)
                    .await
            }
            MenuAction::AdminDeleteSubcategory { category, sub } => {
                match self
                    .context
                    .admin
                    .delete_subcategory(&actor, &category, &sub)
                    .await
                {
                    Ok(name) => {
                        self.respond_text(
                            ctx,
                            interaction,
                            &format!("✅ **Подкатегория удалена!**\n🗑️ {name}"),
                        )
                        .await
                    }
                    Err(e) => self.respond_domain_error(ctx, interaction, e).await,
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // User-facing menus
    // ------------------------------------------------------------------

    /// Subcategory picker for one category.
    async fn show_subcategories(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        category_key: &str,
    ) -> Result<()> {
        let detail = match self.context.service.category_detail(category_key).await {
            Ok(detail) => detail,
            Err(e) => return self.respond_domain_error(ctx, interaction, e).await,
        };

        let buttons = subcategory_buttons(&detail.key, &detail.subcategories);
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .embed(|embed| {
                                embed
                                    .title(format!("{} - Подкатегории", detail.name))
                                    .description("Выберите нужную опцию:")
                                    .color(0x00ff00);
                                for sub in &detail.subcategories {
                                    let time_info = sub
                                        .time
                                        .as_deref()
                                        .map(|t| format!(" | ⏰ {t}"))
                                        .unwrap_or_default();
                                    embed.field(
                                        format!("{}{time_info}", sub.name),
                                        format!(
                                            "💬 {}",
                                            sub.message.as_deref().unwrap_or("Настраиваемое напоминание")
                                        ),
                                        false,
                                    );
                                }
                                embed
                            })
                            .set_components(buttons)
                            .ephemeral(true)
                    })
            })
            .await?;
        Ok(())
    }

    /// Route a picked subcategory: custom opens the timer modal, fixed
    /// creates the reminder immediately.
    async fn pick_subcategory(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        category_key: &str,
        sub_key: &str,
    ) -> Result<()> {
        let sub = match self
            .context
            .service
            .subcategory_detail(category_key, sub_key)
            .await
        {
            Ok(sub) => sub,
            Err(e) => return self.respond_domain_error(ctx, interaction, e).await,
        };

        if !sub.fixed {
            return self
                .open_custom_timer_modal(ctx, interaction, category_key, sub_key)
                .await;
        }

        match self
            .context
            .service
            .create_fixed(category_key, sub_key, interaction.user.id.0)
            .await
        {
            Ok(receipt) => {
                let fired_at = receipt.end_time.format("%d.%m.%Y в %H:%M:%S");
                self.respond_text(
                    ctx,
                    interaction,
                    &format!(
                        "✅ **Напоминание установлено!**\n\
                         📁 **Категория:** {}\n\
                         ⏰ **Через:** {}\n\
                         📝 **Сообщение:** {}\n\
                         🕐 **Сработает:** {fired_at}",
                        receipt.category_label, receipt.time_display, receipt.message
                    ),
                )
                .await
            }
            Err(e) => self.respond_domain_error(ctx, interaction, e).await,
        }
    }

    // ------------------------------------------------------------------
    // Admin menus
    // ------------------------------------------------------------------

    async fn show_admin_categories(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        let categories = self.context.service.categories().await;
        let buttons = admin_category_buttons(&categories);

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .embed(|embed| {
                                embed
                                    .title("⚙️ Управление категориями")
                                    .description("Выберите категорию для управления:")
                                    .color(0xffa500);
                                for category in &categories {
                                    embed.field(
                                        &category.name,
                                        format!("📊 Подкатегорий: {}", category.subcategory_count),
                                        true,
                                    );
                                }
                                embed.field("➕ Новая категория", "Создать новую категорию", false)
                            })
                            .set_components(buttons)
                            .ephemeral(true)
                    })
            })
            .await?;
        Ok(())
    }

    async fn show_category_management(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        category_key: &str,
    ) -> Result<()> {
        let detail = match self.context.service.category_detail(category_key).await {
            Ok(detail) => detail,
            Err(e) => return self.respond_domain_error(ctx, interaction, e).await,
        };

        let subcats_text = detail
            .subcategories
            .iter()
            .map(|sub| {
                let kind = if sub.fixed { "fixed" } else { "custom" };
                format!("• {} ({kind})", sub.name)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let key = detail.key.clone();
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .embed(|embed| {
                                embed
                                    .title(format!("⚙️ Управление: {}", detail.name))
                                    .description("Выберите действие:")
                                    .color(0x0099ff)
                                    .field(
                                        "📊 Информация",
                                        format!("Подкатегорий: {}", detail.subcategories.len()),
                                        false,
                                    );
                                if !subcats_text.is_empty() {
                                    embed.field("📁 Подкатегории", &subcats_text, false);
                                }
                                embed
                            })
                            .components(|components| {
                                components.create_action_row(|row| {
                                    row.create_button(|button| {
                                        button
                                            .custom_id(
                                                MenuAction::AdminRenameCategory(key.clone())
                                                    .custom_id(),
                                            )
                                            .label("✏️ Редактировать категорию")
                                            .style(ButtonStyle::Primary)
                                    })
                                    .create_button(|button| {
                                        button
                                            .custom_id(
                                                MenuAction::AdminSubcategories(key.clone())
                                                    .custom_id(),
                                            )
                                            .label("📝 Управление подкатегориями")
                                            .style(ButtonStyle::Secondary)
                                    })
                                    .create_button(|button| {
                                        button
                                            .custom_id(
                                                MenuAction::AdminDeleteCategory(key.clone())
                                                    .custom_id(),
                                            )
                                            .label("🗑️ Удалить категорию")
                                            .style(ButtonStyle::Danger)
                                    })
                                })
                            })
                            .ephemeral(true)
                    })
            })
            .await?;
        Ok(())
    }

    async fn show_subcategories_management(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        category_key: &str,
    ) -> Result<()> {
        let detail = match self.context.service.category_detail(category_key).await {
            Ok(detail) => detail,
            Err(e) => return self.respond_domain_error(ctx, interaction, e).await,
        };

        let mut buttons = CreateComponents::default();
        for chunk in detail.subcategories.chunks(4) {
            buttons.create_action_row(|row| {
                for sub in chunk {
                    row.create_button(|button| {
                        button
                            .custom_id(
                                MenuAction::AdminSubcategory {
                                    category: detail.key.clone(),
                                    sub: sub.key.clone(),
                                }
                                .custom_id(),
                            )
                            .label(clip_label(&sub.name))
                            .style(ButtonStyle::Primary)
                    });
                }
                row
            });
        }
        buttons.create_action_row(|row| {
            row.create_button(|button| {
                button
                    .custom_id(MenuAction::AdminAddSubcategory(detail.key.clone()).custom_id())
                    .label("➕ Добавить подкатегорию")
                    .style(ButtonStyle::Success)
            })
            .create_button(|button| {
                button
                    .custom_id(MenuAction::BackToAdminCategories.custom_id())
                    .label("↩️ Назад к категориям")
                    .style(ButtonStyle::Secondary)
            })
        });

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .embed(|embed| {
                                embed
                                    .title(format!(
                                        "📝 Управление подкатегориями: {}",
                                        detail.name
                                    ))
                                    .description(
                                        "Выберите подкатегорию для управления или создайте новую:",
                                    )
                                    .color(0x9370DB);
                                for sub in &detail.subcategories {
                                    let time_info = sub
                                        .time
                                        .as_deref()
                                        .map(|t| format!(" | ⏰ {t}"))
                                        .unwrap_or_default();
                                    let kind = if sub.fixed { "fixed" } else { "custom" };
                                    embed.field(
                                        format!("{}{time_info}", sub.name),
                                        format!(
                                            "Тип: {kind} | 💬 {}",
                                            sub.message.as_deref().unwrap_or("Нет сообщения")
                                        ),
                                        false,
                                    );
                                }
                                embed
                            })
                            .set_components(buttons)
                            .ephemeral(true)
                    })
            })
            .await?;
        Ok(())
    }

    async fn show_subcategory_management(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        category_key: &str,
        sub_key: &str,
    ) -> Result<()> {
        let sub = match self
            .context
            .service
            .subcategory_detail(category_key, sub_key)
            .await
        {
            Ok(sub) => sub,
            Err(e) => return self.respond_domain_error(ctx, interaction, e).await,
        };

        let category = category_key.to_string();
        let sub_id = sub.key.clone();
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .embed(|embed| {
                                embed
                                    .title(format!("⚙️ Управление: {}", sub.name))
                                    .description("Выберите действие:")
                                    .color(0x00ff00)
                                    .field(
                                        "Тип",
                                        if sub.fixed { "fixed" } else { "custom" },
                                        true,
                                    );
                                if let Some(time) = &sub.time {
                                    embed.field("Время", time, true);
                                }
                                if let Some(text) = &sub.message {
                                    embed.field("Сообщение", text, true);
                                }
                                embed
                            })
                            .components(|components| {
                                components.create_action_row(|row| {
                                    row.create_button(|button| {
                                        button
                                            .custom_id(
                                                MenuAction::AdminEditSubcategory {
                                                    category: category.clone(),
                                                    sub: sub_id.clone(),
                                                }
                                                .custom_id(),
                                            )
                                            .label("✏️ Редактировать")
                                            .style(ButtonStyle::Primary)
                                    })
                                    .create_button(|button| {
                                        button
                                            .custom_id(
                                                MenuAction::AdminDeleteSubcategory {
                                                    category: category.clone(),
                                                    sub: sub_id.clone(),
                                                }
                                                .custom_id(),
                                            )
                                            .label("🗑️ Удалить")
                                            .style(ButtonStyle::Danger)
                                    })
                                    .create_button(|button| {
                                        button
                                            .custom_id(
                                                MenuAction::AdminSubcategories(category.clone())
                                                    .custom_id(),
                                            )
                                            .label("↩️ Назад")
                                            .style(ButtonStyle::Secondary)
                                    })
                                })
                            })
                            .ephemeral(true)
                    })
            })
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Modals
    // ------------------------------------------------------------------

    /// Custom timer form: days/hours/minutes plus the reminder text.
    async fn open_custom_timer_modal(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        category_key: &str,
        sub_key: &str,
    ) -> Result<()> {
        let modal_id = ModalAction::CustomTimer {
            category: category_key.to_string(),
            sub: sub_key.to_string(),
        }
        .custom_id();

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::Modal)
                    .interaction_response_data(|modal| {
                        modal
                            .custom_id(modal_id)
                            .title("Настраиваемый таймер")
                            .components(|c| {
                                c.create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("days")
                                            .label("Дни")
                                            .style(InputTextStyle::Short)
                                            .placeholder("Введите количество дней (0 если не нужно)")
                                            .value("0")
                                            .required(true)
                                            .max_length(3)
                                    })
                                })
                                .create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("hours")
                                            .label("Часы")
                                            .style(InputTextStyle::Short)
                                            .placeholder("Введите количество часов (0-23)")
                                            .value("0")
                                            .required(true)
                                            .max_length(2)
                                    })
                                })
                                .create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("minutes")
                                            .label("Минуты")
                                            .style(InputTextStyle::Short)
                                            .placeholder("Введите количество минут (0-59)")
                                            .value("0")
                                            .required(true)
                                            .max_length(2)
                                    })
                                })
                                .create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("message")
                                            .label("Сообщение напоминания")
                                            .style(InputTextStyle::Short)
                                            .placeholder("Введите текст напоминания")
                                            .required(true)
                                            .max_length(100)
                                    })
                                })
                            })
                    })
            })
            .await?;
        Ok(())
    }

    async fn open_new_category_modal(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::Modal)
                    .interaction_response_data(|modal| {
                        modal
                            .custom_id(ModalAction::NewCategory.custom_id())
                            .title("Создание новой категории")
                            .components(|c| {
                                c.create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("name")
                                            .label("Название категории")
                                            .style(InputTextStyle::Short)
                                            .placeholder("Введите название категории...")
                                            .required(true)
                                            .max_length(50)
                                    })
                                })
                            })
                    })
            })
            .await?;
        Ok(())
    }

    async fn open_rename_category_modal(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        category_key: &str,
    ) -> Result<()> {
        let detail = match self.context.service.category_detail(category_key).await {
            Ok(detail) => detail,
            Err(e) => return self.respond_domain_error(ctx, interaction, e).await,
        };

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::Modal)
                    .interaction_response_data(|modal| {
                        modal
                            .custom_id(ModalAction::RenameCategory(detail.key.clone()).custom_id())
                            .title("Редактирование категории")
                            .components(|c| {
                                c.create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("name")
                                            .label("Название категории")
                                            .style(InputTextStyle::Short)
                                            .value(&detail.name)
                                            .required(true)
                                            .max_length(50)
                                    })
                                })
                            })
                    })
            })
            .await?;
        Ok(())
    }

    async fn open_new_subcategory_modal(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        category_key: &str,
    ) -> Result<()> {
        let modal_id = ModalAction::NewSubcategory(category_key.to_string()).custom_id();
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::Modal)
                    .interaction_response_data(|modal| {
                        modal
                            .custom_id(modal_id)
                            .title("Добавление подкатегории")
                            .components(|c| {
                                c.create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("name")
                                            .label("Название подкатегории")
                                            .style(InputTextStyle::Short)
                                            .placeholder("Введите название...")
                                            .required(true)
                                            .max_length(50)
                                    })
                                })
                                .create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("type")
                                            .label("Тип (custom/fixed)")
                                            .style(InputTextStyle::Short)
                                            .placeholder("custom или fixed")
                                            .required(true)
                                            .max_length(10)
                                    })
                                })
                            })
                    })
            })
            .await?;
        Ok(())
    }

    /// Fixed setup form, also reachable right after adding a fixed
    /// subcategory.
    async fn open_fixed_setup_modal(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        category_key: &str,
        sub_key: &str,
    ) -> Result<()> {
        let modal_id = ModalAction::FixedSetup {
            category: category_key.to_string(),
            sub: sub_key.to_string(),
        }
        .custom_id();

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::Modal)
                    .interaction_response_data(|modal| {
                        modal
                            .custom_id(modal_id)
                            .title("Настройка Fixed таймера")
                            .components(|c| {
                                c.create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("days")
                                            .label("Дни")
                                            .style(InputTextStyle::Short)
                                            .placeholder("Введите количество дней")
                                            .value("0")
                                            .required(true)
                                            .max_length(3)
                                    })
                                })
                                .create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("hours")
                                            .label("Часы")
                                            .style(InputTextStyle::Short)
                                            .placeholder("Введите количество часов (0-23)")
                                            .value("0")
                                            .required(true)
                                            .max_length(2)
                                    })
                                })
                                .create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("minutes")
                                            .label("Минуты")
                                            .style(InputTextStyle::Short)
                                            .placeholder("Введите количество минут (0-59)")
                                            .value("0")
                                            .required(true)
                                            .max_length(2)
                                    })
                                })
                                .create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("message")
                                            .label("Сообщение напоминания")
                                            .style(InputTextStyle::Short)
                                            .placeholder("Введите текст напоминания")
                                            .required(true)
                                            .max_length(100)
                                    })
                                })
                            })
                    })
            })
            .await?;
        Ok(())
    }

    /// Combined edit form: a custom subcategory edits only the name, a
    /// fixed one also edits duration and message (prefilled from the tree).
    async fn open_edit_subcategory_modal(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        category_key: &str,
        sub_key: &str,
    ) -> Result<()> {
        let sub = match self
            .context
            .service
            .subcategory_detail(category_key, sub_key)
            .await
        {
            Ok(sub) => sub,
            Err(e) => return self.respond_domain_error(ctx, interaction, e).await,
        };

        let modal_id = ModalAction::EditSubcategory {
            category: category_key.to_string(),
            sub: sub_key.to_string(),
        }
        .custom_id();

        let (days, hours, minutes) = parts_of(parse_time_string(sub.time.as_deref().unwrap_or("")));
        let fixed = sub.fixed;
        let message_value = sub.message.clone().unwrap_or_default();

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::Modal)
                    .interaction_response_data(|modal| {
                        modal
                            .custom_id(modal_id)
                            .title("Редактирование подкатегории")
                            .components(|c| {
                                c.create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id("name")
                                            .label("Название подкатегории")
                                            .style(InputTextStyle::Short)
                                            .value(&sub.name)
                                            .required(true)
                                            .max_length(50)
                                    })
                                });
                                if fixed {
                                    c.create_action_row(|row| {
                                        row.create_input_text(|input| {
                                            input
                                                .custom_id("days")
                                                .label("Дни (для fixed)")
                                                .style(InputTextStyle::Short)
                                                .value(days.to_string())
                                                .required(true)
                                                .max_length(3)
                                        })
                                    })
                                    .create_action_row(|row| {
                                        row.create_input_text(|input| {
                                            input
                                                .custom_id("hours")
                                                .label("Часы (для fixed)")
                                                .style(InputTextStyle::Short)
                                                .value(hours.to_string())
                                                .required(true)
                                                .max_length(2)
                                        })
                                    })
                                    .create_action_row(|row| {
                                        row.create_input_text(|input| {
                                            input
                                                .custom_id("minutes")
                                                .label("Минуты (для fixed)")
                                                .style(InputTextStyle::Short)
                                                .value(minutes.to_string())
                                                .required(true)
                                                .max_length(2)
                                        })
                                    })
                                    .create_action_row(|row| {
                                        row.create_input_text(|input| {
                                            input
                                                .custom_id("message")
                                                .label("Сообщение (для fixed)")
                                                .style(InputTextStyle::Short)
                                                .value(&message_value)
                                                .required(true)
                                                .max_length(100)
                                        })
                                    });
                                }
                                c
                            })
                    })
            })
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Modal submissions
    // ------------------------------------------------------------------

    /// Handle all modal submit interactions
    pub async fn handle_modal_submit(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
    ) -> Result<()> {
        let custom_id = &interaction.data.custom_id;
        let user_id = interaction.user.id.to_string();
        let request_id = Uuid::new_v4();

        info!("[{request_id}] Processing modal submit: {custom_id} from user: {user_id}");

        let action = match ModalAction::parse(custom_id) {
            Some(action) => action,
            None => {
                return self
                    .respond_modal_text(ctx, interaction, "❌ Неизвестная форма.")
                    .await;
            }
        };

        let actor = resolve_actor(
            ctx,
            interaction.guild_id,
            interaction.member.as_ref(),
            &interaction.user,
        );

        match action {
            ModalAction::CustomTimer { category, sub } => {
                self.submit_custom_timer(ctx, interaction, &category, &sub).await
            }
            ModalAction::NewCategory => {
                let name = modal_value(interaction, "name").unwrap_or_default();
                match self.context.admin.create_category(&actor, &name).await {
                    Ok(key) => {
                        info!("[{request_id}] Created category `{key}`");
                        self.respond_modal_text(
                            ctx,
                            interaction,
                            &format!(
                                "✅ **Новая категория создана!**\n📁 {name}\n🔑 Ключ: {key}"
                            ),
                        )
                        .await
                    }
                    Err(e) => self.respond_modal_domain_error(ctx, interaction, e).await,
                }
            }
            ModalAction::RenameCategory(key) => {
                let name = modal_value(interaction, "name").unwrap_or_default();
                match self.context.admin.rename_category(&actor, &key, &name).await {
                    Ok(()) => {
                        self.respond_modal_text(
                            ctx,
                            interaction,
                            &format!("✅ **Категория обновлена!**\n📁 {name}"),
                        )
                        .await
                    }
                    Err(e) => self.respond_modal_domain_error(ctx, interaction, e).await,
                }
            }
            ModalAction::NewSubcategory(category) => {
                self.submit_new_subcategory(ctx, interaction, &actor, &category)
                    .await
            }
            ModalAction::FixedSetup { category, sub } => {
                self.submit_fixed_setup(ctx, interaction, &actor, &category, &sub)
                    .await
            }
            ModalAction::EditSubcategory { category, sub } => {
                self.submit_edit_subcategory(ctx, interaction, &actor, &category, &sub)
                    .await
            }
        }
    }

    async fn submit_custom_timer(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
        category_key: &str,
        sub_key: &str,
    ) -> Result<()> {
        let (days, hours, minutes) = match parse_numeric_fields(interaction) {
            Some(parts) => parts,
            None => {
                return self
                    .respond_modal_text(
                        ctx,
                        interaction,
                        "❌ Ошибка! Введите корректные числовые значения.",
                    )
                    .await;
            }
        };
        let message = modal_value(interaction, "message").unwrap_or_default();

        match self
            .context
            .service
            .create_custom(
                category_key,
                sub_key,
                interaction.user.id.0,
                days,
                hours,
                minutes,
                &message,
            )
            .await
        {
            Ok(receipt) => {
                let fired_at = receipt.end_time.format("%d.%m.%Y в %H:%M:%S");
                self.respond_modal_text(
                    ctx,
                    interaction,
                    &format!(
                        "✅ **Настраиваемый таймер установлен!**\n\
                         📁 **Категория:** {}\n\
                         ⏰ **Через:** {} ({days}д {hours}ч {minutes}м)\n\
                         📝 **Сообщение:** {}\n\
                         🕐 **Сработает:** {fired_at}",
                        receipt.category_label, receipt.time_display, receipt.message
                    ),
                )
                .await
            }
            Err(e) => self.respond_modal_domain_error(ctx, interaction, e).await,
        }
    }

    async fn submit_new_subcategory(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
        actor: &Actor,
        category_key: &str,
    ) -> Result<()> {
        let name = modal_value(interaction, "name").unwrap_or_default();
        let type_selection = modal_value(interaction, "type").unwrap_or_default();

        match self
            .context
            .admin
            .add_subcategory(actor, category_key, &name, &type_selection)
            .await
        {
            Ok(added) if added.fixed => {
                // a modal cannot answer a modal, so the setup step hangs off
                // a follow-up button
                let setup_id = MenuAction::AdminConfigureFixed {
                    category: category_key.to_string(),
                    sub: added.key.clone(),
                }
                .custom_id();
                interaction
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| {
                                message
                                    .content(format!(
                                        "✅ **Новая подкатегория добавлена!**\n\
                                         📝 {name}\n🔧 Тип: fixed\n\n\
                                         ⚠️ Таймер ещё не настроен — нажмите кнопку ниже."
                                    ))
                                    .components(|components| {
                                        components.create_action_row(|row| {
                                            row.create_button(|button| {
                                                button
                                                    .custom_id(setup_id.clone())
                                                    .label("⚙️ Настроить таймер")
                                                    .style(ButtonStyle::Success)
                                            })
                                        })
                                    })
                                    .ephemeral(true)
                            })
                    })
                    .await?;
                Ok(())
            }
            Ok(_) => {
                self.respond_modal_text(
                    ctx,
                    interaction,
                    &format!(
                        "✅ **Новая подкатегория добавлена!**\n📝 {name}\n🔧 Тип: custom"
                    ),
                )
                .await
            }
            Err(e) => self.respond_modal_domain_error(ctx, interaction, e).await,
        }
    }

    async fn submit_fixed_setup(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
        actor: &Actor,
        category_key: &str,
        sub_key: &str,
    ) -> Result<()> {
        let (days, hours, minutes) = match parse_numeric_fields(interaction) {
            Some(parts) => parts,
            None => {
                return self
                    .respond_modal_text(
                        ctx,
                        interaction,
                        "❌ Ошибка! Введите корректные числовые значения.",
                    )
                    .await;
            }
        };
        let message = modal_value(interaction, "message").unwrap_or_default();

        match self
            .context
            .admin
            .configure_fixed(actor, category_key, sub_key, days, hours, minutes, &message)
            .await
        {
            Ok(()) => {
                self.respond_modal_text(
                    ctx,
                    interaction,
                    &format!(
                        "✅ **Fixed-таймер настроен!**\n\
                         ⏰ Время: {days}д {hours}ч {minutes}м\n\
                         💬 Сообщение: {message}"
                    ),
                )
                .await
            }
            Err(e) => self.respond_modal_domain_error(ctx, interaction, e).await,
        }
    }

    async fn submit_edit_subcategory(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
        actor: &Actor,
        category_key: &str,
        sub_key: &str,
    ) -> Result<()> {
        let name = modal_value(interaction, "name").unwrap_or_default();

        // timer fields are present only when the subcategory is fixed
        let fixed_update = if modal_value(interaction, "days").is_some() {
            match parse_numeric_fields(interaction) {
                Some((days, hours, minutes)) => Some((
                    days,
                    hours,
                    minutes,
                    modal_value(interaction, "message").unwrap_or_default(),
                )),
                None => {
                    return self
                        .respond_modal_text(
                            ctx,
                            interaction,
                            "❌ Ошибка! Введите корректные числовые значения времени.",
                        )
                        .await;
                }
            }
        } else {
            None
        };

        match self
            .context
            .admin
            .edit_subcategory(actor, category_key, sub_key, &name, fixed_update)
            .await
        {
            Ok(()) => {
                self.respond_modal_text(
                    ctx,
                    interaction,
                    &format!("✅ **Подкатегория обновлена!**\n📝 {name}"),
                )
                .await
            }
            Err(e) => self.respond_modal_domain_error(ctx, interaction, e).await,
        }
    }

    // ------------------------------------------------------------------
    // Responses
    // ------------------------------------------------------------------

    async fn respond_text(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        text: &str,
    ) -> Result<()> {
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(text).ephemeral(true))
            })
            .await?;
        Ok(())
    }

    async fn respond_domain_error(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        err: DomainError,
    ) -> Result<()> {
        error!("Component interaction rejected: {err}");
        self.respond_text(ctx, interaction, &format!("❌ {err}")).await
    }

    async fn respond_modal_text(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
        text: &str,
    ) -> Result<()> {
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(text).ephemeral(true))
            })
            .await?;
        Ok(())
    }

    async fn respond_modal_domain_error(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
        err: DomainError,
    ) -> Result<()> {
        error!("Modal submission rejected: {err}");
        self.respond_modal_text(ctx, interaction, &format!("❌ {err}"))
            .await
    }
}

/// Pull one text input out of a submitted modal by its custom-id.
fn modal_value(interaction: &ModalSubmitInteraction, id: &str) -> Option<String> {
    for action_row in &interaction.data.components {
        for component in &action_row.components {
            if let ActionRowComponent::InputText(input) = component {
                if input.custom_id == id {
                    return Some(input.value.clone());
                }
            }
        }
    }
    None
}

/// Parse the three numeric timer fields of a modal. `None` on any
/// non-numeric entry.
fn parse_numeric_fields(interaction: &ModalSubmitInteraction) -> Option<(i64, i64, i64)> {
    let parse = |id: &str| modal_value(interaction, id)?.trim().parse::<i64>().ok();
    Some((parse("days")?, parse("hours")?, parse("minutes")?))
}
