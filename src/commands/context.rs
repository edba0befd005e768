//! Shared context for command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use serenity::model::guild::Member;
use serenity::model::id::GuildId;
use serenity::model::user::User;
use serenity::prelude::Context;

use crate::features::categories::{Actor, AdminOps};
use crate::features::reminders::ReminderService;

/// Shared context for all command and component handlers
///
/// Contains the two service handles every handler needs:
/// - ReminderService for reminder creation and listing
/// - AdminOps for gated category management
#[derive(Clone)]
pub struct CommandContext {
    pub service: ReminderService,
    pub admin: AdminOps,
}

impl CommandContext {
    pub fn new(service: ReminderService, admin: AdminOps) -> Self {
        Self { service, admin }
    }
}

/// Resolve the interacting user into an [`Actor`] for the admin gate.
///
/// Role names come from the guild cache; outside a guild (DMs) the actor
/// carries no roles and fails the admin check.
pub fn resolve_actor(
    serenity_ctx: &Context,
    guild_id: Option<GuildId>,
    member: Option<&Member>,
    user: &User,
) -> Actor {
    let mut roles = Vec::new();
    if let (Some(guild_id), Some(member)) = (guild_id, member) {
        if let Some(guild) = serenity_ctx.cache.guild(guild_id) {
            for role_id in &member.roles {
                if let Some(role) = guild.roles.get(role_id) {
                    roles.push(role.name.clone());
                }
            }
        }
    }
    Actor {
        user_id: user.id.0,
        roles,
    }
}
