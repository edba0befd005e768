//! # Configuration
//!
//! Environment-based configuration loaded once at startup.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{Context, Result};

/// Default comma-separated admin role allow-list.
pub const DEFAULT_ADMIN_ROLES: &str = "Администратор,Директор";

/// Runtime configuration for the bot.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token (required).
    pub discord_token: String,
    /// Optional guild id for instant command registration in development.
    pub discord_guild_id: Option<String>,
    /// Role names whose members may manage categories.
    pub admin_roles: Vec<String>,
    /// Path of the reminders snapshot document.
    pub reminders_file: String,
    /// Path of the categories snapshot document.
    pub categories_file: String,
    /// Default log filter when RUST_LOG is not set.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only `DISCORD_TOKEN` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .context("DISCORD_TOKEN environment variable is required")?;

        let discord_guild_id = std::env::var("DISCORD_GUILD_ID").ok();

        let admin_roles = std::env::var("ADMIN_ROLES")
            .unwrap_or_else(|_| DEFAULT_ADMIN_ROLES.to_string());
        let admin_roles = parse_role_list(&admin_roles);

        let reminders_file =
            std::env::var("REMINDERS_FILE").unwrap_or_else(|_| "users_data.json".to_string());
        let categories_file =
            std::env::var("CATEGORIES_FILE").unwrap_or_else(|_| "categories.json".to_string());

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            discord_token,
            discord_guild_id,
            admin_roles,
            reminders_file,
            categories_file,
            log_level,
        })
    }
}

/// Split a comma-separated role list, dropping empty segments.
fn parse_role_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_list() {
        assert_eq!(
            parse_role_list("Администратор,Директор"),
            vec!["Администратор", "Директор"]
        );
        assert_eq!(parse_role_list(" A , B ,"), vec!["A", "B"]);
        assert!(parse_role_list("").is_empty());
    }

    #[test]
    fn test_default_admin_roles() {
        let roles = parse_role_list(DEFAULT_ADMIN_ROLES);
        assert_eq!(roles.len(), 2);
    }
}
