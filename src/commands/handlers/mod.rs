//! Per-command handler implementations
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

pub mod menu;
pub mod reminders;

use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// Create all registered command handlers
///
/// Returns a vector of handlers ready to be registered with CommandRegistry.
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![
        Arc::new(menu::MenuHandler),
        Arc::new(reminders::RemindersHandler),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_commands_covered() {
        let names: Vec<&str> = create_all_handlers()
            .iter()
            .flat_map(|h| h.command_names().iter().copied())
            .collect();
        assert_eq!(names.len(), 3);
        for expected in ["start", "reminders", "help"] {
            assert!(names.contains(&expected), "Missing command: {expected}");
        }
    }
}
