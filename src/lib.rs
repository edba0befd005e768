// Core layer - configuration, errors, time notation
pub mod core;

// Features layer - category tree and the reminder engine
pub mod features;

// Infrastructure - durable JSON snapshots
pub mod storage;

// UI components - buttons, menus and modals
pub mod message_components;

// Application layer
pub mod command_handler;
pub mod commands;

// Re-export core config for convenience
pub use core::Config;

// Re-export feature items the binary wires together
pub use features::{
    // Categories
    Actor, AdminOps, CategoryTree, RoleAllowList,
    // Reminders
    DirectMessageDelivery, ReminderScheduler, ReminderService,
};

// Re-export storage primitives
pub use storage::{shared, AppState, Snapshots};
