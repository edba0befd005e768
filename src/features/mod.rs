//! # Features Layer
//!
//! Domain feature modules: the category configuration tree and the reminder
//! engine built on top of it.

pub mod categories;
pub mod reminders;

// Re-export the items the binary and presentation layer reach for
pub use categories::{Actor, AdminOps, CategoryTree, RoleAllowList, Subcategory, SubcategoryKind};
pub use reminders::{
    DirectMessageDelivery, ReminderDelivery, ReminderScheduler, ReminderService, ReminderStore,
};
