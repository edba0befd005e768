//! # Reminders Feature
//!
//! One-shot scheduled reminders: the store, the creation/listing service and
//! the periodic delivery sweep.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod scheduler;
pub mod service;
pub mod store;

pub use scheduler::{DirectMessageDelivery, ReminderDelivery, ReminderScheduler};
pub use service::{ActiveReminder, ReminderReceipt, ReminderService};
pub use store::{Reminder, ReminderStore};
