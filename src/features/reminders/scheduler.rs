//! # Reminder Scheduler
//!
//! Periodic scan that detects due reminders and hands them to the delivery
//! collaborator. Each reminder gets exactly one delivery attempt: success or
//! failure, the entry is removed afterwards (a duplicate notification is
//! judged worse than a lost one).
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use log::{error, info};
use serenity::http::Http;
use serenity::model::id::UserId;

use crate::storage::{SharedState, Snapshots};

/// Scan period. A sweep that overruns simply delays the next tick; scans
/// never overlap.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(10);

/// Delivery collaborator invoked once per due reminder.
#[async_trait]
pub trait ReminderDelivery: Send + Sync {
    async fn deliver(&self, user_id: u64, message: &str, category: &str) -> Result<()>;
}

/// Sends the reminder to the owner as a direct message.
pub struct DirectMessageDelivery {
    http: Arc<Http>,
}

impl DirectMessageDelivery {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReminderDelivery for DirectMessageDelivery {
    async fn deliver(&self, user_id: u64, message: &str, category: &str) -> Result<()> {
        let dm = UserId(user_id).create_dm_channel(&*self.http).await?;
        dm.send_message(&*self.http, |m| {
            m.content(format!("⏰ **НАПОМИНАНИЕ**\n📁 {category}\n💬 {message}"))
        })
        .await?;
        Ok(())
    }
}

/// Periodic due-reminder sweep over the shared state.
pub struct ReminderScheduler {
    state: SharedState,
    snapshots: Snapshots,
}

impl ReminderScheduler {
    pub fn new(state: SharedState, snapshots: Snapshots) -> Self {
        Self { state, snapshots }
    }

    /// Run the scan loop forever. Spawned as a background task at startup.
    pub async fn run<D: ReminderDelivery>(self, delivery: D) {
        info!("⏱️ Планировщик напоминаний запущен (период {SCAN_INTERVAL:?})");
        let mut interval = tokio::time::interval(SCAN_INTERVAL);
        loop {
            interval.tick().await;
            self.sweep(&delivery).await;
        }
    }

    /// One scan tick: deliver everything due, then remove the whole batch
    /// and flush once. Holds the state lock for the entire tick so the sweep
    /// never interleaves with creations or admin edits.
    pub async fn sweep<D: ReminderDelivery>(&self, delivery: &D) {
        let now = Local::now().naive_local();
        let mut state = self.state.lock().await;

        let due = state.reminders.due(now);
        if due.is_empty() {
            return;
        }

        let mut expired = Vec::with_capacity(due.len());
        for (id, reminder) in due {
            match delivery
                .deliver(reminder.user_id, &reminder.message, &reminder.category)
                .await
            {
                Ok(()) => {
                    info!("📨 Отправлено напоминание {} пользователю {}", id, reminder.user_id);
                }
                Err(e) => {
                    // no retry path: the entry is dropped either way
                    error!("❌ Ошибка отправки напоминания {id}: {e}");
                }
            }
            expired.push(id);
        }

        state.reminders.remove_all(&expired);
        self.snapshots.save_reminders(&state.reminders).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    use chrono::Duration as ChronoDuration;

    use crate::features::reminders::store::Reminder;
    use crate::storage::{shared, AppState, Snapshots};

    /// Records every delivery; optionally fails all of them.
    #[derive(Default)]
    struct RecordingDelivery {
        delivered: Mutex<Vec<(u64, String, String)>>,
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ReminderDelivery for RecordingDelivery {
        async fn deliver(&self, user_id: u64, message: &str, category: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("user unreachable");
            }
            self.delivered
                .lock()
                .await
                .push((user_id, message.to_string(), category.to_string()));
            Ok(())
        }
    }

    fn scheduler_in(dir: &std::path::Path) -> (ReminderScheduler, SharedState, Snapshots) {
        let state = shared(AppState::default());
        let snapshots = Snapshots::new(
            dir.join("users_data.json"),
            dir.join("categories.json"),
        );
        (
            ReminderScheduler::new(state.clone(), snapshots.clone()),
            state,
            snapshots,
        )
    }

    async fn insert_due(state: &SharedState, user_id: u64, seconds_ago: i64) -> String {
        let now = Local::now().naive_local();
        let mut state = state.lock().await;
        state.reminders.insert(
            Reminder {
                message: "Время квестов!".to_string(),
                end_time: now - ChronoDuration::seconds(seconds_ago),
                user_id,
                category: "🌾 Фарм - 📜 Квесты".to_string(),
            },
            now,
        )
    }

    #[tokio::test]
    async fn test_due_reminder_delivered_once_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let (scheduler, state, _) = scheduler_in(dir.path());
        insert_due(&state, 42, 1).await;

        let delivery = RecordingDelivery::default();
        scheduler.sweep(&delivery).await;

        let delivered = delivery.delivered.lock().await;
        assert_eq!(delivered.len(), 1);
        assert_eq!(
            delivered[0],
            (
                42,
                "Время квестов!".to_string(),
                "🌾 Фарм - 📜 Квесты".to_string()
            )
        );
        assert!(state.lock().await.reminders.is_empty());

        // second sweep finds nothing — no redelivery
        drop(delivered);
        scheduler.sweep(&delivery).await;
        assert_eq!(delivery.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_still_discards() {
        let dir = tempfile::tempdir().unwrap();
        let (scheduler, state, _) = scheduler_in(dir.path());
        insert_due(&state, 42, 1).await;

        let delivery = RecordingDelivery {
            fail: true,
            ..Default::default()
        };
        scheduler.sweep(&delivery).await;

        assert_eq!(delivery.calls.load(Ordering::SeqCst), 1);
        assert!(state.lock().await.reminders.is_empty());
    }

    #[tokio::test]
    async fn test_future_reminders_untouched_and_not_flushed() {
        let dir = tempfile::tempdir().unwrap();
        let (scheduler, state, _) = scheduler_in(dir.path());
        insert_due(&state, 42, -3600).await; // due in an hour

        let delivery = RecordingDelivery::default();
        scheduler.sweep(&delivery).await;

        assert_eq!(delivery.calls.load(Ordering::SeqCst), 0);
        assert_eq!(state.lock().await.reminders.len(), 1);
        // nothing was due, so the snapshot was not rewritten
        assert!(!dir.path().join("users_data.json").exists());
    }

    #[tokio::test]
    async fn test_due_reminder_leaves_owner_listing() {
        use crate::features::reminders::service::ReminderService;

        let dir = tempfile::tempdir().unwrap();
        let (scheduler, state, snapshots) = scheduler_in(dir.path());
        let service = ReminderService::new(state.clone(), snapshots);
        insert_due(&state, 42, 0).await;

        // already due, so the listing hides it even before the sweep
        assert!(service.my_reminders(42).await.is_empty());

        let delivery = RecordingDelivery::default();
        scheduler.sweep(&delivery).await;

        assert_eq!(delivery.calls.load(Ordering::SeqCst), 1);
        assert!(service.my_reminders(42).await.is_empty());
        assert!(state.lock().await.reminders.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_flushes_once_after_batch() {
        let dir = tempfile::tempdir().unwrap();
        let (scheduler, state, snapshots) = scheduler_in(dir.path());
        insert_due(&state, 1, 5).await;
        insert_due(&state, 2, 5).await;

        let delivery = RecordingDelivery::default();
        scheduler.sweep(&delivery).await;

        assert_eq!(delivery.calls.load(Ordering::SeqCst), 2);
        let reloaded = snapshots.load().await;
        assert!(reloaded.reminders.is_empty());
    }
}
