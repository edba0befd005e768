//! Reminder creation and listing operations
//!
//! The service owns the shared state handle and the snapshot gateway; every
//! operation locks once, mutates, persists, and returns presentation-ready
//! data.

use chrono::{Duration, Local, NaiveDateTime};
use log::info;

use crate::core::error::{DomainError, DomainResult};
use crate::core::timespan;
use crate::features::categories::{Category, Subcategory};
use crate::features::reminders::store::Reminder;
use crate::storage::{SharedState, Snapshots};

/// Everything the confirmation message needs about a fresh reminder.
#[derive(Debug, Clone)]
pub struct ReminderReceipt {
    pub id: String,
    /// `"Категория - Подкатегория"` label frozen into the reminder.
    pub category_label: String,
    pub message: String,
    /// Duration as shown to the user (`"2ч 30м"` style).
    pub time_display: String,
    pub end_time: NaiveDateTime,
}

/// A pending reminder as listed back to its owner.
#[derive(Debug, Clone)]
pub struct ActiveReminder {
    pub category: String,
    pub message: String,
    pub remaining_seconds: u64,
}

/// Category summary for menu rendering.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub key: String,
    pub name: String,
    pub subcategory_count: usize,
}

/// Subcategory summary for menu rendering.
#[derive(Debug, Clone)]
pub struct SubcategoryView {
    pub key: String,
    pub name: String,
    pub fixed: bool,
    pub time: Option<String>,
    pub message: Option<String>,
}

impl SubcategoryView {
    fn from_entry(key: &str, sub: &Subcategory) -> Self {
        Self {
            key: key.to_string(),
            name: sub.name.clone(),
            fixed: sub.is_fixed(),
            time: sub.time().map(str::to_string),
            message: sub.message().map(str::to_string),
        }
    }
}

/// Category with its subcategories, for menu rendering.
#[derive(Debug, Clone)]
pub struct CategoryDetail {
    pub key: String,
    pub name: String,
    pub subcategories: Vec<SubcategoryView>,
}

fn category_label(category: &Category, sub: &Subcategory) -> String {
    format!("{} - {}", category.name, sub.name)
}

/// Reminder operations over the shared state.
#[derive(Clone)]
pub struct ReminderService {
    state: SharedState,
    snapshots: Snapshots,
}

impl ReminderService {
    pub fn new(state: SharedState, snapshots: Snapshots) -> Self {
        Self { state, snapshots }
    }

    /// Categories in configuration order.
    pub async fn categories(&self) -> Vec<CategoryView> {
        let state = self.state.lock().await;
        state
            .categories
            .iter()
            .map(|(key, category)| CategoryView {
                key: key.to_string(),
                name: category.name.clone(),
                subcategory_count: category.subcategories.len(),
            })
            .collect()
    }

    /// One category with all its subcategories.
    pub async fn category_detail(&self, category_key: &str) -> DomainResult<CategoryDetail> {
        let state = self.state.lock().await;
        let category = state.categories.require(category_key)?;
        Ok(CategoryDetail {
            key: category_key.to_string(),
            name: category.name.clone(),
            subcategories: category
                .subcategories
                .iter()
                .map(|(key, sub)| SubcategoryView::from_entry(key, sub))
                .collect(),
        })
    }

    /// One subcategory view (for the admin detail menu).
    pub async fn subcategory_detail(
        &self,
        category_key: &str,
        sub_key: &str,
    ) -> DomainResult<SubcategoryView> {
        let state = self.state.lock().await;
        let (_, sub) = state.categories.require_subcategory(category_key, sub_key)?;
        Ok(SubcategoryView::from_entry(sub_key, sub))
    }

    /// Create a reminder from a fully configured fixed subcategory.
    pub async fn create_fixed(
        &self,
        category_key: &str,
        sub_key: &str,
        user_id: u64,
    ) -> DomainResult<ReminderReceipt> {
        let mut state = self.state.lock().await;
        let (category, sub) = state.categories.require_subcategory(category_key, sub_key)?;

        let (time, message) = match (sub.time(), sub.message()) {
            (Some(time), Some(message)) => (time.to_string(), message.to_string()),
            _ => {
                return Err(DomainError::Validation(
                    "Таймер ещё не настроен администратором!".to_string(),
                ))
            }
        };

        let label = category_label(category, sub);
        let total_seconds = timespan::parse_time_string(&time);
        let now = Local::now().naive_local();
        let end_time = now + Duration::seconds(total_seconds as i64);

        let id = state.reminders.insert(
            Reminder {
                message: message.clone(),
                end_time,
                user_id,
                category: label.clone(),
            },
            now,
        );
        self.snapshots.save_reminders(&state.reminders).await;

        info!("⏰ Напоминание {id} установлено для {user_id} ({label}, через {time})");

        Ok(ReminderReceipt {
            id,
            category_label: label,
            message,
            time_display: time,
            end_time,
        })
    }

    /// Create a reminder from user-supplied day/hour/minute parts.
    pub async fn create_custom(
        &self,
        category_key: &str,
        sub_key: &str,
        user_id: u64,
        days: i64,
        hours: i64,
        minutes: i64,
        message: &str,
    ) -> DomainResult<ReminderReceipt> {
        let (days, hours, minutes) = timespan::validate_parts(days, hours, minutes)?;
        let total_seconds = timespan::seconds_from_parts(days, hours, minutes);
        if total_seconds == 0 {
            return Err(DomainError::Validation(
                "Время не может быть нулевым!".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        let (category, sub) = state.categories.require_subcategory(category_key, sub_key)?;
        let label = category_label(category, sub);

        let now = Local::now().naive_local();
        let end_time = now + Duration::seconds(total_seconds as i64);

        let id = state.reminders.insert(
            Reminder {
                message: message.to_string(),
                end_time,
                user_id,
                category: label.clone(),
            },
            now,
        );
        self.snapshots.save_reminders(&state.reminders).await;

        let time_display = timespan::format_time(total_seconds);
        info!("⏰ Напоминание {id} установлено для {user_id} ({label}, через {time_display})");

        Ok(ReminderReceipt {
            id,
            category_label: label,
            message: message.to_string(),
            time_display,
            end_time,
        })
    }

    /// The caller's pending reminders. Entries already due are about to be
    /// collected by the scheduler and are not listed.
    pub async fn my_reminders(&self, user_id: u64) -> Vec<ActiveReminder> {
        let now = Local::now().naive_local();
        let state = self.state.lock().await;
        state
            .reminders
            .for_owner(user_id)
            .into_iter()
            .filter_map(|(_, reminder)| {
                let remaining = (reminder.end_time - now).num_seconds();
                if remaining > 0 {
                    Some(ActiveReminder {
                        category: reminder.category.clone(),
                        message: reminder.message.clone(),
                        remaining_seconds: remaining as u64,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::CategoryTree;
    use crate::storage::{shared, AppState, Snapshots};

    fn service(dir: &std::path::Path) -> ReminderService {
        let state = shared(AppState {
            categories: CategoryTree::with_defaults(),
            reminders: Default::default(),
        });
        let snapshots = Snapshots::new(
            dir.join("users_data.json"),
            dir.join("categories.json"),
        );
        ReminderService::new(state, snapshots)
    }

    #[tokio::test]
    async fn test_create_fixed_from_seed() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let before = Local::now().naive_local();
        let receipt = service.create_fixed("таймер", "оплата_дома", 42).await.unwrap();

        assert_eq!(receipt.category_label, "⏰ Таймер - 🏠 Оплата дома");
        assert_eq!(receipt.message, "Время оплатить дом!");
        assert_eq!(receipt.time_display, "0д 0ч 1м");
        let offset = (receipt.end_time - before).num_seconds();
        assert!((60..=62).contains(&offset), "offset was {offset}");

        // persisted on creation
        assert!(dir.path().join("users_data.json").exists());
    }

    #[tokio::test]
    async fn test_create_fixed_requires_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        // the seed custom subcategory has no stored time/message
        let err = service
            .create_fixed("таймер", "настраиваемый", 42)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_custom_rejects_zero_duration() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let err = service
            .create_custom("таймер", "настраиваемый", 42, 0, 0, 0, "привет")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation("Время не может быть нулевым!".to_string())
        );
    }

    #[tokio::test]
    async fn test_create_custom_rejects_out_of_range_parts() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        for (d, h, m) in [(-1, 0, 0), (0, 24, 0), (0, 0, 60)] {
            let err = service
                .create_custom("таймер", "настраиваемый", 42, d, h, m, "x")
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_create_custom_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let receipt = service
            .create_custom("фарм", "настраиваемый", 7, 0, 1, 30, "Собрать урожай")
            .await
            .unwrap();
        assert_eq!(receipt.time_display, "1ч 30м");
        assert_eq!(receipt.category_label, "🌾 Фарм - 🔄 Настраиваемый таймер");

        let mine = service.my_reminders(7).await;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].message, "Собрать урожай");
        assert!(mine[0].remaining_seconds <= 5400);
        assert!(service.my_reminders(8).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        assert_eq!(
            service.create_fixed("нет", "нет", 1).await.unwrap_err(),
            DomainError::CategoryNotFound
        );
        assert_eq!(
            service.create_fixed("таймер", "нет", 1).await.unwrap_err(),
            DomainError::SubcategoryNotFound
        );
    }

    #[tokio::test]
    async fn test_category_views() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let categories = service.categories().await;
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[0].name, "⏰ Таймер");
        assert_eq!(categories[0].subcategory_count, 3);

        let detail = service.category_detail("задания_клуба").await.unwrap();
        assert_eq!(detail.subcategories.len(), 4);
        assert!(!detail.subcategories[0].fixed);
        assert_eq!(detail.subcategories[1].time.as_deref(), Some("0д 0ч 1м"));
    }
}
