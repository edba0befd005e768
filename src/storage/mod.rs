//! # Storage
//!
//! Durable whole-document snapshots of the process-wide state: the category
//! tree and the reminder store, one JSON file each. Both documents are read
//! entirely at startup and rewritten entirely after each mutation.
//!
//! Writes go to a temp file in the same directory and are renamed over the
//! target, so a crash mid-write never corrupts the previous snapshot. A
//! failed write is logged and the in-memory mutation stands; a failed read
//! at startup degrades to empty state.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::features::categories::CategoryTree;
use crate::features::reminders::ReminderStore;

/// Errors produced by the snapshot layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The two in-memory documents every operation mutates.
#[derive(Debug, Default, Clone)]
pub struct AppState {
    pub categories: CategoryTree,
    pub reminders: ReminderStore,
}

/// Single mutual-exclusion boundary around [`AppState`]: reminder creation,
/// admin edits and the scheduler sweep all serialize through this lock.
pub type SharedState = Arc<Mutex<AppState>>;

pub fn shared(state: AppState) -> SharedState {
    Arc::new(Mutex::new(state))
}

/// Snapshot file locations plus load/save operations.
#[derive(Debug, Clone)]
pub struct Snapshots {
    reminders_path: PathBuf,
    categories_path: PathBuf,
}

impl Snapshots {
    pub fn new(reminders_path: impl Into<PathBuf>, categories_path: impl Into<PathBuf>) -> Self {
        Self {
            reminders_path: reminders_path.into(),
            categories_path: categories_path.into(),
        }
    }

    /// Load both documents. A missing file means empty state; an unreadable
    /// or corrupt file is logged and also treated as empty (the bot prefers
    /// starting over aborting).
    pub async fn load(&self) -> AppState {
        let reminders = match read_document::<ReminderStore>(&self.reminders_path).await {
            Ok(Some(store)) => {
                info!("✅ Загружено напоминаний: {}", store.len());
                store
            }
            Ok(None) => ReminderStore::new(),
            Err(e) => {
                error!(
                    "❌ Ошибка загрузки данных {}: {e}",
                    self.reminders_path.display()
                );
                ReminderStore::new()
            }
        };

        let categories = match read_document::<CategoryTree>(&self.categories_path).await {
            Ok(Some(tree)) => {
                info!("✅ Загружено категорий: {}", tree.len());
                tree
            }
            Ok(None) => CategoryTree::new(),
            Err(e) => {
                error!(
                    "❌ Ошибка загрузки данных {}: {e}",
                    self.categories_path.display()
                );
                CategoryTree::new()
            }
        };

        AppState {
            categories,
            reminders,
        }
    }

    /// Persist the reminders document. Failures are logged, never surfaced:
    /// in-memory state is the source of truth until the next write lands.
    pub async fn save_reminders(&self, store: &ReminderStore) {
        if let Err(e) = write_document(&self.reminders_path, store).await {
            error!(
                "❌ Ошибка сохранения данных {}: {e}",
                self.reminders_path.display()
            );
        }
    }

    /// Persist the categories document.
    pub async fn save_categories(&self, tree: &CategoryTree) {
        if let Err(e) = write_document(&self.categories_path, tree).await {
            error!(
                "❌ Ошибка сохранения данных {}: {e}",
                self.categories_path.display()
            );
        }
    }
}

/// Read a whole JSON document. `Ok(None)` when the file does not exist.
async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Write a whole JSON document: serialize, write a sibling temp file, then
/// rename it over the target.
async fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::features::reminders::Reminder;

    fn snapshots_in(dir: &Path) -> Snapshots {
        Snapshots::new(dir.join("users_data.json"), dir.join("categories.json"))
    }

    #[tokio::test]
    async fn test_load_missing_files_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = snapshots_in(dir.path()).load().await;
        assert!(state.categories.is_empty());
        assert!(state.reminders.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("categories.json"), b"{ not json").unwrap();
        let state = snapshots_in(dir.path()).load().await;
        assert!(state.categories.is_empty());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = snapshots_in(dir.path());

        let tree = CategoryTree::with_defaults();
        let mut store = ReminderStore::new();
        let created = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        store.insert(
            Reminder {
                message: "Время оплатить дом!".to_string(),
                end_time: created + chrono::Duration::seconds(60),
                user_id: 42,
                category: "⏰ Таймер - 🏠 Оплата дома".to_string(),
            },
            created,
        );

        snapshots.save_categories(&tree).await;
        snapshots.save_reminders(&store).await;

        let state = snapshots.load().await;
        assert_eq!(state.categories, tree);
        assert_eq!(state.reminders, store);
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_residue() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = snapshots_in(dir.path());
        snapshots.save_categories(&CategoryTree::with_defaults()).await;

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["categories.json".to_string()]);
    }
}
