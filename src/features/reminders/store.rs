//! Reminder records and the in-memory store
//!
//! Each reminder is a one-shot notification: owner, due instant, message
//! and the category label frozen at creation. The store is the second half
//! of the process-wide state and persists as a whole document keyed by
//! reminder id.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A pending one-shot reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub message: String,
    /// Due instant, process-local wall clock, persisted as ISO-8601.
    pub end_time: NaiveDateTime,
    pub user_id: u64,
    /// Denormalized `"Категория - Подкатегория"` display string.
    pub category: String,
}

/// Reminder id → record mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderStore {
    entries: BTreeMap<String, Reminder>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Reminder> {
        self.entries.get(id)
    }

    /// Insert under a fresh id derived from the owner and the creation
    /// instant. Ids are never reused; a same-millisecond collision probes a
    /// suffix counter.
    pub fn insert(&mut self, reminder: Reminder, created_at: NaiveDateTime) -> String {
        let base = format!(
            "{}_{}",
            reminder.user_id,
            created_at.and_utc().timestamp_millis()
        );
        let mut id = base.clone();
        let mut counter = 1;
        while self.entries.contains_key(&id) {
            id = format!("{base}_{counter}");
            counter += 1;
        }
        self.entries.insert(id.clone(), reminder);
        id
    }

    /// All reminders owned by `user_id`, in store order.
    pub fn for_owner(&self, user_id: u64) -> Vec<(&String, &Reminder)> {
        self.entries
            .iter()
            .filter(|(_, r)| r.user_id == user_id)
            .collect()
    }

    /// Snapshot of every reminder due at or before `now`.
    pub fn due(&self, now: NaiveDateTime) -> Vec<(String, Reminder)> {
        self.entries
            .iter()
            .filter(|(_, r)| r.end_time <= now)
            .map(|(id, r)| (id.clone(), r.clone()))
            .collect()
    }

    /// Bulk removal; returns how many entries were actually removed.
    pub fn remove_all(&mut self, ids: &[String]) -> usize {
        let mut removed = 0;
        for id in ids {
            if self.entries.remove(id).is_some() {
                removed += 1;
            }
        }
        removed
    }
}

impl Serialize for ReminderStore {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ReminderStore {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self {
            entries: BTreeMap::deserialize(deserializer)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn reminder(user_id: u64, end_time: NaiveDateTime) -> Reminder {
        Reminder {
            message: "Проверить билетики!".to_string(),
            end_time,
            user_id,
            category: "🌾 Фарм - 🎫 Билетики".to_string(),
        }
    }

    #[test]
    fn test_insert_mints_owner_instant_id() {
        let mut store = ReminderStore::new();
        let id = store.insert(reminder(42, at(12, 0, 0)), at(11, 0, 0));
        assert!(id.starts_with("42_"));
        assert_eq!(store.len(), 1);
        assert!(store.get(&id).is_some());
    }

    #[test]
    fn test_insert_collision_probes_suffix() {
        let mut store = ReminderStore::new();
        let created = at(11, 0, 0);
        let first = store.insert(reminder(42, at(12, 0, 0)), created);
        let second = store.insert(reminder(42, at(13, 0, 0)), created);
        assert_ne!(first, second);
        assert_eq!(second, format!("{first}_1"));
    }

    #[test]
    fn test_for_owner_filters() {
        let mut store = ReminderStore::new();
        store.insert(reminder(1, at(12, 0, 0)), at(10, 0, 0));
        store.insert(reminder(2, at(12, 0, 0)), at(10, 0, 1));
        store.insert(reminder(1, at(14, 0, 0)), at(10, 0, 2));
        assert_eq!(store.for_owner(1).len(), 2);
        assert_eq!(store.for_owner(2).len(), 1);
        assert!(store.for_owner(3).is_empty());
    }

    #[test]
    fn test_due_boundary_is_inclusive() {
        let mut store = ReminderStore::new();
        store.insert(reminder(1, at(12, 0, 0)), at(10, 0, 0));
        store.insert(reminder(1, at(12, 0, 1)), at(10, 0, 1));
        let due = store.due(at(12, 0, 0));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].1.end_time, at(12, 0, 0));
    }

    #[test]
    fn test_remove_all() {
        let mut store = ReminderStore::new();
        let a = store.insert(reminder(1, at(12, 0, 0)), at(10, 0, 0));
        let b = store.insert(reminder(1, at(13, 0, 0)), at(10, 0, 1));
        let removed = store.remove_all(&[a, "missing".to_string()]);
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(&b).is_some());
    }

    #[test]
    fn test_document_round_trip() {
        let mut store = ReminderStore::new();
        store.insert(reminder(42, at(12, 30, 15)), at(10, 0, 0));
        let json = serde_json::to_string_pretty(&store).unwrap();
        let reloaded: ReminderStore = serde_json::from_str(&json).unwrap();
        assert_eq!(store, reloaded);
    }

    #[test]
    fn test_document_field_names() {
        let mut store = ReminderStore::new();
        let id = store.insert(reminder(42, at(12, 30, 15)), at(10, 0, 0));
        let value = serde_json::to_value(&store).unwrap();
        let entry = &value[&id];
        assert_eq!(entry["user_id"], 42);
        assert_eq!(entry["category"], "🌾 Фарм - 🎫 Билетики");
        assert_eq!(entry["message"], "Проверить билетики!");
        assert_eq!(entry["end_time"], "2024-05-01T12:30:15");
    }
}
