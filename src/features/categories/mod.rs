//! # Categories Feature
//!
//! Two-level category → subcategory configuration tree that parametrizes
//! reminder creation. Subcategories are either *custom* (the user supplies
//! duration and message per reminder) or *fixed* (duration and message live
//! in the tree). Admin mutations are layered on top in [`admin`].
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Model custom/fixed as a sum type instead of a string tag
//! - 1.0.0: Initial category tree with seed data

pub mod admin;

use serde::{Deserialize, Serialize};

use crate::core::error::{DomainError, DomainResult};
use crate::core::timespan;

pub use admin::{Actor, AdminLookup, AdminOps, RoleAllowList};

// ============================================================================
// Types
// ============================================================================

/// One subcategory of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSubcategory", into = "RawSubcategory")]
pub struct Subcategory {
    /// Display name, shown on buttons and in reminder labels.
    pub name: String,
    pub kind: SubcategoryKind,
}

/// Behavior of a subcategory.
///
/// `Fixed` starts unconfigured (`time`/`message` empty) and becomes usable
/// for one-click reminder creation only after the setup step fills both.
/// `Custom` never stores a duration or message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubcategoryKind {
    Custom,
    Fixed {
        /// Canonical duration string, e.g. `"0д 0ч 1м"`.
        time: Option<String>,
        message: Option<String>,
    },
}

impl Subcategory {
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SubcategoryKind::Custom,
        }
    }

    pub fn fixed(
        name: impl Into<String>,
        time: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SubcategoryKind::Fixed {
                time: Some(time.into()),
                message: Some(message.into()),
            },
        }
    }

    /// Unconfigured fixed subcategory awaiting its setup step.
    pub fn fixed_unconfigured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SubcategoryKind::Fixed {
                time: None,
                message: None,
            },
        }
    }

    /// Stored duration string, if any.
    pub fn time(&self) -> Option<&str> {
        match &self.kind {
            SubcategoryKind::Custom => None,
            SubcategoryKind::Fixed { time, .. } => time.as_deref(),
        }
    }

    /// Stored reminder message, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.kind {
            SubcategoryKind::Custom => None,
            SubcategoryKind::Fixed { message, .. } => message.as_deref(),
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.kind, SubcategoryKind::Fixed { .. })
    }

    /// Wire tag for the snapshot document (`"custom"` / `"fixed"`).
    pub fn type_tag(&self) -> &'static str {
        match self.kind {
            SubcategoryKind::Custom => "custom",
            SubcategoryKind::Fixed { .. } => "fixed",
        }
    }
}

/// Flat document shape of a subcategory: `{name, type, time, message}`.
#[derive(Serialize, Deserialize)]
struct RawSubcategory {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    time: Option<String>,
    message: Option<String>,
}

impl TryFrom<RawSubcategory> for Subcategory {
    type Error = String;

    fn try_from(raw: RawSubcategory) -> Result<Self, Self::Error> {
        let kind = match raw.kind.as_str() {
            "custom" => SubcategoryKind::Custom,
            "fixed" => SubcategoryKind::Fixed {
                time: raw.time,
                message: raw.message,
            },
            other => return Err(format!("unknown subcategory type `{other}`")),
        };
        Ok(Self {
            name: raw.name,
            kind,
        })
    }
}

impl From<Subcategory> for RawSubcategory {
    fn from(sub: Subcategory) -> Self {
        let kind = sub.type_tag().to_string();
        let (time, message) = match sub.kind {
            SubcategoryKind::Custom => (None, None),
            SubcategoryKind::Fixed { time, message } => (time, message),
        };
        Self {
            name: sub.name,
            kind,
            time,
            message,
        }
    }
}

/// One category with its ordered subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(with = "ordered_map")]
    pub subcategories: Vec<(String, Subcategory)>,
}

impl Category {
    /// Look up a subcategory by key.
    pub fn subcategory(&self, key: &str) -> Option<&Subcategory> {
        self.subcategories
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, sub)| sub)
    }

    fn subcategory_mut(&mut self, key: &str) -> Option<&mut Subcategory> {
        self.subcategories
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, sub)| sub)
    }
}

// ============================================================================
// Category tree
// ============================================================================

/// Ordered category key → [`Category`] mapping.
///
/// This is the configuration half of the process-wide state: mutated only
/// behind the shared state lock, persisted as a whole document after every
/// mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    categories: Vec<(String, Category)>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three default categories installed on first startup.
    pub fn with_defaults() -> Self {
        let mut tree = Self::new();
        tree.install(
            "таймер",
            Category {
                name: "⏰ Таймер".to_string(),
                subcategories: vec![
                    (
                        "настраиваемый".to_string(),
                        Subcategory::custom("🔄 Настраиваемый таймер"),
                    ),
                    (
                        "оплата_дома".to_string(),
                        Subcategory::fixed("🏠 Оплата дома", "0д 0ч 1м", "Время оплатить дом!"),
                    ),
                    (
                        "оплата_недвижимости".to_string(),
                        Subcategory::fixed(
                            "🏢 Оплата недвижимости",
                            "0д 0ч 2м",
                            "Время оплатить недвижимость!",
                        ),
                    ),
                ],
            },
        );
        tree.install(
            "фарм",
            Category {
                name: "🌾 Фарм".to_string(),
                subcategories: vec![
                    (
                        "настраиваемый".to_string(),
                        Subcategory::custom("🔄 Настраиваемый таймер"),
                    ),
                    (
                        "билетики".to_string(),
                        Subcategory::fixed("🎫 Билетики", "0д 1ч 0м", "Проверить билетики!"),
                    ),
                    (
                        "квесты".to_string(),
                        Subcategory::fixed("📜 Квесты", "0д 2ч 0м", "Время квестов!"),
                    ),
                ],
            },
        );
        tree.install(
            "задания_клуба",
            Category {
                name: "🏁 Задания клуба".to_string(),
                subcategories: vec![
                    (
                        "настраиваемый".to_string(),
                        Subcategory::custom("🔄 Настраиваемый таймер"),
                    ),
                    (
                        "реднеки".to_string(),
                        Subcategory::fixed("🤠 Реднеки", "0д 0ч 1м", "Задание Реднеки!"),
                    ),
                    (
                        "мото_клуб".to_string(),
                        Subcategory::fixed("🏍️ Мото клуб", "0д 0ч 1м", "Задание Мото-клуба!"),
                    ),
                    (
                        "epsilon".to_string(),
                        Subcategory::fixed("👽 Epsilon", "0д 0ч 1м", "Задание Epsilon!"),
                    ),
                ],
            },
        );
        tree
    }

    fn install(&mut self, key: &str, category: Category) {
        self.categories.push((key.to_string(), category));
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Categories in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.categories.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn get(&self, key: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, c)| c)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Category> {
        self.categories
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, c)| c)
    }

    fn contains(&self, key: &str) -> bool {
        self.categories.iter().any(|(k, _)| k == key)
    }

    /// Fetch a category or fail with the domain error.
    pub fn require(&self, key: &str) -> DomainResult<&Category> {
        self.get(key).ok_or(DomainError::CategoryNotFound)
    }

    /// Fetch a subcategory or fail with the domain error.
    pub fn require_subcategory(
        &self,
        category_key: &str,
        sub_key: &str,
    ) -> DomainResult<(&Category, &Subcategory)> {
        let category = self.require(category_key)?;
        let sub = category
            .subcategory(sub_key)
            .ok_or(DomainError::SubcategoryNotFound)?;
        Ok((category, sub))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a category with the given display name and one default custom
    /// subcategory. Returns the derived key.
    pub fn create_category(&mut self, display_name: &str) -> String {
        let key = unique_key(&slug(display_name), |k| self.contains(k));
        self.categories.push((
            key.clone(),
            Category {
                name: display_name.to_string(),
                subcategories: vec![(
                    "настраиваемый".to_string(),
                    Subcategory::custom("🔄 Настраиваемый таймер"),
                )],
            },
        ));
        key
    }

    pub fn rename_category(&mut self, key: &str, new_name: &str) -> DomainResult<()> {
        let category = self.get_mut(key).ok_or(DomainError::CategoryNotFound)?;
        category.name = new_name.to_string();
        Ok(())
    }

    /// Delete a category unconditionally. Existing reminders keep their
    /// frozen label and are unaffected. Returns the removed category.
    pub fn delete_category(&mut self, key: &str) -> DomainResult<Category> {
        let pos = self
            .categories
            .iter()
            .position(|(k, _)| k == key)
            .ok_or(DomainError::CategoryNotFound)?;
        Ok(self.categories.remove(pos).1)
    }

    /// Add a subcategory. Fixed subcategories start unconfigured and need
    /// [`CategoryTree::configure_fixed`] before they can create reminders.
    /// Returns the derived key.
    pub fn add_subcategory(
        &mut self,
        category_key: &str,
        display_name: &str,
        fixed: bool,
    ) -> DomainResult<String> {
        let category = self
            .get_mut(category_key)
            .ok_or(DomainError::CategoryNotFound)?;
        let key = unique_key(&slug(display_name), |k| {
            category.subcategories.iter().any(|(existing, _)| existing == k)
        });
        let sub = if fixed {
            Subcategory::fixed_unconfigured(display_name)
        } else {
            Subcategory::custom(display_name)
        };
        category.subcategories.push((key.clone(), sub));
        Ok(key)
    }

    pub fn rename_subcategory(
        &mut self,
        category_key: &str,
        sub_key: &str,
        new_name: &str,
    ) -> DomainResult<()> {
        let category = self
            .get_mut(category_key)
            .ok_or(DomainError::CategoryNotFound)?;
        let sub = category
            .subcategory_mut(sub_key)
            .ok_or(DomainError::SubcategoryNotFound)?;
        sub.name = new_name.to_string();
        Ok(())
    }

    /// Delete a subcategory. The last subcategory of a category cannot be
    /// removed. Returns the removed subcategory.
    pub fn delete_subcategory(
        &mut self,
        category_key: &str,
        sub_key: &str,
    ) -> DomainResult<Subcategory> {
        let category = self
            .get_mut(category_key)
            .ok_or(DomainError::CategoryNotFound)?;
        let pos = category
            .subcategories
            .iter()
            .position(|(k, _)| k == sub_key)
            .ok_or(DomainError::SubcategoryNotFound)?;
        if category.subcategories.len() <= 1 {
            return Err(DomainError::LastSubcategory);
        }
        Ok(category.subcategories.remove(pos).1)
    }

    /// Set duration and message of a fixed subcategory from a validated
    /// day/hour/minute triple.
    pub fn configure_fixed(
        &mut self,
        category_key: &str,
        sub_key: &str,
        days: i64,
        hours: i64,
        minutes: i64,
        message: &str,
    ) -> DomainResult<()> {
        let (days, hours, minutes) = timespan::validate_parts(days, hours, minutes)?;
        let category = self
            .get_mut(category_key)
            .ok_or(DomainError::CategoryNotFound)?;
        let sub = category
            .subcategory_mut(sub_key)
            .ok_or(DomainError::SubcategoryNotFound)?;
        match &mut sub.kind {
            SubcategoryKind::Fixed { time, message: msg } => {
                *time = Some(timespan::canonical_parts(days, hours, minutes));
                *msg = Some(message.to_string());
                Ok(())
            }
            SubcategoryKind::Custom => Err(DomainError::Validation(
                "Тип должен быть \"fixed\" для настройки таймера!".to_string(),
            )),
        }
    }
}

impl Serialize for CategoryTree {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ordered_map::serialize(&self.categories, serializer)
    }
}

impl<'de> Deserialize<'de> for CategoryTree {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self {
            categories: ordered_map::deserialize(deserializer)?,
        })
    }
}

// ============================================================================
// Keys
// ============================================================================

/// Derive a slug key from a display name: lowercase, spaces to underscores,
/// everything outside `[a-z0-9_]` stripped.
fn slug(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Resolve key collisions by probing `_1`, `_2`, ...
fn unique_key(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{base}_{counter}");
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Serialize a `Vec<(String, T)>` as a JSON object, preserving entry order.
mod ordered_map {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(entries: &[(String, T)], serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        struct OrderedMapVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<T> {
            type Value = Vec<(String, T)>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of keyed entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry()? {
                    entries.push((key, value));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("My Farm Tasks"), "my_farm_tasks");
        assert_eq!(slug("Daily  (v2)"), "daily__v2");
        assert_eq!(slug("Фарм"), "");
    }

    #[test]
    fn test_create_category_collision_suffix() {
        let mut tree = CategoryTree::new();
        let first = tree.create_category("Daily");
        let second = tree.create_category("Daily");
        let third = tree.create_category("Daily");
        assert_eq!(first, "daily");
        assert_eq!(second, "daily_1");
        assert_eq!(third, "daily_2");
    }

    #[test]
    fn test_new_category_seeds_custom_subcategory() {
        let mut tree = CategoryTree::new();
        let key = tree.create_category("Daily");
        let category = tree.get(&key).unwrap();
        assert_eq!(category.subcategories.len(), 1);
        let (sub_key, sub) = &category.subcategories[0];
        assert_eq!(sub_key, "настраиваемый");
        assert_eq!(sub.kind, SubcategoryKind::Custom);
    }

    #[test]
    fn test_delete_last_subcategory_rejected() {
        let mut tree = CategoryTree::new();
        let key = tree.create_category("Daily");
        let err = tree.delete_subcategory(&key, "настраиваемый").unwrap_err();
        assert_eq!(err, DomainError::LastSubcategory);
        assert_eq!(tree.get(&key).unwrap().subcategories.len(), 1);
    }

    #[test]
    fn test_delete_subcategory_ok_when_not_last() {
        let mut tree = CategoryTree::new();
        let key = tree.create_category("Daily");
        tree.add_subcategory(&key, "Backup", true).unwrap();
        let removed = tree.delete_subcategory(&key, "настраиваемый").unwrap();
        assert_eq!(removed.kind, SubcategoryKind::Custom);
        assert_eq!(tree.get(&key).unwrap().subcategories.len(), 1);
    }

    #[test]
    fn test_added_fixed_starts_unconfigured() {
        let mut tree = CategoryTree::new();
        let key = tree.create_category("Daily");
        let sub_key = tree.add_subcategory(&key, "Rent", true).unwrap();
        let sub = tree.get(&key).unwrap().subcategory(&sub_key).unwrap();
        assert!(sub.is_fixed());
        assert_eq!(sub.time(), None);
        assert_eq!(sub.message(), None);
    }

    #[test]
    fn test_configure_fixed() {
        let mut tree = CategoryTree::new();
        let key = tree.create_category("Daily");
        let sub_key = tree.add_subcategory(&key, "Rent", true).unwrap();
        tree.configure_fixed(&key, &sub_key, 0, 2, 30, "Pay rent!")
            .unwrap();
        let sub = tree.get(&key).unwrap().subcategory(&sub_key).unwrap();
        assert_eq!(sub.time(), Some("0д 2ч 30м"));
        assert_eq!(sub.message(), Some("Pay rent!"));
    }

    #[test]
    fn test_configure_fixed_validates_ranges() {
        let mut tree = CategoryTree::new();
        let key = tree.create_category("Daily");
        let sub_key = tree.add_subcategory(&key, "Rent", true).unwrap();
        assert!(matches!(
            tree.configure_fixed(&key, &sub_key, 0, 24, 0, "x"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            tree.configure_fixed(&key, &sub_key, 0, 0, -5, "x"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_configure_fixed_rejects_custom_target() {
        let mut tree = CategoryTree::new();
        let key = tree.create_category("Daily");
        assert!(matches!(
            tree.configure_fixed(&key, "настраиваемый", 0, 0, 1, "x"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_keys() {
        let mut tree = CategoryTree::with_defaults();
        assert_eq!(tree.require("нет").unwrap_err(), DomainError::CategoryNotFound);
        assert_eq!(
            tree.require_subcategory("таймер", "нет").unwrap_err(),
            DomainError::SubcategoryNotFound
        );
        assert_eq!(
            tree.rename_category("нет", "x").unwrap_err(),
            DomainError::CategoryNotFound
        );
        assert_eq!(
            tree.rename_subcategory("таймер", "нет", "x").unwrap_err(),
            DomainError::SubcategoryNotFound
        );
    }

    #[test]
    fn test_defaults_shape() {
        let tree = CategoryTree::with_defaults();
        assert_eq!(tree.len(), 3);
        let (category, sub) = tree.require_subcategory("таймер", "оплата_дома").unwrap();
        assert_eq!(category.name, "⏰ Таймер");
        assert_eq!(sub.name, "🏠 Оплата дома");
        assert_eq!(sub.time(), Some("0д 0ч 1м"));
        // every category keeps one custom subcategory
        for (_, category) in tree.iter() {
            assert!(category
                .subcategories
                .iter()
                .any(|(_, sub)| sub.kind == SubcategoryKind::Custom));
        }
    }

    #[test]
    fn test_document_round_trip_preserves_order() {
        let tree = CategoryTree::with_defaults();
        let json = serde_json::to_string_pretty(&tree).unwrap();
        let reloaded: CategoryTree = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, reloaded);
        let keys: Vec<&str> = reloaded.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["таймер", "фарм", "задания_клуба"]);
    }

    #[test]
    fn test_subcategory_document_shape() {
        let sub = Subcategory::fixed("🏠 Оплата дома", "0д 0ч 1м", "Время оплатить дом!");
        let value = serde_json::to_value(&sub).unwrap();
        assert_eq!(value["type"], "fixed");
        assert_eq!(value["time"], "0д 0ч 1м");
        assert_eq!(value["message"], "Время оплатить дом!");

        let custom = Subcategory::custom("🔄 Настраиваемый таймер");
        let value = serde_json::to_value(&custom).unwrap();
        assert_eq!(value["type"], "custom");
        assert!(value["time"].is_null());
        assert!(value["message"].is_null());
    }
}
