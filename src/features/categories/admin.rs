//! Category administration operations
//!
//! Every mutation of the category tree goes through [`AdminOps`], which
//! rejects the caller before touching anything unless the authorization
//! lookup clears them, and flushes the categories snapshot on success.

use std::sync::Arc;

use log::info;

use crate::core::error::{DomainError, DomainResult};
use crate::storage::{SharedState, Snapshots};

/// The caller of an admin operation, as resolved by the presentation layer.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: u64,
    /// Role names the actor carries in the guild. Empty outside a guild.
    pub roles: Vec<String>,
}

/// Authorization seam: decides whether an actor may administer categories.
pub trait AdminLookup: Send + Sync {
    fn is_admin(&self, actor: &Actor) -> bool;
}

/// Allow-list of privileged role names (the production lookup).
pub struct RoleAllowList {
    roles: Vec<String>,
}

impl RoleAllowList {
    pub fn new(roles: Vec<String>) -> Self {
        Self { roles }
    }
}

impl AdminLookup for RoleAllowList {
    fn is_admin(&self, actor: &Actor) -> bool {
        actor.roles.iter().any(|role| self.roles.contains(role))
    }
}

/// Result of adding a subcategory: the derived key, and whether a fixed
/// setup step still has to follow.
#[derive(Debug, Clone)]
pub struct AddedSubcategory {
    pub key: String,
    pub fixed: bool,
}

/// Gated category CRUD over the shared state.
#[derive(Clone)]
pub struct AdminOps {
    state: SharedState,
    snapshots: Snapshots,
    lookup: Arc<dyn AdminLookup>,
}

impl AdminOps {
    pub fn new(state: SharedState, snapshots: Snapshots, lookup: Arc<dyn AdminLookup>) -> Self {
        Self {
            state,
            snapshots,
            lookup,
        }
    }

    /// Whether the actor may see the admin panel at all.
    pub fn is_admin(&self, actor: &Actor) -> bool {
        self.lookup.is_admin(actor)
    }

    fn authorize(&self, actor: &Actor) -> DomainResult<()> {
        if self.lookup.is_admin(actor) {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }

    /// Create a category (with its default custom subcategory). Returns the
    /// derived key.
    pub async fn create_category(&self, actor: &Actor, display_name: &str) -> DomainResult<String> {
        self.authorize(actor)?;
        let mut state = self.state.lock().await;
        let key = state.categories.create_category(display_name);
        self.snapshots.save_categories(&state.categories).await;
        info!("📁 Категория `{key}` создана ({display_name}) администратором {}", actor.user_id);
        Ok(key)
    }

    pub async fn rename_category(
        &self,
        actor: &Actor,
        key: &str,
        new_name: &str,
    ) -> DomainResult<()> {
        self.authorize(actor)?;
        let mut state = self.state.lock().await;
        state.categories.rename_category(key, new_name)?;
        self.snapshots.save_categories(&state.categories).await;
        info!("📁 Категория `{key}` переименована в {new_name}");
        Ok(())
    }

    /// Delete a category unconditionally; returns its display name.
    pub async fn delete_category(&self, actor: &Actor, key: &str) -> DomainResult<String> {
        self.authorize(actor)?;
        let mut state = self.state.lock().await;
        let removed = state.categories.delete_category(key)?;
        self.snapshots.save_categories(&state.categories).await;
        info!("🗑️ Категория `{key}` удалена ({})", removed.name);
        Ok(removed.name)
    }

    /// Add a subcategory. `type_selection` is the raw `custom`/`fixed` text
    /// the admin typed.
    pub async fn add_subcategory(
        &self,
        actor: &Actor,
        category_key: &str,
        display_name: &str,
        type_selection: &str,
    ) -> DomainResult<AddedSubcategory> {
        self.authorize(actor)?;
        let fixed = match type_selection.to_lowercase().as_str() {
            "fixed" => true,
            "custom" => false,
            _ => {
                return Err(DomainError::Validation(
                    "Тип должен быть \"custom\" или \"fixed\"!".to_string(),
                ))
            }
        };
        let mut state = self.state.lock().await;
        let key = state
            .categories
            .add_subcategory(category_key, display_name, fixed)?;
        self.snapshots.save_categories(&state.categories).await;
        info!("📝 Подкатегория `{category_key}/{key}` добавлена ({display_name})");
        Ok(AddedSubcategory { key, fixed })
    }

    pub async fn rename_subcategory(
        &self,
        actor: &Actor,
        category_key: &str,
        sub_key: &str,
        new_name: &str,
    ) -> DomainResult<()> {
        self.authorize(actor)?;
        let mut state = self.state.lock().await;
        state
            .categories
            .rename_subcategory(category_key, sub_key, new_name)?;
        self.snapshots.save_categories(&state.categories).await;
        Ok(())
    }

    /// Set duration and message of a fixed subcategory.
    pub async fn configure_fixed(
        &self,
        actor: &Actor,
        category_key: &str,
        sub_key: &str,
        days: i64,
        hours: i64,
        minutes: i64,
        message: &str,
    ) -> DomainResult<()> {
        self.authorize(actor)?;
        let mut state = self.state.lock().await;
        state
            .categories
            .configure_fixed(category_key, sub_key, days, hours, minutes, message)?;
        self.snapshots.save_categories(&state.categories).await;
        info!("⚙️ Fixed-таймер `{category_key}/{sub_key}` настроен");
        Ok(())
    }

    /// The combined edit the admin modal submits: a new name, plus new
    /// duration and message when the subcategory is fixed. Validated as a
    /// whole before anything is touched.
    pub async fn edit_subcategory(
        &self,
        actor: &Actor,
        category_key: &str,
        sub_key: &str,
        new_name: &str,
        fixed_update: Option<(i64, i64, i64, String)>,
    ) -> DomainResult<()> {
        self.authorize(actor)?;
        let mut state = self.state.lock().await;
        state.categories.require_subcategory(category_key, sub_key)?;
        if let Some((days, hours, minutes, message)) = fixed_update {
            state
                .categories
                .configure_fixed(category_key, sub_key, days, hours, minutes, &message)?;
        }
        state
            .categories
            .rename_subcategory(category_key, sub_key, new_name)?;
        self.snapshots.save_categories(&state.categories).await;
        info!("📝 Подкатегория `{category_key}/{sub_key}` обновлена ({new_name})");
        Ok(())
    }

    /// Delete a subcategory (never the last one); returns its display name.
    pub async fn delete_subcategory(
        &self,
        actor: &Actor,
        category_key: &str,
        sub_key: &str,
    ) -> DomainResult<String> {
        self.authorize(actor)?;
        let mut state = self.state.lock().await;
        let removed = state.categories.delete_subcategory(category_key, sub_key)?;
        self.snapshots.save_categories(&state.categories).await;
        info!("🗑️ Подкатегория `{category_key}/{sub_key}` удалена ({})", removed.name);
        Ok(removed.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::CategoryTree;
    use crate::storage::{shared, AppState, Snapshots};

    fn admin_ops(dir: &std::path::Path) -> (AdminOps, SharedState) {
        let state = shared(AppState {
            categories: CategoryTree::with_defaults(),
            reminders: Default::default(),
        });
        let snapshots = Snapshots::new(
            dir.join("users_data.json"),
            dir.join("categories.json"),
        );
        let lookup = Arc::new(RoleAllowList::new(vec![
            "Администратор".to_string(),
            "Директор".to_string(),
        ]));
        (AdminOps::new(state.clone(), snapshots, lookup), state)
    }

    fn admin() -> Actor {
        Actor {
            user_id: 1,
            roles: vec!["Директор".to_string()],
        }
    }

    fn outsider() -> Actor {
        Actor {
            user_id: 2,
            roles: vec!["Гость".to_string()],
        }
    }

    #[tokio::test]
    async fn test_non_admin_rejected_before_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let (ops, state) = admin_ops(dir.path());

        let err = ops.create_category(&outsider(), "Daily").await.unwrap_err();
        assert_eq!(err, DomainError::Unauthorized);
        assert_eq!(state.lock().await.categories.len(), 3);
        // rejected before any snapshot write
        assert!(!dir.path().join("categories.json").exists());
    }

    #[tokio::test]
    async fn test_create_category_persists() {
        let dir = tempfile::tempdir().unwrap();
        let (ops, state) = admin_ops(dir.path());

        let key = ops.create_category(&admin(), "Daily").await.unwrap();
        assert_eq!(key, "daily");
        assert_eq!(state.lock().await.categories.len(), 4);
        assert!(dir.path().join("categories.json").exists());
    }

    #[tokio::test]
    async fn test_add_subcategory_type_selection() {
        let dir = tempfile::tempdir().unwrap();
        let (ops, _) = admin_ops(dir.path());

        let added = ops
            .add_subcategory(&admin(), "фарм", "Rent", "Fixed")
            .await
            .unwrap();
        assert!(added.fixed);
        assert_eq!(added.key, "rent");

        let err = ops
            .add_subcategory(&admin(), "фарм", "Other", "weekly")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_last_subcategory_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let (ops, state) = admin_ops(dir.path());

        let key = ops.create_category(&admin(), "Daily").await.unwrap();
        let err = ops
            .delete_subcategory(&admin(), &key, "настраиваемый")
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::LastSubcategory);
        let state = state.lock().await;
        assert_eq!(state.categories.get(&key).unwrap().subcategories.len(), 1);
    }

    #[tokio::test]
    async fn test_edit_subcategory_fixed_update() {
        let dir = tempfile::tempdir().unwrap();
        let (ops, state) = admin_ops(dir.path());

        ops.edit_subcategory(
            &admin(),
            "таймер",
            "оплата_дома",
            "🏠 Оплата квартиры",
            Some((1, 2, 3, "Оплатить квартиру!".to_string())),
        )
        .await
        .unwrap();

        let state = state.lock().await;
        let (_, sub) = state
            .categories
            .require_subcategory("таймер", "оплата_дома")
            .unwrap();
        assert_eq!(sub.name, "🏠 Оплата квартиры");
        assert_eq!(sub.time(), Some("1д 2ч 3м"));
        assert_eq!(sub.message(), Some("Оплатить квартиру!"));
    }

    #[tokio::test]
    async fn test_edit_subcategory_invalid_parts_leaves_name() {
        let dir = tempfile::tempdir().unwrap();
        let (ops, state) = admin_ops(dir.path());

        let err = ops
            .edit_subcategory(
                &admin(),
                "таймер",
                "оплата_дома",
                "Новое имя",
                Some((0, 99, 0, "x".to_string())),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let state = state.lock().await;
        let (_, sub) = state
            .categories
            .require_subcategory("таймер", "оплата_дома")
            .unwrap();
        assert_eq!(sub.name, "🏠 Оплата дома");
    }

    #[tokio::test]
    async fn test_rename_operations() {
        let dir = tempfile::tempdir().unwrap();
        let (ops, state) = admin_ops(dir.path());

        ops.rename_category(&admin(), "фарм", "🌾 Фермерство")
            .await
            .unwrap();
        ops.rename_subcategory(&admin(), "фарм", "квесты", "📜 Ежедневные квесты")
            .await
            .unwrap();

        let state = state.lock().await;
        let (category, sub) = state
            .categories
            .require_subcategory("фарм", "квесты")
            .unwrap();
        assert_eq!(category.name, "🌾 Фермерство");
        assert_eq!(sub.name, "📜 Ежедневные квесты");
        // the key stays stable across renames
        assert!(state.categories.get("фарм").is_some());
    }

    #[tokio::test]
    async fn test_delete_category_returns_name() {
        let dir = tempfile::tempdir().unwrap();
        let (ops, state) = admin_ops(dir.path());
        let name = ops.delete_category(&admin(), "фарм").await.unwrap();
        assert_eq!(name, "🌾 Фарм");
        assert_eq!(state.lock().await.categories.len(), 2);
    }

    #[test]
    fn test_role_allow_list() {
        let lookup = RoleAllowList::new(vec!["Администратор".to_string()]);
        assert!(lookup.is_admin(&Actor {
            user_id: 1,
            roles: vec!["Участник".to_string(), "Администратор".to_string()],
        }));
        assert!(!lookup.is_admin(&Actor {
            user_id: 1,
            roles: vec![],
        }));
    }
}
