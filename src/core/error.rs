//! Domain error taxonomy
//!
//! Every operation-level failure is one of these variants. The `Display`
//! text is the user-facing rejection message (the presentation layer
//! prefixes it with an error marker); none of them ever aborts the process.

use thiserror::Error;

/// Errors produced by category, subcategory and reminder operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Unknown category key.
    #[error("Категория не найдена!")]
    CategoryNotFound,

    /// Unknown subcategory key within an existing category.
    #[error("Подкатегория не найдена!")]
    SubcategoryNotFound,

    /// Out-of-range time components, zero durations, malformed type
    /// selections and the like. Carries the user-facing message.
    #[error("{0}")]
    Validation(String),

    /// A category must always keep at least one subcategory.
    #[error("Нельзя удалить последнюю подкатегорию в категории!")]
    LastSubcategory,

    /// Actor is not on the admin allow-list.
    #[error("Недостаточно прав! Только для администраторов.")]
    Unauthorized,
}

/// Convenience alias used throughout the crate.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_user_facing_russian() {
        assert_eq!(
            DomainError::CategoryNotFound.to_string(),
            "Категория не найдена!"
        );
        assert_eq!(
            DomainError::Validation("Часы не могут быть больше 23!".into()).to_string(),
            "Часы не могут быть больше 23!"
        );
    }
}
