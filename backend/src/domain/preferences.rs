//! Anime-genre preferences and the shared category vocabulary.
//!
//! A [`Preference`] records how strongly one user favours one category.
//! Categories are case-insensitive: [`CategoryName`] lowercases its input, so
//! every lookup and write goes through the same normalized key.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use super::{User, UserId};

/// Maximum length of a category name, in characters.
pub const CATEGORY_NAME_MAX: usize = 50;

/// Validation errors for preference value types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceValidationError {
    #[error("category must not be empty")]
    EmptyCategory,
    #[error("category must be at most {max} characters")]
    CategoryTooLong { max: usize },
    #[error("level must be an integer between {min} and {max}")]
    LevelOutOfRange { min: u8, max: u8 },
}

impl PreferenceValidationError {
    /// Machine-readable code reported alongside the field name.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyCategory => "empty",
            Self::CategoryTooLong { .. } => "too_long",
            Self::LevelOutOfRange { .. } => "out_of_range",
        }
    }
}

/// Normalized category name: trimmed and lowercase.
///
/// # Examples
/// ```
/// use tokku::domain::CategoryName;
///
/// let name = CategoryName::new("  Romance ").expect("valid category");
/// assert_eq!(name.as_ref(), "romance");
/// assert_eq!(name, CategoryName::new("ROMANCE").expect("valid category"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryName(String);

impl CategoryName {
    /// Validate and normalize a category name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PreferenceValidationError> {
        let normalized = raw.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(PreferenceValidationError::EmptyCategory);
        }
        if normalized.chars().count() > CATEGORY_NAME_MAX {
            return Err(PreferenceValidationError::CategoryTooLong {
                max: CATEGORY_NAME_MAX,
            });
        }
        Ok(Self(normalized))
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strength of a preference, from 1 (mild) to 5 (essential).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreferenceLevel(u8);

impl PreferenceLevel {
    /// Lowest accepted level.
    pub const MIN: u8 = 1;
    /// Highest accepted level; preferences at this level are "essential".
    pub const MAX: u8 = 5;
    /// Level applied when a request omits one.
    pub const DEFAULT: Self = Self(Self::MIN);
    /// The essential level.
    pub const ESSENTIAL: Self = Self(Self::MAX);

    /// Validate a level.
    ///
    /// # Examples
    /// ```
    /// use tokku::domain::PreferenceLevel;
    ///
    /// assert_eq!(PreferenceLevel::new(3).map(|l| l.value()), Ok(3));
    /// assert!(PreferenceLevel::new(0).is_err());
    /// assert!(PreferenceLevel::new(6).is_err());
    /// ```
    pub fn new(value: i64) -> Result<Self, PreferenceValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|level| (Self::MIN..=Self::MAX).contains(level))
            .map(Self)
            .ok_or(PreferenceValidationError::LevelOutOfRange {
                min: Self::MIN,
                max: Self::MAX,
            })
    }

    /// Numeric value in `1..=5`.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this is the essential level.
    #[must_use]
    pub fn is_essential(self) -> bool {
        self == Self::ESSENTIAL
    }
}

impl Default for PreferenceLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PreferenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a stored category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// Identifier of a stored preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreferenceId(Uuid);

impl PreferenceId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PreferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Shared genre tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
}

/// One user's level for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub id: PreferenceId,
    pub user_id: UserId,
    pub category: CategoryName,
    pub level: PreferenceLevel,
}

/// A user together with every preference they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithPreferences {
    pub user: User,
    pub preferences: Vec<Preference>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("romance", "romance")]
    #[case("Romance", "romance")]
    #[case("  SLICE OF LIFE ", "slice of life")]
    fn category_names_are_normalized(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(CategoryName::new(raw).expect("valid").as_ref(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn category_names_must_not_be_blank(#[case] raw: &str) {
        assert_eq!(
            CategoryName::new(raw),
            Err(PreferenceValidationError::EmptyCategory)
        );
    }

    #[rstest]
    fn category_names_have_length_limit() {
        let raw = "x".repeat(CATEGORY_NAME_MAX + 1);
        assert!(matches!(
            CategoryName::new(raw),
            Err(PreferenceValidationError::CategoryTooLong { .. })
        ));
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(5)]
    fn levels_in_range_are_accepted(#[case] raw: i64) {
        let level = PreferenceLevel::new(raw).expect("in range");
        assert_eq!(i64::from(level.value()), raw);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(-1)]
    #[case(256)]
    #[case(i64::MAX)]
    fn levels_out_of_range_are_rejected(#[case] raw: i64) {
        assert_eq!(
            PreferenceLevel::new(raw),
            Err(PreferenceValidationError::LevelOutOfRange { min: 1, max: 5 })
        );
    }

    #[rstest]
    fn default_level_is_one_and_five_is_essential() {
        assert_eq!(PreferenceLevel::default().value(), 1);
        assert!(PreferenceLevel::new(5).expect("valid").is_essential());
        assert!(!PreferenceLevel::new(4).expect("valid").is_essential());
    }
}
