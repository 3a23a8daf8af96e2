//! Saved catalogue items and their keys.
//!
//! A [`SavedItem`] is a snapshot of an external catalogue entry (a movie or a
//! book) captured when the user saved it. Items are immutable once saved; the
//! only way to change one is to remove it and save it again.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Maximum allowed length for a catalogue key.
pub const CATALOG_KEY_MAX: usize = 128;

/// Validation errors for saved-item values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedItemValidationError {
    EmptyKey,
    KeyTooLong { max: usize },
}

impl fmt::Display for SavedItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "catalogue key must not be empty"),
            Self::KeyTooLong { max } => {
                write!(f, "catalogue key must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for SavedItemValidationError {}

/// Stable identifier of an item in the external catalogue.
///
/// Catalogue keys arrive either as JSON integers (movie ids) or strings (book
/// ids). Both are normalised to their trimmed decimal/string form, so `42`
/// and `"42"` name the same item.
///
/// # Examples
/// ```
/// use watchlist::domain::CatalogKey;
///
/// let from_int: CatalogKey = serde_json::from_str("42").unwrap();
/// let from_str: CatalogKey = serde_json::from_str("\" 42 \"").unwrap();
/// assert_eq!(from_int, from_str);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(into = "String")]
pub struct CatalogKey(String);

impl CatalogKey {
    /// Validate and construct a key from string input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SavedItemValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SavedItemValidationError::EmptyKey);
        }
        if trimmed.chars().count() > CATALOG_KEY_MAX {
            return Err(SavedItemValidationError::KeyTooLong {
                max: CATALOG_KEY_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Construct a key from a numeric catalogue identifier.
    pub fn from_number(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for CatalogKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CatalogKey> for String {
    fn from(value: CatalogKey) -> Self {
        value.0
    }
}

/// Wire shape accepted for catalogue keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCatalogKey {
    /// Numeric identifier, as used by movie catalogues.
    Number(i64),
    /// Opaque string identifier, as used by book catalogues.
    Text(String),
}

impl TryFrom<RawCatalogKey> for CatalogKey {
    type Error = SavedItemValidationError;

    fn try_from(value: RawCatalogKey) -> Result<Self, Self::Error> {
        match value {
            RawCatalogKey::Number(number) => Ok(Self::from_number(number)),
            RawCatalogKey::Text(text) => Self::new(text),
        }
    }
}

impl<'de> Deserialize<'de> for CatalogKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawCatalogKey::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Catalogue entry persisted in a user's saved set.
///
/// Display attributes are optional because catalogues omit them freely; only
/// the key is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    key: CatalogKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Heat")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "https://image.tmdb.org/t/p/w500/heat.jpg")]
    image: Option<String>,
    /// Release dates for movies or author names for books.
    #[serde(default)]
    release_or_author_info: Vec<String>,
}

impl SavedItem {
    /// Start building an item for `key`.
    pub fn builder(key: CatalogKey) -> SavedItemBuilder {
        SavedItemBuilder {
            item: Self {
                key,
                title: None,
                description: None,
                image: None,
                release_or_author_info: Vec::new(),
            },
        }
    }

    /// Catalogue key, unique within one user's saved set.
    pub fn key(&self) -> &CatalogKey {
        &self.key
    }

    /// Display title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Display description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Image reference (usually a URL).
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Release or authorship metadata.
    pub fn release_or_author_info(&self) -> &[String] {
        &self.release_or_author_info
    }
}

/// Builder for [`SavedItem`]. Blank optional fields are dropped.
#[derive(Debug, Clone)]
pub struct SavedItemBuilder {
    item: SavedItem,
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl SavedItemBuilder {
    /// Set the display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.item.title = non_blank(title);
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.item.description = non_blank(description);
        self
    }

    /// Set the image reference.
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.item.image = non_blank(image);
        self
    }

    /// Set release or authorship metadata; blank entries are skipped.
    pub fn release_or_author_info<I, S>(mut self, info: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item.release_or_author_info = info.into_iter().filter_map(non_blank).collect();
        self
    }

    /// Finish building.
    pub fn build(self) -> SavedItem {
        self.item
    }
}
