//! Store slug type.
//!
//! A store slug is the tenant identifier that scopes every store-specific
//! endpoint (`/api/stores/{slug}/...`, `orders.php?store={slug}`).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`StoreSlug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input string is empty.
    #[error("store slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("store slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9_-]`.
    #[error("store slug contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A validated store slug.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - Only ASCII letters, digits, `-` and `_`
///
/// The restricted alphabet keeps the slug safe to splice into URL paths and
/// query strings without further escaping.
///
/// ## Examples
///
/// ```
/// use quickshop_core::StoreSlug;
///
/// assert!(StoreSlug::parse("yogev").is_ok());
/// assert!(StoreSlug::parse("my-store_2").is_ok());
///
/// assert!(StoreSlug::parse("").is_err());
/// assert!(StoreSlug::parse("../admin").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct StoreSlug(String);

impl StoreSlug {
    /// Maximum length of a store slug.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `StoreSlug` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than
    /// [`Self::MAX_LENGTH`], or contains characters outside `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(SlugError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for StoreSlug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StoreSlug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StoreSlug> for String {
    fn from(slug: StoreSlug) -> Self {
        slug.0
    }
}

impl AsRef<str> for StoreSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
