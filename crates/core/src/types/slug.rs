//! URL slug type with auto-generation from display names.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A URL-safe slug (lowercase ASCII letters, digits, and hyphens).
///
/// Categories, brands, and products are addressable by slug as well as by
/// numeric id. When a client omits the slug, one is generated from the
/// display name.
///
/// ## Examples
///
/// ```
/// use mercata_core::Slug;
///
/// let slug = Slug::generate("Espresso Machines & Grinders");
/// assert_eq!(slug.as_str(), "espresso-machines-grinders");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum slug length; longer generated slugs are truncated at a
    /// hyphen boundary where possible.
    pub const MAX_LENGTH: usize = 120;

    /// Generate a slug from a display name.
    ///
    /// Non-alphanumeric runs collapse into a single hyphen; leading and
    /// trailing hyphens are trimmed. An input with no usable characters
    /// produces the slug `"item"` so the result is never empty.
    #[must_use]
    pub fn generate(name: &str) -> Self {
        let mut out = String::with_capacity(name.len());
        let mut last_hyphen = true; // suppress a leading hyphen

        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_lowercase());
                last_hyphen = false;
            } else if !last_hyphen {
                out.push('-');
                last_hyphen = true;
            }
        }

        while out.ends_with('-') {
            out.pop();
        }

        if out.len() > Self::MAX_LENGTH {
            out.truncate(Self::MAX_LENGTH);
            if let Some(pos) = out.rfind('-') {
                out.truncate(pos);
            }
        }

        if out.is_empty() {
            out.push_str("item");
        }

        Self(out)
    }

    /// Wrap an already-valid slug coming from the database.
    #[must_use]
    pub const fn from_trusted(slug: String) -> Self {
        Self(slug)
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_basic() {
        assert_eq!(Slug::generate("Coffee Beans").as_str(), "coffee-beans");
    }

    #[test]
    fn test_generate_collapses_punctuation() {
        assert_eq!(
            Slug::generate("Espresso Machines & Grinders").as_str(),
            "espresso-machines-grinders"
        );
    }

    #[test]
    fn test_generate_trims_hyphens() {
        assert_eq!(Slug::generate("  --Sale!--  ").as_str(), "sale");
    }

    #[test]
    fn test_generate_empty_input() {
        assert_eq!(Slug::generate("???").as_str(), "item");
    }

    #[test]
    fn test_generate_preserves_digits() {
        assert_eq!(Slug::generate("V60 Dripper 02").as_str(), "v60-dripper-02");
    }

    #[test]
    fn test_generate_truncates_long_names() {
        let name = "word ".repeat(60);
        let slug = Slug::generate(&name);
        assert!(slug.as_str().len() <= Slug::MAX_LENGTH);
        assert!(!slug.as_str().ends_with('-'));
    }
}
