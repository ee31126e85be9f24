//! Locale code type for type-safe language handling.
//!
//! - `Locale` is an interned, cheaply clonable language code (e.g. `en`, `nb`)
//! - `LocaleSet` is the configured set of supported locales; exactly one is
//!   the default and carries no URL prefix

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A supported language code.
///
/// Invariants:
/// - Always lowercase, non-empty
/// - Construction does not imply the locale is configured; membership is
///   checked against a [`LocaleSet`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale(Arc<str>);

impl Locale {
    /// Create a locale from a code, normalizing to lowercase.
    pub fn new(code: &str) -> Self {
        let trimmed = code.trim();
        if trimmed.chars().any(|c| c.is_ascii_uppercase()) {
            Self(Arc::from(trimmed.to_ascii_lowercase()))
        } else {
            Self(Arc::from(trimmed))
        }
    }

    /// Get the locale code as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Locale {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Locale {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for Locale {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for Locale {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for Locale {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

/// The configured set of supported locales.
///
/// Exactly one member is the default locale; default-locale documents render
/// without a locale prefix in their URLs.
#[derive(Debug, Clone)]
pub struct LocaleSet {
    default: Locale,
    all: Vec<Locale>,
}

impl LocaleSet {
    /// Build a locale set. The default is prepended if missing from `all`.
    pub fn new(default: Locale, all: impl IntoIterator<Item = Locale>) -> Self {
        let mut members: Vec<Locale> = Vec::new();
        for locale in all {
            if !members.contains(&locale) {
                members.push(locale);
            }
        }
        if !members.contains(&default) {
            members.insert(0, default.clone());
        }
        Self {
            default,
            all: members,
        }
    }

    /// The default locale (no URL prefix).
    #[inline]
    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    /// Check whether a locale is the default.
    #[inline]
    pub fn is_default(&self, locale: &Locale) -> bool {
        *locale == self.default
    }

    /// Look up a supported locale by code.
    pub fn get(&self, code: &str) -> Option<&Locale> {
        self.all.iter().find(|l| l.as_str() == code)
    }

    /// Check whether a code names a supported locale.
    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Iterate all supported locales (default first is not guaranteed).
    pub fn iter(&self) -> impl Iterator<Item = &Locale> {
        self.all.iter()
    }

    /// Number of supported locales.
    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> LocaleSet {
        LocaleSet::new(
            Locale::new("en"),
            ["en", "nb", "ar"].map(Locale::new),
        )
    }

    #[test]
    fn test_locale_normalizes_case() {
        assert_eq!(Locale::new("NB").as_str(), "nb");
        assert_eq!(Locale::new(" en "), "en");
    }

    #[test]
    fn test_locale_equality() {
        assert_eq!(Locale::new("en"), Locale::new("en"));
        assert_ne!(Locale::new("en"), Locale::new("nb"));
    }

    #[test]
    fn test_default_locale() {
        let set = set();
        assert_eq!(set.default_locale(), &Locale::new("en"));
        assert!(set.is_default(&Locale::new("en")));
        assert!(!set.is_default(&Locale::new("nb")));
    }

    #[test]
    fn test_contains() {
        let set = set();
        assert!(set.contains("nb"));
        assert!(!set.contains("fr"));
    }

    #[test]
    fn test_default_prepended_when_missing() {
        let set = LocaleSet::new(Locale::new("en"), ["nb"].map(Locale::new));
        assert!(set.contains("en"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_duplicates_collapsed() {
        let set = LocaleSet::new(Locale::new("en"), ["en", "en", "nb"].map(Locale::new));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let locale = Locale::new("nb");
        let json = serde_json::to_string(&locale).unwrap();
        assert_eq!(json, r#""nb""#);
        let parsed: Locale = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, locale);
    }
}
