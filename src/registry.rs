//! Collection slug registry.
//!
//! Immutable (collection, locale) → listing-root-slug table, generated once
//! from config at startup and passed by reference into every component. A
//! locale without its own entry falls back to the default locale's slug, so
//! untranslated collections keep a stable URL everywhere.
//!
//! The reverse lookup is restricted to the queried locale's own mapping: a
//! path segment is only recognized as a collection root if it matches what
//! that locale actually serves.

use rustc_hash::FxHashMap;

use crate::config::ConfigDiagnostics;
use crate::core::{CollectionKind, Locale, LocaleSet};

/// Immutable slug table for collection listing roots.
///
/// Precondition (validated at startup, not per request): slugs are unique
/// within a single locale across all collections.
#[derive(Debug, Clone)]
pub struct SlugRegistry {
    locales: LocaleSet,
    overrides: FxHashMap<(CollectionKind, Locale), String>,
}

impl SlugRegistry {
    /// Create a registry with built-in default slugs only.
    pub fn new(locales: LocaleSet) -> Self {
        Self {
            locales,
            overrides: FxHashMap::default(),
        }
    }

    /// Set a locale-specific slug for a collection.
    pub fn set_slug(&mut self, kind: CollectionKind, locale: Locale, slug: impl Into<String>) {
        self.overrides.insert((kind, locale), slug.into());
    }

    /// The supported locales this registry was built for.
    #[inline]
    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    /// The listing-root slug for `kind` in `locale`.
    ///
    /// Falls back to the default locale's slug when the locale has no entry
    /// of its own. Infallible: `CollectionKind` is closed, so an unknown
    /// collection cannot reach this at request time.
    pub fn slug_for(&self, kind: CollectionKind, locale: &Locale) -> &str {
        if let Some(slug) = self.lookup(kind, locale) {
            return slug;
        }
        if let Some(slug) = self.lookup(kind, self.locales.default_locale()) {
            return slug;
        }
        kind.default_slug()
    }

    /// Reverse lookup: which collection does `segment` name in `locale`?
    ///
    /// Only consults the effective mapping of that specific locale.
    pub fn kind_from_slug(&self, segment: &str, locale: &Locale) -> Option<CollectionKind> {
        CollectionKind::ALL
            .into_iter()
            .find(|kind| self.slug_for(*kind, locale) == segment)
    }

    fn lookup(&self, kind: CollectionKind, locale: &Locale) -> Option<&str> {
        self.overrides
            .get(&(kind, locale.clone()))
            .map(String::as_str)
    }

    /// Check slug uniqueness per locale across all collections.
    ///
    /// A collision would make the reverse lookup ambiguous, so it is a fatal
    /// startup diagnostic, never a request-time error.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for locale in self.locales.iter() {
            let mut seen: FxHashMap<&str, CollectionKind> = FxHashMap::default();
            for kind in CollectionKind::ALL {
                let slug = self.slug_for(kind, locale);
                if let Some(other) = seen.insert(slug, kind) {
                    diag.error_with_hint(
                        format!("collections.{kind}.{locale}"),
                        format!(
                            "slug `{slug}` collides with collections.{other} in locale `{locale}`"
                        ),
                        "collection slugs must be unique within a locale",
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locales() -> LocaleSet {
        LocaleSet::new(Locale::new("en"), ["en", "nb", "ar"].map(Locale::new))
    }

    fn registry() -> SlugRegistry {
        let mut registry = SlugRegistry::new(locales());
        registry.set_slug(CollectionKind::Articles, Locale::new("nb"), "artikler");
        registry.set_slug(CollectionKind::Events, Locale::new("nb"), "arrangementer");
        registry
    }

    #[test]
    fn test_slug_for_override() {
        let registry = registry();
        assert_eq!(
            registry.slug_for(CollectionKind::Articles, &Locale::new("nb")),
            "artikler"
        );
    }

    #[test]
    fn test_slug_for_falls_back_to_default_locale() {
        // No Norwegian override for docs: falls back to the English slug.
        let registry = registry();
        assert_eq!(
            registry.slug_for(CollectionKind::Docs, &Locale::new("nb")),
            "docs"
        );
        // Arabic has no overrides at all.
        assert_eq!(
            registry.slug_for(CollectionKind::Articles, &Locale::new("ar")),
            "articles"
        );
    }

    #[test]
    fn test_default_locale_override_applies_to_fallback() {
        let mut registry = SlugRegistry::new(locales());
        registry.set_slug(CollectionKind::Articles, Locale::new("en"), "writing");
        // Default-locale override is the fallback for untranslated locales.
        assert_eq!(
            registry.slug_for(CollectionKind::Articles, &Locale::new("nb")),
            "writing"
        );
    }

    #[test]
    fn test_kind_from_slug_locale_restricted() {
        let registry = registry();
        assert_eq!(
            registry.kind_from_slug("artikler", &Locale::new("nb")),
            Some(CollectionKind::Articles)
        );
        // The Norwegian slug is not a collection root in English.
        assert_eq!(registry.kind_from_slug("artikler", &Locale::new("en")), None);
        // The fallback slug is recognized in locales without an override.
        assert_eq!(
            registry.kind_from_slug("articles", &Locale::new("ar")),
            Some(CollectionKind::Articles)
        );
    }

    #[test]
    fn test_kind_from_slug_unknown_segment() {
        let registry = registry();
        assert_eq!(registry.kind_from_slug("about", &Locale::new("en")), None);
    }

    #[test]
    fn test_validate_accepts_unique_slugs() {
        let mut diag = ConfigDiagnostics::new();
        registry().validate(&mut diag);
        assert!(!diag.has_errors());
    }

    #[test]
    fn test_validate_rejects_duplicate_slug_in_locale() {
        let mut registry = registry();
        registry.set_slug(CollectionKind::Docs, Locale::new("nb"), "artikler");

        let mut diag = ConfigDiagnostics::new();
        registry.validate(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_validate_ignores_cross_locale_duplicates() {
        // Same slug in different locales is fine.
        let mut registry = SlugRegistry::new(locales());
        registry.set_slug(CollectionKind::Articles, Locale::new("nb"), "articles");

        let mut diag = ConfigDiagnostics::new();
        registry.validate(&mut diag);
        assert!(!diag.has_errors());
    }
}
