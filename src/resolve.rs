//! URL resolution for document identities.
//!
//! Pure path building: given a document's (kind, locale, slug) and a slug
//! source for collection listing roots, produce its relative or absolute URL.
//!
//! Guarantees:
//! - Deterministic and side-effect free; never fails
//! - A document missing locale or slug degrades to `/`
//! - Default-locale documents carry no locale prefix
//! - The homepage (`index`) renders as exactly the root (`/` or `/{locale}`)
//!
//! The slug source is a capability: callers pick the live [`SlugRegistry`]
//! or a precomputed [`SlugTable`] snapshot. Both must resolve identically
//! for the same registry state; a document may embed its own listing slug,
//! which overrides either source.

use url::form_urlencoded;

use crate::core::{CollectionKind, DocKind, DocRef, HOMEPAGE_SLUG, Locale, LocaleSet, RawDoc};
use crate::registry::SlugRegistry;
use rustc_hash::FxHashMap;

// ============================================================================
// Slug sources
// ============================================================================

/// Source of collection listing-root slugs.
pub trait SlugSource {
    fn collection_slug(&self, kind: CollectionKind, locale: &Locale) -> &str;
}

impl SlugSource for SlugRegistry {
    fn collection_slug(&self, kind: CollectionKind, locale: &Locale) -> &str {
        self.slug_for(kind, locale)
    }
}

/// Precomputed slug snapshot, detached from the live registry.
///
/// Resolves identically to the registry it was taken from.
#[derive(Debug, Clone)]
pub struct SlugTable {
    table: FxHashMap<(CollectionKind, Locale), String>,
}

impl SlugTable {
    /// Materialize every (collection, locale) pair of the registry.
    pub fn snapshot(registry: &SlugRegistry) -> Self {
        let mut table = FxHashMap::default();
        for kind in CollectionKind::ALL {
            for locale in registry.locales().iter() {
                table.insert(
                    (kind, locale.clone()),
                    registry.slug_for(kind, locale).to_string(),
                );
            }
        }
        Self { table }
    }
}

impl SlugSource for SlugTable {
    fn collection_slug(&self, kind: CollectionKind, locale: &Locale) -> &str {
        self.table
            .get(&(kind, locale.clone()))
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_slug())
    }
}

// ============================================================================
// Options
// ============================================================================

/// A query parameter with one or many values; repeated values repeat the key.
#[derive(Debug, Clone)]
pub struct QueryParam {
    pub key: String,
    pub values: Vec<String>,
}

impl QueryParam {
    pub fn one(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: vec![value.into()],
        }
    }

    pub fn many(key: impl Into<String>, values: impl IntoIterator<Item = String>) -> Self {
        Self {
            key: key.into(),
            values: values.into_iter().collect(),
        }
    }
}

/// Options for a single resolution.
#[derive(Debug, Clone)]
pub struct ResolveOptions<'a> {
    /// Prefix the configured base URL (if one is configured).
    pub include_base: bool,
    /// Query parameters, serialized in input order.
    pub query: &'a [QueryParam],
    /// When set, only these keys survive into the query string.
    pub allowed_keys: Option<&'a [&'a str]>,
}

impl Default for ResolveOptions<'_> {
    fn default() -> Self {
        Self {
            include_base: false,
            query: &[],
            allowed_keys: None,
        }
    }
}

impl ResolveOptions<'_> {
    /// Absolute URL (base included), no query.
    pub fn absolute() -> Self {
        Self {
            include_base: true,
            ..Default::default()
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Pure URL builder for document identities.
#[derive(Debug, Clone)]
pub struct UrlResolver<'a, S: SlugSource> {
    slugs: &'a S,
    locales: &'a LocaleSet,
    base: Option<&'a str>,
}

impl<'a, S: SlugSource> UrlResolver<'a, S> {
    pub fn new(slugs: &'a S, locales: &'a LocaleSet, base: Option<&'a str>) -> Self {
        Self {
            slugs,
            locales,
            base: base.map(|b| b.trim_end_matches('/')),
        }
    }

    /// The locale set this resolver renders for.
    #[inline]
    pub fn locales(&self) -> &LocaleSet {
        self.locales
    }

    /// Resolve a content-store document. Degrades to `/` when the row is
    /// missing locale or slug.
    pub fn resolve(&self, doc: &RawDoc, opts: &ResolveOptions) -> String {
        let (Some(locale), Some(slug)) = (&doc.locale, doc.slug.as_deref()) else {
            return "/".to_string();
        };
        if slug.is_empty() {
            return "/".to_string();
        }
        self.build(
            doc.kind.unwrap_or(DocKind::Page),
            locale,
            slug,
            doc.collection_slug.as_deref(),
            opts,
        )
    }

    /// Resolve a full identity.
    pub fn resolve_ref(&self, doc: &DocRef, opts: &ResolveOptions) -> String {
        self.build(doc.kind, &doc.locale, &doc.slug, None, opts)
    }

    fn build(
        &self,
        kind: DocKind,
        locale: &Locale,
        slug: &str,
        slug_override: Option<&str>,
        opts: &ResolveOptions,
    ) -> String {
        let base = if opts.include_base { self.base } else { None };

        let mut out = String::new();
        if let Some(base) = base {
            out.push_str(base);
        }

        if !self.locales.is_default(locale) {
            out.push('/');
            out.push_str(locale.as_str());
        }

        // The homepage renders with no path segment at all.
        if slug != HOMEPAGE_SLUG || kind != DocKind::Page {
            if let DocKind::Collection(kind) = kind {
                let collection =
                    slug_override.unwrap_or_else(|| self.slugs.collection_slug(kind, locale));
                out.push('/');
                out.push_str(collection);
            }
            out.push('/');
            out.push_str(slug);
        }

        let query = query_string(opts.query, opts.allowed_keys);
        if !query.is_empty() {
            out.push('?');
            out.push_str(&query);
        }

        // Bare base means default-locale homepage: keep a root slash.
        if let Some(base) = base
            && out == base
        {
            out.push('/');
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }
}

/// Serialize query parameters, preserving input key order and repeating the
/// key for multi-values.
fn query_string(params: &[QueryParam], allowed_keys: Option<&[&str]>) -> String {
    let mut ser = form_urlencoded::Serializer::new(String::new());
    for param in params {
        let allowed = allowed_keys
            .map(|keys| keys.contains(&param.key.as_str()))
            .unwrap_or(true);
        if !allowed {
            continue;
        }
        for value in &param.values {
            ser.append_pair(&param.key, value);
        }
    }
    ser.finish()
}
