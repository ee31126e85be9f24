//! Document identity types.
//!
//! A document is identified by the triple (kind, locale, slug). Kind is a
//! closed tagged union so that adding a collection is a compile-time-checked
//! change: every `match` over [`DocKind`] or [`CollectionKind`] is exhaustive.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Locale;

/// Reserved slug for the homepage; renders with no path segment.
pub const HOMEPAGE_SLUG: &str = "index";

/// Repeatable content collections.
///
/// Each collection has a listing-root path segment per locale, configured in
/// `[collections]` with a built-in default-locale slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Articles,
    Docs,
    Changelog,
    Events,
    Newsletter,
}

impl CollectionKind {
    /// All collections, in sitemap emission order.
    pub const ALL: [CollectionKind; 5] = [
        Self::Articles,
        Self::Docs,
        Self::Changelog,
        Self::Events,
        Self::Newsletter,
    ];

    /// Stable key used in config sections and on the wire.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Articles => "articles",
            Self::Docs => "docs",
            Self::Changelog => "changelog",
            Self::Events => "events",
            Self::Newsletter => "newsletter",
        }
    }

    /// Built-in default-locale listing-root slug.
    pub const fn default_slug(&self) -> &'static str {
        // Defaults equal the key; locale overrides come from config.
        self.key()
    }

    /// Parse a collection from its stable key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Sitemap `<priority>` for items of this collection.
    pub const fn sitemap_priority(&self) -> f32 {
        match self {
            Self::Articles | Self::Docs => 0.6,
            Self::Events => 0.5,
            Self::Changelog | Self::Newsletter => 0.4,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Document kind: a standalone page or an item in a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocKind {
    Page,
    Collection(CollectionKind),
}

impl DocKind {
    /// Stable wire key: `page` or the collection key.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Collection(kind) => kind.key(),
        }
    }

    /// Parse from the wire key.
    pub fn from_key(key: &str) -> Option<Self> {
        if key == "page" {
            return Some(Self::Page);
        }
        CollectionKind::from_key(key).map(Self::Collection)
    }
}

impl Serialize for DocKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for DocKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_key(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown document kind `{s}`"))
        })
    }
}

/// Fully-identified document: the (kind, locale, slug) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRef {
    pub kind: DocKind,
    pub locale: Locale,
    pub slug: String,
}

impl DocRef {
    pub fn new(kind: DocKind, locale: Locale, slug: impl Into<String>) -> Self {
        Self {
            kind,
            locale,
            slug: slug.into(),
        }
    }

    /// The homepage is the `index` page; it renders as the bare locale root.
    pub fn is_homepage(&self) -> bool {
        self.kind == DocKind::Page && self.slug == HOMEPAGE_SLUG
    }
}

/// A document as returned by the content store.
///
/// Every identifying field is optional: the store may return partially
/// projected rows, and downstream layers degrade rather than fail (an
/// unidentifiable document resolves to `/` and is dropped from translation
/// sets).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDoc {
    /// Document kind (`page` or a collection key). Defaults to `page`.
    #[serde(rename = "type")]
    pub kind: Option<DocKind>,
    pub locale: Option<Locale>,
    pub slug: Option<String>,
    /// Listing-root slug embedded in the document, overriding the registry.
    pub collection_slug: Option<String>,
    /// Last modification timestamp (ISO 8601 date).
    pub lastmod: Option<String>,
}

impl RawDoc {
    /// The full identity, if the store row carries one.
    ///
    /// Rows missing locale or slug are unidentifiable and get discarded by
    /// translation-set assembly.
    pub fn identity(&self) -> Option<DocRef> {
        let locale = self.locale.clone()?;
        let slug = self.slug.clone().filter(|s| !s.is_empty())?;
        Some(DocRef {
            kind: self.kind.unwrap_or(DocKind::Page),
            locale,
            slug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_key_roundtrip() {
        for kind in CollectionKind::ALL {
            assert_eq!(CollectionKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(CollectionKind::from_key("unknown"), None);
    }

    #[test]
    fn test_dockind_key_roundtrip() {
        assert_eq!(DocKind::from_key("page"), Some(DocKind::Page));
        assert_eq!(
            DocKind::from_key("articles"),
            Some(DocKind::Collection(CollectionKind::Articles))
        );
        assert_eq!(DocKind::from_key("nope"), None);
    }

    #[test]
    fn test_dockind_serde() {
        let json = serde_json::to_string(&DocKind::Collection(CollectionKind::Docs)).unwrap();
        assert_eq!(json, r#""docs""#);
        let parsed: DocKind = serde_json::from_str(r#""page""#).unwrap();
        assert_eq!(parsed, DocKind::Page);
        assert!(serde_json::from_str::<DocKind>(r#""widgets""#).is_err());
    }

    #[test]
    fn test_is_homepage() {
        let home = DocRef::new(DocKind::Page, Locale::new("en"), HOMEPAGE_SLUG);
        assert!(home.is_homepage());

        let about = DocRef::new(DocKind::Page, Locale::new("en"), "about");
        assert!(!about.is_homepage());

        // Collection item with slug "index" is not the homepage
        let item = DocRef::new(
            DocKind::Collection(CollectionKind::Articles),
            Locale::new("en"),
            HOMEPAGE_SLUG,
        );
        assert!(!item.is_homepage());
    }

    #[test]
    fn test_rawdoc_identity() {
        let raw: RawDoc = serde_json::from_str(
            r#"{"type": "articles", "locale": "nb", "slug": "hei", "lastmod": "2026-01-01"}"#,
        )
        .unwrap();
        let doc = raw.identity().unwrap();
        assert_eq!(doc.kind, DocKind::Collection(CollectionKind::Articles));
        assert_eq!(doc.locale, Locale::new("nb"));
        assert_eq!(doc.slug, "hei");
    }

    #[test]
    fn test_rawdoc_identity_missing_fields() {
        assert!(RawDoc::default().identity().is_none());

        let raw: RawDoc = serde_json::from_str(r#"{"locale": "en"}"#).unwrap();
        assert!(raw.identity().is_none());

        let raw: RawDoc = serde_json::from_str(r#"{"locale": "en", "slug": ""}"#).unwrap();
        assert!(raw.identity().is_none());
    }

    #[test]
    fn test_rawdoc_kind_defaults_to_page() {
        let raw: RawDoc = serde_json::from_str(r#"{"locale": "en", "slug": "about"}"#).unwrap();
        assert_eq!(raw.identity().unwrap().kind, DocKind::Page);
    }
}
