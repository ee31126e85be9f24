//! Content-store access.
//!
//! This layer consumes one uniform query/fetch capability; it never executes
//! queries itself. [`ContentStore`] is the seam: the live implementation is
//! [`HttpStore`], tests use an in-memory stub.
//!
//! # Error taxonomy
//!
//! - Transient (network-class, 5xx, 429): retryable with bounded backoff
//! - Everything else: surfaced as-is, never retried
//! - "No such document" is `Ok` with an empty/`None` payload, never an error

mod http;
mod retry;

pub use http::HttpStore;
pub use retry::{RetryPolicy, with_retry};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::core::{CollectionKind, DocKind, DocRef, Locale, RawDoc};
use crate::translate::TranslationSet;

// ============================================================================
// StoreError
// ============================================================================

/// Content-store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network-class transport failure (connect, timeout, body read).
    #[error("content store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status from the store.
    #[error("content store returned status {status}")]
    Status { status: u16 },

    /// Response body did not match the expected projection.
    #[error("failed to decode content store response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl StoreError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status } => *status >= 500 || *status == 429,
            Self::Decode(_) => false,
        }
    }
}

// ============================================================================
// Projections
// ============================================================================

/// One row of the per-locale sitemap projection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapDoc {
    #[serde(rename = "type")]
    pub kind: DocKind,
    pub locale: Locale,
    pub slug: String,
    #[serde(default)]
    pub lastmod: Option<String>,
    /// Flagged documents are filtered out before sitemap assembly.
    #[serde(default)]
    pub no_index: bool,
}

impl SitemapDoc {
    pub fn identity(&self) -> DocRef {
        DocRef::new(self.kind, self.locale.clone(), self.slug.clone())
    }
}

/// One row of the bulk translation-link table: a document plus its
/// cross-locale siblings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationLink {
    #[serde(rename = "type")]
    pub kind: DocKind,
    pub locale: Locale,
    pub slug: String,
    #[serde(default)]
    pub translations: Vec<RawDoc>,
}

/// Indexed bulk translation-link table for batch sitemap emission.
///
/// Looking up a document yields the same translation set the live per-page
/// gather would produce from the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct TranslationLinkTable {
    index: FxHashMap<(DocKind, Locale, String), Vec<RawDoc>>,
}

impl TranslationLinkTable {
    pub fn from_links(links: Vec<TranslationLink>) -> Self {
        let mut index = FxHashMap::default();
        for link in links {
            index.insert((link.kind, link.locale, link.slug), link.translations);
        }
        Self { index }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Translation set for a document, always containing the document itself.
    pub fn set_for(&self, doc: &DocRef) -> TranslationSet {
        let mut set = TranslationSet::new();
        set.insert(doc.clone());
        let key = (doc.kind, doc.locale.clone(), doc.slug.clone());
        if let Some(siblings) = self.index.get(&key) {
            for raw in siblings {
                if let Some(sibling) = raw.identity() {
                    set.insert(sibling);
                }
            }
        }
        set
    }
}

// ============================================================================
// ContentStore
// ============================================================================

/// The query/fetch capability this layer consumes.
///
/// Each method corresponds to one named query; callers issue exactly one
/// query per translation-set gather.
#[allow(async_fn_in_trait)]
pub trait ContentStore {
    /// Homepages of every locale.
    async fn homepages(&self) -> Result<Vec<RawDoc>, StoreError>;

    /// All items of one collection sharing a slug, across every locale.
    ///
    /// Collection items have no explicit cross-locale link; slug equality is
    /// the linking strategy. Two unrelated items coincidentally sharing a
    /// slug will be linked as translations.
    async fn collection_items(
        &self,
        kind: CollectionKind,
        slug: &str,
    ) -> Result<Vec<RawDoc>, StoreError>;

    /// Explicit translation group of a page (side table, per-locale siblings).
    async fn page_translations(
        &self,
        slug: &str,
        locale: &Locale,
    ) -> Result<Vec<RawDoc>, StoreError>;

    /// Per-locale sitemap projection.
    async fn sitemap_documents(&self, locale: &Locale) -> Result<Vec<SitemapDoc>, StoreError>;

    /// Bulk translation-link table for batch sitemap emission.
    async fn translation_links(&self) -> Result<TranslationLinkTable, StoreError>;
}

// ============================================================================
// Test stub
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Status { status: 500 }.is_transient());
        assert!(StoreError::Status { status: 503 }.is_transient());
        assert!(StoreError::Status { status: 429 }.is_transient());
        assert!(!StoreError::Status { status: 400 }.is_transient());
        assert!(!StoreError::Status { status: 401 }.is_transient());

        let decode = StoreError::Decode(serde_json::from_str::<u32>("x").unwrap_err());
        assert!(!decode.is_transient());
    }

    #[test]
    fn test_sitemap_doc_decode() {
        let doc: SitemapDoc = serde_json::from_str(
            r#"{"type": "articles", "locale": "en", "slug": "hello", "lastmod": "2026-02-01", "noIndex": true}"#,
        )
        .unwrap();
        assert_eq!(doc.kind, DocKind::Collection(CollectionKind::Articles));
        assert!(doc.no_index);
        assert_eq!(doc.identity().slug, "hello");
    }

    #[test]
    fn test_link_table_lookup() {
        let links = vec![TranslationLink {
            kind: DocKind::Page,
            locale: Locale::new("en"),
            slug: "about".into(),
            translations: vec![
                RawDoc {
                    kind: Some(DocKind::Page),
                    locale: Some(Locale::new("nb")),
                    slug: Some("om".into()),
                    ..Default::default()
                },
                // Unidentifiable rows are dropped.
                RawDoc::default(),
            ],
        }];
        let table = TranslationLinkTable::from_links(links);
        assert_eq!(table.len(), 1);

        let doc = DocRef::new(DocKind::Page, Locale::new("en"), "about");
        let set = table.set_for(&doc);
        assert_eq!(set.len(), 2);
        assert!(set.get(&Locale::new("nb")).is_some());
    }

    #[test]
    fn test_link_table_miss_keeps_self() {
        let table = TranslationLinkTable::default();
        let doc = DocRef::new(DocKind::Page, Locale::new("en"), "about");
        let set = table.set_for(&doc);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&Locale::new("en")), Some(&doc));
    }
}
