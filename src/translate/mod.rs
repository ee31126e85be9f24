//! Translation discovery.
//!
//! Given an incoming path and a desired target language, decide whether an
//! equivalent document exists and where. Documents are linked across locales
//! by one of three strategies, depending on what the path identifies:
//!
//! - homepage: every locale has one; fetch them all
//! - collection item: same-slug linking across locales (no explicit link
//!   exists for collection items)
//! - page: explicit translation group from a side table
//!
//! Exactly one content-store query is issued per lookup. Any store failure
//! is caught and folded into the `not-found` shape: this feature backs a
//! locale-switch control and must degrade, never break navigation.

mod parse;

pub use parse::parse_path;

use serde::Serialize;

use crate::core::{DocKind, DocRef, Locale, RawDoc};
use crate::log;
use crate::registry::SlugRegistry;
use crate::resolve::{ResolveOptions, UrlResolver};
use crate::store::{ContentStore, StoreError};

// ============================================================================
// TranslationSet
// ============================================================================

/// Documents representing the same logical content across locales.
///
/// At most one member per locale; first insertion wins. Rebuilt per lookup,
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationSet {
    members: Vec<DocRef>,
}

impl TranslationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member unless its locale is already taken.
    pub fn insert(&mut self, doc: DocRef) -> bool {
        if self.has_locale(&doc.locale) {
            return false;
        }
        self.members.push(doc);
        true
    }

    /// Assemble from raw store rows, discarding unidentifiable ones.
    pub fn from_raw(docs: impl IntoIterator<Item = RawDoc>) -> Self {
        let mut set = Self::new();
        for raw in docs {
            if let Some(doc) = raw.identity() {
                set.insert(doc);
            }
        }
        set
    }

    pub fn has_locale(&self, locale: &Locale) -> bool {
        self.members.iter().any(|m| m.locale == *locale)
    }

    pub fn get(&self, locale: &Locale) -> Option<&DocRef> {
        self.members.iter().find(|m| m.locale == *locale)
    }

    pub fn get_by_code(&self, code: &str) -> Option<&DocRef> {
        self.members.iter().find(|m| m.locale.as_str() == code)
    }

    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.members.iter().map(|m| &m.locale)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocRef> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// How the lookup concluded. There are no other states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    ExactMatch,
    NotFound,
}

/// Result of a translation lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationOutcome {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    pub available_locales: Vec<Locale>,
    pub strategy: Strategy,
}

impl TranslationOutcome {
    fn not_found(available_locales: Vec<Locale>) -> Self {
        Self {
            found: false,
            redirect_url: None,
            available_locales,
            strategy: Strategy::NotFound,
        }
    }
}

// ============================================================================
// Gathering & decision
// ============================================================================

/// Assemble the translation set for a document identity.
///
/// One store query per call. For pages and the homepage the parsed identity
/// is unioned in first, so the current locale always represents the request;
/// for collection items the same-slug query already covers the current
/// document when it exists.
pub async fn gather_translations<S: ContentStore>(
    store: &S,
    identity: &DocRef,
) -> Result<TranslationSet, StoreError> {
    let mut set = TranslationSet::new();

    let fetched = match identity.kind {
        DocKind::Collection(kind) => store.collection_items(kind, &identity.slug).await?,
        DocKind::Page if identity.is_homepage() => {
            set.insert(identity.clone());
            store.homepages().await?
        }
        DocKind::Page => {
            set.insert(identity.clone());
            store
                .page_translations(&identity.slug, &identity.locale)
                .await?
        }
    };

    for raw in fetched {
        if let Some(doc) = raw.identity() {
            set.insert(doc);
        }
    }
    Ok(set)
}

/// Decide whether an equivalent document exists in `target_locale`.
///
/// Never fails: store errors are logged and reported as `not-found` with no
/// available locales.
pub async fn find_available_translation<S: ContentStore>(
    store: &S,
    registry: &SlugRegistry,
    pathname: &str,
    current_locale: &str,
    target_locale: Option<&str>,
) -> TranslationOutcome {
    let identity = parse_path(pathname, registry);

    let set = match gather_translations(store, &identity).await {
        Ok(set) => set,
        Err(e) => {
            log!("translate"; "lookup for {pathname} failed: {e}");
            return TranslationOutcome::not_found(Vec::new());
        }
    };

    let available_locales: Vec<Locale> = set
        .locales()
        .filter(|l| l.as_str() != current_locale)
        .cloned()
        .collect();

    if let Some(target) = target_locale
        && let Some(doc) = set.get_by_code(target)
    {
        let resolver = UrlResolver::new(registry, registry.locales(), None);
        return TranslationOutcome {
            found: true,
            redirect_url: Some(resolver.resolve_ref(doc, &ResolveOptions::default())),
            available_locales,
            strategy: Strategy::ExactMatch,
        };
    }

    TranslationOutcome::not_found(available_locales)
}
